//! Noop メール送信実装
//!
//! メールを実際に送信せず、ログ出力のみ行う。
//! テスト環境や通知無効化時に使用する。

use async_trait::async_trait;
use laptopcare_domain::notification::{EmailMessage, NotificationError};

use super::Mailer;
use crate::mail_config::SmtpCredentials;

/// Noop メール送信（ログ出力のみ）
#[derive(Debug, Clone)]
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(
        &self,
        _credentials: &SmtpCredentials,
        email: &EmailMessage,
    ) -> Result<(), NotificationError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "Noop: メール送信をスキップ"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::test_credentials;

    #[tokio::test]
    async fn sendがエラーを返さない() {
        let mailer = NoopMailer;
        let email = EmailMessage::new(
            "test@example.com",
            "テスト件名",
            "<p>テスト</p>",
            Some("テスト".to_string()),
            vec![],
        )
        .unwrap();

        let result = mailer.send(&test_credentials(), &email).await;
        assert!(result.is_ok());
    }

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NoopMailer>();
    }
}
