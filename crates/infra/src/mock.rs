//! # テスト用モック実装
//!
//! 通知ディスパッチャのテストで使用するインメモリモック。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! laptopcare-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use laptopcare_domain::notification::{EmailMessage, NotificationError};

use crate::{
    mail_config::{MailConfigSource, SmtpCredentials},
    mailer::Mailer,
};

/// テスト用の SMTP 認証情報を作成する
pub fn test_credentials() -> SmtpCredentials {
    SmtpCredentials {
        server:         "smtp.example.com".to_string(),
        port:           2525,
        use_tls:        false,
        username:       "test-user".to_string(),
        password:       "test-pass".to_string(),
        default_sender: "noreply@laptopcare.example.com".to_string(),
    }
}

// ===== MockMailer =====

/// トランスポートのイベント
///
/// 1 通の送信が「接続 → 送信 → 切断」で完結することを検証するために記録する。
/// 失敗時は `Sent` を挟まず `Connected` → `Closed` となる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// 接続を確立した
    Connected,
    /// メッセージを送信した
    Sent {
        /// 宛先メールアドレス
        to: String,
    },
    /// 接続を閉じた
    Closed,
}

/// テスト用のモック Mailer
///
/// 送信されたメッセージと接続イベント列を記録する。
/// `set_fail(true)` で以降の送信を失敗させられる。
#[derive(Clone, Default)]
pub struct MockMailer {
    sent:   Arc<Mutex<Vec<EmailMessage>>>,
    events: Arc<Mutex<Vec<TransportEvent>>>,
    fail:   Arc<Mutex<bool>>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以降の送信を失敗させるかを設定する
    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    /// 送信に成功したメッセージを返す
    pub fn sent_emails(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// 記録されたトランスポートイベント列を返す
    pub fn events(&self) -> Vec<TransportEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(
        &self,
        _credentials: &SmtpCredentials,
        email: &EmailMessage,
    ) -> Result<(), NotificationError> {
        self.events.lock().unwrap().push(TransportEvent::Connected);

        if *self.fail.lock().unwrap() {
            // 失敗時も接続は閉じる（実装の「必ず解放」契約に合わせる）
            self.events.lock().unwrap().push(TransportEvent::Closed);
            return Err(NotificationError::SendFailed(
                "モック送信失敗".to_string(),
            ));
        }

        self.sent.lock().unwrap().push(email.clone());
        self.events.lock().unwrap().push(TransportEvent::Sent {
            to: email.to.clone(),
        });
        self.events.lock().unwrap().push(TransportEvent::Closed);
        Ok(())
    }
}

// ===== MockMailConfig =====

/// テスト用のモック MailConfigSource
///
/// 保持する認証情報を返す。`None` の場合は解決失敗となる。
/// 解決回数を記録し、「送信ごとに解決し直す」契約の検証に使う。
#[derive(Clone, Default)]
pub struct MockMailConfig {
    credentials:   Arc<Mutex<Option<SmtpCredentials>>>,
    resolve_calls: Arc<Mutex<usize>>,
}

impl MockMailConfig {
    /// 常に解決に成功するモックを作成する
    pub fn with_credentials(credentials: SmtpCredentials) -> Self {
        Self {
            credentials:   Arc::new(Mutex::new(Some(credentials))),
            resolve_calls: Arc::new(Mutex::new(0)),
        }
    }

    /// 常に解決に失敗するモックを作成する
    pub fn empty() -> Self {
        Self::default()
    }

    /// 保持する認証情報を差し替える
    pub fn set_credentials(&self, credentials: Option<SmtpCredentials>) {
        *self.credentials.lock().unwrap() = credentials;
    }

    /// `resolve` が呼ばれた回数を返す
    pub fn resolve_calls(&self) -> usize {
        *self.resolve_calls.lock().unwrap()
    }
}

impl MailConfigSource for MockMailConfig {
    fn resolve(&self) -> Result<SmtpCredentials, NotificationError> {
        *self.resolve_calls.lock().unwrap() += 1;
        self.credentials.lock().unwrap().clone().ok_or_else(|| {
            NotificationError::ConfigIncomplete("モック設定が未設定".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn make_email(to: &str) -> EmailMessage {
        EmailMessage::new(to, "件名", "<p>本文</p>", None, vec![]).unwrap()
    }

    #[tokio::test]
    async fn mock_mailerが送信メッセージとイベントを記録する() {
        let mailer = MockMailer::new();

        mailer
            .send(&test_credentials(), &make_email("a@example.com"))
            .await
            .unwrap();

        assert_eq!(mailer.sent_emails().len(), 1);
        assert_eq!(mailer.sent_emails()[0].to, "a@example.com");
        assert_eq!(
            mailer.events(),
            vec![
                TransportEvent::Connected,
                TransportEvent::Sent {
                    to: "a@example.com".to_string()
                },
                TransportEvent::Closed,
            ]
        );
    }

    #[tokio::test]
    async fn mock_mailerが失敗モードでも接続を閉じる() {
        let mailer = MockMailer::new();
        mailer.set_fail(true);

        let result = mailer
            .send(&test_credentials(), &make_email("a@example.com"))
            .await;

        assert!(matches!(result, Err(NotificationError::SendFailed(_))));
        assert!(mailer.sent_emails().is_empty());
        assert_eq!(
            mailer.events(),
            vec![TransportEvent::Connected, TransportEvent::Closed]
        );
    }

    #[test]
    fn mock_mail_configが解決回数を記録する() {
        let config = MockMailConfig::with_credentials(test_credentials());

        assert_eq!(config.resolve_calls(), 0);
        config.resolve().unwrap();
        config.resolve().unwrap();
        assert_eq!(config.resolve_calls(), 2);
    }

    #[test]
    fn mock_mail_configが未設定時にconfig_incompleteを返す() {
        let config = MockMailConfig::empty();

        assert!(matches!(
            config.resolve(),
            Err(NotificationError::ConfigIncomplete(_))
        ));
        assert_eq!(config.resolve_calls(), 1);
    }
}
