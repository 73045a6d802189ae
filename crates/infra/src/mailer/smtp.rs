//! SMTP メール送信実装
//!
//! lettre の `AsyncSmtpTransport` を使用してメールを送信する。
//! トランスポートは送信ごとに構築・破棄する（接続プールなし）。
//! 元実装と同じく 1 通ごとに接続 → 送信 → 切断が完結し、
//! 送信試行同士が接続状態を共有しない。

use async_trait::async_trait;
use laptopcare_domain::notification::{EmailMessage, NotificationError};
use lettre::{
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    message::{Attachment, Mailbox, Message, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};

use super::Mailer;
use crate::mail_config::SmtpCredentials;

/// SMTP メール送信
///
/// `lettre::AsyncSmtpTransport<Tokio1Executor>` を送信ごとに構築する。
/// `use_tls` が有効なら STARTTLS、無効なら平文接続
/// （Mailpit 等のローカル SMTP 向け）を使用する。
#[derive(Debug, Clone, Default)]
pub struct SmtpMailer;

impl SmtpMailer {
    /// 新しい SMTP 送信インスタンスを作成
    pub fn new() -> Self {
        Self
    }

    /// 認証情報からトランスポートを構築する
    fn build_transport(
        credentials: &SmtpCredentials,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, NotificationError> {
        let builder = if credentials.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&credentials.server)
                .map_err(|e| NotificationError::SendFailed(format!("STARTTLS 設定不正: {e}")))?
        } else {
            // builder_dangerous: TLS なしで接続（ローカル SMTP 向け）
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&credentials.server)
        };

        Ok(builder
            .port(credentials.port)
            .credentials(Credentials::new(
                credentials.username.clone(),
                credentials.password.clone(),
            ))
            .build())
    }

    /// ドメインの [`EmailMessage`] から lettre の MIME メッセージを構築する
    fn build_message(
        credentials: &SmtpCredentials,
        email: &EmailMessage,
    ) -> Result<Message, NotificationError> {
        let from: Mailbox = credentials.default_sender.parse().map_err(|e| {
            NotificationError::InvalidMessage(format!("送信元アドレス不正: {e}"))
        })?;
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| NotificationError::InvalidMessage(format!("宛先アドレス不正: {e}")))?;

        let html_part = SinglePart::builder()
            .header(ContentType::TEXT_HTML)
            .body(email.html_body.clone());

        let body = match &email.text_body {
            Some(text) => MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(text.clone()),
                )
                .singlepart(html_part),
            None => MultiPart::alternative().singlepart(html_part),
        };

        let body = if email.attachments.is_empty() {
            body
        } else {
            let mut mixed = MultiPart::mixed().multipart(body);
            for attachment in &email.attachments {
                let content_type =
                    ContentType::parse(&format!("application/{}", attachment.mime_subtype))
                        .map_err(|e| {
                            NotificationError::InvalidMessage(format!(
                                "添付ファイル {} の MIME タイプ不正: {e}",
                                attachment.filename
                            ))
                        })?;
                mixed = mixed.singlepart(
                    Attachment::new(attachment.filename.clone())
                        .body(attachment.content.clone(), content_type),
                );
            }
            mixed
        };

        Message::builder()
            .from(from)
            .to(to)
            .subject(&email.subject)
            .multipart(body)
            .map_err(|e| NotificationError::InvalidMessage(format!("メッセージ構築失敗: {e}")))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(
        &self,
        credentials: &SmtpCredentials,
        email: &EmailMessage,
    ) -> Result<(), NotificationError> {
        let message = Self::build_message(credentials, email)?;
        let transport = Self::build_transport(credentials)?;

        // lettre はプールなし構成のため、send 完了時（成否を問わず）に接続が閉じる
        transport
            .send(message)
            .await
            .map_err(|e| NotificationError::SendFailed(format!("SMTP 送信失敗: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use laptopcare_domain::notification::EmailAttachment;

    use super::*;
    use crate::mock::test_credentials;

    fn make_email(attachments: Vec<EmailAttachment>) -> EmailMessage {
        EmailMessage::new(
            "jane@example.com",
            "New Job Card #42 Created - Laptop Care",
            "<p>A new job card has been created.</p>",
            Some("A new job card has been created.".to_string()),
            attachments,
        )
        .unwrap()
    }

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SmtpMailer>();
    }

    #[test]
    fn build_messageが本文のみのメッセージを構築できる() {
        let message = SmtpMailer::build_message(&test_credentials(), &make_email(vec![]));
        assert!(message.is_ok());
    }

    #[test]
    fn build_messageが添付ファイル付きメッセージを構築できる() {
        let attachment = EmailAttachment {
            filename:     "invoice.pdf".to_string(),
            content:      vec![0x25, 0x50, 0x44, 0x46],
            mime_subtype: "pdf".to_string(),
        };

        let message =
            SmtpMailer::build_message(&test_credentials(), &make_email(vec![attachment]));
        assert!(message.is_ok());
    }

    #[test]
    fn build_messageがhtmlのみの単一パートメッセージを構築できる() {
        let email = EmailMessage::new(
            "jane@example.com",
            "件名",
            "<p>HTML のみ</p>",
            None,
            vec![],
        )
        .unwrap();

        let message = SmtpMailer::build_message(&test_credentials(), &email);
        assert!(message.is_ok());
    }

    #[test]
    fn build_messageが不正なmimeサブタイプでinvalid_messageを返す() {
        let attachment = EmailAttachment {
            filename:     "data.bin".to_string(),
            content:      vec![0u8; 8],
            mime_subtype: "not a subtype".to_string(),
        };

        let result =
            SmtpMailer::build_message(&test_credentials(), &make_email(vec![attachment]));
        assert!(matches!(
            result,
            Err(NotificationError::InvalidMessage(_))
        ));
    }

    #[test]
    fn build_transportがstarttls構成を構築できる() {
        let credentials = SmtpCredentials {
            use_tls: true,
            ..test_credentials()
        };
        assert!(SmtpMailer::build_transport(&credentials).is_ok());
    }

    #[test]
    fn build_transportが平文構成を構築できる() {
        let credentials = SmtpCredentials {
            use_tls: false,
            ..test_credentials()
        };
        assert!(SmtpMailer::build_transport(&credentials).is_ok());
    }
}
