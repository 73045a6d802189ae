//! # テンプレートレンダラー
//!
//! tera テンプレートエンジンで通知メールを HTML/plaintext 両形式で生成する。
//!
//! ## 設計方針
//!
//! - **`include_str!` によるコンパイル時埋め込み**: テンプレートはバイナリに埋め込まれる
//! - **件名パターン**: `New Job Card #{jobcard_id} Created - Laptop Care`

use laptopcare_domain::notification::{EmailMessage, JobcardNotification, NotificationError};
use tera::{Context, Tera};

/// テンプレートレンダラー
///
/// tera テンプレートエンジンをラップし、[`JobcardNotification`] から
/// [`EmailMessage`] を生成する。
pub struct TemplateRenderer {
    engine: Tera,
}

impl TemplateRenderer {
    /// 新しいレンダラーインスタンスを作成
    ///
    /// `include_str!` で埋め込んだテンプレートを tera に登録する。
    pub fn new() -> Result<Self, NotificationError> {
        let mut engine = Tera::default();

        engine
            .add_raw_templates(vec![
                (
                    "jobcard_created.html",
                    include_str!("../templates/notifications/jobcard_created.html"),
                ),
                (
                    "jobcard_created.txt",
                    include_str!("../templates/notifications/jobcard_created.txt"),
                ),
            ])
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        Ok(Self { engine })
    }

    /// ジョブカード作成通知のメールメッセージを生成する
    pub fn render_jobcard_created(
        &self,
        notification: &JobcardNotification,
    ) -> Result<EmailMessage, NotificationError> {
        let mut context = Context::new();
        context.insert("client_name", &notification.client_name);
        context.insert("jobcard_id", &notification.jobcard_id);
        context.insert("problem_description", &notification.problem_description);
        context.insert("device_model", &notification.device_model);
        context.insert("device_brand", &notification.device_brand);

        let subject = format!(
            "New Job Card #{} Created - Laptop Care",
            notification.jobcard_id
        );

        let html_body = self
            .engine
            .render("jobcard_created.html", &context)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;
        let text_body = self
            .engine
            .render("jobcard_created.txt", &context)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        EmailMessage::new(
            notification.recipient_email(),
            subject,
            html_body,
            Some(text_body),
            vec![],
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn make_notification() -> JobcardNotification {
        JobcardNotification {
            client_name:         "Jane".to_string(),
            client_email:        "jane@example.com".to_string(),
            jobcard_id:          42,
            problem_description: "Battery dead".to_string(),
            device_model:        "X1".to_string(),
            device_brand:        "Lenovo".to_string(),
        }
    }

    #[test]
    fn newが正常に初期化される() {
        let renderer = TemplateRenderer::new();
        assert!(renderer.is_ok());
    }

    #[test]
    fn jobcard_createdのレンダリングが正しい() {
        let renderer = TemplateRenderer::new().unwrap();

        let email = renderer.render_jobcard_created(&make_notification()).unwrap();

        assert_eq!(email.to, "jane@example.com");
        assert_eq!(email.subject, "New Job Card #42 Created - Laptop Care");

        assert!(email.html_body.contains("Jane"));
        assert!(email.html_body.contains("#42"));
        assert!(email.html_body.contains("Lenovo"));
        assert!(email.html_body.contains("X1"));
        assert!(email.html_body.contains("Battery dead"));

        let text_body = email.text_body.unwrap();
        assert!(text_body.contains("Jane"));
        assert!(text_body.contains("#42"));
        assert!(text_body.contains("Lenovo"));
        assert!(text_body.contains("X1"));
        assert!(text_body.contains("Battery dead"));
    }

    #[test]
    fn デバイスはブランドとモデルの順で表示される() {
        let renderer = TemplateRenderer::new().unwrap();

        let email = renderer.render_jobcard_created(&make_notification()).unwrap();

        assert!(email.html_body.contains("Lenovo X1"));
    }

    #[test]
    fn 不正なクライアントメールアドレスでエラーを返す() {
        let renderer = TemplateRenderer::new().unwrap();
        let notification = JobcardNotification {
            client_email: "not-an-address".to_string(),
            ..make_notification()
        };

        let result = renderer.render_jobcard_created(&notification);
        assert!(matches!(
            result,
            Err(NotificationError::InvalidMessage(_))
        ));
    }
}
