//! # 通知サービス
//!
//! テンプレートレンダリング → キュー投入を統合するサービス。
//!
//! ## 設計方針
//!
//! - **fire-and-forget**: 戻り値の bool は「キューに受理されたか」のみを表し、
//!   配送の成否はログでのみ観測する
//! - **依存性注入**: ディスパッチャは構築時に受け取り、HTTP ハンドラ等と共有する

use std::sync::Arc;

use laptopcare_domain::notification::JobcardNotification;

use crate::{dispatcher::EmailDispatcher, template_renderer::TemplateRenderer};

/// 通知サービス
///
/// ジョブカード操作に伴うメール通知の入口。レンダリングした通知を
/// [`EmailDispatcher`] のキューに積むだけで、SMTP を待たずに即座に返る。
pub struct NotificationService {
    dispatcher:        Arc<EmailDispatcher>,
    template_renderer: TemplateRenderer,
}

impl NotificationService {
    pub fn new(dispatcher: Arc<EmailDispatcher>, template_renderer: TemplateRenderer) -> Self {
        Self {
            dispatcher,
            template_renderer,
        }
    }

    /// バックグラウンドワーカーを起動する（アプリケーション起動時に 1 回）
    pub fn start(&self) {
        self.dispatcher.start();
    }

    /// ワーカーを停止する（グレースフルシャットダウン時）
    pub async fn stop(&self) {
        self.dispatcher.stop().await;
    }

    /// 内部のディスパッチャへの参照を返す
    pub fn dispatcher(&self) -> &Arc<EmailDispatcher> {
        &self.dispatcher
    }

    /// ジョブカード作成通知をキューに投入する
    ///
    /// # 戻り値
    ///
    /// キューに受理されたら `true`。レンダリングまたはメッセージ構築に
    /// 失敗した場合はエラーログを出して `false` を返し、何も積まない。
    pub fn send_jobcard_notification(&self, notification: &JobcardNotification) -> bool {
        tracing::info!(
            client_name = %notification.client_name,
            client_email = %notification.client_email,
            jobcard_id = notification.jobcard_id,
            device_brand = %notification.device_brand,
            device_model = %notification.device_model,
            "ジョブカード通知メールを準備"
        );

        let email = match self.template_renderer.render_jobcard_created(notification) {
            Ok(email) => email,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    jobcard_id = notification.jobcard_id,
                    "ジョブカード通知のレンダリングに失敗"
                );
                return false;
            }
        };

        self.dispatcher.enqueue_email(email)
    }
}

#[cfg(test)]
mod tests {
    use laptopcare_infra::mock::{MockMailConfig, MockMailer};
    use pretty_assertions::assert_eq;

    use super::*;

    fn make_service(mailer: MockMailer, config: MockMailConfig) -> NotificationService {
        let dispatcher = Arc::new(EmailDispatcher::new(Arc::new(mailer), Arc::new(config)));
        NotificationService::new(dispatcher, TemplateRenderer::new().unwrap())
    }

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

    #[tokio::test]
    async fn 有効な通知がキューに受理される() {
        let service = make_service(MockMailer::new(), MockMailConfig::empty());

        let accepted = service.send_jobcard_notification(&make_notification());

        assert!(accepted);
        assert_eq!(service.dispatcher().queue_len(), 1);
    }

    #[tokio::test]
    async fn 不正な宛先ではfalseを返し何も積まない() {
        let service = make_service(MockMailer::new(), MockMailConfig::empty());
        let notification = JobcardNotification {
            client_email: "not-an-address".to_string(),
            ..make_notification()
        };

        let accepted = service.send_jobcard_notification(&notification);

        assert!(!accepted);
        assert_eq!(service.dispatcher().queue_len(), 0);
    }
}
