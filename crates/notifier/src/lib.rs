//! # 通知ディスパッチャ
//!
//! HTTP リクエスト処理と低速な SMTP I/O を分離する非同期メール送信キュー。
//!
//! ## 設計方針
//!
//! - **fire-and-forget**: 呼び出し側はキュー投入の成否（bool）だけを受け取り、
//!   配送の成否はログでのみ観測する（at-most-once、ベストエフォート配送）
//! - **単一ワーカー**: バックグラウンドタスクは 1 つだけ。メッセージは
//!   到着順（FIFO）に 1 通ずつ直列送信し、SMTP サーバーへの負荷を抑える
//! - **依存性注入**: [`Mailer`](laptopcare_infra::Mailer) と
//!   [`MailConfigSource`](laptopcare_infra::MailConfigSource) は構築時に注入し、
//!   グローバルシングルトンを持たない
//!
//! ## モジュール構成
//!
//! - [`dispatcher`] - キュー・ワーカーループ・起動/停止の中核
//! - [`template_renderer`] - tera テンプレートエンジンによるメール生成
//! - [`service`] - テンプレートレンダリング + キュー投入の統合サービス
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use laptopcare_infra::{LayeredMailConfig, SmtpMailer, StaticMailConfig};
//! use laptopcare_notifier::{EmailDispatcher, NotificationService, TemplateRenderer};
//!
//! let dispatcher = Arc::new(EmailDispatcher::new(
//!     Arc::new(SmtpMailer::new()),
//!     Arc::new(LayeredMailConfig::app_then_env(StaticMailConfig::default())),
//! ));
//! let service = NotificationService::new(Arc::clone(&dispatcher), TemplateRenderer::new()?);
//!
//! // アプリケーション起動時
//! service.start();
//!
//! // リクエストハンドラから（ネットワーク I/O なし、即座に返る）
//! let accepted = service.send_jobcard_notification(&notification);
//!
//! // アプリケーション終了時
//! service.stop().await;
//! ```

pub mod dispatcher;
pub mod service;
pub mod template_renderer;

pub use dispatcher::EmailDispatcher;
pub use service::NotificationService;
pub use template_renderer::TemplateRenderer;
