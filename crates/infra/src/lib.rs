//! # LaptopCare インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 設計方針
//!
//! このクレートはドメイン層の通知モデルに対する具体的な送信手段と
//! 設定解決を提供する。SMTP の詳細をカプセル化し、上位層（notifier）を
//! トランスポートの変更から保護する。
//!
//! ## 責務
//!
//! - **メール送信**: [`Mailer`] trait と SMTP / Noop 実装
//! - **設定解決**: [`MailConfigSource`] trait による SMTP 認証情報の解決
//!   （アプリケーション設定 → 環境変数の 2 段フォールバック）
//!
//! ## 依存関係
//!
//! ```text
//! notifier → infra → domain
//! ```
//!
//! インフラ層は `domain` に依存する。
//! ドメイン層はインフラ層に依存しない（依存性逆転の原則）。
//!
//! ## モジュール構成
//!
//! - [`mail_config`] - SMTP 認証情報と設定解決
//! - [`mailer`] - メール送信 trait と実装
//! - [`mock`] - テスト用モック実装（`test-utils` feature）

pub mod mail_config;
pub mod mailer;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use mail_config::{
    EnvMailConfig,
    LayeredMailConfig,
    MailConfigSource,
    SmtpCredentials,
    StaticMailConfig,
};
pub use mailer::{Mailer, NoopMailer, SmtpMailer};
