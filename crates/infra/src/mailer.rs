//! # メール送信
//!
//! メール送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: [`Mailer`] trait でメール送信を抽象化
//! - **2 つの実装**: SMTP（本番・開発用）、Noop（通知無効化時用）
//! - **接続は送信ごと**: 認証情報は呼び出しごとに受け取り、接続を
//!   メッセージ単位で確立・解放する。送信試行同士が互いに独立するため、
//!   1 通の失敗が後続の配送へ波及しない

mod noop;
mod smtp;

use async_trait::async_trait;
use laptopcare_domain::notification::{EmailMessage, NotificationError};
pub use noop::NoopMailer;
pub use smtp::SmtpMailer;

use crate::mail_config::SmtpCredentials;

/// メール送信トレイト
///
/// 通知基盤の中核。メール送信の具体的な方法を抽象化する。
/// ワーカーが送信のたびに解決した認証情報を渡すため、
/// 実装は接続設定をキャッシュしない。
#[async_trait]
pub trait Mailer: Send + Sync {
    /// メールを 1 通送信する
    ///
    /// 接続の確立から切断までを 1 回の呼び出しで完結させる。
    /// 失敗時も接続は解放される。
    async fn send(
        &self,
        credentials: &SmtpCredentials,
        email: &EmailMessage,
    ) -> Result<(), NotificationError>;
}
