//! # LaptopCare ドメイン層
//!
//! 修理工房管理システムの通知サブシステムに関するドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - インフラ層（SMTP、設定解決）への依存を持たない純粋なデータ型のみを配置
//! - メッセージは構築時に検証され、構築後は不変（ワーカーとの間でロック不要）
//! - エラーは `thiserror` による enum で分類し、上層が破棄・ログ出力を判断する
//!
//! ## モジュール構成
//!
//! - [`notification`] - メール通知のドメインモデルとエラー定義

pub mod notification;

pub use notification::{EmailAttachment, EmailMessage, JobcardNotification, NotificationError};
