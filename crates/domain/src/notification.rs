//! # 通知
//!
//! メール通知に関するドメインモデルを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`EmailMessage`] | 送信メッセージ | キューに積まれる 1 通のメール（構築後は不変） |
//! | [`EmailAttachment`] | 添付ファイル | ファイル名・バイト列・MIME サブタイプの 3 つ組 |
//! | [`JobcardNotification`] | ジョブカード通知イベント | ジョブカード作成時にメール送信をトリガーする |
//!
//! ## 設計方針
//!
//! - **構築時検証**: [`EmailMessage::new`] が宛先と添付ファイルを検証し、
//!   不正な入力は [`NotificationError::InvalidMessage`] として弾く。
//!   キュー投入後の失敗要因を送信時エラーだけに絞るため。
//! - **fire-and-forget**: 通知送信の失敗はジョブカード操作に影響しない

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 通知送信エラー
#[derive(Debug, Error)]
pub enum NotificationError {
    /// メッセージ構築に失敗（宛先不正、添付ファイル不正など）
    #[error("メッセージ構築に失敗: {0}")]
    InvalidMessage(String),

    /// メール設定が不完全（ユーザー名・パスワード未設定など）
    #[error("メール設定が不完全: {0}")]
    ConfigIncomplete(String),

    /// テンプレートレンダリングに失敗
    #[error("テンプレートレンダリングに失敗: {0}")]
    TemplateFailed(String),

    /// メール送信に失敗
    #[error("メール送信に失敗: {0}")]
    SendFailed(String),
}

/// 添付ファイル
///
/// `mime_subtype` は `application/` 配下のサブタイプ（例: `pdf` → `application/pdf`）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailAttachment {
    /// ファイル名
    pub filename:     String,
    /// ファイル内容
    pub content:      Vec<u8>,
    /// MIME サブタイプ
    pub mime_subtype: String,
}

/// メールメッセージ
///
/// キューに積まれる 1 通の送信メッセージ。[`EmailMessage::new`] で検証してから
/// 構築し、以降は変更しない（キューエントリが所有し、ワーカーが消費する）。
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// 送信先メールアドレス
    pub to:          String,
    /// 件名
    pub subject:     String,
    /// HTML 本文
    pub html_body:   String,
    /// プレーンテキスト本文（省略時は HTML のみの単一パートで送信）
    pub text_body:   Option<String>,
    /// 添付ファイル
    pub attachments: Vec<EmailAttachment>,
}

impl EmailMessage {
    /// メッセージを検証して構築する
    ///
    /// # エラー
    ///
    /// 以下の場合に [`NotificationError::InvalidMessage`] を返す:
    ///
    /// - 宛先が空、`@` を含まない、または空白を含む
    /// - 添付ファイルのファイル名または MIME サブタイプが空
    pub fn new(
        to: impl Into<String>,
        subject: impl Into<String>,
        html_body: impl Into<String>,
        text_body: Option<String>,
        attachments: Vec<EmailAttachment>,
    ) -> Result<Self, NotificationError> {
        let to = to.into();

        if to.is_empty() || !to.contains('@') || to.chars().any(char::is_whitespace) {
            return Err(NotificationError::InvalidMessage(format!(
                "宛先メールアドレスが不正: {to:?}"
            )));
        }

        for attachment in &attachments {
            if attachment.filename.is_empty() {
                return Err(NotificationError::InvalidMessage(
                    "添付ファイル名が空".to_string(),
                ));
            }
            if attachment.mime_subtype.is_empty() {
                return Err(NotificationError::InvalidMessage(format!(
                    "添付ファイル {} の MIME サブタイプが空",
                    attachment.filename
                )));
            }
        }

        Ok(Self {
            to,
            subject: subject.into(),
            html_body: html_body.into(),
            text_body,
            attachments,
        })
    }
}

/// ジョブカード通知イベント
///
/// ジョブカード（修理チケット）作成時にクライアントへ送信する通知の入力。
/// HTTP ハンドラがリクエストから組み立てて通知サービスに渡す。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobcardNotification {
    /// クライアント名
    pub client_name:         String,
    /// クライアントのメールアドレス
    pub client_email:        String,
    /// ジョブカード ID
    pub jobcard_id:          i64,
    /// 問題の説明
    pub problem_description: String,
    /// デバイスのモデル名
    pub device_model:        String,
    /// デバイスのブランド名
    pub device_brand:        String,
}

impl JobcardNotification {
    /// 受信者のメールアドレスを返す
    pub fn recipient_email(&self) -> &str {
        &self.client_email
    }
}
