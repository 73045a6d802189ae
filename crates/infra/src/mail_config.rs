//! # メール設定解決
//!
//! SMTP 認証情報（[`SmtpCredentials`]）の解決を担当するモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: [`MailConfigSource`] で設定の取得元を抽象化
//! - **2 段フォールバック**: アプリケーション設定（[`StaticMailConfig`]）→
//!   環境変数（[`EnvMailConfig`]）の順に [`LayeredMailConfig`] が試行する
//! - **送信時解決**: 認証情報はキャッシュせず、送信試行のたびに解決する。
//!   ワーカーはリクエストスコープの設定コンテキスト外で動作するため、
//!   実行中の設定変更を次の送信から反映できる

use std::{env, sync::Arc};

use laptopcare_domain::notification::NotificationError;

/// SMTP 認証情報
///
/// 設定解決の出力。送信試行 1 回ごとに [`MailConfigSource::resolve`] が生成する。
#[derive(Debug, Clone)]
pub struct SmtpCredentials {
    /// SMTP サーバーのホスト名
    pub server:         String,
    /// SMTP サーバーのポート番号
    pub port:           u16,
    /// STARTTLS を使用するか
    pub use_tls:        bool,
    /// SMTP 認証ユーザー名
    pub username:       String,
    /// SMTP 認証パスワード
    pub password:       String,
    /// 送信元メールアドレス
    pub default_sender: String,
}

/// メール設定の取得元 trait
///
/// 設定解決の中核。ユーザー名とパスワードはどちらも必須で、
/// 欠けている場合はその送信試行のエラーとなる（ワーカーは継続する）。
pub trait MailConfigSource: Send + Sync {
    /// SMTP 認証情報を解決する
    ///
    /// # エラー
    ///
    /// ユーザー名またはパスワードが得られない場合は
    /// [`NotificationError::ConfigIncomplete`] を返す。
    fn resolve(&self) -> Result<SmtpCredentials, NotificationError>;
}

/// アプリケーション設定によるメール設定
///
/// 設定ファイルや起動時引数から組み立てた値を保持する。
/// ユーザー名・パスワードが未設定の場合、解決は失敗し
/// [`LayeredMailConfig`] が次の取得元（環境変数）へフォールバックする。
#[derive(Debug, Clone)]
pub struct StaticMailConfig {
    /// SMTP サーバーのホスト名
    pub server:         String,
    /// SMTP サーバーのポート番号
    pub port:           u16,
    /// STARTTLS を使用するか
    pub use_tls:        bool,
    /// SMTP 認証ユーザー名
    pub username:       Option<String>,
    /// SMTP 認証パスワード
    pub password:       Option<String>,
    /// 送信元メールアドレス（未設定時はユーザー名を使用）
    pub default_sender: Option<String>,
}

impl Default for StaticMailConfig {
    fn default() -> Self {
        Self {
            server:         "smtp.gmail.com".to_string(),
            port:           587,
            use_tls:        true,
            username:       None,
            password:       None,
            default_sender: None,
        }
    }
}

impl MailConfigSource for StaticMailConfig {
    fn resolve(&self) -> Result<SmtpCredentials, NotificationError> {
        let username = self
            .username
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                NotificationError::ConfigIncomplete("ユーザー名が未設定".to_string())
            })?;
        let password = self
            .password
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                NotificationError::ConfigIncomplete("パスワードが未設定".to_string())
            })?;

        Ok(SmtpCredentials {
            server:         self.server.clone(),
            port:           self.port,
            use_tls:        self.use_tls,
            username:       username.to_string(),
            password:       password.to_string(),
            default_sender: self
                .default_sender
                .clone()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| username.to_string()),
        })
    }
}

/// 環境変数によるメール設定
///
/// `{prefix}_SERVER` / `{prefix}_PORT` / `{prefix}_USE_TLS` /
/// `{prefix}_USERNAME` / `{prefix}_PASSWORD` / `{prefix}_DEFAULT_SENDER`
/// を読み取る。プレフィックスのデフォルトは `MAIL`。
///
/// サーバー・ポート・TLS にはデフォルト値があるが、
/// ユーザー名とパスワードは必須。
#[derive(Debug, Clone)]
pub struct EnvMailConfig {
    prefix: String,
}

impl Default for EnvMailConfig {
    fn default() -> Self {
        Self::new("MAIL")
    }
}

impl EnvMailConfig {
    /// 指定したプレフィックスで環境変数を読む設定を作成する
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// `{prefix}_{name}` の値を返す（未設定・空文字は `None`）
    fn var(&self, name: &str) -> Option<String> {
        env::var(format!("{}_{name}", self.prefix))
            .ok()
            .filter(|v| !v.is_empty())
    }
}

impl MailConfigSource for EnvMailConfig {
    fn resolve(&self) -> Result<SmtpCredentials, NotificationError> {
        let port = match self.var("PORT") {
            Some(raw) => raw.parse().map_err(|e| {
                NotificationError::ConfigIncomplete(format!(
                    "{}_PORT が不正なポート番号: {e}",
                    self.prefix
                ))
            })?,
            None => 587,
        };

        let username = self.var("USERNAME").ok_or_else(|| {
            NotificationError::ConfigIncomplete(format!("{}_USERNAME が未設定", self.prefix))
        })?;
        let password = self.var("PASSWORD").ok_or_else(|| {
            NotificationError::ConfigIncomplete(format!("{}_PASSWORD が未設定", self.prefix))
        })?;

        Ok(SmtpCredentials {
            server: self
                .var("SERVER")
                .unwrap_or_else(|| "smtp.gmail.com".to_string()),
            port,
            use_tls: self
                .var("USE_TLS")
                .is_none_or(|v| v.eq_ignore_ascii_case("true")),
            default_sender: self.var("DEFAULT_SENDER").unwrap_or_else(|| username.clone()),
            username,
            password,
        })
    }
}

/// 優先順位付きメール設定
///
/// 登録された取得元を順に試し、最初に解決できたものを採用する。
/// アプリケーション設定 → 環境変数、という元実装の暗黙のフォールバックを
/// 構築時に注入する明示的な解決チェーンとして表現する。
#[derive(Clone)]
pub struct LayeredMailConfig {
    sources: Vec<Arc<dyn MailConfigSource>>,
}

impl LayeredMailConfig {
    /// 優先度順の取得元リストから作成する
    pub fn new(sources: Vec<Arc<dyn MailConfigSource>>) -> Self {
        Self { sources }
    }

    /// アプリケーション設定 → 環境変数の標準 2 段構成を作成する
    pub fn app_then_env(app_config: StaticMailConfig) -> Self {
        Self::new(vec![
            Arc::new(app_config),
            Arc::new(EnvMailConfig::default()),
        ])
    }
}

impl MailConfigSource for LayeredMailConfig {
    fn resolve(&self) -> Result<SmtpCredentials, NotificationError> {
        let mut last_error =
            NotificationError::ConfigIncomplete("設定の取得元が未登録".to_string());

        for source in &self.sources {
            match source.resolve() {
                Ok(credentials) => return Ok(credentials),
                Err(e) => last_error = e,
            }
        }

        Err(last_error)
    }
}
