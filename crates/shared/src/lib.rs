//! # LaptopCare 共有ユーティリティ
//!
//! このクレートは、LaptopCare
//! プロジェクト全体で使用される共通ユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - API サービスやバックグラウンドワーカーの起動時初期化から利用される
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - 外部クレートへの依存は最小限に抑える

pub mod observability;
