//! # Waypoint ドメイン層
//!
//! 認証ドメインの値オブジェクトとエラーを定義する。
//!
//! ## 依存関係の方向
//!
//! ```text
//! gateway → infra → domain
//!      ↘             ↑
//!        ────────────┘
//! ```
//!
//! ドメイン層はインフラ層（DB、外部サービス）には一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`error`] - ドメイン層で発生するエラーの定義
//! - [`password`] - 平文パスワード・パスワードハッシュ
//! - [`user`] - ユーザー ID・ユーザー名
//!
//! ## 使用例
//!
//! ```rust
//! use waypoint_domain::{DomainError, user::Username};
//!
//! let username = Username::new("alice").unwrap();
//! assert_eq!(username.as_str(), "alice");
//!
//! assert!(matches!(Username::new(""), Err(DomainError::Validation(_))));
//! ```

pub mod error;
pub mod password;
pub mod user;

pub use error::DomainError;
