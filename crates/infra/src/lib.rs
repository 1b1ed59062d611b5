//! # Waypoint インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 責務
//!
//! - **接続管理**: PostgreSQL 接続プールの確立（直接接続 / セキュアトンネル経由）、
//!   起動時のリトライ、ヘルスチェック用 ping
//! - **パスワードハッシュ**: Argon2id によるハッシュ化と検証
//! - **リポジトリ実装**: ユーザー認証情報の永続化
//!
//! ## 依存関係
//!
//! ```text
//! gateway → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`db`] - 接続プールの確立・リトライ・ヘルスチェック
//! - [`error`] - インフラ層エラー定義
//! - [`password`] - パスワードハッシュ
//! - [`repository`] - リポジトリ実装
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use waypoint_infra::db::{self, CloudSqlConnectorDialer, DatabaseConfig, RetryPolicy};
//!
//! async fn setup() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env()?;
//!     let dialer = CloudSqlConnectorDialer::from_env();
//!     let pool = db::establish(&config, &dialer, &RetryPolicy::default()).await?;
//!     db::run_migrations(&pool).await?;
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod password;
pub mod repository;

pub use error::{InfraError, InfraErrorKind};
pub use password::{Argon2PasswordHasher, PasswordHasher};
