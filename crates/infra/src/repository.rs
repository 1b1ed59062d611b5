//! # リポジトリ実装
//!
//! 永続化操作のトレイトと PostgreSQL による具体的な実装を提供する。
//!
//! ## 設計方針
//!
//! - **データベース抽象化**: sqlx を使用し、PostgreSQL 固有の処理をカプセル化
//! - **テスタビリティ**: トレイト経由でモック可能な設計

pub mod user_repository;

pub use user_repository::{PostgresUserRepository, UserRepository};
