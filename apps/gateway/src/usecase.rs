//! # ユースケース層
//!
//! Gateway のビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **トレイトベースの設計**: テスト可能性のためトレイトを定義
//! - **依存性注入**: リポジトリとパスワードハッシャーを外部から注入
//! - **薄いハンドラ**: ハンドラは薄く保ち、ロジックはユースケースに集約

pub mod credential;

use async_trait::async_trait;
pub use credential::{CredentialError, CredentialServiceImpl};
use waypoint_domain::user::UserId;

/// 認証情報ユースケーストレイト
///
/// 具体的な実装は `CredentialServiceImpl` で提供される。
#[async_trait]
pub trait CredentialService: Send + Sync {
    /// ユーザーを登録する
    ///
    /// ## 戻り値
    ///
    /// - `Ok(UserId)`: 登録されたユーザーの ID
    /// - `Err(CredentialError)`: 入力不正、ハッシュ化失敗、重複、ストア障害
    async fn register(&self, username: &str, password: &str) -> Result<UserId, CredentialError>;

    /// ユーザー名とパスワードで認証する
    ///
    /// ユーザー不在とパスワード不一致はどちらも
    /// [`CredentialError::InvalidCredentials`] になる。
    async fn authenticate(&self, username: &str, password: &str) -> Result<(), CredentialError>;
}

/// CredentialServiceImpl に CredentialService トレイトを実装
#[async_trait]
impl CredentialService for CredentialServiceImpl {
    async fn register(&self, username: &str, password: &str) -> Result<UserId, CredentialError> {
        self.register(username, password).await
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<(), CredentialError> {
        self.authenticate(username, password).await
    }
}
