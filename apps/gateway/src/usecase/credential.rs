//! # 認証情報ユースケース
//!
//! サインアップ（登録）とサインイン（認証）のビジネスロジックを実装する。
//!
//! ## 列挙攻撃対策
//!
//! - ユーザー不在とパスワード不一致は同一のエラー
//!   （[`CredentialError::InvalidCredentials`]）で返す
//! - ユーザーが存在しない場合もダミーハッシュで検証を実行し、処理時間を均一化する
//!
//! ## 入力検証
//!
//! 空のユーザー名・パスワードは、ハッシュ化やストアへのアクセスより前に拒否する。

use std::sync::Arc;

use thiserror::Error;
use waypoint_domain::{
    DomainError,
    password::{PasswordHash, PlainPassword},
    user::{UserId, Username},
};
use waypoint_infra::{InfraError, PasswordHasher, repository::UserRepository};

/// ダミー検証用のハッシュ（有効な Argon2id 形式、どのパスワードとも一致しない）
const DUMMY_HASH: &str = "$argon2id$v=19$m=65536,t=1,p=1$AAAAAAAAAAAAAAAAAAAAAA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// 認証情報ユースケースのエラー
#[derive(Debug, Error)]
pub enum CredentialError {
    /// 入力が不正（空のユーザー名・パスワード）
    #[error(transparent)]
    Validation(#[from] DomainError),

    /// パスワードのハッシュ化に失敗した
    #[error("パスワードのハッシュ化に失敗しました: {0}")]
    Hash(#[source] InfraError),

    /// ユーザー名が既に登録されている
    #[error("ユーザー名は既に登録されています: {0}")]
    DuplicateUser(String),

    /// ユーザー名またはパスワードが正しくない
    #[error("ユーザー名またはパスワードが正しくありません")]
    InvalidCredentials,

    /// ストアの障害
    #[error("ストアエラー: {0}")]
    Store(#[source] InfraError),
}

/// 認証情報ユースケースの実装
pub struct CredentialServiceImpl {
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
}

impl CredentialServiceImpl {
    /// 新しいユースケースインスタンスを作成
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            user_repository,
            password_hasher,
        }
    }

    /// ユーザーを登録する
    ///
    /// パスワードはランダムなソルト付きでハッシュ化してから保存する。
    /// 平文パスワードは保存しない。
    #[tracing::instrument(skip_all, fields(%username))]
    pub async fn register(&self, username: &str, password: &str) -> Result<UserId, CredentialError> {
        let (username, password) = validate(username, password)?;

        let hash = self
            .password_hasher
            .hash(&password)
            .map_err(CredentialError::Hash)?;

        let inserted = self.user_repository.insert(&username, &hash).await;
        match inserted {
            Ok(user_id) => {
                tracing::info!(user_id = %user_id, "ユーザーを登録しました");
                Ok(user_id)
            }
            Err(e) if e.is_conflict() => Err(CredentialError::DuplicateUser(username.into_string())),
            Err(e) => Err(CredentialError::Store(e)),
        }
    }

    /// ユーザー名とパスワードで認証する
    #[tracing::instrument(skip_all, fields(%username))]
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<(), CredentialError> {
        let (username, password) = validate(username, password)?;

        let stored = self
            .user_repository
            .find_password_hash(&username)
            .await
            .map_err(CredentialError::Store)?;

        let Some(hash) = stored else {
            // タイミング攻撃対策: ダミーハッシュで検証を実行
            self.dummy_verification(&password);
            return Err(CredentialError::InvalidCredentials);
        };

        match self.password_hasher.verify(&password, &hash) {
            Ok(result) if result.is_match() => Ok(()),
            Ok(_) => Err(CredentialError::InvalidCredentials),
            Err(e) => {
                // 保存済みハッシュの破損は内部障害だが、クライアントには認証失敗として返す
                tracing::error!(error = %e, "保存済みのパスワードハッシュを検証できません");
                Err(CredentialError::InvalidCredentials)
            }
        }
    }

    /// ダミーハッシュで検証を実行する（タイミング攻撃対策）
    ///
    /// 固定 sleep ではなく実際に Argon2id 検証を実行することで、
    /// CPU/メモリ状況による自然な変動も含めて同じ時間特性になる。
    fn dummy_verification(&self, password: &PlainPassword) {
        let _ = self
            .password_hasher
            .verify(password, &PasswordHash::new(DUMMY_HASH));
    }
}

/// 空のユーザー名・パスワードを拒否する
fn validate(username: &str, password: &str) -> Result<(Username, PlainPassword), DomainError> {
    let username = Username::new(username)?;
    let password = PlainPassword::try_new(password)?;
    Ok((username, password))
}
