//! # UserRepository
//!
//! ユーザー名とパスワードハッシュの永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **パラメータ化クエリ**: ユーザー入力は常にバインドパラメータで渡す
//! - **一意性は DB で保証**: 重複チェックを事前の SELECT で行わず、
//!   INSERT の一意制約違反を [`InfraError::conflict`] に変換する（同時登録でも 1 行のみ残る）
//! - **存在しないユーザーは `Ok(None)`**: エラーではなく値として返す

use async_trait::async_trait;
use sqlx::PgPool;
use waypoint_domain::{
    password::PasswordHash,
    user::{UserId, Username},
};

use crate::error::InfraError;

/// ユーザーリポジトリトレイト
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// ユーザーを登録する
    ///
    /// # 戻り値
    ///
    /// - `Ok(user_id)`: 採番されたユーザー ID
    /// - `Err(e)` で `e.is_conflict()`: ユーザー名が既に存在する
    /// - `Err(_)`: データベースエラー
    async fn insert(
        &self,
        username: &Username,
        password_hash: &PasswordHash,
    ) -> Result<UserId, InfraError>;

    /// ユーザー名からパスワードハッシュを取得する
    ///
    /// # 戻り値
    ///
    /// - `Ok(Some(hash))`: ユーザーが見つかった場合
    /// - `Ok(None)`: ユーザーが見つからない場合
    /// - `Err(_)`: データベースエラー
    async fn find_password_hash(
        &self,
        username: &Username,
    ) -> Result<Option<PasswordHash>, InfraError>;
}

/// PostgreSQL 実装の UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%username))]
    async fn insert(
        &self,
        username: &Username,
        password_hash: &PasswordHash,
    ) -> Result<UserId, InfraError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(username.as_str())
        .bind(password_hash.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                InfraError::conflict("User", username.as_str())
            }
            other => InfraError::from(other),
        })?;

        Ok(UserId::from_i64(id))
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%username))]
    async fn find_password_hash(
        &self,
        username: &Username,
    ) -> Result<Option<PasswordHash>, InfraError> {
        let hash: Option<String> = sqlx::query_scalar(
            r#"
            SELECT password_hash
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(hash.map(PasswordHash::new))
    }
}
