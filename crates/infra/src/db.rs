//! # PostgreSQL 接続管理
//!
//! プロセス全体で共有する接続プールの確立・検証・ヘルスチェックを行う。
//!
//! ## 設計方針
//!
//! - **プールは 1 つだけ**: `main` で確立し、リポジトリとヘルスチェックへ明示的に渡す
//!   （グローバル変数は使わない）
//! - **少数・長寿命の接続**: マネージド DB のプロキシは少ない接続数を前提とするため、
//!   最大接続数を [`MAX_CONNECTIONS`] に固定する
//! - **遅延ダイヤル**: プール作成時には接続しない（`connect_lazy_with`）。
//!   トンネルの資格情報更新で起動がブロックされないようにする
//! - **起動時リトライ**: DB / コネクタより先にコンテナが起動する競合を吸収するため、
//!   疎通確認を [`RetryPolicy`] に従って繰り返す。使い切ったら [`ConnectError`] で起動を中止する
//!
//! ## 起動シーケンス
//!
//! ```text
//! DatabaseConfig ──→ connect_options ──→ connect_lazy_with ──→ verify_connectivity
//!                    (直接 / トンネル)     (ダイヤルしない)       (ping × 最大 5 回)
//! ```
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use waypoint_infra::db::{self, CloudSqlConnectorDialer, DatabaseConfig, RetryPolicy};
//!
//! let config = DatabaseConfig::from_env()?;
//! let pool = db::establish(&config, &CloudSqlConnectorDialer::from_env(), &RetryPolicy::default()).await?;
//!
//! let health = db::ping(&pool, std::time::Duration::from_secs(5)).await;
//! ```

pub mod config;
pub mod tunnel;

use std::{fmt, future::Future, time::Duration};

use sqlx::{Connection as _, PgPool, postgres::{PgConnectOptions, PgPoolOptions}};
use thiserror::Error;

pub use self::{
    config::{ConfigError, DatabaseConfig, DatabaseTarget},
    tunnel::{CloudSqlConnectorDialer, InstanceConnectionName, NetworkPath, SecureTunnelDialer},
};

/// プールの最大接続数
pub const MAX_CONNECTIONS: u32 = 5;

/// プールから接続を取得する際のタイムアウト
pub const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// 接続確立エラー
///
/// 起動時にのみ発生し、回復不能（プロセスを終了する）。
#[derive(Debug, Error)]
pub enum ConnectError {
    /// リトライを使い切っても疎通できなかった
    #[error("データベースに接続できません（{attempts} 回試行）: {reason}")]
    Unreachable { attempts: u32, reason: String },

    /// マイグレーションの適用に失敗した
    #[error("マイグレーションの適用に失敗しました: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// 疎通確認のリトライ方針
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 最大試行回数
    pub max_attempts:    u32,
    /// 試行間の待機時間（固定）
    pub delay:           Duration,
    /// 1 回の試行のタイムアウト
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts:    5,
            delay:           Duration::from_secs(2),
            attempt_timeout: ACQUIRE_TIMEOUT,
        }
    }
}

/// リトライを使い切ったときの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryExhausted<E> {
    pub attempts:   u32,
    pub last_error: E,
}

/// 操作を [`RetryPolicy`] に従って繰り返す
///
/// `operation` には 1 始まりの試行番号が渡される。
/// 最後の試行の後は待機しない。
pub async fn retry_with_policy<T, E, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= max_attempts => {
                return Err(RetryExhausted {
                    attempts:   attempt,
                    last_error: e,
                });
            }
            Err(e) => {
                tracing::warn!(
                    attempt,
                    max_attempts,
                    error = %e,
                    "データベース疎通確認に失敗しました。{:?} 後に再試行します",
                    policy.delay
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}

/// ヘルスチェック結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseHealth {
    Healthy,
    /// 原因（ログ用。クライアントには返さない）
    Unhealthy(String),
}

impl DatabaseHealth {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

impl fmt::Display for DatabaseHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Unhealthy(reason) => write!(f, "unhealthy: {reason}"),
        }
    }
}

/// 接続プールのオプション
pub fn pool_options() -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
}

/// 設定から接続記述子を組み立てる
///
/// セキュアトンネルの場合は接続先の解決をダイヤラに委譲する。
pub fn connect_options(config: &DatabaseConfig, dialer: &dyn SecureTunnelDialer) -> PgConnectOptions {
    let options = match &config.target {
        DatabaseTarget::Direct { host, port } => PgConnectOptions::new().host(host).port(*port),
        DatabaseTarget::SecureTunnel { instance, network } => {
            dialer.connect_options(instance, *network)
        }
    };

    options
        .username(&config.user)
        .password(&config.password)
        .database(&config.database_name)
}

/// 接続プールを確立する
///
/// プールを遅延作成した後、疎通確認をリトライ付きで行う。
/// 疎通できないまま返すことはない。
#[tracing::instrument(skip_all, fields(secure_tunnel = config.use_secure_tunnel()))]
pub async fn establish(
    config: &DatabaseConfig,
    dialer: &dyn SecureTunnelDialer,
    policy: &RetryPolicy,
) -> Result<PgPool, ConnectError> {
    let pool = pool_options().connect_lazy_with(connect_options(config, dialer));

    if let Err(e) = verify_connectivity(&pool, policy).await {
        pool.close().await;
        return Err(e);
    }

    tracing::info!(
        database = %config.database_name,
        max_connections = MAX_CONNECTIONS,
        "データベースに接続しました"
    );
    Ok(pool)
}

/// 疎通確認をリトライ付きで行う
pub async fn verify_connectivity(pool: &PgPool, policy: &RetryPolicy) -> Result<(), ConnectError> {
    retry_with_policy(policy, move |_| async move {
        match ping(pool, policy.attempt_timeout).await {
            DatabaseHealth::Healthy => Ok(()),
            DatabaseHealth::Unhealthy(reason) => Err(reason),
        }
    })
    .await
    .map_err(|exhausted| {
        tracing::error!(
            attempts = exhausted.attempts,
            error = %exhausted.last_error,
            "データベースに接続できませんでした"
        );
        ConnectError::Unreachable {
            attempts: exhausted.attempts,
            reason:   exhausted.last_error,
        }
    })
}

/// データベースへの疎通を確認する
///
/// `timeout` を過ぎたら待機を打ち切り `Unhealthy` を返す。
/// 接続取得と ping の両方がタイムアウトの対象になる。
pub async fn ping(pool: &PgPool, timeout: Duration) -> DatabaseHealth {
    let probe = async {
        let mut conn = pool.acquire().await?;
        conn.ping().await
    };

    match tokio::time::timeout(timeout, probe).await {
        Ok(Ok(())) => DatabaseHealth::Healthy,
        Ok(Err(e)) => DatabaseHealth::Unhealthy(e.to_string()),
        Err(_) => DatabaseHealth::Unhealthy(format!("{timeout:?} 以内に応答がありません")),
    }
}

/// データベースマイグレーションを実行する
///
/// `sqlx::migrate!()` マクロで埋め込まれたマイグレーションファイルを
/// 順番に適用する。適用済みのマイグレーションはスキップされる。
pub async fn run_migrations(pool: &PgPool) -> Result<(), ConnectError> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}
