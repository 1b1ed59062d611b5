//! # セキュアトンネル
//!
//! マネージドデータベースインスタンスへの接続経路を解決する。
//!
//! ## 方式
//!
//! マネージドコネクタ（Cloud SQL Auth Proxy 等）がインスタンスごとに
//! Unix ソケットを公開し、認証・暗号化された経路をアプリケーションの代わりに張る。
//! アプリケーションはインスタンス参照からソケットパスを解決し、そこへ接続するだけでよい。
//!
//! ```text
//! ┌──────────┐  unix socket   ┌───────────┐  TLS (IAM 認証)  ┌────────────┐
//! │ gateway  │───────────────→│ connector │─────────────────→│ Cloud SQL  │
//! └──────────┘ /cloudsql/p:r:i└───────────┘                  └────────────┘
//! ```
//!
//! 経路の解決は純粋な計算であり、ここでは接続を張らない。
//! 実際のダイヤルは接続プールが最初に接続を必要としたとき（遅延）に行われる。

use std::path::{Path, PathBuf};

use derive_more::Display;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

use super::config::ConfigError;

pub const ENV_DB_SOCKET_DIR: &str = "DB_SOCKET_DIR";
pub const ENV_DB_PRIVATE_SOCKET_DIR: &str = "DB_PRIVATE_SOCKET_DIR";

/// パブリック経路のコネクタのソケットディレクトリ（Cloud Run の規約）
pub const DEFAULT_SOCKET_DIR: &str = "/cloudsql";
/// プライベート経路（`--private-ip` で起動したコネクタ）のソケットディレクトリ
pub const DEFAULT_PRIVATE_SOCKET_DIR: &str = "/cloudsql-private";

/// インスタンス接続名（`project:region:instance`）
///
/// ドメインスコープのプロジェクト（`example.com:project:region:instance`）も受け付ける。
/// ソケットパスの一部になるため、`/` を含む値は拒否する。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[display("{_0}")]
pub struct InstanceConnectionName(String);

impl InstanceConnectionName {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::Invalid {
            name:   super::config::ENV_INSTANCE_CONNECTION_NAME,
            reason: format!("{reason}: {value}"),
        };

        if value.contains('/') {
            return Err(invalid("'/' は使用できません"));
        }

        let segments: Vec<&str> = value.split(':').collect();
        if !(segments.len() == 3 || segments.len() == 4) {
            return Err(invalid("project:region:instance の形式である必要があります"));
        }
        if segments.iter().any(|s| s.is_empty()) {
            return Err(invalid("空のセグメントがあります"));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// プロジェクト部分（ドメインスコープの場合は `domain:project`）
    pub fn project(&self) -> &str {
        let end = self.0.len() - self.region().len() - self.instance().len() - 2;
        &self.0[..end]
    }

    pub fn region(&self) -> &str {
        self.0.rsplit(':').nth(1).unwrap_or_default()
    }

    pub fn instance(&self) -> &str {
        self.0.rsplit(':').next().unwrap_or_default()
    }
}

/// トンネルが通るネットワーク経路
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum NetworkPath {
    /// パブリック IP 経由
    #[default]
    #[display("public")]
    Public,
    /// VPC 内のプライベート IP 経由
    #[display("private")]
    Private,
}

/// セキュアトンネルのダイヤラ
///
/// インスタンス参照とネットワーク経路から、接続プールが使う接続記述子を作る。
/// 認証情報（ユーザー・パスワード・DB 名）は呼び出し側で付与する。
pub trait SecureTunnelDialer: Send + Sync {
    fn connect_options(
        &self,
        instance: &InstanceConnectionName,
        network: NetworkPath,
    ) -> PgConnectOptions;
}

/// Cloud SQL コネクタの Unix ソケット経由で接続するダイヤラ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudSqlConnectorDialer {
    public_socket_dir:  PathBuf,
    private_socket_dir: PathBuf,
}

impl CloudSqlConnectorDialer {
    pub fn new(public_socket_dir: impl Into<PathBuf>, private_socket_dir: impl Into<PathBuf>) -> Self {
        Self {
            public_socket_dir:  public_socket_dir.into(),
            private_socket_dir: private_socket_dir.into(),
        }
    }

    /// 環境変数 `DB_SOCKET_DIR` / `DB_PRIVATE_SOCKET_DIR` から作成する
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        Self::new(
            get(ENV_DB_SOCKET_DIR, DEFAULT_SOCKET_DIR),
            get(ENV_DB_PRIVATE_SOCKET_DIR, DEFAULT_PRIVATE_SOCKET_DIR),
        )
    }

    fn socket_dir(&self, network: NetworkPath) -> &Path {
        match network {
            NetworkPath::Public => &self.public_socket_dir,
            NetworkPath::Private => &self.private_socket_dir,
        }
    }

    /// インスタンスのソケットディレクトリ
    ///
    /// sqlx はこの下の `.s.PGSQL.<port>` に接続する。
    pub fn socket_path(&self, instance: &InstanceConnectionName, network: NetworkPath) -> PathBuf {
        self.socket_dir(network).join(instance.as_str())
    }
}

impl Default for CloudSqlConnectorDialer {
    fn default() -> Self {
        Self::new(DEFAULT_SOCKET_DIR, DEFAULT_PRIVATE_SOCKET_DIR)
    }
}

impl SecureTunnelDialer for CloudSqlConnectorDialer {
    fn connect_options(
        &self,
        instance: &InstanceConnectionName,
        network: NetworkPath,
    ) -> PgConnectOptions {
        // 暗号化はコネクタが担うため、ソケット上では TLS を使わない
        PgConnectOptions::new()
            .socket(self.socket_path(instance, network))
            .ssl_mode(PgSslMode::Disable)
    }
}
