//! # Gateway 設定
//!
//! 環境変数から Gateway サーバーの設定を読み込む。
//! データベース関連の変数は [`DatabaseConfig`] を参照。

use std::env;

use waypoint_infra::db::{CloudSqlConnectorDialer, ConfigError, DatabaseConfig};

/// 旅程サービスのデフォルト URL
pub const DEFAULT_ITINERARY_URL: &str = "https://gsc2025-sps-418414887688.us-central1.run.app/run";

/// Gateway サーバーの設定
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// バインドアドレス
    pub host:          String,
    /// ポート番号
    pub port:          u16,
    /// 旅程リクエストの転送先
    pub itinerary_url: String,
    /// データベース接続設定
    pub database:      DatabaseConfig,
    /// セキュアトンネルのダイヤラ
    pub connector:     CloudSqlConnectorDialer,
}

impl GatewayConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let port = match get("PORT") {
            Some(port) => port.parse().map_err(|_| ConfigError::Invalid {
                name:   "PORT",
                reason: format!("ポート番号ではありません: {port}"),
            })?,
            None => 8080,
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            itinerary_url: get("ITINERARY_UPSTREAM_URL")
                .unwrap_or_else(|| DEFAULT_ITINERARY_URL.to_string()),
            database: DatabaseConfig::from_lookup(&lookup)?,
            connector: CloudSqlConnectorDialer::from_lookup(&lookup),
        })
    }
}
