//! # ヘルスチェックハンドラ
//!
//! Gateway の稼働状態を確認するためのエンドポイント。
//!
//! - `/`: 疎通確認（常に `ok` を返す）
//! - `/health`: Liveness Check（常に `"healthy"` を返す）
//! - `/health/ready`: Readiness Check（DB の接続状態を確認）
//!
//! レスポンス型は [`waypoint_shared::HealthResponse`] / [`waypoint_shared::ReadinessResponse`] を参照。

use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sqlx::PgPool;
use waypoint_infra::db::{self, DatabaseHealth};
use waypoint_shared::{CheckStatus, HealthResponse, ReadinessResponse};

/// Readiness Check のデフォルトタイムアウト
pub const READINESS_TIMEOUT: Duration = Duration::from_secs(5);

/// GET /
pub async fn root() -> &'static str {
    "ok"
}

/// Gateway のヘルスチェックエンドポイント
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy(env!("CARGO_PKG_VERSION")))
}

/// Readiness Check 用の State
pub struct ReadinessState {
    pub pool:    PgPool,
    pub timeout: Duration,
}

/// Gateway の Readiness Check エンドポイント
///
/// DB に ping し、OK → 200、失敗またはタイムアウト → 503。
#[tracing::instrument(skip_all)]
pub async fn readiness_check(State(state): State<Arc<ReadinessState>>) -> impl IntoResponse {
    let database = match db::ping(&state.pool, state.timeout).await {
        DatabaseHealth::Healthy => CheckStatus::Ok,
        DatabaseHealth::Unhealthy(reason) => {
            tracing::warn!(error = %reason, "readiness check: database ping failed");
            CheckStatus::Error
        }
    };

    let mut checks = HashMap::new();
    checks.insert("database".to_string(), database);

    let response = ReadinessResponse::from_checks(checks);
    let http_status = if response.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (http_status, Json(response))
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Method, Request},
        routing::get,
    };
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;
    use waypoint_infra::db::{CloudSqlConnectorDialer, DatabaseConfig, DatabaseTarget};

    use super::*;

    async fn get_body(sut: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = sut.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_rootはokを返す() {
        let sut = Router::new().route("/", get(root));

        let (status, body) = get_body(sut, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"ok");
    }

    #[tokio::test]
    async fn test_health_checkはhealthyを返す() {
        let sut = Router::new().route("/health", get(health_check));

        let (status, body) = get_body(sut, "/health").await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_dbに到達できない場合は503() {
        // Given: 接続を拒否するポートを指す遅延プール
        let config = DatabaseConfig {
            user:          "postgres".to_string(),
            password:      "postgres".to_string(),
            database_name: "waypoint".to_string(),
            target:        DatabaseTarget::Direct {
                host: "127.0.0.1".to_string(),
                port: 1,
            },
        };
        let pool = db::pool_options()
            .connect_lazy_with(db::connect_options(&config, &CloudSqlConnectorDialer::default()));
        let state = Arc::new(ReadinessState {
            pool,
            timeout: Duration::from_millis(200),
        });
        let sut = Router::new()
            .route("/health/ready", get(readiness_check))
            .with_state(state);

        // When
        let (status, body) = get_body(sut, "/health/ready").await;

        // Then
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "status": "not_ready", "checks": { "database": "error" } })
        );
    }
}
