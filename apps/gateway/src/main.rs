//! # Waypoint Gateway サーバー
//!
//! 旅程プランナーの公開 HTTP エッジ。
//!
//! ## 役割
//!
//! - **ユーザー登録・認証**: Argon2id でハッシュ化したパスワードを PostgreSQL に保存・検証
//! - **旅程リクエストの中継**: 上流の旅程生成サービスへボディをそのまま転送
//! - **ヘルスチェック**: Liveness / Readiness（DB への ping）
//!
//! ```text
//! ┌──────────┐     ┌──────────────┐     ┌────────────────────┐
//! │  Client  │────→│   Gateway    │────→│ PostgreSQL         │
//! └──────────┘     └──────────────┘     │ (直接 / トンネル)   │
//!                         │             └────────────────────┘
//!                         ↓
//!                  ┌──────────────┐
//!                  │ 旅程サービス │
//!                  └──────────────┘
//! ```
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `PORT` | No | ポート番号（デフォルト: `8080`） |
//! | `ITINERARY_UPSTREAM_URL` | No | 旅程サービスの URL |
//! | `DB_*` / `INSTANCE_CONNECTION_NAME` | **Yes** | [`waypoint_infra::db::config`] を参照 |
//! | `LOG_FORMAT` | No | `json` / `pretty` |
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（ローカルの PostgreSQL に直接接続）
//! DB_USER=postgres DB_PASS=postgres DB_NAME=waypoint DB_HOST=localhost cargo run -p waypoint-gateway
//!
//! # 本番環境（Cloud SQL コネクタ経由）
//! INSTANCE_CONNECTION_NAME=proj:us-central1:db LOG_FORMAT=json ./waypoint-gateway
//! ```

mod client;
mod config;
mod error;
mod handler;
mod usecase;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use axum::{
    Router,
    routing::{get, post},
};
use client::ItineraryClientImpl;
use config::GatewayConfig;
use handler::{
    CredentialState,
    ItineraryState,
    ReadinessState,
    forward_itinerary,
    health_check,
    readiness_check,
    root,
    signin,
    signup,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use usecase::CredentialServiceImpl;
use waypoint_infra::{
    Argon2PasswordHasher,
    PasswordHasher,
    db::{self, RetryPolicy},
    repository::{PostgresUserRepository, UserRepository},
};
use waypoint_shared::observability::{TracingConfig, make_request_span};

/// Gateway サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    // トレーシング初期化
    let tracing_config = TracingConfig::from_env("gateway");
    waypoint_shared::observability::init_tracing(tracing_config);
    let _tracing_guard = tracing::info_span!("app", service = "gateway").entered();

    // 設定読み込み（不足があればサーバーを起動しない）
    let config = GatewayConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        "Gateway サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    // データベース接続プールを作成（疎通確認まで行う）
    let pool = db::establish(&config.database, &config.connector, &RetryPolicy::default())
        .await
        .context("データベース接続に失敗しました")?;

    // マイグレーション実行
    db::run_migrations(&pool)
        .await
        .context("マイグレーションの実行に失敗しました")?;
    tracing::info!("マイグレーションを適用しました");

    // Readiness Check 用 State（pool が move される前に clone）
    let readiness_state = Arc::new(ReadinessState {
        pool:    pool.clone(),
        timeout: handler::health::READINESS_TIMEOUT,
    });

    // 依存コンポーネントを初期化
    let user_repository: Arc<dyn UserRepository> =
        Arc::new(PostgresUserRepository::new(pool.clone()));
    let password_hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());
    let credential_state = Arc::new(CredentialState {
        service: Arc::new(CredentialServiceImpl::new(user_repository, password_hasher)),
    });
    let itinerary_state = Arc::new(ItineraryState {
        client: Arc::new(ItineraryClientImpl::new(&config.itinerary_url)),
    });

    // ルーター構築
    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .merge(
            Router::new()
                .route("/health/ready", get(readiness_check))
                .with_state(readiness_state),
        )
        .merge(
            Router::new()
                .route("/itinerary", post(forward_itinerary))
                .with_state(itinerary_state),
        )
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .with_state(credential_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("アドレスのパースに失敗しました")?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Gateway サーバーが起動しました: {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("接続プールを閉じています");
    pool.close().await;

    Ok(())
}

/// Ctrl+C（SIGINT）または SIGTERM を待つ
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl+C ハンドラの登録に失敗しました");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERM ハンドラの登録に失敗しました");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("シャットダウンシグナルを受信しました");
}
