//! # 旅程サービスクライアント
//!
//! Gateway から上流の旅程生成サービスへリクエストを転送する。
//!
//! ## 転送ルール
//!
//! - リクエストボディは受け取ったバイト列をそのまま `POST` する
//!   （`Content-Type: application/json`）
//! - 上流のステータスコードとボディは解釈せずに呼び出し元へ返す
//! - 上流が 4xx / 5xx を返してもエラーにはしない（そのまま中継する）

use async_trait::async_trait;
use axum::http::StatusCode;
use bytes::Bytes;
use thiserror::Error;

/// 旅程サービスクライアントエラー
#[derive(Debug, Error)]
pub enum ItineraryClientError {
    /// 送信失敗（接続エラー、タイムアウト等）
    #[error("リクエストの送信に失敗しました: {0}")]
    Send(#[source] reqwest::Error),

    /// レスポンスボディの読み取り失敗
    #[error("レスポンスの読み取りに失敗しました: {0}")]
    Read(#[source] reqwest::Error),
}

/// 上流サービスのレスポンス
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body:   Bytes,
}

/// 旅程サービスクライアントトレイト
///
/// テスト時にスタブを使用できるようトレイトで定義。
#[async_trait]
pub trait ItineraryClient: Send + Sync {
    /// JSON ボディを上流サービスへ転送する
    async fn forward(&self, body: Bytes) -> Result<UpstreamResponse, ItineraryClientError>;
}

/// 旅程サービスクライアント実装
pub struct ItineraryClientImpl {
    url:    String,
    client: reqwest::Client,
}

impl ItineraryClientImpl {
    /// 新しい ItineraryClient を作成する
    ///
    /// # 引数
    ///
    /// - `url`: 転送先の完全な URL（例: `https://example.run.app/run`）
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url:    url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ItineraryClient for ItineraryClientImpl {
    #[tracing::instrument(skip_all, fields(url = %self.url))]
    async fn forward(&self, body: Bytes) -> Result<UpstreamResponse, ItineraryClientError> {
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(ItineraryClientError::Send)?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(ItineraryClientError::Read)?;

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "上流サービスが応答しました");
        Ok(UpstreamResponse { status, body })
    }
}
