//! # 旅程ハンドラ
//!
//! `POST /itinerary` を上流の旅程生成サービスへ中継する。
//!
//! ボディが JSON として正しいことだけを確認し、内容は解釈しない。
//! 上流のステータスとボディはそのまま `Content-Type: application/json` で返す。

use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::de::IgnoredAny;

use crate::{client::ItineraryClient, error::GatewayError};

/// 旅程ハンドラの共有状態
pub struct ItineraryState {
    pub client: Arc<dyn ItineraryClient>,
}

/// POST /itinerary
#[tracing::instrument(skip_all, fields(bytes = body.len()))]
pub async fn forward_itinerary(
    State(state): State<Arc<ItineraryState>>,
    body: Bytes,
) -> Result<Response, GatewayError> {
    serde_json::from_slice::<IgnoredAny>(&body)?;

    let upstream = state.client.forward(body).await?;

    Ok((
        upstream.status,
        [(header::CONTENT_TYPE, "application/json")],
        upstream.body,
    )
        .into_response())
}
