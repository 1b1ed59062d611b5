//! # Gateway エラー定義
//!
//! HTTP 境界のエラーと、レスポンスへの変換を定義する。
//!
//! レスポンスボディは常に `{ "error": "..." }`。
//! 内部エラーはここでログに記録し、クライアントには固定メッセージのみを返す。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use waypoint_infra::InfraError;
use waypoint_shared::ErrorResponse;

use crate::{client::ItineraryClientError, usecase::CredentialError};

/// Gateway で発生するエラー
#[derive(Debug, Error)]
pub enum GatewayError {
    /// リクエストボディが JSON として不正
    #[error("{0}")]
    InvalidJson(#[from] serde_json::Error),

    /// ユーザー名またはパスワードが空
    #[error("ユーザー名とパスワードは必須です")]
    CredentialsRequired,

    /// ユーザー名の重複
    #[error("ユーザー名は既に登録されています")]
    UsernameTaken,

    /// 認証失敗
    #[error("認証に失敗しました")]
    InvalidCredentials,

    /// パスワードのハッシュ化失敗
    #[error("パスワードのハッシュ化に失敗しました: {0}")]
    HashFailed(#[source] InfraError),

    /// ユーザーの保存失敗
    #[error("ユーザーの保存に失敗しました: {0}")]
    SaveFailed(#[source] InfraError),

    /// 上流サービスへの転送失敗
    #[error("上流サービスへの転送に失敗しました: {0}")]
    Upstream(#[from] ItineraryClientError),

    /// 内部エラー
    #[error("内部エラー: {0}")]
    Internal(String),
}

impl From<CredentialError> for GatewayError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Validation(_) => Self::CredentialsRequired,
            CredentialError::Hash(e) => Self::HashFailed(e),
            CredentialError::DuplicateUser(_) => Self::UsernameTaken,
            CredentialError::InvalidCredentials => Self::InvalidCredentials,
            CredentialError::Store(e) => Self::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            GatewayError::InvalidJson(e) => (StatusCode::BAD_REQUEST, ErrorResponse::new(e.to_string())),
            GatewayError::CredentialsRequired => {
                (StatusCode::BAD_REQUEST, ErrorResponse::credentials_required())
            }
            GatewayError::UsernameTaken => (StatusCode::CONFLICT, ErrorResponse::username_taken()),
            GatewayError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, ErrorResponse::invalid_credentials())
            }
            GatewayError::HashFailed(e) => {
                tracing::error!(error = %e, span_trace = %e.span_trace(), "パスワードのハッシュ化に失敗しました");
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::hash_failed())
            }
            GatewayError::SaveFailed(e) => {
                tracing::error!(error = %e, span_trace = %e.span_trace(), "ユーザーの保存に失敗しました");
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::save_failed())
            }
            GatewayError::Upstream(e) => {
                tracing::error!(error = %e, "上流サービスへの転送に失敗しました");
                let body = match e {
                    ItineraryClientError::Send(_) => ErrorResponse::upstream_unreachable(),
                    ItineraryClientError::Read(_) => ErrorResponse::upstream_unreadable(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
            GatewayError::Internal(msg) => {
                tracing::error!("内部エラー: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::internal_error())
            }
        };

        (status, Json(body)).into_response()
    }
}
