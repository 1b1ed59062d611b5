//! # 認証ハンドラ
//!
//! サインアップ・サインインのエンドポイントを提供する。
//!
//! ## エンドポイント
//!
//! - `POST /signup` - ユーザー登録
//! - `POST /signin` - パスワード認証
//!
//! ## リクエストボディ
//!
//! ```json
//! { "username": "alice", "password": "wonderland" }
//! ```
//!
//! `Content-Type` は問わない。JSON として解釈できないボディは 400 で
//! パーサーのエラーメッセージを返す。欠けたフィールドは空文字列として扱い、
//! ユースケースの入力検証で拒否する。

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use bytes::Bytes;
use serde::Deserialize;
use waypoint_shared::MessageResponse;

use crate::{
    error::GatewayError,
    usecase::{CredentialError, CredentialService},
};

/// 認証ハンドラの共有状態
pub struct CredentialState {
    pub service: Arc<dyn CredentialService>,
}

// --- リクエスト型 ---

/// 認証情報リクエスト
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

// --- ハンドラ ---

/// POST /signup
///
/// ユーザーを登録する。
pub async fn signup(
    State(state): State<Arc<CredentialState>>,
    body: Bytes,
) -> Result<impl IntoResponse, GatewayError> {
    let req: CredentialsRequest = serde_json::from_slice(&body)?;

    state
        .service
        .register(&req.username, &req.password)
        .await
        .map_err(|e| match e {
            CredentialError::Store(e) => GatewayError::SaveFailed(e),
            other => other.into(),
        })?;

    Ok(Json(MessageResponse::user_created()))
}

/// POST /signin
///
/// パスワード認証を実行する。
/// ユーザー不在とパスワード不一致は同じ 401 レスポンスになる。
pub async fn signin(
    State(state): State<Arc<CredentialState>>,
    body: Bytes,
) -> Result<impl IntoResponse, GatewayError> {
    let req: CredentialsRequest = serde_json::from_slice(&body)?;

    state
        .service
        .authenticate(&req.username, &req.password)
        .await?;

    Ok(Json(MessageResponse::login_success()))
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Method, Request, StatusCode},
        routing::post,
    };
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tower::ServiceExt;
    use waypoint_infra::{Argon2PasswordHasher, mock::MockUserRepository};

    use super::*;
    use crate::usecase::CredentialServiceImpl;

    fn create_test_app(repo: MockUserRepository) -> Router {
        let service =
            CredentialServiceImpl::new(Arc::new(repo), Arc::new(Argon2PasswordHasher::new()));
        let state = Arc::new(CredentialState {
            service: Arc::new(service),
        });

        Router::new()
            .route("/signup", post(signup))
            .route("/signin", post(signin))
            .with_state(state)
    }

    async fn post_json(sut: &Router, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = sut.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_signupからsigninまでの一連の流れ() {
        // Given
        let sut = create_test_app(MockUserRepository::new());

        // When / Then: 登録
        let (status, json) = post_json(
            &sut,
            "/signup",
            r#"{"username":"alice","password":"wonderland"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({ "message": "user created" }));

        // When / Then: 正しいパスワード
        let (status, json) = post_json(
            &sut,
            "/signin",
            r#"{"username":"alice","password":"wonderland"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({ "message": "login success" }));

        // When / Then: 誤ったパスワードと不在ユーザーは同じレスポンス
        let expected = serde_json::json!({ "error": "invalid username or password" });
        let (status, json) = post_json(
            &sut,
            "/signin",
            r#"{"username":"alice","password":"wrong"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json, expected);

        let (status, json) =
            post_json(&sut, "/signin", r#"{"username":"bob","password":"x"}"#).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json, expected);
    }

    #[tokio::test]
    async fn test_signup_重複ユーザーは409() {
        let repo = MockUserRepository::new();
        let sut = create_test_app(repo.clone());
        let body = r#"{"username":"alice","password":"wonderland"}"#;
        post_json(&sut, "/signup", body).await;

        let (status, json) = post_json(&sut, "/signup", body).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json, serde_json::json!({ "error": "username already exists" }));
        assert_eq!(repo.row_count(), 1);
    }

    #[rstest]
    #[case("/signup", r#"{"username":"","password":"pw"}"#)]
    #[case("/signup", r#"{"username":"alice"}"#)]
    #[case("/signin", r#"{"password":"pw"}"#)]
    #[case("/signin", r#"{}"#)]
    #[tokio::test]
    async fn test_空のフィールドは400(#[case] uri: &str, #[case] body: &str) {
        let repo = MockUserRepository::new();
        let sut = create_test_app(repo.clone());

        let (status, json) = post_json(&sut, uri, body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json,
            serde_json::json!({ "error": "username and password required" })
        );
        assert_eq!(repo.insert_calls() + repo.find_calls(), 0);
    }

    #[rstest]
    #[case("/signup")]
    #[case("/signin")]
    #[tokio::test]
    async fn test_不正なjsonは400でパースエラーを返す(#[case] uri: &str) {
        let sut = create_test_app(MockUserRepository::new());

        let (status, json) = post_json(&sut, uri, r#"{"username": "alice""#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().is_some_and(|msg| !msg.is_empty()));
    }

    #[tokio::test]
    async fn test_signup_ストア障害は500() {
        let repo = MockUserRepository::new();
        repo.set_unavailable(true);
        let sut = create_test_app(repo);

        let (status, json) = post_json(
            &sut,
            "/signup",
            r#"{"username":"alice","password":"wonderland"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, serde_json::json!({ "error": "failed to save user" }));
    }

    #[tokio::test]
    async fn test_signin_ストア障害は500() {
        let repo = MockUserRepository::new();
        repo.set_unavailable(true);
        let sut = create_test_app(repo);

        let (status, json) = post_json(
            &sut,
            "/signin",
            r#"{"username":"alice","password":"wonderland"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, serde_json::json!({ "error": "internal server error" }));
    }
}
