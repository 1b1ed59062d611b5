//! # レスポンスボディ
//!
//! 公開エンドポイントが返す JSON ボディの共通型。
//!
//! ## 設計
//!
//! - 成功時は `{ "message": "..." }`、失敗時は `{ "error": "..." }` の単一フィールド
//! - 純粋なデータ構造（`Serialize` / `Deserialize` のみ）
//! - よく使うメッセージは便利コンストラクタで提供し、文字列のハードコードを一箇所に集める

use serde::{Deserialize, Serialize};

/// 成功レスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// サインアップ成功
    pub fn user_created() -> Self {
        Self::new("user created")
    }

    /// サインイン成功
    pub fn login_success() -> Self {
        Self::new("login success")
    }
}

/// エラーレスポンス
///
/// `error` には利用者向けの短いメッセージのみを入れる。
/// 内部エラーの詳細（SQL エラー文など）は含めない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// 必須項目の欠落（400）
    pub fn credentials_required() -> Self {
        Self::new("username and password required")
    }

    /// 認証失敗（401）
    ///
    /// ユーザー不在とパスワード不一致で同一のメッセージを返す。
    pub fn invalid_credentials() -> Self {
        Self::new("invalid username or password")
    }

    /// ユーザー名の重複（409）
    pub fn username_taken() -> Self {
        Self::new("username already exists")
    }

    /// パスワードのハッシュ化失敗（500）
    pub fn hash_failed() -> Self {
        Self::new("failed to hash password")
    }

    /// ユーザーの保存失敗（500）
    pub fn save_failed() -> Self {
        Self::new("failed to save user")
    }

    /// 上流サービスへの送信失敗（500）
    pub fn upstream_unreachable() -> Self {
        Self::new("error sending request")
    }

    /// 上流サービスのレスポンス読み取り失敗（500）
    pub fn upstream_unreadable() -> Self {
        Self::new("error reading response")
    }

    /// 内部エラー（500）
    ///
    /// メッセージは固定値（内部情報を漏らさないため）。
    pub fn internal_error() -> Self {
        Self::new("internal server error")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_message_responseのjson形状() {
        let json = serde_json::to_value(MessageResponse::user_created()).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "user created" }));

        let json = serde_json::to_value(MessageResponse::login_success()).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "login success" }));
    }

    #[test]
    fn test_error_responseのjson形状() {
        let json = serde_json::to_value(ErrorResponse::invalid_credentials()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "error": "invalid username or password" })
        );
    }

    #[test]
    fn test_jsonデシリアライズが正しく動作する() {
        let error: ErrorResponse =
            serde_json::from_str(r#"{"error": "username already exists"}"#).unwrap();
        assert_eq!(error, ErrorResponse::username_taken());
    }
}
