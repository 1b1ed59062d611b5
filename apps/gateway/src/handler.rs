//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュールで re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、ビジネスロジックは usecase 層に委譲
//!
//! ## ハンドラ一覧
//!
//! - `health`: ルート・ヘルスチェック
//! - `auth`: サインアップ・サインイン
//! - `itinerary`: 旅程リクエストの中継

pub mod auth;
pub mod health;
pub mod itinerary;

pub use auth::{CredentialState, signin, signup};
pub use health::{ReadinessState, health_check, readiness_check, root};
pub use itinerary::{ItineraryState, forward_itinerary};
