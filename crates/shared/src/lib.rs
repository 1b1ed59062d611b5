//! # Waypoint 共有ユーティリティ
//!
//! ワークスペース全体で使用される共通ユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - axum には依存しない（`IntoResponse` 変換は各サービスの責務）
//! - 外部クレートへの依存は最小限に抑え、トレーシングは `observability` feature の裏に置く

pub mod health;
pub mod observability;
pub mod response;

pub use health::{CheckStatus, HealthResponse, ReadinessResponse, ReadinessStatus};
pub use response::{ErrorResponse, MessageResponse};
