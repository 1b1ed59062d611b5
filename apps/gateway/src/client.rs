//! # 外部 API クライアント
//!
//! 上流の旅程サービスとの通信を担当する。

pub mod itinerary;

pub use itinerary::{ItineraryClient, ItineraryClientError, ItineraryClientImpl};
