//! # ユーザー
//!
//! ユーザーレコードに関連する値オブジェクトを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 用途 |
//! |---|------------|------|
//! | [`UserId`] | ユーザー ID | ストアが採番する一意な整数 |
//! | [`Username`] | ユーザー名 | サインアップ・サインイン時の識別子（一意） |
//!
//! ## 設計方針
//!
//! - **Newtype パターン**: プリミティブをラップし、引数の取り違えを防ぐ
//! - **バリデーション**: 値オブジェクトの生成時に検証ロジックを実行
//! - **一意性はストアの責務**: ユーザー名の重複はデータベースの UNIQUE 制約で検出する

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::DomainError;

/// ユーザー ID
///
/// `users.id`（BIGSERIAL）に対応する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct UserId(i64);

impl UserId {
    /// 既存の値からユーザー ID を作成する
    pub fn from_i64(value: i64) -> Self {
        Self(value)
    }

    /// 内部の値を取得する
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

/// ユーザー名（値オブジェクト）
///
/// 空文字列は許可しない。前後の空白は値の一部として扱い、加工しない。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct Username(String);

impl Username {
    /// ユーザー名を作成する
    ///
    /// # エラー
    ///
    /// 空文字列の場合は `DomainError::Validation` を返す。
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();

        if value.is_empty() {
            return Err(DomainError::Validation("ユーザー名は必須です".to_string()));
        }

        Ok(Self(value))
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 所有権を持つ文字列に変換する
    pub fn into_string(self) -> String {
        self.0
    }
}
