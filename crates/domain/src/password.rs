//! # パスワード
//!
//! パスワード関連の値オブジェクトを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 用途 |
//! |---|------------|------|
//! | [`PlainPassword`] | 平文パスワード | サインアップ・サインイン時の入力値 |
//! | [`PasswordHash`] | パスワードハッシュ | 永続化用のハッシュ値（PHC 文字列） |
//! | [`PasswordVerifyResult`] | 検証結果 | パスワード検証の成否 |

use crate::DomainError;

/// 平文パスワード（入力値）
///
/// ユーザーが入力したパスワードをラップする。
///
/// # セキュリティ
///
/// Debug 出力ではパスワードの値をマスクする。
#[derive(Clone)]
pub struct PlainPassword(String);

impl std::fmt::Debug for PlainPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PlainPassword").field(&"[REDACTED]").finish()
    }
}

impl PlainPassword {
    /// パスワードを作成する（検証なし）
    ///
    /// ダミー検証など、入力検証が不要な経路で使用する。
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// 入力値を検証してパスワードを作成する
    ///
    /// # エラー
    ///
    /// 空文字列の場合は `DomainError::Validation` を返す。
    pub fn try_new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.is_empty() {
            return Err(DomainError::Validation("パスワードは必須です".to_string()));
        }
        Ok(Self(value))
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// パスワードハッシュ（永続化用）
///
/// Argon2id でハッシュ化された PHC 形式の文字列をラップする。
/// アルゴリズム・コストパラメータ・ソルトを文字列自体が保持するため、
/// 検証時に追加の情報は不要。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// ハッシュ文字列からインスタンスを作成する
    ///
    /// 主にデータベースからの復元時に使用する。
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
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

/// パスワード検証結果
///
/// bool ではなく専用の型を使うことで、意図が明確になる。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordVerifyResult {
    /// パスワードが一致した
    Match,
    /// パスワードが一致しなかった
    Mismatch,
}

impl PasswordVerifyResult {
    /// 一致したかどうかを返す
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match)
    }

    /// 一致しなかったかどうかを返す
    pub fn is_mismatch(&self) -> bool {
        matches!(self, Self::Mismatch)
    }
}

impl From<bool> for PasswordVerifyResult {
    fn from(matched: bool) -> Self {
        if matched { Self::Match } else { Self::Mismatch }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_平文パスワードを作成できる() {
        let password = PlainPassword::try_new("wonderland").unwrap();
        assert_eq!(password.as_str(), "wonderland");
    }

    #[rstest]
    fn test_空のパスワードはバリデーションエラー() {
        let result = PlainPassword::try_new("");
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[rstest]
    fn test_平文パスワードのdebug出力はマスクされる() {
        let password = PlainPassword::new("secret");
        let debug = format!("{:?}", password);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret"));
    }

    #[rstest]
    fn test_パスワードハッシュを作成できる() {
        let hash = PasswordHash::new("$argon2id$v=19$...");
        assert_eq!(hash.as_str(), "$argon2id$v=19$...");
        assert_eq!(hash.into_string(), "$argon2id$v=19$...");
    }

    #[rstest]
    #[case(true, PasswordVerifyResult::Match)]
    #[case(false, PasswordVerifyResult::Mismatch)]
    fn test_boolからの変換(#[case] input: bool, #[case] expected: PasswordVerifyResult) {
        let result = PasswordVerifyResult::from(input);
        assert_eq!(result, expected);
        assert_eq!(result.is_match(), input);
        assert_eq!(result.is_mismatch(), !input);
    }
}
