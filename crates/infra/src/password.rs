//! # パスワードハッシュ
//!
//! Argon2id によるパスワードのハッシュ化と検証を提供する。
//!
//! ハッシュは PHC 文字列形式（`$argon2id$v=19$m=...,t=...,p=...$<salt>$<hash>`）で保存され、
//! ソルトとコストパラメータが文字列自体に埋め込まれる。
//! 検証時は保存済みハッシュのパラメータを使うため、将来パラメータを変更しても
//! 既存のハッシュは引き続き検証できる。

use argon2::{
    Argon2,
    Params,
    PasswordHasher as _,
    PasswordVerifier as _,
    password_hash::{PasswordHash as Argon2PasswordHash, SaltString, rand_core::OsRng},
};
use waypoint_domain::password::{PasswordHash, PasswordVerifyResult, PlainPassword};

use crate::InfraError;

/// パスワードのハッシュ化・検証を担当するトレイト
pub trait PasswordHasher: Send + Sync {
    /// パスワードをハッシュ化する
    ///
    /// 呼び出しごとにランダムなソルトを生成するため、
    /// 同じパスワードでも毎回異なるハッシュになる。
    ///
    /// # Errors
    ///
    /// - ハッシュ計算に失敗した場合
    fn hash(&self, password: &PlainPassword) -> Result<PasswordHash, InfraError>;

    /// パスワードを検証する
    ///
    /// # Errors
    ///
    /// - 不正なハッシュ形式の場合
    fn verify(
        &self,
        password: &PlainPassword,
        hash: &PasswordHash,
    ) -> Result<PasswordVerifyResult, InfraError>;
}

/// Argon2id によるパスワードハッシュの実装
///
/// OWASP 推奨パラメータ（RFC 9106）を使用:
/// - Memory: 64 MB
/// - Iterations: 1
/// - Parallelism: 1
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        let params = Params::new(
            65536, // memory (KB) = 64 MB
            1,     // iterations
            1,     // parallelism
            None,  // output length (default: 32)
        )
        .expect("Argon2 パラメータが不正です");

        Self {
            argon2: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
        }
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &PlainPassword) -> Result<PasswordHash, InfraError> {
        let salt = SaltString::generate(&mut OsRng);

        let hashed = self
            .argon2
            .hash_password(password.as_str().as_bytes(), &salt)
            .map_err(|e| InfraError::password_hash(format!("ハッシュ化に失敗: {e}")))?;

        Ok(PasswordHash::new(hashed.to_string()))
    }

    fn verify(
        &self,
        password: &PlainPassword,
        hash: &PasswordHash,
    ) -> Result<PasswordVerifyResult, InfraError> {
        let parsed = Argon2PasswordHash::new(hash.as_str())
            .map_err(|e| InfraError::password_hash(format!("不正なハッシュ形式: {e}")))?;

        let matched = self
            .argon2
            .verify_password(password.as_str().as_bytes(), &parsed)
            .is_ok();

        Ok(PasswordVerifyResult::from(matched))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_ne;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::InfraErrorKind;

    // password123 の既知ハッシュ
    const TEST_HASH: &str = "$argon2id$v=19$m=65536,t=1,p=1$olntqw+EoVpwH4B1vUAI0A$5yCA1izLODgz8nQOInDGwbuQB/AS0sIQDwpmIilve5M";

    #[fixture]
    fn hasher() -> Argon2PasswordHasher {
        Argon2PasswordHasher::new()
    }

    #[rstest]
    fn test_正しいパスワードを検証できる(hasher: Argon2PasswordHasher) {
        let password = PlainPassword::new("password123");
        let hash = PasswordHash::new(TEST_HASH);

        let result = hasher.verify(&password, &hash).unwrap();

        assert!(result.is_match());
    }

    #[rstest]
    fn test_不正なパスワードを検証できる(hasher: Argon2PasswordHasher) {
        let password = PlainPassword::new("wrongpassword");
        let hash = PasswordHash::new(TEST_HASH);

        let result = hasher.verify(&password, &hash).unwrap();

        assert!(result.is_mismatch());
    }

    #[rstest]
    fn test_不正なハッシュ形式はエラー(hasher: Argon2PasswordHasher) {
        let password = PlainPassword::new("password123");
        let invalid_hash = PasswordHash::new("not-a-valid-hash");

        let result = hasher.verify(&password, &invalid_hash);

        assert!(matches!(
            result.unwrap_err().kind(),
            InfraErrorKind::PasswordHash(_)
        ));
    }

    #[rstest]
    fn test_ハッシュ化したパスワードを検証できる(hasher: Argon2PasswordHasher) {
        let password = PlainPassword::new("pw1");

        let hash = hasher.hash(&password).unwrap();

        assert!(hash.as_str().starts_with("$argon2id$v=19$m=65536,t=1,p=1$"));
        assert!(hasher.verify(&password, &hash).unwrap().is_match());
        assert!(
            hasher
                .verify(&PlainPassword::new("pw2"), &hash)
                .unwrap()
                .is_mismatch()
        );
    }

    #[rstest]
    fn test_同じパスワードでもソルトが異なる(hasher: Argon2PasswordHasher) {
        let password = PlainPassword::new("password123");

        let first = hasher.hash(&password).unwrap();
        let second = hasher.hash(&password).unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify(&password, &first).unwrap().is_match());
        assert!(hasher.verify(&password, &second).unwrap().is_match());
    }
}
