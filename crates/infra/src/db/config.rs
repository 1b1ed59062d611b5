//! # データベース接続設定
//!
//! 環境変数から接続設定を読み込み、起動前に検証する。
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `DB_USER` | **Yes** | データベースユーザー |
//! | `DB_PASS` | **Yes** | データベースパスワード |
//! | `DB_NAME` | **Yes** | データベース名 |
//! | `INSTANCE_CONNECTION_NAME` | どちらか | マネージドインスタンス参照（`project:region:instance`）。指定時はセキュアトンネル経由 |
//! | `DB_HOST` | どちらか | 直接接続先ホスト |
//! | `DB_PORT` | No | 直接接続先ポート（デフォルト: `5432`） |
//! | `PRIVATE_IP` | No | 値が空でなければプライベートネットワーク経路を使う |
//!
//! `INSTANCE_CONNECTION_NAME` と `DB_HOST` が両方設定されている場合は
//! セキュアトンネルを優先する。
//!
//! 必須項目の欠落は [`ConfigError`] として返し、呼び出し元は起動を中止する。
//! 認証ストアなしでサーバーを起動しないこと。

use std::fmt;

use thiserror::Error;

use super::tunnel::{InstanceConnectionName, NetworkPath};

pub const ENV_DB_USER: &str = "DB_USER";
pub const ENV_DB_PASS: &str = "DB_PASS";
pub const ENV_DB_NAME: &str = "DB_NAME";
pub const ENV_INSTANCE_CONNECTION_NAME: &str = "INSTANCE_CONNECTION_NAME";
pub const ENV_DB_HOST: &str = "DB_HOST";
pub const ENV_DB_PORT: &str = "DB_PORT";
pub const ENV_PRIVATE_IP: &str = "PRIVATE_IP";

/// 直接接続時のデフォルトポート
pub const DEFAULT_PORT: u16 = 5432;

/// 設定エラー
///
/// 起動時にのみ発生し、回復不能（プロセスを終了する）。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// 必須の環境変数が未設定
    #[error("必須の環境変数が設定されていません: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    /// 値の形式が不正
    #[error("{name} の値が不正です: {reason}")]
    Invalid {
        name:   &'static str,
        reason: String,
    },
}

/// 接続先
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    /// ホスト・ポートへ直接接続する
    Direct { host: String, port: u16 },
    /// マネージドインスタンスへセキュアトンネル経由で接続する
    SecureTunnel {
        instance: InstanceConnectionName,
        network:  NetworkPath,
    },
}

/// データベース接続設定
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub user:          String,
    pub password:      String,
    pub database_name: String,
    pub target:        DatabaseTarget,
}

// パスワードをログに出さない
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("database_name", &self.database_name)
            .field("target", &self.target)
            .finish()
    }
}

impl DatabaseConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// 空文字列は未設定として扱う。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let user = get(ENV_DB_USER);
        let password = get(ENV_DB_PASS);
        let database_name = get(ENV_DB_NAME);
        let instance = get(ENV_INSTANCE_CONNECTION_NAME);
        let host = get(ENV_DB_HOST);

        let mut missing = Vec::new();
        if user.is_none() {
            missing.push(ENV_DB_USER);
        }
        if password.is_none() {
            missing.push(ENV_DB_PASS);
        }
        if database_name.is_none() {
            missing.push(ENV_DB_NAME);
        }
        if instance.is_none() && host.is_none() {
            missing.push(ENV_INSTANCE_CONNECTION_NAME);
        }

        let (Some(user), Some(password), Some(database_name)) = (user, password, database_name)
        else {
            return Err(ConfigError::Missing(missing));
        };

        let target = match (instance, host) {
            (Some(instance), _) => DatabaseTarget::SecureTunnel {
                instance: InstanceConnectionName::parse(&instance)?,
                network:  if get(ENV_PRIVATE_IP).is_some() {
                    NetworkPath::Private
                } else {
                    NetworkPath::Public
                },
            },
            (None, Some(host)) => DatabaseTarget::Direct {
                host,
                port: match get(ENV_DB_PORT) {
                    Some(port) => port.parse().map_err(|_| ConfigError::Invalid {
                        name:   ENV_DB_PORT,
                        reason: format!("ポート番号ではありません: {port}"),
                    })?,
                    None => DEFAULT_PORT,
                },
            },
            (None, None) => return Err(ConfigError::Missing(missing)),
        };

        Ok(Self {
            user,
            password,
            database_name,
            target,
        })
    }

    /// セキュアトンネル経由で接続するかどうか
    pub fn use_secure_tunnel(&self) -> bool {
        matches!(self.target, DatabaseTarget::SecureTunnel { .. })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const BASE: [(&str, &str); 3] = [
        ("DB_USER", "postgres"),
        ("DB_PASS", "secret"),
        ("DB_NAME", "sps_db"),
    ];

    #[rstest]
    fn test_インスタンス参照があればセキュアトンネル() {
        let mut pairs = BASE.to_vec();
        pairs.push(("INSTANCE_CONNECTION_NAME", "proj:us-central1:db"));

        let config = DatabaseConfig::from_lookup(lookup_from(&pairs)).unwrap();

        assert!(config.use_secure_tunnel());
        assert_eq!(
            config.target,
            DatabaseTarget::SecureTunnel {
                instance: InstanceConnectionName::parse("proj:us-central1:db").unwrap(),
                network:  NetworkPath::Public,
            }
        );
    }

    #[rstest]
    fn test_private_ipが設定されていればプライベート経路() {
        let mut pairs = BASE.to_vec();
        pairs.push(("INSTANCE_CONNECTION_NAME", "proj:us-central1:db"));
        pairs.push(("PRIVATE_IP", "true"));

        let config = DatabaseConfig::from_lookup(lookup_from(&pairs)).unwrap();

        assert!(matches!(
            config.target,
            DatabaseTarget::SecureTunnel {
                network: NetworkPath::Private,
                ..
            }
        ));
    }

    #[rstest]
    fn test_ホスト指定で直接接続_ポートはデフォルト() {
        let mut pairs = BASE.to_vec();
        pairs.push(("DB_HOST", "localhost"));

        let config = DatabaseConfig::from_lookup(lookup_from(&pairs)).unwrap();

        assert!(!config.use_secure_tunnel());
        assert_eq!(
            config.target,
            DatabaseTarget::Direct {
                host: "localhost".to_string(),
                port: 5432,
            }
        );
    }

    #[rstest]
    fn test_不正なポートはinvalid() {
        let mut pairs = BASE.to_vec();
        pairs.push(("DB_HOST", "localhost"));
        pairs.push(("DB_PORT", "abc"));

        let result = DatabaseConfig::from_lookup(lookup_from(&pairs));

        assert!(matches!(
            result,
            Err(ConfigError::Invalid { name: "DB_PORT", .. })
        ));
    }

    #[rstest]
    fn test_必須項目の欠落をまとめて報告する() {
        let result = DatabaseConfig::from_lookup(lookup_from(&[("DB_USER", "postgres")]));

        assert_eq!(
            result,
            Err(ConfigError::Missing(vec![
                "DB_PASS",
                "DB_NAME",
                "INSTANCE_CONNECTION_NAME"
            ]))
        );
    }

    #[rstest]
    fn test_接続先の欠落のみでもエラー() {
        let result = DatabaseConfig::from_lookup(lookup_from(&BASE));

        assert_eq!(
            result,
            Err(ConfigError::Missing(vec!["INSTANCE_CONNECTION_NAME"]))
        );
    }

    #[rstest]
    fn test_空文字列は未設定として扱う() {
        let pairs = [
            ("DB_USER", ""),
            ("DB_PASS", "secret"),
            ("DB_NAME", "sps_db"),
            ("DB_HOST", "localhost"),
        ];

        let result = DatabaseConfig::from_lookup(lookup_from(&pairs));

        assert_eq!(result, Err(ConfigError::Missing(vec!["DB_USER"])));
    }

    #[rstest]
    fn test_debug出力でパスワードがマスクされる() {
        let mut pairs = BASE.to_vec();
        pairs.push(("DB_HOST", "localhost"));
        let config = DatabaseConfig::from_lookup(lookup_from(&pairs)).unwrap();

        let debug = format!("{config:?}");

        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret"));
    }
}
