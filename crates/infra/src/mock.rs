//! # テスト用モックリポジトリ
//!
//! ユースケース・ハンドラのテストで使用するインメモリモックリポジトリ。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! waypoint-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::{
    collections::HashMap,
    sync::{
        Arc,
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use waypoint_domain::{
    password::PasswordHash,
    user::{UserId, Username},
};

use crate::{error::InfraError, repository::UserRepository};

// ===== MockUserRepository =====

/// インメモリの UserRepository
///
/// クローンしたインスタンス同士でストアを共有する。
/// ユーザー名の一意性は PostgreSQL 実装と同じく [`InfraError::conflict`] で報告する。
#[derive(Clone, Default)]
pub struct MockUserRepository {
    users:        Arc<Mutex<HashMap<String, (UserId, PasswordHash)>>>,
    next_id:      Arc<AtomicUsize>,
    insert_calls: Arc<AtomicUsize>,
    find_calls:   Arc<AtomicUsize>,
    unavailable:  Arc<AtomicBool>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// ハッシュ済みのユーザーを直接登録する
    pub fn add_user(&self, username: &str, hash: PasswordHash) {
        let id = self.allocate_id();
        self.users
            .lock()
            .unwrap()
            .insert(username.to_string(), (id, hash));
    }

    /// 以降の操作をデータベースエラーにする
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// 保存されている行数
    pub fn row_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    /// 保存されているハッシュ
    pub fn stored_hash(&self, username: &str) -> Option<PasswordHash> {
        self.users
            .lock()
            .unwrap()
            .get(username)
            .map(|(_, hash)| hash.clone())
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    fn allocate_id(&self) -> UserId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        UserId::from_i64(id as i64)
    }

    fn check_available(&self) -> Result<(), InfraError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolTimedOut.into());
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn insert(
        &self,
        username: &Username,
        password_hash: &PasswordHash,
    ) -> Result<UserId, InfraError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let mut users = self.users.lock().unwrap();
        if users.contains_key(username.as_str()) {
            return Err(InfraError::conflict("User", username.as_str()));
        }
        let id = self.allocate_id();
        users.insert(
            username.as_str().to_string(),
            (id, password_hash.clone()),
        );
        Ok(id)
    }

    async fn find_password_hash(
        &self,
        username: &Username,
    ) -> Result<Option<PasswordHash>, InfraError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        Ok(self.stored_hash(username.as_str()))
    }
}
