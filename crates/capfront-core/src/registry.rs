//! The directory of known users.
//!
//! Each user sits behind its own async mutex so requests for different
//! users proceed in parallel while requests for the same user take turns.
//! The map lock is only held long enough to find or insert an entry.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::user::{User, UserSummary};

/// Shared handle on one user.
pub type UserHandle = Arc<Mutex<User>>;

/// Name-keyed user directory. Entries are never removed.
#[derive(Debug, Default)]
pub struct UserRegistry {
    users: RwLock<BTreeMap<String, UserHandle>>,
}

impl UserRegistry {
    /// An empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `user` unless a user of that name is already present.
    ///
    /// Returns `true` if the user was added.
    pub async fn insert(&self, user: User) -> bool {
        let mut users = self.users.write().await;
        if users.contains_key(&user.name) {
            return false;
        }
        users.insert(user.name.clone(), Arc::new(Mutex::new(user)));
        true
    }

    /// The handle for `name`.
    pub async fn get(&self, name: &str) -> Option<UserHandle> {
        self.users.read().await.get(name).map(Arc::clone)
    }

    /// Wait for exclusive access to `name`.
    pub async fn lock(&self, name: &str) -> Option<OwnedMutexGuard<User>> {
        let handle = self.get(name).await?;
        Some(handle.lock_owned().await)
    }

    /// Every user name, sorted.
    pub async fn names(&self) -> Vec<String> {
        self.users.read().await.keys().cloned().collect()
    }

    /// Number of users.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// Whether the directory is empty.
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    /// A summary of every user not currently busy.
    ///
    /// Users whose lock is held by an in-flight request are skipped rather
    /// than waited for, so a caller holding its own user's guard cannot
    /// deadlock here.
    pub async fn summaries(&self) -> Vec<UserSummary> {
        let users = self.users.read().await;
        users
            .values()
            .filter_map(|handle| handle.try_lock().ok().map(|user| user.summary()))
            .collect()
    }
}
