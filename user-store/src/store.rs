//! In-memory user store
//!
//! The collection is an ordered `Vec<User>`: insertion order is preserved and
//! deletions never renumber survivors. One `RwLock` guards both the records and
//! the id counter, so every operation is a single atomic step and two
//! concurrent creates can never compute the same id from a stale read.

use tokio::sync::RwLock;

use crate::{
    config::{IdStrategy, StoreConfig},
    error::{Error, Result},
    ids::UserId,
    models::{seed_users, CreateUserRequest, UpdateUserRequest, User},
};

#[derive(Debug)]
struct Records {
    users: Vec<User>,
    /// Next id handed out under [`IdStrategy::Sequential`]
    next_id: UserId,
}

impl Records {
    fn new(users: Vec<User>) -> Self {
        let next_id = users
            .iter()
            .map(|u| u.id)
            .max()
            .map(UserId::next)
            .unwrap_or(UserId::new(1));
        Self { users, next_id }
    }

    fn allocate_id(&mut self, strategy: IdStrategy) -> UserId {
        match strategy {
            IdStrategy::Sequential => {
                let id = self.next_id;
                self.next_id = id.next();
                id
            }
            IdStrategy::Length => UserId::new(self.users.len() as u64 + 1),
        }
    }
}

/// Ordered, lock-guarded collection of user records
#[derive(Debug)]
pub struct UserStore {
    records: RwLock<Records>,
    id_strategy: IdStrategy,
    ignore_empty_fields: bool,
}

impl UserStore {
    /// Build a store from configuration, loading the seed records if enabled
    pub fn from_config(config: &StoreConfig) -> Self {
        let users = if config.seed { seed_users() } else { Vec::new() };
        Self::with_users(users, config.id_strategy, config.ignore_empty_fields)
    }

    /// Build a store over an explicit initial collection
    pub fn with_users(users: Vec<User>, id_strategy: IdStrategy, ignore_empty_fields: bool) -> Self {
        Self {
            records: RwLock::new(Records::new(users)),
            id_strategy,
            ignore_empty_fields,
        }
    }

    /// Seeded store with default behaviour
    pub fn seeded() -> Self {
        Self::from_config(&StoreConfig::default())
    }

    pub fn id_strategy(&self) -> IdStrategy {
        self.id_strategy
    }

    /// Every record, in insertion order
    pub async fn list(&self) -> Vec<User> {
        self.records.read().await.users.clone()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// First record carrying `id`
    pub async fn get(&self, id: UserId) -> Result<User> {
        self.records
            .read()
            .await
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(Error::user_not_found)
    }

    /// Append a new record; names are stored as given, absent ones stay absent
    pub async fn create(&self, request: CreateUserRequest) -> User {
        let mut records = self.records.write().await;

        let id = records.allocate_id(self.id_strategy);
        let user = User {
            id,
            first_name: request.first_name,
            last_name: request.last_name,
        };
        records.users.push(user.clone());

        tracing::debug!(user_id = %id, total = records.users.len(), "user created");
        user
    }

    /// Overwrite the fields present in `request` on the first record with `id`
    pub async fn update(&self, id: UserId, request: UpdateUserRequest) -> Result<User> {
        let mut records = self.records.write().await;

        let user = records
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(Error::user_not_found)?;

        if let Some(first_name) = self.accepted(request.first_name) {
            user.first_name = Some(first_name);
        }
        if let Some(last_name) = self.accepted(request.last_name) {
            user.last_name = Some(last_name);
        }

        tracing::debug!(user_id = %id, "user updated");
        Ok(user.clone())
    }

    /// Remove every record with `id`, returning how many were removed.
    ///
    /// Deleting an id that is not stored is not an error; the count is 0.
    pub async fn delete(&self, id: UserId) -> usize {
        let mut records = self.records.write().await;

        let before = records.users.len();
        records.users.retain(|u| u.id != id);
        let removed = before - records.users.len();

        tracing::debug!(user_id = %id, removed, "user delete");
        removed
    }

    fn accepted(&self, value: Option<String>) -> Option<String> {
        match value {
            Some(v) if v.is_empty() && self.ignore_empty_fields => {
                tracing::debug!("ignoring empty field in update");
                None
            }
            other => other,
        }
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::seeded()
    }
}
