//! In-memory user repository.
//!
//! Records are free-form JSON objects with a server-assigned string `id`.
//! The store owns its own locking; the server gives handlers no atomicity.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};

/// A stored user: a JSON object that always contains `"id"`.
pub type UserRecord = Map<String, Value>;

/// Storage operations needed by the demo handlers.
pub trait UserRepository: Send + Sync + 'static {
    /// All users ordered by id.
    fn list(&self) -> Vec<UserRecord>;

    fn get(&self, id: &str) -> Option<UserRecord>;

    /// Store a new user and return it with its assigned id.
    fn create(&self, fields: UserRecord) -> UserRecord;

    /// Merge every field into an existing user.
    fn update(&self, id: &str, fields: UserRecord) -> Option<UserRecord>;

    /// Overwrite only fields the user already has.
    fn patch(&self, id: &str, fields: UserRecord) -> Option<UserRecord>;

    /// Remove a user. Returns whether it existed.
    fn delete(&self, id: &str) -> bool;
}

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<u64, UserRecord>,
    next_id: u64,
}

/// Mutex-guarded map of users keyed by numeric id.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    state: Mutex<State>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the two sample users.
    pub fn seeded() -> Self {
        let store = Self::new();
        for (name, email) in [("mayur", "mayur@example.com"), ("admin", "admin@example.com")] {
            let mut fields = Map::new();
            fields.insert("name".into(), Value::from(name));
            fields.insert("email".into(), Value::from(email));
            store.create(fields);
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // Every mutation finishes before the guard drops, so a poisoned state is still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn parse_id(id: &str) -> Option<u64> {
    id.parse().ok()
}

impl UserRepository for InMemoryUserStore {
    fn list(&self) -> Vec<UserRecord> {
        self.lock().users.values().cloned().collect()
    }

    fn get(&self, id: &str) -> Option<UserRecord> {
        let id = parse_id(id)?;
        self.lock().users.get(&id).cloned()
    }

    fn create(&self, mut fields: UserRecord) -> UserRecord {
        let mut state = self.lock();
        state.next_id += 1;
        let id = state.next_id;

        fields.insert("id".into(), Value::String(id.to_string()));
        state.users.insert(id, fields.clone());
        fields
    }

    fn update(&self, id: &str, fields: UserRecord) -> Option<UserRecord> {
        let id = parse_id(id)?;
        let mut state = self.lock();
        let user = state.users.get_mut(&id)?;
        for (key, value) in fields {
            if key != "id" {
                user.insert(key, value);
            }
        }
        Some(user.clone())
    }

    fn patch(&self, id: &str, fields: UserRecord) -> Option<UserRecord> {
        let id = parse_id(id)?;
        let mut state = self.lock();
        let user = state.users.get_mut(&id)?;
        for (key, value) in fields {
            if key != "id" && user.contains_key(&key) {
                user.insert(key, value);
            }
        }
        Some(user.clone())
    }

    fn delete(&self, id: &str) -> bool {
        parse_id(id).is_some_and(|id| self.lock().users.remove(&id).is_some())
    }
}
