use crate::config::DefaultDatePolicy;
use crate::domain::user::{User, generate_user_id};
use crate::services::user_store::{ID_ATTEMPTS, StoreError, UserStore, prepare_for_save, today_utc};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Process-local record store.
#[derive(Debug)]
pub struct MemoryUserStore {
    users: DashMap<String, User>,
    // username -> id
    usernames: DashMap<String, String>,
    default_date: DefaultDatePolicy,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new(default_date: DefaultDatePolicy) -> Self {
        Self { users: DashMap::new(), usernames: DashMap::new(), default_date }
    }

    fn insert_with_fresh_id(&self, username: &str, mut next_id: impl FnMut() -> String) -> Result<User, StoreError> {
        for _ in 0..ID_ATTEMPTS {
            if let Entry::Vacant(slot) = self.users.entry(next_id()) {
                let user = User::new(slot.key().clone(), username.to_string());
                slot.insert(user.clone());
                return Ok(user);
            }
            tracing::debug!("Generated id already taken, retrying");
        }
        Err(StoreError::IdExhausted)
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    #[tracing::instrument(level = "debug", skip(self), err)]
    async fn create(&self, username: &str) -> Result<User, StoreError> {
        match self.usernames.entry(username.to_string()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateKey),
            Entry::Vacant(slot) => {
                let user = self.insert_with_fresh_id(username, generate_user_id)?;
                slot.insert(user.id.clone());
                Ok(user)
            }
        }
    }

    #[tracing::instrument(level = "debug", skip(self), err)]
    async fn find_by_id(&self, id: &str) -> Result<User, StoreError> {
        self.users.get(id).map(|user| user.clone()).ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    #[tracing::instrument(level = "debug", skip(self, user), fields(user_id = %user.id), err)]
    async fn save(&self, user: User) -> Result<User, StoreError> {
        let prepared = prepare_for_save(user, self.default_date, today_utc())?;

        let Some(mut stored) = self.users.get_mut(&prepared.id) else {
            return Err(StoreError::NotFound(prepared.id));
        };
        if stored.version != prepared.version {
            return Err(StoreError::Conflict(prepared.id));
        }

        let saved = User { version: prepared.version + 1, ..prepared };
        *stored = saved.clone();
        Ok(saved)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::ActivityEntry;
    use time::macros::date;

    fn entry(description: &str) -> ActivityEntry {
        ActivityEntry { description: description.into(), duration: 30, date: None }
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_username() {
        let store = MemoryUserStore::new(DefaultDatePolicy::Now);
        let first = store.create("alice").await.unwrap();

        let second = store.create("alice").await;
        assert!(matches!(second, Err(StoreError::DuplicateKey)));

        let found = store.find_by_id(&first.id).await.unwrap();
        assert_eq!(found, first);
        assert!(found.log.is_empty());
    }

    #[tokio::test]
    async fn test_find_unknown_id() {
        let store = MemoryUserStore::new(DefaultDatePolicy::Now);
        assert!(matches!(store.find_by_id("nope").await, Err(StoreError::NotFound(id)) if id == "nope"));
    }

    #[tokio::test]
    async fn test_save_bumps_version_and_resolves_dates() {
        let store = MemoryUserStore::new(DefaultDatePolicy::Now);
        let user = store.create("bob").await.unwrap();

        let saved = store.save(user.with_entry(entry("run"))).await.unwrap();

        assert_eq!(saved.version, 1);
        assert_eq!(saved.log.len(), 1);
        assert_eq!(saved.log[0].date, Some(today_utc()));
        assert_eq!(store.find_by_id(&saved.id).await.unwrap(), saved);
    }

    #[tokio::test]
    async fn test_save_keeps_supplied_date_under_unset_policy() {
        let store = MemoryUserStore::new(DefaultDatePolicy::Unset);
        let user = store.create("carol").await.unwrap();
        let dated = ActivityEntry { date: Some(date!(2021 - 07 - 04)), ..entry("hike") };

        let saved = store.save(user.with_entry(dated).with_entry(entry("swim"))).await.unwrap();

        assert_eq!(saved.log[0].date, Some(date!(2021 - 07 - 04)));
        assert_eq!(saved.log[1].date, None);
    }

    #[tokio::test]
    async fn test_stale_save_is_a_conflict() {
        let store = MemoryUserStore::new(DefaultDatePolicy::Now);
        let user = store.create("dave").await.unwrap();
        let stale_id = user.id.clone();

        store.save(user.clone().with_entry(entry("first"))).await.unwrap();
        let stale = store.save(user.with_entry(entry("second"))).await;

        assert!(matches!(stale, Err(StoreError::Conflict(_))));
        let current = store.find_by_id(&stale_id).await.unwrap();
        assert_eq!(current.log.len(), 1);
        assert_eq!(current.log[0].description, "first");
    }

    #[tokio::test]
    async fn test_id_allocation_gives_up_after_bounded_attempts() {
        let store = MemoryUserStore::new(DefaultDatePolicy::Now);
        let taken = store.create("erin").await.unwrap();
        let mut calls = 0;

        let result = store.insert_with_fresh_id("frank", || {
            calls += 1;
            taken.id.clone()
        });

        assert!(matches!(result, Err(StoreError::IdExhausted)));
        assert_eq!(calls, ID_ATTEMPTS);
        assert_eq!(store.users.len(), 1);
        assert!(store.create("frank").await.is_ok());
    }

    #[tokio::test]
    async fn test_save_of_unknown_record() {
        let store = MemoryUserStore::new(DefaultDatePolicy::Now);
        let ghost = User::new("ghost".into(), "ghost".into());
        assert!(matches!(store.save(ghost).await, Err(StoreError::NotFound(_))));
    }
}
