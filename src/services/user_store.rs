use crate::config::DefaultDatePolicy;
use crate::domain::user::User;
use async_trait::async_trait;
use thiserror::Error;
use time::{Date, OffsetDateTime};

/// Freshly generated ids tried by `create` before giving up.
pub const ID_ATTEMPTS: usize = 5;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("There was a duplicate key error")]
    DuplicateKey,
    #[error("No record with id {0}")]
    NotFound(String),
    #[error("Path `{path}` is required.")]
    MissingField { path: &'static str },
    #[error("Record {0} was modified concurrently")]
    Conflict(String),
    #[error("Could not allocate a unique record id")]
    IdExhausted,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Durable home of user records and their embedded logs.
///
/// Implementations must make `create` an atomic insert-if-absent on the
/// username and `save` a compare-and-swap on [`User::version`].
#[async_trait]
pub trait UserStore: Send + Sync + std::fmt::Debug {
    /// Inserts a new record with a generated id and an empty log.
    ///
    /// # Errors
    /// Returns `StoreError::DuplicateKey` if the username is taken.
    async fn create(&self, username: &str) -> Result<User, StoreError>;

    /// Looks up a record by its exact id.
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` if no record has this id.
    async fn find_by_id(&self, id: &str) -> Result<User, StoreError>;

    /// Persists a mutated record and returns it as stored.
    ///
    /// # Errors
    /// Returns `StoreError::MissingField` if an entry is missing a required field and
    /// `StoreError::Conflict` if the record changed since it was read.
    async fn save(&self, user: User) -> Result<User, StoreError>;

    /// Verifies the store is reachable.
    ///
    /// # Errors
    /// Returns the underlying failure if the store cannot be reached.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Checks required entry fields and resolves missing dates per `policy`.
///
/// # Errors
/// Returns `StoreError::MissingField` for the first entry with an empty description.
pub fn prepare_for_save(mut user: User, policy: DefaultDatePolicy, today: Date) -> Result<User, StoreError> {
    for entry in &mut user.log {
        if entry.description.trim().is_empty() {
            return Err(StoreError::MissingField { path: "description" });
        }
        if entry.date.is_none() && policy == DefaultDatePolicy::Now {
            entry.date = Some(today);
        }
    }
    Ok(user)
}

#[must_use]
pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}
