use crate::error::{AppError, Result};
use crate::services::user_store::UserStore;
use opentelemetry::{global, metrics::Counter};
use std::sync::Arc;

pub const MISSING_USERNAME: &str = "Please insert a username";

#[derive(Clone, Debug)]
struct Metrics {
    users_registered_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("exercise-tracker");
        Self {
            users_registered_total: meter
                .u64_counter("exercise_users_registered_total")
                .with_description("Total number of successful user registrations")
                .build(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredUser {
    pub id: String,
    pub username: String,
}

#[derive(Clone, Debug)]
pub struct RegistrationService {
    store: Arc<dyn UserStore>,
    metrics: Metrics,
}

impl RegistrationService {
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store, metrics: Metrics::new() }
    }

    /// Creates a user record for `username`.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if the username is missing or blank and
    /// `AppError::DuplicateKey` if it is already registered.
    #[tracing::instrument(skip(self), fields(user_id = tracing::field::Empty), err(level = "warn"))]
    pub async fn register(&self, username: Option<String>) -> Result<RegisteredUser> {
        let username = username
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| AppError::Validation(MISSING_USERNAME.into()))?;

        let user = self.store.create(&username).await?;

        tracing::Span::current().record("user_id", tracing::field::display(&user.id));
        tracing::info!("User registered");
        self.metrics.users_registered_total.add(1, &[]);

        Ok(RegisteredUser { id: user.id, username: user.username })
    }
}
