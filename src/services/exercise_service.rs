use crate::domain::exercise::{AppendedEntry, LogLine, UserLog, display_date, parse_entry_date};
use crate::domain::user::{ActivityEntry, User};
use crate::error::{AppError, Result};
use crate::services::user_store::{StoreError, UserStore};
use backon::{ExponentialBuilder, Retryable};
use opentelemetry::{global, metrics::Counter};
use std::sync::Arc;
use std::time::Duration;

pub const MISSING_FIELDS: &str = "Please insert all required fields (userId, description, and duration)";
pub const MISSING_USER_ID: &str = "userId is required";

const APPEND_RETRIES: usize = 5;

// Largest magnitude an f64 holds without losing integer precision (2^53).
const MAX_EXACT_DURATION: f64 = 9_007_199_254_740_992.0;

#[derive(Clone, Debug)]
struct Metrics {
    entries_appended_total: Counter<u64>,
    append_conflicts_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("exercise-tracker");
        Self {
            entries_appended_total: meter
                .u64_counter("exercise_entries_appended_total")
                .with_description("Total number of exercise entries logged")
                .build(),
            append_conflicts_total: meter
                .u64_counter("exercise_append_conflicts_total")
                .with_description("Appends that lost a concurrent write and were retried")
                .build(),
        }
    }
}

/// Raw fields of an append request, as received.
#[derive(Debug, Clone, Default)]
pub struct AppendRequest {
    pub user_id: Option<String>,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub date: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ExerciseService {
    store: Arc<dyn UserStore>,
    metrics: Metrics,
}

impl ExerciseService {
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store, metrics: Metrics::new() }
    }

    /// Appends one entry to a user's log.
    ///
    /// # Errors
    /// Returns `AppError::Validation` for missing or malformed fields (without
    /// touching the store) and `AppError::NotFound` for an unknown user.
    #[tracing::instrument(
        skip(self, request),
        fields(user_id = request.user_id.as_deref().unwrap_or_default()),
        err(level = "warn")
    )]
    pub async fn append(&self, request: AppendRequest) -> Result<AppendedEntry> {
        let (Some(user_id), Some(description), Some(duration)) =
            (present(request.user_id), present(request.description), present(request.duration))
        else {
            return Err(AppError::Validation(MISSING_FIELDS.into()));
        };

        let duration = parse_duration(&duration)?;
        let date = present(request.date)
            .map(|text| parse_entry_date(&text).map_err(|_| cast_error("Date", &text, "date")))
            .transpose()?;
        let entry = ActivityEntry { description, duration, date };

        let saved = (|| self.append_once(&user_id, &entry))
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(Duration::from_millis(2))
                    .with_max_delay(Duration::from_millis(100))
                    .with_max_times(APPEND_RETRIES)
                    .with_jitter(),
            )
            .when(|e: &StoreError| matches!(e, StoreError::Conflict(_)))
            .notify(|e: &StoreError, retry_in: Duration| {
                self.metrics.append_conflicts_total.add(1, &[]);
                tracing::debug!(error = %e, retry_in_ms = retry_in.as_millis(), "Concurrent append, retrying");
            })
            .await?;

        let added = saved.log.last().ok_or_else(|| AppError::Internal("saved log is empty".into()))?;
        let date = added.date.map(display_date).transpose().map_err(|e| AppError::Internal(e.to_string()))?;

        tracing::info!(count = saved.log.len(), "Exercise logged");
        self.metrics.entries_appended_total.add(1, &[]);

        Ok(AppendedEntry {
            description: added.description.clone(),
            duration: added.duration,
            date,
            user_id: saved.id,
            username: saved.username,
        })
    }

    async fn append_once(&self, user_id: &str, entry: &ActivityEntry) -> std::result::Result<User, StoreError> {
        let user = self.store.find_by_id(user_id).await?;
        self.store.save(user.with_entry(entry.clone())).await
    }

    /// Returns a user's full log with display-formatted dates.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if `user_id` is missing, `AppError::NotFound`
    /// for an unknown user and `AppError::MissingEntryDate` if any entry is undated.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn log(&self, user_id: Option<String>) -> Result<UserLog> {
        let user_id = present(user_id).ok_or_else(|| AppError::Validation(MISSING_USER_ID.into()))?;

        let user = self.store.find_by_id(&user_id).await?;

        let log = user
            .log
            .iter()
            .enumerate()
            .map(|(position, entry)| {
                let date = entry.date.ok_or(AppError::MissingEntryDate { position })?;
                Ok(LogLine {
                    description: entry.description.clone(),
                    duration: entry.duration,
                    date: display_date(date).map_err(|e| AppError::Internal(e.to_string()))?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(UserLog { user_id: user.id, username: user.username, count: log.len(), log })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Accepts integer text and decimal text with no fractional part (`"30"`, `"30.0"`, `"3e1"`),
/// the same values a JSON number body may carry.
fn parse_duration(text: &str) -> Result<i64> {
    let trimmed = text.trim();
    if let Ok(minutes) = trimmed.parse::<i64>() {
        return Ok(minutes);
    }
    match trimmed.parse::<f64>() {
        #[allow(clippy::cast_possible_truncation)]
        Ok(minutes) if minutes.is_finite() && minutes.fract() == 0.0 && minutes.abs() <= MAX_EXACT_DURATION => {
            Ok(minutes as i64)
        }
        _ => Err(cast_error("Number", text, "duration")),
    }
}

fn cast_error(kind: &str, value: &str, path: &str) -> AppError {
    AppError::Validation(format!("Cast to {kind} failed for value \"{value}\" at path \"{path}\""))
}
