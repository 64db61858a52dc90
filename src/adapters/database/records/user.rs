use crate::domain::user::{ActivityEntry, User};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use time::Date;

time::serde::format_description!(entry_date, Date, "[year]-[month]-[day]");

#[derive(Debug, FromRow)]
pub struct UserRecord {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) log: Json<Vec<EntryRecord>>,
    pub(crate) version: i32,
}

/// JSON shape of one element of the `users.log` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub(crate) description: String,
    pub(crate) duration: i64,
    #[serde(default, with = "entry_date::option", skip_serializing_if = "Option::is_none")]
    pub(crate) date: Option<Date>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
            log: record.log.0.into_iter().map(Into::into).collect(),
            version: record.version,
        }
    }
}

impl From<EntryRecord> for ActivityEntry {
    fn from(record: EntryRecord) -> Self {
        Self { description: record.description, duration: record.duration, date: record.date }
    }
}

impl From<&ActivityEntry> for EntryRecord {
    fn from(entry: &ActivityEntry) -> Self {
        Self { description: entry.description.clone(), duration: entry.duration, date: entry.date }
    }
}
