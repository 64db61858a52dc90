use crate::adapters::database::DbPool;
use crate::adapters::database::records::{EntryRecord, UserRecord};
use crate::config::DefaultDatePolicy;
use crate::domain::user::{User, generate_user_id};
use crate::services::user_store::{ID_ATTEMPTS, StoreError, UserStore, prepare_for_save, today_utc};
use async_trait::async_trait;
use sqlx::types::Json;

/// Postgres-backed record store. Each user is one row; the log is an embedded JSONB array.
#[derive(Clone, Debug)]
pub struct PgUserStore {
    pool: DbPool,
    default_date: DefaultDatePolicy,
}

impl PgUserStore {
    #[must_use]
    pub const fn new(pool: DbPool, default_date: DefaultDatePolicy) -> Self {
        Self { pool, default_date }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    #[tracing::instrument(level = "debug", skip(self), err)]
    async fn create(&self, username: &str) -> Result<User, StoreError> {
        for _ in 0..ID_ATTEMPTS {
            // An id collision yields no row; a username collision raises a unique violation.
            let inserted = sqlx::query_as::<_, UserRecord>(
                r#"
                INSERT INTO users (id, username)
                VALUES ($1, $2)
                ON CONFLICT (id) DO NOTHING
                RETURNING id, username, log, version
                "#,
            )
            .bind(generate_user_id())
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.code().as_deref() == Some("23505")
                {
                    return StoreError::DuplicateKey;
                }
                StoreError::Database(e)
            })?;

            if let Some(record) = inserted {
                return Ok(record.into());
            }
            tracing::debug!("Generated id already taken, retrying");
        }

        Err(StoreError::IdExhausted)
    }

    #[tracing::instrument(level = "debug", skip(self), err)]
    async fn find_by_id(&self, id: &str) -> Result<User, StoreError> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, username, log, version
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        record.map(Into::into).ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    #[tracing::instrument(level = "debug", skip(self, user), fields(user_id = %user.id), err)]
    async fn save(&self, user: User) -> Result<User, StoreError> {
        let prepared = prepare_for_save(user, self.default_date, today_utc())?;
        let log: Vec<EntryRecord> = prepared.log.iter().map(Into::into).collect();

        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            UPDATE users
            SET log = $2, version = version + 1
            WHERE id = $1 AND version = $3
            RETURNING id, username, log, version
            "#,
        )
        .bind(&prepared.id)
        .bind(Json(log))
        .bind(prepared.version)
        .fetch_optional(&self.pool)
        .await?;

        // No row: the version moved on since the record was read.
        record.map(Into::into).ok_or(StoreError::Conflict(prepared.id))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
