//! `PostgreSQL` implementation of the `FlagStore` trait.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::debug;
use uuid::Uuid;

use waymark_core::error::TourError;
use waymark_core::flags::FlagName;
use waymark_core::ports::FlagStore;

/// PostgreSQL-backed flag store. An absent row reads as `false`.
#[derive(Debug, Clone)]
pub struct PgFlagStore {
    pool: PgPool,
}

impl PgFlagStore {
    /// Creates a new `PgFlagStore`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn persistence_error(e: &sqlx::Error) -> TourError {
    TourError::Persistence(e.to_string())
}

#[async_trait]
impl FlagStore for PgFlagStore {
    async fn get_flag(&self, identity: Uuid, name: &FlagName) -> Result<bool, TourError> {
        let row = sqlx::query("SELECT value FROM tour_flags WHERE identity = $1 AND flag_key = $2")
            .bind(identity)
            .bind(name.key())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| persistence_error(&e))?;

        match row {
            Some(row) => row.try_get("value").map_err(|e| persistence_error(&e)),
            None => Ok(false),
        }
    }

    async fn set_flag(
        &self,
        identity: Uuid,
        name: &FlagName,
        value: bool,
    ) -> Result<(), TourError> {
        sqlx::query(
            r"
            INSERT INTO tour_flags (identity, flag_key, value, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (identity, flag_key)
            DO UPDATE SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at
            ",
        )
        .bind(identity)
        .bind(name.key())
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| persistence_error(&e))?;

        debug!(%identity, flag = %name, value, "flag persisted");
        Ok(())
    }
}
