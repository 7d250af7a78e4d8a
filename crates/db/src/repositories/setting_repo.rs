//! Repository for the `agency_settings` table.

use sqlx::PgPool;

use caresign_core::types::DbId;

use crate::models::setting::AgencySetting;

/// Column list for `agency_settings` queries.
const COLUMNS: &str = "id, agency_id, key, value, created_at, updated_at";

/// Provides access to tenant-scoped configuration values.
pub struct SettingRepo;

impl SettingRepo {
    /// Fetch a single configuration value for a tenant.
    pub async fn get_value(
        pool: &PgPool,
        agency_id: DbId,
        key: &str,
    ) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT value FROM agency_settings WHERE agency_id = $1 AND key = $2",
        )
        .bind(agency_id)
        .bind(key)
        .fetch_optional(pool)
        .await
    }

    /// Insert or replace a configuration value for a tenant, returning the
    /// row ID.
    pub async fn upsert(
        pool: &PgPool,
        agency_id: DbId,
        key: &str,
        value: &str,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO agency_settings (agency_id, key, value) \
             VALUES ($1, $2, $3) \
             ON CONFLICT ON CONSTRAINT uq_agency_settings_agency_key \
             DO UPDATE SET value = EXCLUDED.value, updated_at = NOW() \
             RETURNING id",
        )
        .bind(agency_id)
        .bind(key)
        .bind(value)
        .fetch_one(pool)
        .await
    }

    /// List all settings for a tenant.
    pub async fn list_for_agency(
        pool: &PgPool,
        agency_id: DbId,
    ) -> Result<Vec<AgencySetting>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM agency_settings WHERE agency_id = $1 ORDER BY key"
        );
        sqlx::query_as::<_, AgencySetting>(&query)
            .bind(agency_id)
            .fetch_all(pool)
            .await
    }
}
