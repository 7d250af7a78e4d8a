//! Agency settings entity model.

use serde::Serialize;
use sqlx::FromRow;

use caresign_core::types::{DbId, Timestamp};

/// A row from the `agency_settings` table.
///
/// Tenant-scoped key/value configuration: provider API keys and the
/// default sender identity.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AgencySetting {
    pub id: DbId,
    pub agency_id: DbId,
    pub key: String,
    pub value: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
