//! Repository for the `signature_requests` table.
//!
//! Every method takes the owning tenant's `agency_id` and scopes the SQL
//! by it. The update path validates status transitions against the
//! lifecycle graph before writing, so an illegal transition can never be
//! persisted.

use sqlx::types::Json;
use sqlx::PgPool;

use caresign_core::error::CoreError;
use caresign_core::signature::validate_transition;
use caresign_core::types::DbId;

use crate::models::signature_request::{
    NewSignatureRequest, SignatureRequest, SignatureRequestFilter, SignatureRequestPatch,
};

/// Column list for `signature_requests` queries.
const COLUMNS: &str = "id, agency_id, title, custom_message, provider, external_request_id, \
     external_document_id, recipients, status, sent_date, signed_date, signature_url, \
     signed_document_url, metadata, created_at, updated_at";

/// Errors from the signature request store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying database failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A domain rule was violated (missing row, illegal transition,
    /// malformed stored data).
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Provides tenant-scoped CRUD operations for signature requests.
pub struct SignatureRequestRepo;

impl SignatureRequestRepo {
    /// Persist a new signature request for a tenant.
    ///
    /// The `agency_id` comes from the authenticated caller's tenant
    /// context, never from client input.
    pub async fn create(
        pool: &PgPool,
        agency_id: DbId,
        new: NewSignatureRequest,
    ) -> Result<SignatureRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO signature_requests \
             (agency_id, title, custom_message, provider, external_request_id, \
              external_document_id, recipients, status, sent_date, signature_url, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SignatureRequest>(&query)
            .bind(agency_id)
            .bind(&new.title)
            .bind(&new.custom_message)
            .bind(new.provider.as_str())
            .bind(&new.external_request_id)
            .bind(&new.external_document_id)
            .bind(Json(&new.recipients))
            .bind(new.status.as_str())
            .bind(new.sent_date)
            .bind(&new.signature_url)
            .bind(new.metadata.as_ref().map(Json))
            .fetch_one(pool)
            .await
    }

    /// Fetch a single request, scoped to its tenant.
    pub async fn get(
        pool: &PgPool,
        agency_id: DbId,
        id: DbId,
    ) -> Result<Option<SignatureRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM signature_requests WHERE id = $1 AND agency_id = $2"
        );
        sqlx::query_as::<_, SignatureRequest>(&query)
            .bind(id)
            .bind(agency_id)
            .fetch_optional(pool)
            .await
    }

    /// List a tenant's requests, newest first, with optional filters.
    pub async fn list(
        pool: &PgPool,
        agency_id: DbId,
        filter: &SignatureRequestFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SignatureRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM signature_requests \
             WHERE agency_id = $1 \
               AND ($2::text IS NULL OR provider = $2) \
               AND ($3::text IS NULL OR status = $3) \
             ORDER BY created_at DESC \
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, SignatureRequest>(&query)
            .bind(agency_id)
            .bind(filter.provider.map(|p| p.as_str()))
            .bind(filter.status.map(|s| s.as_str()))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Apply a partial update, validating any status change against the
    /// lifecycle transition graph first.
    pub async fn apply_patch(
        pool: &PgPool,
        agency_id: DbId,
        id: DbId,
        patch: SignatureRequestPatch,
    ) -> Result<SignatureRequest, StoreError> {
        let current = Self::get(pool, agency_id, id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "SignatureRequest",
                id,
            })?;

        if let Some(next) = patch.status {
            let current_status = current.lifecycle_status()?;
            validate_transition(current_status, next)?;
        }

        let query = format!(
            "UPDATE signature_requests SET \
               status = COALESCE($3, status), \
               signed_date = COALESCE($4, signed_date), \
               signature_url = COALESCE($5, signature_url), \
               signed_document_url = COALESCE($6, signed_document_url), \
               external_document_id = COALESCE($7, external_document_id), \
               metadata = COALESCE($8, metadata), \
               updated_at = NOW() \
             WHERE id = $1 AND agency_id = $2 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, SignatureRequest>(&query)
            .bind(id)
            .bind(agency_id)
            .bind(patch.status.map(|s| s.as_str()))
            .bind(patch.signed_date)
            .bind(&patch.signature_url)
            .bind(&patch.signed_document_url)
            .bind(&patch.external_document_id)
            .bind(patch.metadata.as_ref().map(Json))
            .fetch_one(pool)
            .await?;

        Ok(updated)
    }

    /// Delete all of a tenant's requests (explicit bulk cleanup, the only
    /// deletion path). Returns the number of rows removed.
    pub async fn delete_all(pool: &PgPool, agency_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM signature_requests WHERE agency_id = $1")
            .bind(agency_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
