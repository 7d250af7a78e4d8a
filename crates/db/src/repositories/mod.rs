//! Repositories: stateless structs whose methods take `&PgPool` plus the
//! owning tenant's agency id, so cross-tenant access is structurally
//! impossible rather than filtered by convention.

pub mod setting_repo;
pub mod signature_request_repo;

pub use setting_repo::SettingRepo;
pub use signature_request_repo::{SignatureRequestRepo, StoreError};
