//! Outbound service clients for the CareSign backend.
//!
//! One module per external service (BoldSign, JotForm, Resend) plus the
//! shared [`adapter::ProviderAdapter`] contract, per-call credential
//! handling, and the timeout/retry policy applied to idempotent calls.

pub mod adapter;
pub mod boldsign;
pub mod credential;
pub mod error;
mod http;
pub mod jotform;
pub mod resend;
pub mod retry;
