//! Request-scoped extractors and middleware.

pub mod auth;
