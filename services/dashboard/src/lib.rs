//! services/dashboard/src/lib.rs
//!
//! The dashboard's data layer: typed endpoint clients over an HTTP transport,
//! the query cache that shares their results, and the application context that
//! holds the session-scoped season selection.

pub mod adapters;
pub mod api;
pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod queries;
