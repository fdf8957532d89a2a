//! # Roster - student record service
//!
//! Record management for students, groups, curricula and science areas.
//!
//! Roster provides:
//! - A store gateway that scopes one SQLite connection to one logical operation
//! - Optional-filter student listings with left-joined reference names
//! - Per-group and per-science statistics computed from a single snapshot
//! - Transactional create/delete with typed errors
//! - An HTTP API (axum) and a typed HTTP client (reqwest) consuming it

pub mod api;
pub mod client;
pub mod config;
pub mod query;
pub mod record;
pub mod server;
pub mod service;
pub mod storage;
pub mod ui;

// Re-exports for convenient access
pub use client::{ClientError, RosterClient};
pub use query::StudentFilter;
pub use record::{BucketCount, NewStudent, RefEntry, StatisticsSnapshot, StudentRecord};
pub use service::RecordService;
pub use storage::{StoreConfig, StoreGateway};

/// Result type alias for Roster operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Roster operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No connection could be acquired; nothing was executed.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A query or commit failed after the connection was acquired.
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Student not found: {0}")]
    NotFound(i64),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The blocking worker running a store call panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(String),
}

impl Error {
    /// Stable, machine-readable classification of the error.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::StoreUnavailable(_) => "store_unavailable",
            Error::Store(_) => "store_error",
            Error::NotFound(_) => "not_found",
            Error::InvalidArgument(_) => "invalid_argument",
            Error::Task(_) => "internal",
        }
    }
}
