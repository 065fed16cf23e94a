//! Error types for the GrowthHub client.
//!
//! Split into two layers: [`StoreError`] for failures of the persisted auth
//! record itself, and [`Error`] for everything a request can run into.
//! Callers match on variants instead of inspecting strings, so auth
//! expiry and missing-tenant conditions stay distinguishable from plain
//! network trouble.

use thiserror::Error;

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the request gateway and the auth operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The operation needs a logged-in session and the store holds none.
    #[error("not authenticated: no session is stored")]
    NotAuthenticated,

    /// A session exists but the account belongs to no organization, so
    /// tenant-scoped requests cannot be sent. Stored state is untouched.
    #[error("no organization found for the current user; contact support")]
    NoOrganization,

    /// The API answered 401. Stored credentials have already been cleared;
    /// the caller should send the user back through login.
    #[error("authentication expired: stored credentials were cleared")]
    AuthExpired,

    /// Transport-level failure (connect, timeout, body read).
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx status from a typed endpoint call.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The persisted auth record could not be read or written.
    #[error("auth store error: {0}")]
    Store(#[from] StoreError),
}

/// Failures of the persisted auth record store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing the storage slot failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The slot exists but does not hold a valid auth record.
    #[error("corrupt auth record: {0}")]
    Corrupt(#[from] serde_json::Error),
}
