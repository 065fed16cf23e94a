//! GrowthHub API Client
//!
//! Tenant-aware client for the GrowthHub REST API. Wraps every request in
//! an authorization gateway so application code never touches identity
//! headers:
//!
//! - Stored credentials are attached automatically (`Authorization: Bearer`
//!   plus `X-Organization-Id`).
//! - A session without a resolved organization triggers one lookup against
//!   `/auth/organizations`, shared across concurrent requests, and the
//!   result is persisted for every later call.
//! - A 401 destroys the persisted record and surfaces as
//!   [`Error::AuthExpired`] for the application shell to turn into a
//!   fresh login.
//!
//! Auth state lives behind the [`AuthStore`] trait: a JSON file slot
//! ([`FileAuthStore`]) in real deployments, [`MemoryAuthStore`] in tests.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use growthhub_client::{FileAuthStore, GrowthHubClient};
//!
//! let store = Arc::new(FileAuthStore::new("/home/app/.growthhub"));
//! let client = GrowthHubClient::from_env(store);
//!
//! client.login("founder@acme.dev", "hunter2").await?;
//! let org = client.ensure_tenant_context().await?;
//! println!("operating as {}", org.name);
//!
//! // Scoped request; bearer and organization headers ride along.
//! let leads: serde_json::Value = client.get_json("/revops/leads").await?;
//! ```
//!
//! # Modules
//!
//! - [`client`] - The gateway and the auth operations
//! - [`store`] - Persisted auth record repository
//! - [`types`] - Wire shapes and the auth record
//! - [`error`] - Typed errors

pub mod client;
pub mod error;
pub mod store;
pub mod types;

// Re-export core types at crate root
pub use client::{GrowthHubClient, ORGANIZATION_HEADER};
pub use error::{Error, Result, StoreError};
pub use store::{AuthStore, FileAuthStore, MemoryAuthStore, STORAGE_SLOT};
pub use types::{
    AuthRecord, AuthResponse, MessageResponse, Organization, OrganizationMembership, Session,
    SignupRequest, User, UserProfile,
};
