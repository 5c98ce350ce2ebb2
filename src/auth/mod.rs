//! Email one-time-code authentication
//!
//! This module provides:
//! - [`session`]: the session value and its pure transition function
//! - [`manager`]: the stateful coordinator wiring gateway, credential, and storage
//! - [`gateway`]: the remote API seam and its HTTP implementation
//! - [`token_store`]: bearer credential cache and durable backends
//! - [`validation`]: client-side input checks
//! - [`types`]: profile and wire types

pub mod gateway;
pub mod manager;
pub mod session;
pub mod token_store;
pub mod types;
pub mod validation;

pub use gateway::{AuthGateway, HttpAuthGateway};
pub use manager::SessionManager;
pub use session::{AuthStep, Session, SessionEvent};
pub use token_store::{CredentialBackend, KeyringBackend, MemoryBackend, TokenStore};
pub use types::{Profile, ProfileUpdate, Registration, Role, VerificationStatus};
