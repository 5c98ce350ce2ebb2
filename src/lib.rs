//! Amity - session client library for the Amity dating and booking API
//!
//! This library implements the client side of sign-in: email one-time-code
//! authentication, account onboarding, the persisted session, and the policy
//! that picks which group of screens a front end should show.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `auth`: Session state machine, gateway, credential storage, validation
//! - `navigation`: Screen-group selection from the session
//! - `storage`: Persisted session snapshot
//! - `config`: Configuration management and validation
//! - `error`: Error types, result aliases, and operation failures
//! - `cli` / `commands`: Command-line interface and its handlers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use amity::auth::{HttpAuthGateway, KeyringBackend, SessionManager, TokenStore};
//! use amity::storage::SledStore;
//! use amity::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let manager = SessionManager::new(
//!         Arc::new(HttpAuthGateway::new(&config.api)?),
//!         Arc::new(TokenStore::new(Arc::new(KeyringBackend::new("amity")))),
//!         Arc::new(SledStore::open(config.data_dir()?)?),
//!     );
//!     let session = manager.initialize().await;
//!     println!("{}", amity::navigation::screen_group(&session));
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod navigation;
pub mod storage;

// Re-export commonly used types
pub use auth::SessionManager;
pub use config::Config;
pub use error::{AmityError, AuthFailure, FailureKind, Outcome, Result};
pub use navigation::{screen_group, ScreenGroup};

#[cfg(test)]
pub mod test_utils;
