//! Local persistence for the session snapshot
//!
//! The snapshot lives in an embedded `sled` database under the data
//! directory, keyed by [`SESSION_KEY`]. The same database can also hold the
//! bearer credential for hosts without a usable OS keyring.
//!
//! Writes from the session state machine go through [`best_effort`]: a
//! failed write is logged and the in-memory session stays authoritative.

use crate::auth::token_store::CredentialBackend;
use crate::error::{AmityError, Result};
use anyhow::Context;
use std::path::PathBuf;
use std::sync::Mutex;

pub mod types;
pub use types::PersistedSession;

/// Key of the session snapshot
pub const SESSION_KEY: &str = "session";

/// Key of the bearer credential when stored in the database
pub const CREDENTIAL_KEY: &str = "credential";

/// Runs a storage operation whose failure must not reach the caller.
///
/// This is an accepted durability gap: the failure is logged at `warn` and
/// the next successful write or rehydration brings durable state back in
/// line with memory.
pub fn best_effort<F>(operation: &str, f: F)
where
    F: FnOnce() -> Result<()>,
{
    if let Err(e) = f() {
        tracing::warn!("Best-effort {} failed: {:#}", operation, e);
    }
}

/// Durable home of the [`PersistedSession`] snapshot.
pub trait SessionStorage: Send + Sync {
    /// Loads the snapshot, or `Ok(None)` when none was ever written.
    fn load(&self) -> Result<Option<PersistedSession>>;

    /// Replaces the snapshot.
    fn save(&self, session: &PersistedSession) -> Result<()>;
}

/// `sled`-backed storage for the snapshot and, optionally, the credential
pub struct SledStore {
    db: sled::Db,
    path: PathBuf,
}

impl SledStore {
    /// Open (or create) the database inside `data_dir`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use amity::storage::SledStore;
    ///
    /// let store = SledStore::open("/tmp/amity-data").unwrap();
    /// ```
    pub fn open<P: Into<PathBuf>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)
            .context("Failed to create data directory")
            .map_err(|e| AmityError::Storage(e.to_string()))?;

        let path = data_dir.join("session.db");
        let db = sled::open(&path)
            .context("Failed to open session database")
            .map_err(|e| AmityError::Storage(e.to_string()))?;

        tracing::debug!("Opened session database at {}", path.display());
        Ok(Self { db, path })
    }

    /// Location of the database on disk
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.db
            .insert(key, value)
            .map_err(|e| AmityError::Storage(format!("Failed to write '{}': {}", key, e)))?;
        self.db
            .flush()
            .map_err(|e| AmityError::Storage(format!("Failed to flush database: {}", e)))?;
        Ok(())
    }

    fn fetch(&self, key: &str) -> Result<Option<sled::IVec>> {
        self.db
            .get(key)
            .map_err(|e| AmityError::Storage(format!("Failed to read '{}': {}", key, e)).into())
    }
}

impl SessionStorage for SledStore {
    fn load(&self) -> Result<Option<PersistedSession>> {
        match self.fetch(SESSION_KEY)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn save(&self, session: &PersistedSession) -> Result<()> {
        let json = serde_json::to_vec(session)?;
        self.put(SESSION_KEY, &json)
    }
}

impl CredentialBackend for SledStore {
    fn read(&self) -> Result<Option<String>> {
        match self.fetch(CREDENTIAL_KEY)? {
            Some(bytes) => Ok(Some(
                String::from_utf8(bytes.to_vec())
                    .map_err(|e| AmityError::Storage(format!("Corrupt credential: {}", e)))?,
            )),
            None => Ok(None),
        }
    }

    fn write(&self, token: &str) -> Result<()> {
        self.put(CREDENTIAL_KEY, token.as_bytes())
    }

    fn delete(&self) -> Result<()> {
        self.db
            .remove(CREDENTIAL_KEY)
            .map_err(|e| AmityError::Storage(format!("Failed to delete credential: {}", e)))?;
        self.db
            .flush()
            .map_err(|e| AmityError::Storage(format!("Failed to flush database: {}", e)))?;
        Ok(())
    }
}

/// In-memory snapshot storage for tests and embedders
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    snapshot: Mutex<Option<PersistedSession>>,
}

impl MemorySessionStorage {
    /// Create storage holding `snapshot`
    pub fn with_snapshot(snapshot: PersistedSession) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
        }
    }

    /// Last snapshot written, if any
    pub fn snapshot(&self) -> Option<PersistedSession> {
        self.snapshot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Result<Option<PersistedSession>> {
        Ok(self.snapshot())
    }

    fn save(&self, session: &PersistedSession) -> Result<()> {
        *self.snapshot.lock().unwrap_or_else(|e| e.into_inner()) = Some(session.clone());
        Ok(())
    }
}
