//! Bearer credential persistence
//!
//! [`TokenStore`] keeps the current credential in memory and mirrors it to a
//! durable [`CredentialBackend`]. The default backend is the operating
//! system's native credential store (Keychain on macOS, Secret Service on
//! Linux, Windows Credential Manager on Windows).
//!
//! Durable writes are best effort: a failing backend is logged and otherwise
//! ignored, so the in-memory value is always authoritative for the running
//! process. The durable copy can fall one write behind after a crash; the
//! session re-validates the token against the server on the next start.

use std::sync::{Mutex, RwLock};

use crate::error::{AmityError, Result};
use crate::storage::best_effort;

// ---------------------------------------------------------------------------
// CredentialBackend
// ---------------------------------------------------------------------------

/// Durable storage for a single opaque credential string.
pub trait CredentialBackend: Send + Sync {
    /// Returns the stored credential, or `Ok(None)` when nothing is stored.
    fn read(&self) -> Result<Option<String>>;

    /// Replaces the stored credential.
    fn write(&self, token: &str) -> Result<()>;

    /// Removes the stored credential. Deleting a missing entry is a no-op.
    fn delete(&self) -> Result<()>;
}

/// Credential backend on the OS native keyring.
///
/// # Examples
///
/// ```no_run
/// use amity::auth::token_store::{CredentialBackend, KeyringBackend};
///
/// let backend = KeyringBackend::new("amity");
/// backend.write("opaque-token").unwrap();
/// assert_eq!(backend.read().unwrap().as_deref(), Some("opaque-token"));
/// ```
#[derive(Debug, Clone)]
pub struct KeyringBackend {
    service: String,
    account: String,
}

impl KeyringBackend {
    /// Account name under which the credential is filed.
    pub const ACCOUNT: &'static str = "session";

    /// Creates a backend filing the credential under `service`.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            account: Self::ACCOUNT.to_string(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry> {
        keyring::Entry::new(&self.service, &self.account)
            .map_err(|e| AmityError::Keyring(e).into())
    }
}

impl CredentialBackend for KeyringBackend {
    fn read(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(token) if token.is_empty() => Ok(None),
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(AmityError::Keyring(e).into()),
        }
    }

    fn write(&self, token: &str) -> Result<()> {
        self.entry()?
            .set_password(token)
            .map_err(AmityError::Keyring)?;
        Ok(())
    }

    fn delete(&self) -> Result<()> {
        match self.entry()?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(AmityError::Keyring(e).into()),
        }
    }
}

/// Process-local credential backend, for tests and embedders that manage
/// durability themselves.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    value: Mutex<Option<String>>,
    reads: Mutex<usize>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend that already holds `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(token.into())),
            reads: Mutex::new(0),
        }
    }

    /// Current durable value, bypassing any cache.
    pub fn stored(&self) -> Option<String> {
        self.value.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of times [`CredentialBackend::read`] has been called.
    pub fn read_count(&self) -> usize {
        *self.reads.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CredentialBackend for MemoryBackend {
    fn read(&self) -> Result<Option<String>> {
        *self.reads.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        Ok(self.stored())
    }

    fn write(&self, token: &str) -> Result<()> {
        *self.value.lock().unwrap_or_else(|e| e.into_inner()) = Some(token.to_string());
        Ok(())
    }

    fn delete(&self) -> Result<()> {
        *self.value.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TokenStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Cached {
    Unloaded,
    Loaded(Option<String>),
}

/// In-memory credential cache mirrored to a durable backend.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use amity::auth::token_store::{MemoryBackend, TokenStore};
///
/// let store = TokenStore::new(Arc::new(MemoryBackend::new()));
/// assert!(store.get().is_none());
///
/// store.set(Some("opaque-token"));
/// assert_eq!(store.get().as_deref(), Some("opaque-token"));
///
/// store.set(None);
/// assert!(store.get().is_none());
/// ```
pub struct TokenStore {
    backend: std::sync::Arc<dyn CredentialBackend>,
    cache: RwLock<Cached>,
}

impl TokenStore {
    /// Creates a store over `backend`. Nothing is read until the first
    /// [`get`](Self::get).
    pub fn new(backend: std::sync::Arc<dyn CredentialBackend>) -> Self {
        Self {
            backend,
            cache: RwLock::new(Cached::Unloaded),
        }
    }

    /// Replaces the credential, or clears it when `token` is `None`.
    ///
    /// The in-memory value changes immediately. The durable copy is written
    /// or deleted afterwards; a backend failure is logged and swallowed.
    pub fn set(&self, token: Option<&str>) {
        *self.cache.write().unwrap_or_else(|e| e.into_inner()) =
            Cached::Loaded(token.map(str::to_string));

        match token {
            Some(token) => best_effort("persist credential", || self.backend.write(token)),
            None => best_effort("delete credential", || self.backend.delete()),
        }
    }

    /// Returns the current credential.
    ///
    /// The first call reads the durable backend once; the result (including
    /// "no credential") is cached for every later call. A failing read is
    /// logged and treated as "no credential".
    pub fn get(&self) -> Option<String> {
        if let Cached::Loaded(token) = &*self.cache.read().unwrap_or_else(|e| e.into_inner()) {
            return token.clone();
        }

        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        // Another caller may have loaded while we waited for the write lock.
        if let Cached::Loaded(token) = &*cache {
            return token.clone();
        }

        let loaded = match self.backend.read() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Failed to read stored credential: {:#}", e);
                None
            }
        };
        *cache = Cached::Loaded(loaded.clone());
        loaded
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &*self.cache.read().unwrap_or_else(|e| e.into_inner()) {
            Cached::Unloaded => "unloaded",
            Cached::Loaded(Some(_)) => "present",
            Cached::Loaded(None) => "absent",
        };
        f.debug_struct("TokenStore").field("token", &state).finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Backend whose every operation fails.
    struct BrokenBackend;

    impl CredentialBackend for BrokenBackend {
        fn read(&self) -> Result<Option<String>> {
            Err(AmityError::Storage("read refused".into()).into())
        }
        fn write(&self, _token: &str) -> Result<()> {
            Err(AmityError::Storage("write refused".into()).into())
        }
        fn delete(&self) -> Result<()> {
            Err(AmityError::Storage("delete refused".into()).into())
        }
    }

    #[test]
    fn test_get_reads_backend_once() {
        let backend = Arc::new(MemoryBackend::with_token("persisted"));
        let store = TokenStore::new(backend.clone());

        assert_eq!(store.get().as_deref(), Some("persisted"));
        assert_eq!(store.get().as_deref(), Some("persisted"));
        assert_eq!(backend.read_count(), 1);
    }

    #[test]
    fn test_get_caches_absence() {
        let backend = Arc::new(MemoryBackend::new());
        let store = TokenStore::new(backend.clone());

        assert!(store.get().is_none());
        // A value appearing behind the cache's back is not picked up.
        backend.write("late").unwrap();
        assert!(store.get().is_none());
        assert_eq!(backend.read_count(), 1);
    }

    #[test]
    fn test_set_writes_through_without_reading() {
        let backend = Arc::new(MemoryBackend::new());
        let store = TokenStore::new(backend.clone());

        store.set(Some("fresh"));
        assert_eq!(store.get().as_deref(), Some("fresh"));
        assert_eq!(backend.stored().as_deref(), Some("fresh"));
        assert_eq!(backend.read_count(), 0);
    }

    #[test]
    fn test_set_none_deletes_durable_copy() {
        let backend = Arc::new(MemoryBackend::with_token("old"));
        let store = TokenStore::new(backend.clone());

        store.set(None);
        assert!(store.get().is_none());
        assert!(backend.stored().is_none());
    }

    #[test]
    fn test_broken_backend_is_swallowed() {
        let store = TokenStore::new(Arc::new(BrokenBackend));

        assert!(store.get().is_none());
        store.set(Some("in-memory-only"));
        assert_eq!(store.get().as_deref(), Some("in-memory-only"));
        store.set(None);
        assert!(store.get().is_none());
    }

    #[test]
    fn test_debug_never_prints_token() {
        let store = TokenStore::new(Arc::new(MemoryBackend::new()));
        store.set(Some("secret-value"));
        let printed = format!("{:?}", store);
        assert!(!printed.contains("secret-value"));
        assert!(printed.contains("present"));
    }

    #[test]
    fn test_keyring_backend_account_name() {
        let backend = KeyringBackend::new("amity-test");
        assert_eq!(backend.service, "amity-test");
        assert_eq!(backend.account, KeyringBackend::ACCOUNT);
    }

    // -----------------------------------------------------------------------
    // Keyring integration tests  (require system keyring; skipped in CI)
    // -----------------------------------------------------------------------

    #[test]
    #[ignore = "requires system keyring"]
    fn test_keyring_roundtrip() {
        let backend = KeyringBackend::new("amity-integration-test");
        backend.write("integration-token").expect("write");
        assert_eq!(
            backend.read().expect("read").as_deref(),
            Some("integration-token")
        );
        backend.delete().expect("delete");
        assert!(backend.read().expect("read after delete").is_none());
    }

    #[test]
    #[ignore = "requires system keyring"]
    fn test_keyring_delete_is_idempotent() {
        let backend = KeyringBackend::new("amity-idempotent-delete-test");
        backend.delete().expect("first delete");
        backend.delete().expect("second delete is no-op");
    }
}
