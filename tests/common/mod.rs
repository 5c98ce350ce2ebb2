use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use amity::auth::{HttpAuthGateway, MemoryBackend, SessionManager, TokenStore};
use amity::config::ApiConfig;
use amity::storage::MemorySessionStorage;

/// A manager talking HTTP to `base_url`, with in-memory credential and
/// snapshot storage the test can inspect.
#[allow(dead_code)]
pub struct TestClient {
    pub manager: SessionManager,
    pub credential: Arc<MemoryBackend>,
    pub storage: Arc<MemorySessionStorage>,
}

#[allow(dead_code)]
pub fn client_for(base_url: &str) -> TestClient {
    client_with(base_url, MemoryBackend::new(), MemorySessionStorage::default())
}

#[allow(dead_code)]
pub fn client_with(
    base_url: &str,
    credential: MemoryBackend,
    storage: MemorySessionStorage,
) -> TestClient {
    let credential = Arc::new(credential);
    let storage = Arc::new(storage);
    let manager = SessionManager::new(
        Arc::new(http_gateway(base_url)),
        Arc::new(TokenStore::new(credential.clone())),
        storage.clone(),
    );
    TestClient {
        manager,
        credential,
        storage,
    }
}

#[allow(dead_code)]
pub fn http_gateway(base_url: &str) -> HttpAuthGateway {
    let config = ApiConfig {
        base_url: base_url.to_string(),
        timeout_seconds: 5,
        ..Default::default()
    };
    HttpAuthGateway::new(&config).expect("failed to build gateway")
}

#[allow(dead_code)]
pub fn profile_json(role: &str, status: &str) -> serde_json::Value {
    let mut profile = serde_json::json!({
        "id": "u_42",
        "email": "user@example.com",
        "name": "Ada",
        "role": role,
        "age": 31,
        "location": "Porto",
        "verificationStatus": status
    });
    if role == "companion" {
        profile["hourlyRate"] = serde_json::json!(80.0);
    }
    profile
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
