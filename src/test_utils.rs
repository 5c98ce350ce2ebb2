//! Test utilities for Amity
//!
//! This module provides common test fixtures: temporary directories,
//! profile builders, configuration samples, and assertion helpers.

use crate::auth::types::{Profile, Role, VerificationStatus};
use crate::config::Config;
use crate::error::{AmityError, Result};
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// The directory is removed when the returned guard is dropped.
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Build a profile with the given role and verification status
pub fn sample_profile(role: Role, status: VerificationStatus) -> Profile {
    Profile {
        id: "u_test".to_string(),
        email: "user@example.com".to_string(),
        name: "Test User".to_string(),
        role,
        age: Some(30),
        bio: None,
        location: Some("Lisbon".to_string()),
        verification_status: status,
        hourly_rate: match role {
            Role::Companion => Some(75.0),
            Role::Seeker => None,
        },
        created_at: None,
    }
}

/// Assert that a result failed with an [`AmityError::Validation`] whose
/// message contains `expected`
///
/// # Panics
///
/// Panics if the result is Ok, is another error kind, or if the message
/// doesn't contain the expected substring
pub fn assert_validation_error<T: std::fmt::Debug>(result: Result<T>, expected: &str) {
    match result {
        Ok(value) => panic!(
            "Expected validation error containing '{}' but got Ok({:?})",
            expected, value
        ),
        Err(e) => match e.downcast_ref::<AmityError>() {
            Some(AmityError::Validation(msg)) => assert!(
                msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                msg,
                expected
            ),
            _ => panic!("Expected a validation error, got: {}", e),
        },
    }
}

/// Create a test configuration with default values
pub fn test_config() -> Config {
    Config::default()
}

/// Create a test configuration YAML string
pub fn test_config_yaml() -> String {
    r#"
api:
  base_url: http://127.0.0.1:8080/api
  timeout_seconds: 15
  user_agent: amity-test
storage:
  credential_store: file
  keyring_service: amity-test
auth:
  code_length: 4
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_creation() {
        let dir = temp_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_sample_profile_rate_follows_role() {
        assert!(sample_profile(Role::Seeker, VerificationStatus::Approved)
            .hourly_rate
            .is_none());
        assert!(sample_profile(Role::Companion, VerificationStatus::Approved)
            .hourly_rate
            .is_some());
    }

    #[test]
    fn test_assert_validation_error_success() {
        let result: Result<()> = Err(AmityError::Validation("bad email".to_string()).into());
        assert_validation_error(result, "bad");
    }

    #[test]
    #[should_panic(expected = "Expected validation error containing")]
    fn test_assert_validation_error_ok() {
        let result: Result<()> = Ok(());
        assert_validation_error(result, "error");
    }

    #[test]
    #[should_panic(expected = "Expected a validation error")]
    fn test_assert_validation_error_wrong_kind() {
        let result: Result<()> = Err(AmityError::Network("down".to_string()).into());
        assert_validation_error(result, "down");
    }

    #[test]
    fn test_test_config() {
        let config = test_config();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_test_config_yaml() {
        let config: Config = serde_yaml::from_str(&test_config_yaml()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.auth.code_length, 4);
    }
}
