use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::types::Profile;

/// Durable snapshot of the session, written after every transition.
///
/// The sign-in step and pending email are not stored; an
/// interrupted code exchange starts over after a restart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    /// Introductory slides dismissed
    #[serde(default)]
    pub has_seen_onboarding: bool,
    /// Cached profile of the signed-in user
    #[serde(default)]
    pub user: Option<Profile>,
    /// Whether `user` belonged to a live session when written
    #[serde(default)]
    pub is_authenticated: bool,
    /// Whether the account finished profile setup
    #[serde(default)]
    pub has_completed_onboarding: bool,
    /// When the snapshot was written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}
