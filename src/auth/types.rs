//! Profile, registration, and gateway wire types
//!
//! All JSON field names are camelCase to match the remote API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role chosen during profile setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Books time with companions
    Seeker,
    /// Offers time at an hourly rate
    Companion,
}

impl Role {
    /// Lower-case identifier used on the wire and in screen group names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Seeker => "seeker",
            Role::Companion => "companion",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "seeker" => Ok(Role::Seeker),
            "companion" => Ok(Role::Companion),
            other => Err(format!(
                "Invalid role: {}. Must be one of: seeker, companion",
                other
            )),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity verification status as adjudicated by the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    /// Submitted, awaiting review
    Pending,
    /// Cleared to use the main app
    Approved,
    /// Submission refused
    Rejected,
    /// Nothing submitted yet; also any status this client does not know
    #[default]
    #[serde(other)]
    Unverified,
}

/// Profile snapshot of the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Server-assigned identifier
    pub id: String,
    /// Account email
    pub email: String,
    /// Display name
    pub name: String,
    /// Account role
    pub role: Role,
    /// Age in years
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    /// Free-text introduction, stored exactly as entered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// City or area shown on the profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Identity verification status
    #[serde(default)]
    pub verification_status: VerificationStatus,
    /// Only ever present for companions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<f64>,
    /// Account creation time, when the server reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Drops fields the role cannot carry.
    pub(crate) fn normalized(mut self) -> Self {
        if self.role == Role::Seeker {
            self.hourly_rate = None;
        }
        self
    }
}

/// Profile fields collected during account onboarding.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub name: String,
    pub role: Role,
    pub age: Option<u32>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub hourly_rate: Option<f64>,
}

impl Registration {
    /// Starts a registration with the two mandatory fields.
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
            age: None,
            bio: None,
            location: None,
            hourly_rate: None,
        }
    }
}

/// Partial profile update; `None` fields are left untouched server-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<f64>,
}

impl ProfileUpdate {
    /// Returns `true` when no field would be sent.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.age.is_none()
            && self.bio.is_none()
            && self.location.is_none()
            && self.hourly_rate.is_none()
    }
}

// ---------------------------------------------------------------------------
// Gateway request/response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct StartRequest<'a> {
    pub email: &'a str,
}

/// Response of `POST /auth/start`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    #[serde(default)]
    pub is_new_user: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyRequest<'a> {
    pub email: &'a str,
    pub code: &'a str,
}

/// Response of `POST /auth/verify`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<Profile>,
    #[serde(default)]
    pub is_new_user: bool,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<f64>,
}

impl RegisterRequest {
    /// Builds the wire body; seekers never send a rate.
    pub fn new(email: impl Into<String>, registration: Registration) -> Self {
        let hourly_rate = match registration.role {
            Role::Companion => registration.hourly_rate,
            Role::Seeker => None,
        };
        Self {
            email: email.into(),
            name: registration.name.trim().to_string(),
            role: registration.role,
            age: registration.age,
            bio: registration.bio,
            location: registration.location,
            hourly_rate,
        }
    }
}

/// Response carrying a fresh credential and the profile it belongs to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthenticatedResponse {
    pub token: String,
    pub user: Profile,
}
