//! Session state and its transition function
//!
//! [`Session`] is a plain value. The only way to change one is
//! [`Session::apply`], which takes a [`SessionEvent`] describing something
//! that already succeeded (a code was sent, a code was accepted, ...) and
//! returns the next state. No I/O happens here, so every transition can be
//! tested without a gateway or storage.

use serde::{Deserialize, Serialize};

use crate::auth::types::Profile;
use crate::storage::PersistedSession;

/// Position in the sign-in sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStep {
    /// Signed out
    #[default]
    Idle,
    /// Entering an email address
    Email,
    /// Waiting for the one-time code
    Otp,
    /// New account, profile not yet completed
    Onboarding,
    /// Signed in with a profile
    Authenticated,
}

impl AuthStep {
    /// Lower-case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthStep::Idle => "idle",
            AuthStep::Email => "email",
            AuthStep::Otp => "otp",
            AuthStep::Onboarding => "onboarding",
            AuthStep::Authenticated => "authenticated",
        }
    }
}

impl std::fmt::Display for AuthStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A completed fact that moves the session forward (or back to idle).
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The user chose to continue with email
    EmailEntryStarted,
    /// The gateway sent a code to `email` (already normalized)
    CodeRequested { email: String },
    /// A code was accepted for an account that already has a profile
    ExistingUserVerified { user: Profile },
    /// A code was accepted for an address with no account yet
    NewUserVerified,
    /// Profile setup finished and the account was created
    Registered { user: Profile },
    /// The server returned an updated profile
    ProfileUpdated { user: Profile },
    /// The introductory slides were dismissed
    IntroDismissed,
    /// Logout or account deletion
    SignedOut,
    /// Startup re-validation resolved to a profile (`Some`) or to no usable
    /// credential (`None`)
    Revalidated { user: Option<Profile> },
}

/// The authoritative sign-in state.
///
/// Invariants maintained by [`apply`](Self::apply):
///
/// - `pending_email` is `Some` whenever `auth_step` is `Otp` or `Onboarding`.
/// - `user` is `Some` exactly when `auth_step` is `Authenticated`, and
///   `is_authenticated` mirrors that.
/// - `has_seen_onboarding` is only ever set, never cleared.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub auth_step: AuthStep,
    pub pending_email: Option<String>,
    pub user: Option<Profile>,
    pub is_authenticated: bool,
    pub has_seen_onboarding: bool,
    pub has_completed_onboarding: bool,
}

impl Session {
    /// Builds the startup state from a persisted snapshot.
    ///
    /// A cached profile only counts if the snapshot said it belonged to a
    /// live session. The sign-in step is derived, never stored.
    pub fn rehydrate(snapshot: PersistedSession) -> Self {
        let user = if snapshot.is_authenticated {
            snapshot.user
        } else {
            None
        };
        let auth_step = if user.is_some() {
            AuthStep::Authenticated
        } else {
            AuthStep::Idle
        };

        Self {
            auth_step,
            pending_email: None,
            is_authenticated: user.is_some(),
            user,
            has_seen_onboarding: snapshot.has_seen_onboarding,
            has_completed_onboarding: snapshot.has_completed_onboarding,
        }
    }

    /// Serializable snapshot of the durable part of this state.
    pub fn snapshot(&self) -> PersistedSession {
        PersistedSession {
            has_seen_onboarding: self.has_seen_onboarding,
            user: self.user.clone(),
            is_authenticated: self.is_authenticated,
            has_completed_onboarding: self.has_completed_onboarding,
            saved_at: Some(chrono::Utc::now()),
        }
    }

    /// Whether `event` moves this state at all.
    ///
    /// Overlapping operations can land their events in any order, so each
    /// event is only honored in the steps that still hold its inputs: a code
    /// request never interrupts a signed-in or onboarding session, a code
    /// verification needs a pending code exchange, and registration needs a
    /// verified new account. Sign-out, intro dismissal, and startup
    /// re-validation apply everywhere.
    pub fn accepts(&self, event: &SessionEvent) -> bool {
        let awaiting = |step: AuthStep| self.auth_step == step && self.pending_email.is_some();

        match event {
            SessionEvent::EmailEntryStarted => self.auth_step == AuthStep::Idle,
            SessionEvent::CodeRequested { .. } => matches!(
                self.auth_step,
                AuthStep::Idle | AuthStep::Email | AuthStep::Otp
            ),
            SessionEvent::ExistingUserVerified { .. } | SessionEvent::NewUserVerified => {
                awaiting(AuthStep::Otp)
            }
            SessionEvent::Registered { .. } => awaiting(AuthStep::Onboarding),
            SessionEvent::ProfileUpdated { .. } => self.auth_step == AuthStep::Authenticated,
            SessionEvent::IntroDismissed
            | SessionEvent::SignedOut
            | SessionEvent::Revalidated { .. } => true,
        }
    }

    /// Returns the state that follows `event`.
    ///
    /// An event the current step does not [`accept`](Self::accepts) leaves
    /// the state unchanged.
    pub fn apply(&self, event: SessionEvent) -> Session {
        if !self.accepts(&event) {
            return self.clone();
        }

        let mut next = self.clone();

        match event {
            SessionEvent::EmailEntryStarted => {
                next.auth_step = AuthStep::Email;
            }
            SessionEvent::CodeRequested { email } => {
                next.pending_email = Some(email);
                next.auth_step = AuthStep::Otp;
            }
            SessionEvent::ExistingUserVerified { user }
            | SessionEvent::Registered { user } => {
                next.sign_in(user);
            }
            SessionEvent::NewUserVerified => {
                next.auth_step = AuthStep::Onboarding;
                next.user = None;
                next.is_authenticated = false;
            }
            SessionEvent::ProfileUpdated { user } => {
                next.user = Some(user.normalized());
            }
            SessionEvent::IntroDismissed => {
                next.has_seen_onboarding = true;
            }
            SessionEvent::SignedOut => {
                next.sign_out();
            }
            SessionEvent::Revalidated { user: Some(user) } => {
                next.sign_in(user);
            }
            SessionEvent::Revalidated { user: None } => {
                next.sign_out();
            }
        }

        next
    }

    fn sign_in(&mut self, user: Profile) {
        self.user = Some(user.normalized());
        self.is_authenticated = true;
        self.has_completed_onboarding = true;
        self.pending_email = None;
        self.auth_step = AuthStep::Authenticated;
    }

    fn sign_out(&mut self) {
        self.user = None;
        self.is_authenticated = false;
        self.has_completed_onboarding = false;
        self.pending_email = None;
        self.auth_step = AuthStep::Idle;
    }
}
