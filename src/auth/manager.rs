//! Session state machine
//!
//! [`SessionManager`] owns the current [`Session`] and exposes the operations
//! that move it through the sign-in sequence:
//!
//! ```text
//! idle --begin_email_entry--> email
//! idle/email/otp --request_code--> otp
//! otp --verify_code--> authenticated (existing user) | onboarding (new user)
//! otp --resend_code--> otp
//! onboarding --complete_onboarding--> authenticated
//! authenticated --update_profile--> authenticated
//! authenticated --delete_account--> idle
//! * --logout--> idle
//! ```
//!
//! Every operation returns an [`Outcome`]; failures are values carrying a
//! message for the user and never change the step. Each successful
//! operation commits one [`SessionEvent`] through [`Session::apply`] and then
//! persists the snapshot on a best-effort basis.
//!
//! Operations are not serialized against each other. When a gateway call
//! returns, its event is checked against the state current at that moment;
//! an event the current step no longer accepts is dropped and the operation
//! fails with `InvalidState`. Credential writes happen under the same lock
//! as the commit, so a logout that lands first leaves no credential behind.

use std::sync::{Arc, RwLock};

use crate::auth::gateway::AuthGateway;
use crate::auth::session::{AuthStep, Session, SessionEvent};
use crate::auth::token_store::TokenStore;
use crate::auth::types::{Profile, ProfileUpdate, RegisterRequest, Registration, Role};
use crate::auth::validation;
use crate::error::{AmityError, AuthFailure, Outcome};
use crate::navigation::{screen_group, ScreenGroup};
use crate::storage::{best_effort, SessionStorage};

const DEFAULT_CODE_LENGTH: usize = 6;

/// Credential change committed together with a session event.
#[derive(Debug, Clone, Copy)]
enum Credential<'a> {
    Keep,
    Set(&'a str),
    Clear,
}

/// High-level coordinator for the sign-in sequence.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use amity::auth::gateway::HttpAuthGateway;
/// use amity::auth::manager::SessionManager;
/// use amity::auth::token_store::{MemoryBackend, TokenStore};
/// use amity::config::ApiConfig;
/// use amity::storage::MemorySessionStorage;
///
/// # async fn example() -> amity::error::Result<()> {
/// let manager = SessionManager::new(
///     Arc::new(HttpAuthGateway::new(&ApiConfig::default())?),
///     Arc::new(TokenStore::new(Arc::new(MemoryBackend::new()))),
///     Arc::new(MemorySessionStorage::default()),
/// );
/// manager.initialize().await;
///
/// if let Err(failure) = manager.request_code("User@Example.com ").await {
///     eprintln!("{}", failure);
/// }
/// # Ok(())
/// # }
/// ```
pub struct SessionManager {
    gateway: Arc<dyn AuthGateway>,
    tokens: Arc<TokenStore>,
    storage: Arc<dyn SessionStorage>,
    state: RwLock<Session>,
    code_length: usize,
}

impl SessionManager {
    /// Creates a manager holding an empty session.
    ///
    /// Call [`initialize`](Self::initialize) to rehydrate persisted state.
    pub fn new(
        gateway: Arc<dyn AuthGateway>,
        tokens: Arc<TokenStore>,
        storage: Arc<dyn SessionStorage>,
    ) -> Self {
        Self {
            gateway,
            tokens,
            storage,
            state: RwLock::new(Session::default()),
            code_length: DEFAULT_CODE_LENGTH,
        }
    }

    /// Sets the expected number of digits in a one-time code.
    pub fn with_code_length(mut self, code_length: usize) -> Self {
        self.code_length = code_length;
        self
    }

    /// Copy of the current session.
    pub fn session(&self) -> Session {
        self.state.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Screen group for the current session.
    pub fn screen_group(&self) -> ScreenGroup {
        screen_group(&self.session())
    }

    // -----------------------------------------------------------------------
    // Startup
    // -----------------------------------------------------------------------

    /// Rehydrates the session from storage and re-validates the credential.
    ///
    /// With a stored credential the profile is re-fetched: a fresh profile
    /// signs the session in, a 401 discards the credential, and any other
    /// failure keeps the cached profile so the app still opens offline.
    /// Without a credential the session starts signed out.
    pub async fn initialize(&self) -> Session {
        let snapshot = match self.storage.load() {
            Ok(snapshot) => snapshot.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Failed to load session snapshot: {:#}", e);
                Default::default()
            }
        };
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = Session::rehydrate(snapshot);

        let Some(token) = self.tokens.get() else {
            if self.session().user.is_some() {
                tracing::info!("Cached profile without a credential; signing out");
                return self.commit(SessionEvent::Revalidated { user: None });
            }
            return self.session();
        };

        match self.gateway.fetch_profile(&token).await {
            Ok(user) => self.commit(SessionEvent::Revalidated { user: Some(user) }),
            Err(e) => match e.downcast_ref::<AmityError>() {
                Some(AmityError::Unauthorized(_)) => {
                    tracing::info!("Stored credential rejected; signing out");
                    self.transition(SessionEvent::Revalidated { user: None }, Credential::Clear)
                        .unwrap_or_else(|| self.session())
                }
                _ => {
                    tracing::warn!("Could not refresh profile, using cached state: {:#}", e);
                    self.session()
                }
            },
        }
    }

    // -----------------------------------------------------------------------
    // Sign-in sequence
    // -----------------------------------------------------------------------

    /// Moves from the welcome screen to email entry.
    pub fn begin_email_entry(&self) -> Session {
        self.commit(SessionEvent::EmailEntryStarted)
    }

    /// Asks the gateway to email a one-time code.
    ///
    /// The address is trimmed and lower-cased before validation; on success
    /// it becomes the pending email and the session moves to `otp`.
    pub async fn request_code(&self, email: &str) -> Outcome {
        let step = self.session().auth_step;
        if !matches!(step, AuthStep::Idle | AuthStep::Email | AuthStep::Otp) {
            return Err(AuthFailure::invalid_state(format!(
                "Cannot request a code while {}",
                step
            )));
        }

        let email = validation::normalize_email(email);
        validation::validate_email(&email)?;

        let response = self.gateway.start(&email).await?;
        tracing::debug!("Code requested (new user: {})", response.is_new_user);

        match self.transition(SessionEvent::CodeRequested { email }, Credential::Keep) {
            Some(_) => Ok(()),
            None => Err(AuthFailure::invalid_state(format!(
                "Cannot request a code while {}",
                self.session().auth_step
            ))),
        }
    }

    /// Requests another code for the pending email.
    pub async fn resend_code(&self) -> Outcome {
        let Some(email) = self.session().pending_email else {
            return Err(AuthFailure::invalid_state(
                "No email to resend the code to",
            ));
        };
        self.request_code(&email).await
    }

    /// Verifies a one-time code for the pending email.
    ///
    /// Existing users end up `authenticated` with their profile; new users
    /// move to `onboarding`. A rejected code leaves the session at `otp`.
    pub async fn verify_code(&self, code: &str) -> Outcome {
        let session = self.session();
        let email = match (session.auth_step, session.pending_email) {
            (AuthStep::Otp, Some(email)) => email,
            _ => return Err(AuthFailure::invalid_state("Request a code first")),
        };
        let code = validation::validate_code(code, self.code_length)?;

        let response = self.gateway.verify(&email, code).await?;

        let committed = if response.is_new_user {
            let credential = response
                .token
                .as_deref()
                .map_or(Credential::Keep, Credential::Set);
            self.transition_for(&email, SessionEvent::NewUserVerified, credential)
        } else {
            let token = response.token.ok_or_else(|| {
                AmityError::Network("Verification response did not include a credential".into())
            })?;
            let user = match response.user {
                Some(user) => user,
                None => self.gateway.fetch_profile(&token).await?,
            };
            self.transition_for(
                &email,
                SessionEvent::ExistingUserVerified { user },
                Credential::Set(&token),
            )
        };

        committed.map(|_| ()).ok_or_else(|| {
            AuthFailure::invalid_state("Sign-in was cancelled while verifying the code")
        })
    }

    /// Creates the account for a verified new user.
    pub async fn complete_onboarding(&self, registration: Registration) -> Outcome<Profile> {
        let session = self.session();
        let email = match (session.auth_step, session.pending_email) {
            (AuthStep::Onboarding, Some(email)) => email,
            _ => {
                return Err(AuthFailure::invalid_state(
                    "Verify your email before setting up a profile",
                ))
            }
        };
        validation::validate_registration(&registration)?;

        let submitted_rate = registration.hourly_rate;
        let request = RegisterRequest::new(email, registration);
        let response = self.gateway.register(&request).await?;

        let mut user = response.user;
        if user.role == Role::Companion && user.hourly_rate.is_none() {
            user.hourly_rate = submitted_rate;
        }

        self.transition_for(
            &request.email,
            SessionEvent::Registered { user },
            Credential::Set(&response.token),
        )
        .and_then(|session| session.user)
        .ok_or_else(|| AuthFailure::invalid_state("Session was signed out during registration"))
    }

    // -----------------------------------------------------------------------
    // Signed-in operations
    // -----------------------------------------------------------------------

    /// Applies a partial profile update.
    ///
    /// The bio and every other field are sent exactly as given.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Outcome<Profile> {
        let (user, token) = self.signed_in()?;
        validation::validate_profile_update(&update, user.role)?;

        let updated = self.gateway.update_profile(&token, &update).await?;
        self.transition(SessionEvent::ProfileUpdated { user: updated }, Credential::Keep)
            .and_then(|session| session.user)
            .ok_or_else(|| AuthFailure::invalid_state("Session was signed out during update"))
    }

    /// Signs out.
    ///
    /// The server is told on a best-effort basis; locally the credential,
    /// profile, and pending email are always cleared.
    pub async fn logout(&self) -> Session {
        if let Some(token) = self.tokens.get() {
            if let Err(e) = self.gateway.logout(&token).await {
                tracing::warn!("Remote logout failed: {:#}", e);
            }
        }
        self.transition(SessionEvent::SignedOut, Credential::Clear)
            .unwrap_or_else(|| self.session())
    }

    /// Permanently deletes the account, then signs out.
    pub async fn delete_account(&self) -> Outcome {
        let (_, token) = self.signed_in()?;
        self.gateway.delete_account(&token).await?;

        tracing::info!("Account deleted");
        self.transition(SessionEvent::SignedOut, Credential::Clear);
        Ok(())
    }

    /// Records that the introductory slides were dismissed.
    pub fn dismiss_intro(&self) -> Session {
        self.commit(SessionEvent::IntroDismissed)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn signed_in(&self) -> Outcome<(Profile, String)> {
        let user = self
            .session()
            .user
            .ok_or_else(|| AuthFailure::invalid_state("Not signed in"))?;
        let token = self
            .tokens
            .get()
            .ok_or_else(|| AuthFailure::invalid_state("Not signed in"))?;
        Ok((user, token))
    }

    /// Applies `event` to the current state and persists the result.
    ///
    /// Returns the unchanged session when the current step does not accept
    /// the event.
    fn commit(&self, event: SessionEvent) -> Session {
        self.transition(event, Credential::Keep)
            .unwrap_or_else(|| self.session())
    }

    fn transition(&self, event: SessionEvent, credential: Credential<'_>) -> Option<Session> {
        self.transition_if(event, credential, |_| true)
    }

    /// Like [`transition`](Self::transition), but only while `email` is
    /// still the pending email.
    fn transition_for(
        &self,
        email: &str,
        event: SessionEvent,
        credential: Credential<'_>,
    ) -> Option<Session> {
        self.transition_if(event, credential, |state| {
            state.pending_email.as_deref() == Some(email)
        })
    }

    /// Commits `event` and `credential` together, or neither.
    ///
    /// Returns `None` without touching the credential when the current step
    /// does not accept the event or `guard` rejects the current state.
    fn transition_if(
        &self,
        event: SessionEvent,
        credential: Credential<'_>,
        guard: impl FnOnce(&Session) -> bool,
    ) -> Option<Session> {
        let (from, next) = {
            let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
            if !state.accepts(&event) || !guard(&state) {
                tracing::debug!("Ignoring session event while {}", state.auth_step);
                return None;
            }
            match credential {
                Credential::Keep => {}
                Credential::Set(token) => self.tokens.set(Some(token)),
                Credential::Clear => self.tokens.set(None),
            }
            let from = state.auth_step;
            *state = state.apply(event);
            (from, state.clone())
        };

        if from != next.auth_step {
            tracing::info!("Session step {} -> {}", from, next.auth_step);
        }

        let snapshot = next.snapshot();
        best_effort("persist session", || self.storage.save(&snapshot));
        Some(next)
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("session", &self.session())
            .field("tokens", &self.tokens)
            .field("code_length", &self.code_length)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
