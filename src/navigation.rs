//! Screen-group selection
//!
//! A front end shows exactly one screen group at a time. Which one is a pure
//! function of the session:
//!
//! | intro seen | step | verification | group |
//! |---|---|---|---|
//! | no | any | any | onboarding slides |
//! | yes | idle / email / otp | - | auth flow |
//! | yes | onboarding | - | auth flow, profile setup |
//! | yes | authenticated | not approved | verification for the role |
//! | yes | authenticated | approved | main tabs for the role |

use serde::Serialize;

use crate::auth::session::{AuthStep, Session};
use crate::auth::types::{Role, VerificationStatus};

/// Screen inside the auth flow group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScreen {
    EmailEntry,
    CodeEntry,
    ProfileSetup,
}

/// Top-level group of screens to present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenGroup {
    /// Introductory slides, shown until dismissed once
    OnboardingSlides,
    /// Sign-in and account setup
    AuthFlow(AuthScreen),
    /// Identity verification for the role
    Verification(Role),
    /// Main tabs for the role
    Main(Role),
}

impl ScreenGroup {
    /// Stable kebab-case identifier, e.g. `main/companion`.
    pub fn id(&self) -> String {
        match self {
            ScreenGroup::OnboardingSlides => "onboarding-slides".to_string(),
            ScreenGroup::AuthFlow(AuthScreen::EmailEntry) => "auth-flow/email".to_string(),
            ScreenGroup::AuthFlow(AuthScreen::CodeEntry) => "auth-flow/code".to_string(),
            ScreenGroup::AuthFlow(AuthScreen::ProfileSetup) => {
                "auth-flow/profile-setup".to_string()
            }
            ScreenGroup::Verification(role) => format!("verification/{}", role),
            ScreenGroup::Main(role) => format!("main/{}", role),
        }
    }
}

impl std::fmt::Display for ScreenGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id())
    }
}

impl Serialize for ScreenGroup {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.id())
    }
}

/// Picks the screen group for `session`.
///
/// # Examples
///
/// ```
/// use amity::auth::session::Session;
/// use amity::navigation::{screen_group, ScreenGroup};
///
/// let session = Session::default();
/// assert_eq!(screen_group(&session), ScreenGroup::OnboardingSlides);
/// ```
pub fn screen_group(session: &Session) -> ScreenGroup {
    if !session.has_seen_onboarding {
        return ScreenGroup::OnboardingSlides;
    }

    match (session.auth_step, &session.user) {
        (AuthStep::Idle | AuthStep::Email, _) => ScreenGroup::AuthFlow(AuthScreen::EmailEntry),
        (AuthStep::Otp, _) => ScreenGroup::AuthFlow(AuthScreen::CodeEntry),
        (AuthStep::Onboarding, _) => ScreenGroup::AuthFlow(AuthScreen::ProfileSetup),
        (AuthStep::Authenticated, Some(user)) => {
            if user.verification_status == VerificationStatus::Approved {
                ScreenGroup::Main(user.role)
            } else {
                ScreenGroup::Verification(user.role)
            }
        }
        // Unreachable through Session::apply; fall back to sign-in.
        (AuthStep::Authenticated, None) => ScreenGroup::AuthFlow(AuthScreen::EmailEntry),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::SessionEvent;
    use crate::test_utils::sample_profile;

    fn seen() -> Session {
        Session::default().apply(SessionEvent::IntroDismissed)
    }

    fn signed_in(role: Role, status: VerificationStatus) -> Session {
        seen().apply(SessionEvent::Revalidated {
            user: Some(sample_profile(role, status)),
        })
    }

    #[test]
    fn test_intro_not_seen_wins_over_everything() {
        let session = Session::default().apply(SessionEvent::Revalidated {
            user: Some(sample_profile(Role::Companion, VerificationStatus::Approved)),
        });
        assert_eq!(screen_group(&session), ScreenGroup::OnboardingSlides);
    }

    #[test]
    fn test_pre_auth_steps_map_to_auth_flow() {
        let idle = seen();
        assert_eq!(
            screen_group(&idle),
            ScreenGroup::AuthFlow(AuthScreen::EmailEntry)
        );

        let email = idle.apply(SessionEvent::EmailEntryStarted);
        assert_eq!(
            screen_group(&email),
            ScreenGroup::AuthFlow(AuthScreen::EmailEntry)
        );

        let otp = email.apply(SessionEvent::CodeRequested {
            email: "a@b.co".to_string(),
        });
        assert_eq!(
            screen_group(&otp),
            ScreenGroup::AuthFlow(AuthScreen::CodeEntry)
        );

        let onboarding = otp.apply(SessionEvent::NewUserVerified);
        assert_eq!(
            screen_group(&onboarding),
            ScreenGroup::AuthFlow(AuthScreen::ProfileSetup)
        );
    }

    #[test]
    fn test_unapproved_users_go_to_verification() {
        for status in [
            VerificationStatus::Unverified,
            VerificationStatus::Pending,
            VerificationStatus::Rejected,
        ] {
            assert_eq!(
                screen_group(&signed_in(Role::Seeker, status)),
                ScreenGroup::Verification(Role::Seeker)
            );
            assert_eq!(
                screen_group(&signed_in(Role::Companion, status)),
                ScreenGroup::Verification(Role::Companion)
            );
        }
    }

    #[test]
    fn test_approved_users_go_to_main() {
        assert_eq!(
            screen_group(&signed_in(Role::Seeker, VerificationStatus::Approved)),
            ScreenGroup::Main(Role::Seeker)
        );
        assert_eq!(
            screen_group(&signed_in(Role::Companion, VerificationStatus::Approved)),
            ScreenGroup::Main(Role::Companion)
        );
    }

    #[test]
    fn test_screen_group_ids() {
        assert_eq!(ScreenGroup::OnboardingSlides.id(), "onboarding-slides");
        assert_eq!(
            ScreenGroup::AuthFlow(AuthScreen::ProfileSetup).id(),
            "auth-flow/profile-setup"
        );
        assert_eq!(
            ScreenGroup::Verification(Role::Companion).to_string(),
            "verification/companion"
        );
        assert_eq!(
            serde_json::to_value(ScreenGroup::Main(Role::Seeker)).unwrap(),
            serde_json::json!("main/seeker")
        );
    }
}
