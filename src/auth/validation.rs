//! Client-side input validation
//!
//! Everything here runs before a request is sent. Failures are reported as
//! [`AmityError::Validation`] and never change the session step.

use std::sync::OnceLock;

use regex::Regex;

use crate::auth::types::{ProfileUpdate, Registration, Role};
use crate::error::{AmityError, Result};

const MAX_EMAIL_LEN: usize = 254;
const MIN_AGE: u32 = 18;
const MAX_AGE: u32 = 120;

/// Trims and lower-cases an email address.
///
/// # Examples
///
/// ```
/// use amity::auth::validation::normalize_email;
///
/// assert_eq!(normalize_email("User@Example.com "), "user@example.com");
/// ```
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates an already-normalized email address.
pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() {
        return Err(AmityError::Validation("Email is required".to_string()).into());
    }

    if email.len() > MAX_EMAIL_LEN {
        return Err(AmityError::Validation(format!(
            "Email must be at most {} characters long",
            MAX_EMAIL_LEN
        ))
        .into());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err(AmityError::Validation("Invalid email format".to_string()).into());
    }

    Ok(())
}

/// Validates a one-time code: exactly `length` ASCII digits.
///
/// Surrounding whitespace is tolerated and stripped; the trimmed code is
/// returned.
pub fn validate_code(code: &str, length: usize) -> Result<&str> {
    let code = code.trim();
    if code.len() != length || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AmityError::Validation(format!("Code must be {} digits", length)).into());
    }
    Ok(code)
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AmityError::Validation("Name is required".to_string()).into());
    }
    Ok(())
}

fn validate_age(age: Option<u32>) -> Result<()> {
    match age {
        Some(age) if !(MIN_AGE..=MAX_AGE).contains(&age) => Err(AmityError::Validation(format!(
            "Age must be between {} and {}",
            MIN_AGE, MAX_AGE
        ))
        .into()),
        _ => Ok(()),
    }
}

fn validate_rate(rate: f64) -> Result<()> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(
            AmityError::Validation("Hourly rate must be a positive amount".to_string()).into(),
        );
    }
    Ok(())
}

/// Validates the fields collected during account onboarding.
///
/// Companions must supply a rate. A rate supplied by a seeker is ignored
/// rather than rejected because the request body drops it.
pub fn validate_registration(registration: &Registration) -> Result<()> {
    validate_name(&registration.name)?;
    validate_age(registration.age)?;

    if registration.role == Role::Companion {
        match registration.hourly_rate {
            Some(rate) => validate_rate(rate)?,
            None => {
                return Err(AmityError::Validation(
                    "Companions must set an hourly rate".to_string(),
                )
                .into())
            }
        }
    }

    Ok(())
}

/// Validates a partial profile update for a user with the given role.
///
/// The bio is passed through unmodified; length limits are enforced by the
/// server.
pub fn validate_profile_update(update: &ProfileUpdate, role: Role) -> Result<()> {
    if update.is_empty() {
        return Err(AmityError::Validation("Nothing to update".to_string()).into());
    }

    if let Some(name) = &update.name {
        validate_name(name)?;
    }
    validate_age(update.age)?;

    if let Some(rate) = update.hourly_rate {
        if role != Role::Companion {
            return Err(AmityError::Validation(
                "Only companions can set an hourly rate".to_string(),
            )
            .into());
        }
        validate_rate(rate)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_validation_error;

    #[test]
    fn test_normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  User@Example.COM\n"), "user@example.com");
    }

    #[test]
    fn test_validate_email_accepts_common_addresses() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("first.last+tag@sub.example.co").is_ok());
    }

    #[test]
    fn test_validate_email_rejects_malformed() {
        assert_validation_error(validate_email(""), "Email is required");
        assert_validation_error(validate_email("user@"), "Invalid email format");
        assert_validation_error(validate_email("user example.com"), "Invalid email format");
        assert_validation_error(validate_email("user@example"), "Invalid email format");
    }

    #[test]
    fn test_validate_email_rejects_overlong() {
        let email = format!("{}@example.com", "a".repeat(250));
        assert_validation_error(validate_email(&email), "at most 254");
    }

    #[test]
    fn test_validate_code_accepts_exact_digits() {
        assert_eq!(validate_code("000000", 6).unwrap(), "000000");
        assert_eq!(validate_code(" 123456 ", 6).unwrap(), "123456");
    }

    #[test]
    fn test_validate_code_rejects_wrong_length_or_letters() {
        assert_validation_error(validate_code("12345", 6), "Code must be 6 digits");
        assert_validation_error(validate_code("1234567", 6), "Code must be 6 digits");
        assert_validation_error(validate_code("12a456", 6), "Code must be 6 digits");
        assert_validation_error(validate_code("", 4), "Code must be 4 digits");
    }

    #[test]
    fn test_validate_registration_companion_requires_rate() {
        let registration = Registration::new("Ada", Role::Companion);
        assert_validation_error(validate_registration(&registration), "hourly rate");
    }

    #[test]
    fn test_validate_registration_rejects_non_positive_rate() {
        let mut registration = Registration::new("Ada", Role::Companion);
        registration.hourly_rate = Some(0.0);
        assert_validation_error(validate_registration(&registration), "positive");
        registration.hourly_rate = Some(f64::NAN);
        assert_validation_error(validate_registration(&registration), "positive");
    }

    #[test]
    fn test_validate_registration_seeker_without_rate() {
        let registration = Registration::new("Sam", Role::Seeker);
        assert!(validate_registration(&registration).is_ok());
    }

    #[test]
    fn test_validate_registration_rejects_blank_name_and_minor() {
        assert_validation_error(
            validate_registration(&Registration::new("   ", Role::Seeker)),
            "Name is required",
        );
        let mut registration = Registration::new("Sam", Role::Seeker);
        registration.age = Some(17);
        assert_validation_error(validate_registration(&registration), "Age must be");
    }

    #[test]
    fn test_validate_profile_update_rejects_rate_for_seeker() {
        let update = ProfileUpdate {
            hourly_rate: Some(40.0),
            ..Default::default()
        };
        assert_validation_error(
            validate_profile_update(&update, Role::Seeker),
            "Only companions",
        );
        assert!(validate_profile_update(&update, Role::Companion).is_ok());
    }

    #[test]
    fn test_validate_profile_update_accepts_long_bio() {
        let update = ProfileUpdate {
            bio: Some("x".repeat(1000)),
            ..Default::default()
        };
        assert!(validate_profile_update(&update, Role::Seeker).is_ok());
    }

    #[test]
    fn test_validate_profile_update_rejects_empty() {
        assert_validation_error(
            validate_profile_update(&ProfileUpdate::default(), Role::Seeker),
            "Nothing to update",
        );
    }
}
