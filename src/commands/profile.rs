//! Profile commands for Amity
//!
//! This module provides commands for showing the signed-in profile and
//! applying partial updates to it.

use crate::auth::manager::SessionManager;
use crate::auth::types::{Profile, ProfileUpdate, VerificationStatus};
use crate::error::{AmityError, Result};
use colored::Colorize;
use prettytable::{row, Table};

/// Show the cached profile of the signed-in user
///
/// # Arguments
///
/// * `manager` - Initialized session manager
/// * `json` - Print the profile as JSON instead of a table
///
/// # Examples
///
/// ```no_run
/// use amity::commands::{build_manager, profile::show_profile};
/// use amity::config::Config;
///
/// # async fn example() -> anyhow::Result<()> {
/// let manager = build_manager(&Config::default())?;
/// manager.initialize().await;
/// show_profile(&manager, false)?;
/// # Ok(())
/// # }
/// ```
pub fn show_profile(manager: &SessionManager, json: bool) -> Result<()> {
    let Some(profile) = manager.session().user else {
        if json {
            println!("null");
        } else {
            println!("Not signed in");
        }
        return Ok(());
    };

    if json {
        output_profile_json(&profile)
    } else {
        output_profile_table(&profile);
        Ok(())
    }
}

/// Apply a partial profile update and print the result
///
/// # Errors
///
/// Returns the operation's failure after printing it
pub async fn update_profile(manager: &SessionManager, update: ProfileUpdate) -> Result<()> {
    match manager.update_profile(update).await {
        Ok(profile) => {
            println!("{} Profile updated", "✓".green());
            output_profile_table(&profile);
            Ok(())
        }
        Err(failure) => {
            eprintln!("{} {}", "Error:".red().bold(), failure.message);
            Err(failure.into())
        }
    }
}

fn output_profile_json(profile: &Profile) -> Result<()> {
    let json = serde_json::to_string_pretty(profile).map_err(AmityError::Serialization)?;
    println!("{}", json);
    Ok(())
}

fn output_profile_table(profile: &Profile) {
    let mut table = Table::new();
    for (field, value) in profile_rows(profile) {
        table.add_row(row![field, value]);
    }
    table.printstd();
}

/// Field/value pairs shown in the profile table, in display order
fn profile_rows(profile: &Profile) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("Name", profile.name.clone()),
        ("Email", profile.email.clone()),
        ("Role", profile.role.to_string()),
        ("Verification", format_status(profile.verification_status)),
    ];

    if let Some(age) = profile.age {
        rows.push(("Age", age.to_string()));
    }
    if let Some(location) = &profile.location {
        rows.push(("Location", location.clone()));
    }
    if let Some(rate) = profile.hourly_rate {
        rows.push(("Hourly rate", format!("{:.2}", rate)));
    }
    if let Some(bio) = &profile.bio {
        rows.push(("Bio", bio.clone()));
    }

    rows
}

fn format_status(status: VerificationStatus) -> String {
    match status {
        VerificationStatus::Approved => "approved".green().to_string(),
        VerificationStatus::Pending => "pending".yellow().to_string(),
        VerificationStatus::Rejected => "rejected".red().to_string(),
        VerificationStatus::Unverified => "unverified".dimmed().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::types::Role;
    use crate::test_utils::sample_profile;

    #[test]
    fn test_profile_rows_for_companion_include_rate() {
        let profile = sample_profile(Role::Companion, VerificationStatus::Approved);
        let rows = profile_rows(&profile);
        let fields: Vec<_> = rows.iter().map(|(f, _)| *f).collect();
        assert_eq!(
            fields,
            vec!["Name", "Email", "Role", "Verification", "Age", "Location", "Hourly rate"]
        );
        assert!(rows.contains(&("Hourly rate", "75.00".to_string())));
    }

    #[test]
    fn test_profile_rows_for_seeker_omit_rate() {
        let profile = sample_profile(Role::Seeker, VerificationStatus::Pending);
        let rows = profile_rows(&profile);
        assert!(rows.iter().all(|(f, _)| *f != "Hourly rate"));
    }

    #[test]
    fn test_profile_rows_keep_long_bio() {
        let mut profile = sample_profile(Role::Seeker, VerificationStatus::Approved);
        profile.bio = Some("b".repeat(1000));
        let rows = profile_rows(&profile);
        let bio = rows.iter().find(|(f, _)| *f == "Bio").map(|(_, v)| v.len());
        assert_eq!(bio, Some(1000));
    }

    #[test]
    fn test_output_profile_json_returns_ok() {
        let profile = sample_profile(Role::Seeker, VerificationStatus::Approved);
        assert!(output_profile_json(&profile).is_ok());
    }
}
