/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `login`: Interactive email, code, and profile-setup prompts
- `status`: Current sign-in step and screen group
- `profile`: Show or edit the signed-in profile
- `account`: Logout, account deletion, and intro dismissal

Every handler receives an initialized [`SessionManager`]; see
[`build_manager`].
*/

use crate::auth::gateway::HttpAuthGateway;
use crate::auth::manager::SessionManager;
use crate::auth::token_store::{CredentialBackend, KeyringBackend, TokenStore};
use crate::config::{Config, CredentialStoreKind};
use crate::error::{AuthFailure, Result};
use crate::storage::SledStore;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::sync::Arc;

// Profile display and editing
pub mod profile;

/// Wire a [`SessionManager`] from configuration
///
/// The session database always lives under the configured data directory.
/// The credential goes to the OS keyring unless `storage.credential_store`
/// is `file`, in which case it shares the session database.
///
/// # Errors
///
/// Returns error if the data directory cannot be resolved or opened, or the
/// HTTP client cannot be built
pub fn build_manager(config: &Config) -> Result<SessionManager> {
    let data_dir = config.data_dir()?;
    let store = Arc::new(SledStore::open(&data_dir)?);

    let backend: Arc<dyn CredentialBackend> = match config.storage.credential_store {
        CredentialStoreKind::Keyring => {
            Arc::new(KeyringBackend::new(config.storage.keyring_service.clone()))
        }
        CredentialStoreKind::File => store.clone(),
    };
    tracing::debug!(
        "Credential store: {:?}, session database: {}",
        config.storage.credential_store,
        store.path().display()
    );

    let gateway = HttpAuthGateway::new(&config.api)?;

    Ok(SessionManager::new(
        Arc::new(gateway),
        Arc::new(TokenStore::new(backend)),
        store,
    )
    .with_code_length(config.auth.code_length))
}

fn print_failure(failure: &AuthFailure) {
    eprintln!("{} {}", "Error:".red().bold(), failure.message);
}

/// Read one line, returning `None` on Ctrl-C or Ctrl-D.
fn read_line(rl: &mut DefaultEditor, prompt: &str) -> Result<Option<String>> {
    match rl.readline(prompt) {
        Ok(line) => Ok(Some(line.trim().to_string())),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// Sign-in command handler
pub mod login {
    //! Interactive sign-in.
    //!
    //! Walks the session through email entry, code entry, and (for new
    //! accounts) profile setup. Failures are printed and the same prompt is
    //! shown again; Ctrl-C or Ctrl-D cancels.

    use super::*;
    use crate::auth::session::AuthStep;
    use crate::auth::types::{Registration, Role};

    /// Input typed at the code prompt to ask for a new code
    pub const RESEND_KEYWORD: &str = "resend";

    /// Run the interactive sign-in flow
    ///
    /// # Arguments
    ///
    /// * `manager` - Initialized session manager
    /// * `email` - Email to use for the first attempt; prompted for when `None`
    pub async fn run_login(manager: &SessionManager, email: Option<String>) -> Result<()> {
        if let Some(user) = manager.session().user {
            println!("Already signed in as {}", user.email.cyan());
            return Ok(());
        }

        if !manager.session().has_seen_onboarding {
            print_intro();
            manager.dismiss_intro();
        }
        manager.begin_email_entry();

        let mut rl = DefaultEditor::new()?;

        if !request_code(manager, &mut rl, email).await? {
            println!("Cancelled");
            return Ok(());
        }
        if !enter_code(manager, &mut rl).await? {
            println!("Cancelled");
            return Ok(());
        }
        if manager.session().auth_step == AuthStep::Onboarding
            && !set_up_profile(manager, &mut rl).await?
        {
            println!("Cancelled; sign in again to finish setting up your profile");
            return Ok(());
        }

        if let Some(user) = manager.session().user {
            println!("{} Signed in as {}", "✓".green(), user.email.cyan());
        }
        println!("Next: {}", manager.screen_group());
        Ok(())
    }

    fn print_intro() {
        println!("{}", "Welcome to Amity".bold());
        println!("Book time with verified companions, or offer your own.");
        println!();
    }

    async fn request_code(
        manager: &SessionManager,
        rl: &mut DefaultEditor,
        mut email: Option<String>,
    ) -> Result<bool> {
        loop {
            let candidate = match email.take() {
                Some(email) => email,
                None => match read_line(rl, "Email: ")? {
                    Some(line) => line,
                    None => return Ok(false),
                },
            };

            match manager.request_code(&candidate).await {
                Ok(()) => {
                    if let Some(pending) = manager.session().pending_email {
                        println!("Code sent to {}", pending.cyan());
                    }
                    return Ok(true);
                }
                Err(failure) => print_failure(&failure),
            }
        }
    }

    async fn enter_code(manager: &SessionManager, rl: &mut DefaultEditor) -> Result<bool> {
        let prompt = format!("Code (or '{}'): ", RESEND_KEYWORD);
        loop {
            let Some(input) = read_line(rl, &prompt)? else {
                return Ok(false);
            };

            if input.eq_ignore_ascii_case(RESEND_KEYWORD) {
                match manager.resend_code().await {
                    Ok(()) => println!("A new code is on its way"),
                    Err(failure) => print_failure(&failure),
                }
                continue;
            }

            match manager.verify_code(&input).await {
                Ok(()) => return Ok(true),
                Err(failure) => print_failure(&failure),
            }
        }
    }

    async fn set_up_profile(manager: &SessionManager, rl: &mut DefaultEditor) -> Result<bool> {
        println!();
        println!("{}", "Set up your profile".bold());

        loop {
            let Some(registration) = prompt_registration(rl)? else {
                return Ok(false);
            };
            match manager.complete_onboarding(registration).await {
                Ok(_) => return Ok(true),
                Err(failure) => print_failure(&failure),
            }
        }
    }

    fn prompt_registration(rl: &mut DefaultEditor) -> Result<Option<Registration>> {
        let Some(name) = read_line(rl, "Name: ")? else {
            return Ok(None);
        };

        let role = loop {
            let Some(input) = read_line(rl, "Role (seeker/companion): ")? else {
                return Ok(None);
            };
            match input.parse::<Role>() {
                Ok(role) => break role,
                Err(e) => eprintln!("{}", e.red()),
            }
        };

        let mut registration = Registration::new(name, role);

        registration.age = loop {
            let Some(input) = read_line(rl, "Age (optional): ")? else {
                return Ok(None);
            };
            if input.is_empty() {
                break None;
            }
            match input.parse::<u32>() {
                Ok(age) => break Some(age),
                Err(_) => eprintln!("{}", "Age must be a whole number".red()),
            }
        };

        let Some(location) = read_line(rl, "Location (optional): ")? else {
            return Ok(None);
        };
        registration.location = (!location.is_empty()).then_some(location);

        let Some(bio) = read_line(rl, "Bio (optional): ")? else {
            return Ok(None);
        };
        registration.bio = (!bio.is_empty()).then_some(bio);

        if role == Role::Companion {
            registration.hourly_rate = loop {
                let Some(input) = read_line(rl, "Hourly rate: ")? else {
                    return Ok(None);
                };
                match input.parse::<f64>() {
                    Ok(rate) => break Some(rate),
                    Err(_) => eprintln!("{}", "Hourly rate must be a number".red()),
                }
            };
        }

        Ok(Some(registration))
    }
}

// Status command handler
pub mod status {
    use super::*;

    /// Print the current sign-in step and screen group
    ///
    /// # Arguments
    ///
    /// * `manager` - Initialized session manager
    /// * `json` - Print a JSON object instead of text
    pub fn show_status(manager: &SessionManager, json: bool) -> Result<()> {
        let session = manager.session();
        let screen = manager.screen_group();

        if json {
            let value = serde_json::json!({
                "authStep": session.auth_step,
                "screenGroup": screen,
                "pendingEmail": session.pending_email,
                "email": session.user.as_ref().map(|u| u.email.clone()),
                "hasSeenOnboarding": session.has_seen_onboarding,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
            return Ok(());
        }

        println!("Step:   {}", session.auth_step.to_string().cyan());
        println!("Screen: {}", screen.to_string().cyan());
        match &session.user {
            Some(user) => println!("User:   {} ({})", user.email, user.role),
            None => println!("User:   {}", "not signed in".dimmed()),
        }
        Ok(())
    }
}

// Account-level command handlers
pub mod account {
    use super::*;

    /// Sign out; always succeeds locally
    pub async fn logout(manager: &SessionManager) {
        let was_signed_in = manager.session().is_authenticated;
        manager.logout().await;
        if was_signed_in {
            println!("Signed out");
        } else {
            println!("Not signed in; local session cleared");
        }
    }

    /// Delete the account after confirmation
    ///
    /// # Arguments
    ///
    /// * `manager` - Initialized session manager
    /// * `yes` - Skip the confirmation prompt
    pub async fn delete_account(manager: &SessionManager, yes: bool) -> Result<()> {
        let Some(user) = manager.session().user else {
            println!("Not signed in");
            return Ok(());
        };

        if !yes {
            println!(
                "{} This permanently deletes {} and cannot be undone.",
                "Warning:".yellow().bold(),
                user.email
            );
            let mut rl = DefaultEditor::new()?;
            let confirmed = read_line(&mut rl, "Type DELETE to confirm: ")?;
            if confirmed.as_deref() != Some("DELETE") {
                println!("Cancelled");
                return Ok(());
            }
        }

        manager.delete_account().await.map_err(|failure| {
            print_failure(&failure);
            failure
        })?;
        println!("Account deleted");
        Ok(())
    }

    /// Mark the introductory slides as seen
    pub fn dismiss_intro(manager: &SessionManager) {
        manager.dismiss_intro();
        println!("Next: {}", manager.screen_group());
    }

}
