//! Amity - session client CLI
//!
#![doc = "Main entry point for the Amity command-line client."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use amity::cli::{Cli, Commands, IntroCommand, ProfileCommand};
use amity::commands;
use amity::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    init_tracing(cli.verbose, cli.json_logs);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    let manager = commands::build_manager(&config)?;
    manager.initialize().await;

    match cli.command {
        Commands::Login { email } => {
            tracing::info!("Starting interactive sign-in");
            commands::login::run_login(&manager, email).await?;
        }
        Commands::Status { json } => {
            commands::status::show_status(&manager, json)?;
        }
        Commands::Profile { command } => match command {
            ProfileCommand::Show { json } => {
                commands::profile::show_profile(&manager, json)?;
            }
            ProfileCommand::Update {
                name,
                age,
                bio,
                location,
                rate,
            } => {
                let update = amity::auth::ProfileUpdate {
                    name,
                    age,
                    bio,
                    location,
                    hourly_rate: rate,
                };
                commands::profile::update_profile(&manager, update).await?;
            }
        },
        Commands::Logout => {
            commands::account::logout(&manager).await;
        }
        Commands::DeleteAccount { yes } => {
            commands::account::delete_account(&manager, yes).await?;
        }
        Commands::Intro { command } => match command {
            IntroCommand::Dismiss => commands::account::dismiss_intro(&manager),
        },
    }

    Ok(())
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so that `--json` output on stdout stays parseable.
fn init_tracing(verbose: bool, json_logs: bool) {
    let default_directive = if verbose { "amity=debug" } else { "amity=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let text_layer =
        (!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    let json_layer = json_logs.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(text_layer)
        .with(json_layer)
        .init();
}
