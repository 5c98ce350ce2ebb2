//! Command-line interface definition for Amity
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for signing in, inspecting the session, and
//! editing the profile.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Amity - session client for the Amity dating and booking API
#[derive(Parser, Debug, Clone)]
#[command(name = "amity")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Override the API base URL from config
    #[arg(long)]
    pub api_base_url: Option<String>,

    /// Override the directory holding the session database
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Amity
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Sign in or sign up with a one-time code sent by email
    Login {
        /// Email address; prompted for when omitted
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Show the current session step and screen group
    Status {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Inspect or edit the signed-in profile
    Profile {
        /// Profile subcommand
        #[command(subcommand)]
        command: ProfileCommand,
    },

    /// Sign out and forget the stored credential
    Logout,

    /// Permanently delete the account
    DeleteAccount {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Introductory slides
    Intro {
        /// Intro subcommand
        #[command(subcommand)]
        command: IntroCommand,
    },
}

/// Profile subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ProfileCommand {
    /// Show the cached profile
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Update one or more profile fields
    Update {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        age: Option<u32>,

        #[arg(long)]
        bio: Option<String>,

        #[arg(long)]
        location: Option<String>,

        /// Hourly rate (companions only)
        #[arg(long)]
        rate: Option<f64>,
    },
}

/// Intro subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum IntroCommand {
    /// Mark the introductory slides as seen
    Dismiss,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
