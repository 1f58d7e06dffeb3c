//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::endpoint::Environment;

/// pushgate - push notifications over the legacy APNs binary protocol
#[derive(Debug, Parser)]
#[command(name = "pushgate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Certificate and environment options shared by both commands.
#[derive(Debug, Args)]
pub struct ConnectionArgs {
    /// Path to the PKCS#12 certificate container
    #[arg(long, env = "PUSHGATE_P12")]
    pub p12: PathBuf,

    /// Passphrase for the certificate container
    #[arg(long, env = "PUSHGATE_P12_PASSPHRASE")]
    pub passphrase: Option<String>,

    /// Use the sandbox environment
    #[arg(long)]
    pub sandbox: bool,
}

impl ConnectionArgs {
    /// Returns the push environment selected by the flags.
    pub fn environment(&self) -> Environment {
        if self.sandbox {
            Environment::Sandbox
        } else {
            Environment::Production
        }
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send notifications to the push gateway
    Send {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// Device token, 64 hex characters (can be repeated)
        #[arg(long, action = clap::ArgAction::Append, required = true)]
        token: Vec<String>,

        /// Alert body text
        #[arg(long)]
        alert: Option<String>,

        /// Alert title
        #[arg(long)]
        title: Option<String>,

        /// Badge count to display
        #[arg(long)]
        badge: Option<u32>,

        /// Sound to play on delivery
        #[arg(long)]
        sound: Option<String>,

        /// Custom JSON object merged at the top level of the payload
        #[arg(long)]
        data: Option<String>,
    },

    /// Read the feedback service backlog of dead tokens
    Feedback {
        #[command(flatten)]
        connection: ConnectionArgs,
    },
}
