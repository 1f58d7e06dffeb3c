//! pushgate CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use pushgate_client::cli::{Cli, Command, ConnectionArgs};
use pushgate_client::endpoint::{Endpoint, Service};
use pushgate_client::error::{ClientError, ClientResult};
use pushgate_client::identity::ClientIdentity;
use pushgate_client::session::Session;
use pushgate_client::{dispatch, feedback};
use pushgate_protocol::{Alert, Notification};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.debug {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(Level::WARN.to_string()))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    match cli.command {
        Command::Send {
            connection,
            token,
            alert,
            title,
            badge,
            sound,
            data,
        } => {
            let mut session = open_session(&connection, Service::Gateway)?;

            let custom: serde_json::Map<String, serde_json::Value> = match data {
                Some(ref raw) => serde_json::from_str(raw)
                    .map_err(|e| ClientError::Protocol(e.into()))?,
                None => serde_json::Map::new(),
            };

            let notifications: Vec<Notification> = token
                .into_iter()
                .map(|token| {
                    let mut notification = Notification::new(token);
                    if let Some(ref body) = alert {
                        let mut alert = Alert::new(body.as_str());
                        if let Some(ref title) = title {
                            alert = alert.with_title(title.as_str());
                        }
                        notification = notification.with_alert(alert);
                    }
                    if let Some(badge) = badge {
                        notification = notification.badge(badge);
                    }
                    if let Some(ref sound) = sound {
                        notification = notification.sound(sound.as_str());
                    }
                    notification.custom = custom.clone();
                    notification
                })
                .collect();

            let rejected = dispatch::send(&mut session, &notifications).await;
            if rejected.is_empty() {
                println!("all notifications accepted");
            } else {
                for token in rejected {
                    println!("rejected: {token}");
                }
            }
            Ok(())
        }

        Command::Feedback { connection } => {
            let mut session = open_session(&connection, Service::Feedback)?;

            let records = feedback::read_feedback(&mut session).await?;
            if records.is_empty() {
                println!("no feedback entries");
            } else {
                for record in records {
                    println!("{}\t{}", record.timestamp.to_rfc3339(), record.device_token);
                }
            }
            Ok(())
        }
    }
}

fn open_session(connection: &ConnectionArgs, service: Service) -> ClientResult<Session> {
    let identity =
        ClientIdentity::from_pkcs12_file(&connection.p12, connection.passphrase.as_deref())?;
    let endpoint = Endpoint::new(service, connection.environment());
    Ok(Session::new(endpoint, identity))
}
