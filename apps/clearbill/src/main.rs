use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use client_core::{AuditClient, DocumentView, Dispatched, UserAction};
use shared::domain::DocumentId;
use tokio::sync::oneshot;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod shell;
mod view;

#[derive(Parser, Debug)]
#[command(name = "clearbill", about = "Upload documents for AI extraction and compliance audit")]
struct Args {
    /// Settings file; `clearbill.toml` in the working directory is used when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    api_base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit documents one after another and print the conversation.
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Interactive session with upload, drop and history commands.
    Shell,
    Health,
    /// Fetch a stored document by id.
    Document {
        id: i64,
        #[arg(long)]
        json: bool,
    },
    /// List the audit rules the backend applies.
    Policies {
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = config::load_settings(args.config.as_deref())?;
    if let Some(url) = args.api_base_url {
        settings.api_base_url = config::normalize_api_base_url(&url);
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let client = AuditClient::new(
        &settings.api_base_url,
        Duration::from_secs(settings.request_timeout_secs),
    )?;
    info!(api = %client.backend().base_url(), "clearbill: client ready");

    match args.command {
        Command::Upload { files } => upload_files(&client, files).await,
        Command::Shell => shell::run(&client).await,
        Command::Health => {
            let health = client.backend().health().await?;
            println!("{}: {}", health.status, health.message);
            Ok(())
        }
        Command::Document { id, json } => {
            let record = client.backend().fetch_document(DocumentId(id)).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                print!("{}", DocumentView::from_record(&record));
            }
            Ok(())
        }
        Command::Policies { json } => {
            let policies = client.backend().audit_policies().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&policies)?);
                return Ok(());
            }
            for policy in policies.iter().filter(|p| p.is_active) {
                println!(
                    "[{}] {} ({} {} on {})",
                    policy.severity.label(),
                    policy.rule_name,
                    policy.rule_type,
                    policy.condition,
                    policy.field_name
                );
            }
            Ok(())
        }
    }
}

async fn upload_files(client: &AuditClient, files: Vec<PathBuf>) -> Result<()> {
    let coordinator = client.coordinator();
    let (stop_tx, stop_rx) = oneshot::channel();
    let follower = shell::spawn_follower(
        std::sync::Arc::clone(client.session()),
        coordinator.subscribe(),
        stop_rx,
    );

    let total = files.len();
    let mut pending = Vec::with_capacity(total);
    let mut failed = 0;
    for path in files {
        match coordinator.dispatch(UserAction::FileChosen(path)).await {
            Ok(Dispatched::UploadStarted(handle)) => pending.push(handle),
            Ok(Dispatched::Selected | Dispatched::Ignored) => {}
            Err(e) => {
                eprintln!("error: {e:#}");
                failed += 1;
            }
        }
    }

    for handle in pending {
        if handle.await?.record().is_none() {
            failed += 1;
        }
    }

    let _ = stop_tx.send(());
    let _ = follower.await;

    if failed > 0 {
        bail!("{failed} of {total} uploads failed");
    }
    Ok(())
}
