//! `TripLedger` - extract travel itineraries from stored email.
//!
//! Reads messages from a local mail store, runs them through the configured
//! extraction engine and prints the resulting itinerary as JSON.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tripledger_core::{
    Account, AccountId, CacheBackend, ItineraryService, LocalMailStore, Settings,
};

/// Command line interface.
#[derive(Debug, Parser)]
#[command(name = "tripledger", version, about = "Extract travel itineraries from email")]
struct Cli {
    /// Settings file (defaults to the user configuration directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Root of the local mail store, overriding the settings file.
    #[arg(long, global = true)]
    mail_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract the itinerary of one message.
    Extract {
        /// Account identifier.
        #[arg(long)]
        account: i64,
        /// Mailbox holding the message.
        #[arg(long, default_value = "INBOX")]
        mailbox: String,
        /// Message UID.
        #[arg(long)]
        uid: u32,
        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },
    /// Remove expired entries from the `SQLite` cache.
    PurgeCache,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the itinerary JSON, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tripledger=info,tripledger_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings_path = cli.config.clone().unwrap_or_else(Settings::default_path);
    let mut settings = Settings::load(&settings_path)
        .await
        .with_context(|| format!("loading settings from {}", settings_path.display()))?;
    if let Some(root) = cli.mail_root {
        settings.mail_root = Some(root);
    }

    match cli.command {
        Command::Extract {
            account,
            mailbox,
            uid,
            pretty,
        } => extract(&settings, AccountId(account), &mailbox, uid, pretty).await,
        Command::PurgeCache => purge_cache(&settings).await,
    }
}

/// Extract one message and print its itinerary.
async fn extract(
    settings: &Settings,
    account: AccountId,
    mailbox: &str,
    uid: u32,
    pretty: bool,
) -> anyhow::Result<()> {
    let Some(root) = settings.mail_root.clone() else {
        bail!("No mail store configured; pass --mail-root or set mail_root in the settings");
    };

    let store = LocalMailStore::new(root);
    let cache = settings.cache.open().await.context("opening itinerary cache")?;
    let service = ItineraryService::new(store.clone(), store, settings.extractor.build(), cache)
        .with_options(settings.service_options());

    let itinerary = service
        .extract(&Account::with_id(account), mailbox, uid)
        .await
        .with_context(|| format!("extracting message {uid} in {mailbox}"))?;
    info!(%account, mailbox, uid, entries = itinerary.len(), "Extraction finished");

    let output = if pretty {
        serde_json::to_string_pretty(&itinerary)?
    } else {
        itinerary.to_json()
    };
    println!("{output}");
    Ok(())
}

/// Purge expired cache entries.
async fn purge_cache(settings: &Settings) -> anyhow::Result<()> {
    if settings.cache.backend != CacheBackend::Sqlite {
        info!("Cache backend is not persistent, nothing to purge");
        return Ok(());
    }

    let cache = settings
        .cache
        .open_sqlite()
        .await
        .context("opening itinerary cache")?;
    let removed = cache.purge_expired().await?;
    info!(removed, "Purged expired itinerary cache entries");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_extract() {
        let cli = Cli::try_parse_from([
            "tripledger",
            "--mail-root",
            "/srv/mail",
            "extract",
            "--account",
            "42",
            "--uid",
            "7",
        ])
        .unwrap();

        assert_eq!(cli.mail_root, Some(PathBuf::from("/srv/mail")));
        match cli.command {
            Command::Extract {
                account,
                mailbox,
                uid,
                pretty,
            } => {
                assert_eq!(account, 42);
                assert_eq!(mailbox, "INBOX");
                assert_eq!(uid, 7);
                assert!(!pretty);
            }
            Command::PurgeCache => panic!("expected extract"),
        }
    }

    #[test]
    fn test_uid_is_required() {
        assert!(Cli::try_parse_from(["tripledger", "extract", "--account", "1"]).is_err());
    }

    #[test]
    fn test_parse_purge_cache() {
        let cli = Cli::try_parse_from(["tripledger", "purge-cache", "--config", "/tmp/s.json"])
            .unwrap();
        assert!(matches!(cli.command, Command::PurgeCache));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/s.json")));
    }
}
