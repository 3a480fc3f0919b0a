//! jamfsync - keep each Jamf Pro device's site mirrored into an extension attribute.
//!
//! Lists computers and mobile devices, compares every device's site with the
//! "Jamf Site" extension attribute, and pushes an update where they differ.

mod prompt;
mod report;

use std::io;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use jamfsync_core::api::{Categories, Computers, MobileDevices, UpdatableResource};
use jamfsync_core::auth::CredentialStore;
use jamfsync_core::config::{AuthMethod, Config};
use jamfsync_core::models::{DeviceDetail, ListEntry};
use jamfsync_core::reconcile::{reconcile_entries, Tally};
use jamfsync_core::{JamfClient, Session};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use prompt::InteractiveCredentials;

#[derive(Parser)]
#[command(name = "jamfsync", version, about)]
struct Cli {
    /// Jamf Pro server URL, e.g. https://example.jamfcloud.com
    #[arg(long, global = true)]
    server: Option<String>,

    /// Authenticate with an API client id/secret instead of a username/password
    #[arg(long, global = true)]
    oauth: bool,

    /// Username, or client id with --oauth
    #[arg(long, global = true)]
    account: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Mirror each device's site into the site extension attribute (default)
    SetSite {
        /// Only reconcile one resource type
        #[arg(long, value_enum)]
        only: Option<Target>,
    },
    /// List categories
    Categories,
    /// Remove the stored secret from the keychain
    Forget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Target {
    Computers,
    MobileDevices,
}

/// Initialize the tracing subscriber for logging
fn init_tracing(verbose: bool) {
    // RUST_LOG wins; otherwise warn, or debug with --verbose
    let default = if verbose { "jamfsync_core=debug,jamfsync=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when the run completed but some records failed.
async fn run(cli: Cli) -> Result<bool> {
    let config = Config::load()?;
    let method = cli.oauth.then_some(AuthMethod::OAuth);

    match cli.command.unwrap_or(Command::SetSite { only: None }) {
        Command::Forget => {
            forget(&config, cli.server, cli.account)?;
            Ok(true)
        }
        Command::Categories => {
            let mut client = connect(config, cli.server, cli.account, method)?;
            let result = list_categories(&mut client).await;
            client.logout().await;
            result.map(|()| true)
        }
        Command::SetSite { only } => {
            let attribute = config.site_attribute().to_string();
            let mut client = connect(config, cli.server, cli.account, method)?;

            println!("Attempting to get an auth token from the Jamf server");
            client
                .ensure_authenticated()
                .await
                .context("Unable to get token")?;

            let mut clean = true;
            if only != Some(Target::MobileDevices) {
                clean &= set_site::<Computers>(&mut client, &attribute).await;
            }
            if only != Some(Target::Computers) {
                clean &= set_site::<MobileDevices>(&mut client, &attribute).await;
            }

            client.logout().await;
            Ok(clean)
        }
    }
}

fn connect(
    config: Config,
    server: Option<String>,
    account: Option<String>,
    method: Option<AuthMethod>,
) -> Result<JamfClient> {
    let timeout = config.request_timeout();
    let provider = InteractiveCredentials::new(config, server, account, method);
    Ok(JamfClient::with_timeout(
        Session::with_provider(provider),
        timeout,
    )?)
}

/// Reconcile one resource type, printing a header, a line per record and a tally.
/// Returns false if listing failed or any record failed.
async fn set_site<R>(client: &mut JamfClient, attribute: &str) -> bool
where
    R: UpdatableResource<Entry = ListEntry, Detail = DeviceDetail>,
{
    let entries = match client.list_all::<R>().await {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Unable to list {}: {}", R::LABEL, e);
            return false;
        }
    };
    println!("{}", report::header_line(entries.len(), R::LABEL));

    let reports = reconcile_entries::<R>(client, attribute, entries, |index, count, record| {
        println!("{}", report::record_line(index, count, record));
    })
    .await;

    let tally = Tally::from_reports(&reports);
    println!("{}", report::tally_line(R::LABEL, &tally));
    tally.failed == 0
}

async fn list_categories(client: &mut JamfClient) -> Result<()> {
    let categories = client.list_all::<Categories>().await?;
    info!(count = categories.len(), "Fetched categories");

    println!("Found {} categories", categories.len());
    for category in categories {
        println!("{}\t{}\t{}", category.id, category.priority, category.name);
    }
    Ok(())
}

fn forget(config: &Config, server: Option<String>, account: Option<String>) -> Result<()> {
    let server = server
        .or_else(|| config.server.clone())
        .ok_or_else(|| anyhow!("No server given and none saved in config"))?;
    let account = account
        .or_else(|| config.account.clone())
        .ok_or_else(|| anyhow!("No account given and none saved in config"))?;

    CredentialStore::delete(&account, &server)?;
    println!("Removed stored secret for {} on {}", account, server);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_set_site() {
        let cli = Cli::try_parse_from(["jamfsync"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.oauth);
    }

    #[test]
    fn test_set_site_only_mobile() {
        let cli = Cli::try_parse_from(["jamfsync", "set-site", "--only", "mobile-devices"]).unwrap();
        match cli.command {
            Some(Command::SetSite { only }) => assert_eq!(only, Some(Target::MobileDevices)),
            _ => panic!("expected set-site"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "jamfsync",
            "categories",
            "--oauth",
            "--server",
            "https://example.jamfcloud.com",
        ])
        .unwrap();
        assert!(cli.oauth);
        assert_eq!(cli.server.as_deref(), Some("https://example.jamfcloud.com"));
        assert!(matches!(cli.command, Some(Command::Categories)));
    }

    #[test]
    fn test_rejects_unknown_target() {
        assert!(Cli::try_parse_from(["jamfsync", "set-site", "--only", "printers"]).is_err());
    }
}
