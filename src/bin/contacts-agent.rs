use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use contacts_agent::auth::build_authorization_url;
use contacts_agent::config::endpoints::Endpoints;
use contacts_agent::observability::metrics::get_metrics;
use contacts_agent::utils::constants::DEFAULT_CONFIG_PATH;
use contacts_agent::utils::logging::LogLevel;
use contacts_agent::utils::{config_loader, logging};
use contacts_agent::{ContactList, ContactsClient, PhotoRef, ServiceConfig, Session};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// Print collected metrics to stderr before exiting (needs metrics.is_enabled)
    #[arg(long)]
    print_metrics: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the url a user visits to grant access to their contacts
    AuthUrl {
        /// Where the service sends the user back with a token
        #[arg(long)]
        next: String,
        #[arg(long)]
        secure: bool,
        /// Ask for a single-use token instead of one that can be upgraded
        #[arg(long)]
        no_session: bool,
        /// Hosted domain
        #[arg(long)]
        domain: Option<String>,
    },
    /// Fetch the contacts of one or more accounts
    Fetch {
        #[arg(long, env = "AUTHSUB_TOKEN")]
        token: String,
        /// The token is already a session token
        #[arg(long)]
        session_token: bool,
        /// Keep the session token alive after fetching
        #[arg(long)]
        no_revoke: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Compact)]
        format: OutputFormat,
        #[arg(required = true)]
        accounts: Vec<String>,
    },
    /// Download a contact photo
    Photo {
        #[arg(long, env = "AUTHSUB_TOKEN")]
        token: String,
        #[arg(long)]
        session_token: bool,
        #[arg(long)]
        url: String,
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Compact,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Read args, load YAML config
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config)?;
    logging::run(&service_config, args.log_level);

    // -------------------------------
    // 2. Run the command
    // -------------------------------

    let result = match args.command {
        Command::AuthUrl { next, secure, no_session, domain } => {
            let endpoints = Endpoints::from_config(&service_config.settings.service());
            println!("{}", build_authorization_url(&endpoints, &next, secure, !no_session, domain.as_deref()));
            Ok(())
        }
        Command::Fetch { token, session_token, no_revoke, format, accounts } => {
            fetch(&service_config, Session::new(token, session_token), !no_revoke, format, &accounts).await
        }
        Command::Photo { token, session_token, url, out } => {
            photo(&service_config, Session::new(token, session_token), &url, &out).await
        }
    };

    // -------------------------------
    // 3. Metrics
    // -------------------------------

    if args.print_metrics && service_config.settings.metrics_enabled() {
        eprint!("{}", get_metrics().gather_text()?);
    }
    result
}

async fn fetch(
    service_config: &ServiceConfig,
    session: Session,
    revoke: bool,
    format: OutputFormat,
    accounts: &[String],
) -> Result<()> {
    let mut client = ContactsClient::from_config(service_config, session)?;
    let mut contacts = ContactList::new();

    // one list for every account, the token is released once at the end
    client
        .fetch_accounts(accounts, revoke, &mut contacts)
        .await
        .with_context(|| format!("fetching contacts of {}", accounts.join(", ")))?;
    info!("{} contacts fetched from {} accounts", contacts.len(), accounts.len());

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&contacts)?),
        OutputFormat::Compact => {
            for contact in &contacts {
                println!("{} <{}>", contact.title, contact.primary_email());
            }
        }
    }

    if !revoke && client.token_manager().is_session() {
        eprintln!("session token: {}", client.token_manager().token());
    }
    Ok(())
}

async fn photo(service_config: &ServiceConfig, session: Session, url: &str, out: &Path) -> Result<()> {
    let client = ContactsClient::from_config(service_config, session)?;
    let bytes = client.fetch_photo(PhotoRef::Url(url)).await?;
    tokio::fs::write(out, &bytes)
        .await
        .with_context(|| format!("writing photo to {}", out.display()))?;
    info!("photo saved to {} ({} bytes)", out.display(), bytes.len());
    Ok(())
}
