/*
    createsend-card-rs | Campaign Monitor membership cards for contact lookups.
    Copyright (C) 2025  Israel Alberto Roldan Vega

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use chrono::Utc;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use log::debug;
use membership_core::{
    CreatesendClient, MembershipLookup, MembershipRecord, Metadata, OAuthClient, Settings,
    Summarizer, Summary,
};
use std::fs::{self, File};
use std::io::Write;
use std::process;

#[derive(Parser)]
#[command(name = "createsend-card")]
#[command(about = "Check whether an email address is on any of your Campaign Monitor lists", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prints the integration descriptor shown in the catalog
    Metadata,
    /// Prints the URL that starts the OAuth flow
    AuthUrl {
        /// Opaque value echoed back on the redirect
        #[arg(long)]
        state: String,
    },
    /// Exchanges an authorization code for tokens
    Exchange {
        /// The `code` query parameter from the OAuth redirect
        #[arg(value_name = "CODE")]
        code: String,
    },
    /// Gets a new access token from a refresh token
    Refresh {
        #[arg(value_name = "REFRESH_TOKEN")]
        refresh_token: String,
    },
    /// Shows the account the access token belongs to
    Account {
        /// OAuth access token
        #[arg(long, env = "CREATESEND_ACCESS_TOKEN")]
        token: String,
    },
    /// Builds the membership card for an email address
    Lookup {
        #[arg(value_name = "EMAIL")]
        email: String,
        /// OAuth access token
        #[arg(long, env = "CREATESEND_ACCESS_TOKEN")]
        token: String,
        /// Leave out the "Added ... ago." prefix
        #[arg(long)]
        no_recency: bool,
        /// Also write the card to a JSON file (e.g., --json=card.json)
        #[arg(long)]
        json: Option<String>,
    },
    /// Builds a card offline from a JSON array of memberships
    Summarize {
        /// File in the `listsforemail.json` response format
        #[arg(value_name = "FILE")]
        file: String,
        /// Leave out the "Added ... ago." prefix
        #[arg(long)]
        no_recency: bool,
    },
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if dotenv().is_err() {
        // Silently ignore
    }

    let cli = Cli::parse();

    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("[ERROR] {}", e);
            process::exit(1);
        }
    };

    let result = match &cli.command {
        Commands::Metadata => handle_metadata(),
        Commands::AuthUrl { state } => handle_auth_url(&settings, state),
        Commands::Exchange { code } => handle_exchange(&settings, code).await,
        Commands::Refresh { refresh_token } => handle_refresh(&settings, refresh_token).await,
        Commands::Account { token } => handle_account(&settings, token).await,
        Commands::Lookup {
            email,
            token,
            no_recency,
            json,
        } => handle_lookup(&settings, email, token, *no_recency, json.as_deref()).await,
        Commands::Summarize { file, no_recency } => {
            handle_summarize(&settings, file, *no_recency)
        }
    };

    if let Err(e) = result {
        eprintln!();
        eprintln!("[ERROR] {:#}", e);
        process::exit(1);
    }
}

fn summarizer(settings: &Settings, no_recency: bool) -> Summarizer {
    Summarizer::new(settings.include_recency_preamble && !no_recency)
}

fn oauth_client(settings: &Settings) -> anyhow::Result<OAuthClient> {
    let config = settings.require_oauth()?.clone();
    Ok(OAuthClient::new(config, settings.endpoints.clone())?)
}

fn lookup(
    settings: &Settings,
    token: &str,
    no_recency: bool,
) -> anyhow::Result<MembershipLookup<CreatesendClient>> {
    let client = CreatesendClient::new(token, &settings.endpoints)?;
    Ok(MembershipLookup::new(client, summarizer(settings, no_recency)))
}

fn handle_metadata() -> anyhow::Result<()> {
    let meta = Metadata::campaign_monitor();
    println!("{}", serde_json::to_string_pretty(&meta)?);
    Ok(())
}

fn handle_auth_url(settings: &Settings, state: &str) -> anyhow::Result<()> {
    let url = oauth_client(settings)?.authorize_url(state)?;
    println!("Open this URL in your browser to connect Campaign Monitor:");
    println!();
    println!("{}", url);
    Ok(())
}

async fn handle_exchange(settings: &Settings, code: &str) -> anyhow::Result<()> {
    let tokens = oauth_client(settings)?.exchange_code(code).await?;
    println!("{}", serde_json::to_string_pretty(&tokens)?);
    Ok(())
}

async fn handle_refresh(settings: &Settings, refresh_token: &str) -> anyhow::Result<()> {
    let tokens = oauth_client(settings)?.refresh(refresh_token).await?;
    println!("{}", serde_json::to_string_pretty(&tokens)?);
    Ok(())
}

async fn handle_account(settings: &Settings, token: &str) -> anyhow::Result<()> {
    let account = lookup(settings, token, false)?.account().await?;
    println!("Login:   {}", account.login_name);
    println!("Console: {}", account.account_url);
    Ok(())
}

async fn handle_lookup(
    settings: &Settings,
    email: &str,
    token: &str,
    no_recency: bool,
    json_path: Option<&str>,
) -> anyhow::Result<()> {
    println!("Looking up {} ...", email);
    let summary = lookup(settings, token, no_recency)?
        .fetch(email, Utc::now())
        .await?;

    print_card(&summary);

    if let Some(path) = json_path {
        let mut file = File::create(path)?;
        file.write_all(serde_json::to_string_pretty(&summary)?.as_bytes())?;
        println!();
        println!("[SAVED] Card saved to: {}", path);
    }
    Ok(())
}

fn handle_summarize(settings: &Settings, path: &str, no_recency: bool) -> anyhow::Result<()> {
    let raw = fs::read_to_string(path)?;
    let memberships: Vec<MembershipRecord> = serde_json::from_str(&raw)?;
    debug!("Read {} memberships from {}", memberships.len(), path);

    let summary = summarizer(settings, no_recency).summarize(&memberships, Utc::now());
    print_card(&summary);
    Ok(())
}

fn print_card(summary: &Summary) {
    println!();
    println!("---------------------------------------------------");
    println!("CAMPAIGN MONITOR");
    println!("---------------------------------------------------");
    println!("{}", summary.text.trim_end());
    println!("---------------------------------------------------");
}
