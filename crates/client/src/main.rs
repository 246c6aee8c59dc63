//! `bookacut-route`: evaluate one navigation the way the client would.
//!
//! Boots the client state for `--host` (session from the session file),
//! resolves the tenant when on a client domain, then prints the route
//! outcome for `--path` as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use bookacut_client::{AppState, ClientConfig, FileStore, HeaderInfo, KeyValueStore};
use bookacut_core::{DomainClass, Host, TenantContext};
use bookacut_routing::RouteOutcome;

#[derive(Debug, Parser)]
#[command(name = "bookacut-route", about = "Evaluate a client navigation for a host")]
struct Args {
    /// Host the client is served from (e.g. abcsalon.com).
    #[arg(long)]
    host: String,

    /// Path to navigate to.
    #[arg(long, default_value = "/")]
    path: String,

    /// Session file; defaults to the per-user data directory.
    #[arg(long)]
    session_file: Option<PathBuf>,
}

#[derive(Serialize)]
struct Report<'a> {
    host: &'a str,
    domain: DomainClass,
    tenant: Option<TenantContext>,
    signed_in: Option<HeaderInfo>,
    #[serde(flatten)]
    outcome: RouteOutcome,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bookacut_observability::init();

    let args = Args::parse();
    let config = ClientConfig::from_env().context("invalid client configuration")?;

    let storage: Arc<dyn KeyValueStore> = match args.session_file {
        Some(path) => Arc::new(FileStore::new(path)),
        None => Arc::new(FileStore::at_default_location().context("no session file location")?),
    };

    let host = Host::new(args.host);
    if !host.is_well_formed() {
        tracing::warn!(%host, "host is malformed; treating it as a client domain");
    }

    let app = AppState::boot(config, host, storage).context("failed to boot client")?;

    if let Err(error) = app.ensure_tenant().await {
        tracing::warn!(%error, "tenant unavailable");
    }

    let report = Report {
        host: app.host().as_str(),
        domain: app.domain(),
        tenant: app.tenant(),
        signed_in: app.header(),
        outcome: app.navigate(&args.path),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
