//! CLI module - Ansible inventory script interface and request handling

use std::path::PathBuf;

use clap::Parser;

use crate::cobbler::{CobblerClient, ProvisioningClient};
use crate::config::Settings;
use crate::error::{InventoryError, Result};
use crate::inventory::{self, CacheGate, Session};

/// Produce an Ansible inventory from Cobbler.
#[derive(Parser, Debug)]
#[command(name = "cobbler-inventory")]
#[command(
    version,
    about,
    long_about = r#"Produce an Ansible dynamic inventory from the systems defined in Cobbler.

Results are cached on disk and reused until they are older than cache.max_age.
Exactly one JSON document is written to stdout; diagnostics go to stderr.

Examples:
    cobbler-inventory --list
    cobbler-inventory --host web01.example.com
    cobbler-inventory --refresh-cache
"#
)]
pub struct Cli {
    /// List all hosts and groups (default).
    #[arg(long)]
    pub list: bool,

    /// Print all variables about a specific host.
    #[arg(long, value_name = "HOSTNAME")]
    pub host: Option<String>,

    /// Ignore the cache and query Cobbler.
    #[arg(long)]
    pub refresh_cache: bool,

    /// Path to cobbler.toml.
    #[arg(long, env = "COBBLER_INVENTORY_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Session token, overriding cobbler.token.
    #[arg(long, env = "COBBLER_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// What the caller asked to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    List,
    Host(String),
}

impl Cli {
    pub fn request(&self) -> Request {
        match &self.host {
            Some(host) => Request::Host(host.clone()),
            None => Request::List,
        }
    }
}

/// Run one invocation and return the JSON document to print.
pub async fn run(cli: &Cli) -> Result<String> {
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Settings::default_path().ok_or_else(|| InventoryError::ConfigInvalid {
            field: "--config",
            reason: "no platform config directory; pass --config".to_string(),
        })?,
    };

    let mut settings = Settings::load(&config_path)?;
    if let Some(token) = &cli.token {
        settings.cobbler.token = Some(token.clone());
    }

    let session = Session::new(settings.cobbler.token.clone());
    let client = CobblerClient::new(&settings.cobbler.host, settings.timeout())?;
    let gate = CacheGate::new(
        client,
        &session,
        settings.cache_paths()?,
        settings.ttl(),
        settings.builder(),
    );

    serve(
        gate,
        &cli.request(),
        cli.refresh_cache,
        &settings.inventory.hostvars_namespace,
    )
    .await
}

/// Open the cache and render the requested document.
pub async fn serve<C: ProvisioningClient>(
    mut gate: CacheGate<'_, C>,
    request: &Request,
    refresh_cache: bool,
    namespace: &str,
) -> Result<String> {
    gate.open(refresh_cache).await?;

    match request {
        Request::Host(hostname) => {
            let detail = gate.lookup_host(hostname).await?;
            inventory::render_host(detail.as_ref())
        }
        Request::List => inventory::render_inventory(gate.inventory(), namespace),
    }
}
