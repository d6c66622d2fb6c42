// Cache gate.
// Decides between serving the persisted inventory and refreshing it from Cobbler.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::cache::{self, CachePaths};
use crate::cobbler::ProvisioningClient;
use crate::error::Result;

use super::{Inventory, InventoryBuilder};

/// Per-invocation API session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

/// Whether both cache files exist and the detail file is younger than `ttl`.
///
/// A zero TTL is always stale. Missing files make the cache invalid rather
/// than producing an error.
pub fn is_cache_valid(paths: &CachePaths, ttl: Duration, now: DateTime<Utc>) -> bool {
    if ttl.is_zero() || !paths.detail.is_file() {
        return false;
    }
    let Some(elapsed) = cache::age(&paths.detail, now) else {
        return false;
    };
    let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);

    elapsed < ttl && paths.index.is_file()
}

/// Serves the inventory from cache or Cobbler.
///
/// Concurrent invocations are not coordinated: two refreshes racing on the
/// same cache files leave whichever write finished last.
pub struct CacheGate<'s, C> {
    client: C,
    session: &'s Session,
    paths: CachePaths,
    ttl: Duration,
    builder: InventoryBuilder,
    inventory: Inventory,
    refreshes: usize,
}

impl<'s, C: ProvisioningClient> CacheGate<'s, C> {
    pub fn new(
        client: C,
        session: &'s Session,
        paths: CachePaths,
        ttl: Duration,
        builder: InventoryBuilder,
    ) -> Self {
        Self {
            client,
            session,
            paths,
            ttl,
            builder,
            inventory: Inventory::default(),
            refreshes: 0,
        }
    }

    pub fn is_cache_valid(&self) -> bool {
        is_cache_valid(&self.paths, self.ttl, Utc::now())
    }

    /// Populate the in-memory inventory.
    pub async fn open(&mut self, force_refresh: bool) -> Result<()> {
        if force_refresh {
            info!("cache refresh requested");
            self.refresh().await
        } else if !self.is_cache_valid() {
            info!(
                detail = %self.paths.detail.display(),
                max_age = self.ttl.as_secs(),
                "cache missing or stale"
            );
            self.refresh().await
        } else {
            self.load()
        }
    }

    /// Fetch every system, rebuild both structures and persist them.
    pub async fn refresh(&mut self) -> Result<()> {
        let records = self.client.get_systems(self.session.token()).await?;
        let fetched = records.len();
        let inventory = self.builder.build(records);

        cache::write_json(&self.paths.detail, &inventory.hosts)?;
        cache::write_json(&self.paths.index, &inventory.groups)?;

        info!(
            fetched,
            hosts = inventory.hosts.len(),
            groups = inventory.groups.len(),
            "inventory refreshed from Cobbler"
        );
        self.inventory = inventory;
        self.refreshes += 1;
        Ok(())
    }

    /// Load both cache files.
    pub fn load(&mut self) -> Result<()> {
        let groups = cache::read_json(&self.paths.index)?;
        let hosts = cache::read_json(&self.paths.detail)?;
        self.inventory = Inventory { groups, hosts };

        if let Some(age) = cache::age(&self.paths.detail, Utc::now()) {
            debug!(age_secs = age.num_seconds(), "serving inventory from cache");
        }
        Ok(())
    }

    /// Detail for one host, refreshing once if it is not known yet.
    pub async fn lookup_host(&mut self, hostname: &str) -> Result<Option<Map<String, Value>>> {
        if self.inventory.host(hostname).is_none() {
            debug!(hostname, "host not cached, refreshing");
            self.refresh().await?;
        }
        Ok(self.inventory.host(hostname).cloned())
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Number of refreshes performed by this gate.
    pub fn refresh_count(&self) -> usize {
        self.refreshes
    }
}
