// Cobbler API module.
// Provides the provisioning client contract, the XML-RPC client and record types.

pub mod client;
pub mod types;
pub mod xmlrpc;

pub use client::CobblerClient;
pub use types::{ClassKey, HostRecord, Interface};

use crate::error::Result;

/// Source of host records.
///
/// The inventory engine needs exactly one remote operation: list every
/// system, optionally authenticated with an already issued session token.
#[allow(async_fn_in_trait)]
pub trait ProvisioningClient {
    async fn get_systems(&mut self, token: Option<&str>) -> Result<Vec<HostRecord>>;
}
