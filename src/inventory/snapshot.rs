//! Inventory snapshot record.

use serde::{Deserialize, Serialize};

use crate::models::{AzureFirewall, VirtualWanHub, Vnet};

/// One collected inventory snapshot: the complete per-subscription record
/// set the engine operates on.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Inventory {
    /// Virtual networks, in collection order.
    #[serde(default)]
    pub vnets: Vec<Vnet>,
    /// Virtual-WAN hubs, in collection order.
    #[serde(default)]
    pub hubs: Vec<VirtualWanHub>,
    /// Firewalls reported outside a VNet or hub record.
    #[serde(default)]
    pub firewalls: Vec<AzureFirewall>,
    /// Timestamp the collector stamped on the snapshot.
    #[serde(default)]
    pub collected_at: Option<String>,
}

impl Inventory {
    /// Total record count across all top-level sequences.
    pub fn record_count(&self) -> usize {
        self.vnets.len() + self.hubs.len() + self.firewalls.len()
    }
}
