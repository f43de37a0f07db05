//! Azure Firewall inventory model.

use serde::{Deserialize, Serialize};

/// Represents an Azure Firewall deployed in a VNet or a Virtual-WAN hub.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AzureFirewall {
    /// Full Azure resource ID.
    pub id: String,
    /// Name of the firewall.
    pub name: String,
    /// Firewall SKU tier (Standard / Premium / Basic).
    pub sku_tier: Option<String>,
    /// Threat intelligence mode (Alert / Deny / Off).
    pub threat_intel_mode: Option<String>,
    /// Private IP address of the firewall.
    pub private_ip: Option<String>,
    /// Public IP addresses assigned to the firewall.
    #[serde(default)]
    pub public_ips: Vec<String>,
    /// Whether the firewall is hosted in a VNet or a Virtual-WAN hub.
    #[serde(default)]
    pub deployment: FirewallDeployment,
    /// Name of the hosting VNet or hub.
    pub host_name: Option<String>,
}

/// Deployment model of an Azure Firewall.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirewallDeployment {
    /// Deployed into AzureFirewallSubnet of a VNet.
    #[default]
    Vnet,
    /// Deployed into a Virtual-WAN hub.
    VirtualWan,
}
