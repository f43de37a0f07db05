//! Azure Virtual-WAN hub inventory models.

use serde::{Deserialize, Serialize};

use super::{AzureFirewall, Peering};

/// Represents an Azure Virtual-WAN hub with its connections and peerings.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VirtualWanHub {
    /// Full Azure resource ID.
    pub id: String,
    /// Name of the hub.
    pub name: String,
    /// Azure subscription ID.
    #[serde(default)]
    pub subscription_id: String,
    /// Azure subscription display name.
    #[serde(default)]
    pub subscription_name: String,
    /// Azure region location.
    pub location: String,
    /// Address prefix of the hub.
    pub address_prefix: Option<String>,
    /// Hub routing preference.
    pub routing_preference: Option<String>,
    /// ExpressRoute connections terminated on this hub.
    #[serde(default)]
    pub express_route_connections: Vec<ExpressRouteConnection>,
    /// Site-to-site VPN connections terminated on this hub.
    #[serde(default)]
    pub vpn_connections: Vec<VpnConnection>,
    /// VNet-to-hub peerings, recorded from the hub's perspective.
    #[serde(default)]
    pub peerings: Vec<Peering>,
    /// Firewalls deployed in this hub (if any).
    #[serde(default)]
    pub firewalls: Vec<AzureFirewall>,
}

impl Default for VirtualWanHub {
    fn default() -> Self {
        VirtualWanHub {
            id: "".to_string(),
            name: "blank".to_string(),
            subscription_id: "".to_string(),
            subscription_name: "".to_string(),
            location: "blank".to_string(),
            address_prefix: None,
            routing_preference: None,
            express_route_connections: vec![],
            vpn_connections: vec![],
            peerings: vec![],
            firewalls: vec![],
        }
    }
}

/// An ExpressRoute connection terminated on a Virtual-WAN hub.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ExpressRouteConnection {
    /// Name of the connection.
    pub name: String,
    /// Connection status ("Connected" or other; None when unreported).
    pub status: Option<String>,
    /// The attached circuit object, when the collector could resolve it.
    pub circuit: Option<CircuitReference>,
    /// Explicit circuit name field (may be a placeholder).
    pub circuit_name: Option<String>,
    /// Resource ID of the circuit.
    pub circuit_id: Option<String>,
}

/// Details of an ExpressRoute circuit.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct CircuitReference {
    /// Name of the circuit.
    pub name: Option<String>,
    /// Connectivity provider for the circuit.
    pub provider: Option<String>,
    /// Provider peering location.
    pub peering_location: Option<String>,
    /// Bandwidth in Mbps.
    pub bandwidth_mbps: Option<u32>,
    /// Circuit SKU.
    pub sku: Option<String>,
    /// Peer ASN on the provider side.
    pub peer_asn: Option<u32>,
}

/// A site-to-site VPN connection terminated on a Virtual-WAN hub.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct VpnConnection {
    /// Name of the connection.
    pub name: String,
    /// Connection status ("Connected" or other; None when unreported).
    pub status: Option<String>,
    /// The remote VPN site.
    pub remote_site: Option<RemoteSite>,
}

/// An on-premises VPN site referenced by a hub connection.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RemoteSite {
    /// Name of the site.
    pub name: String,
    /// Address space announced by the site.
    #[serde(default)]
    pub address_space: Vec<String>,
}
