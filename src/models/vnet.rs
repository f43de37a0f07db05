//! Azure Virtual Network (VNet) inventory models.

use serde::{Deserialize, Serialize};

use super::{AzureFirewall, NsgRisk};

/// Represents an Azure Virtual Network with its subnets, gateways and peerings.
///
/// Owned by the subscription that reported it; immutable once ingested.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Vnet {
    /// Full Azure resource ID.
    pub id: String,
    /// Name of the virtual network.
    pub name: String,
    /// Azure subscription ID.
    pub subscription_id: String,
    /// Azure subscription display name.
    pub subscription_name: String,
    /// Azure region location.
    pub location: String,
    /// CIDR blocks of the virtual network.
    #[serde(default)]
    pub address_space: Vec<String>,
    /// Subnets within this VNet.
    #[serde(default)]
    pub subnets: Vec<Subnet>,
    /// Virtual network gateways deployed in this VNet.
    #[serde(default)]
    pub gateways: Vec<Gateway>,
    /// Peerings reported from this VNet's side.
    #[serde(default)]
    pub peerings: Vec<Peering>,
    /// Firewalls deployed in this VNet (if any).
    #[serde(default)]
    pub firewalls: Vec<AzureFirewall>,
}

impl Default for Vnet {
    fn default() -> Self {
        Vnet {
            id: "".to_string(),
            name: "blank".to_string(),
            subscription_id: "blank".to_string(),
            subscription_name: "blank".to_string(),
            location: "blank".to_string(),
            address_space: vec![],
            subnets: vec![],
            gateways: vec![],
            peerings: vec![],
            firewalls: vec![],
        }
    }
}

/// Represents an Azure subnet with its NSG binding and risk findings.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Subnet {
    /// Name of the subnet.
    pub name: String,
    /// CIDR block of the subnet (None if not configured).
    pub address_prefix: Option<String>,
    /// Network Security Group resource ID (if attached).
    pub nsg_id: Option<String>,
    /// Network Security Group display name (if attached).
    pub nsg_name: Option<String>,
    /// Risk findings for this subnet's NSG rules, produced by the NSG analyzer.
    #[serde(default)]
    pub nsg_risks: Vec<NsgRisk>,
    /// Devices (NIC owners) connected to this subnet.
    #[serde(default)]
    pub connected_devices: Vec<ConnectedDevice>,
    /// Route table name (if attached).
    pub route_table: Option<String>,
    /// Service endpoints enabled on this subnet.
    pub service_endpoints: Option<ServiceEndpoints>,
}

impl Subnet {
    /// Number of service endpoints enabled on this subnet.
    pub fn service_endpoint_count(&self) -> usize {
        self.service_endpoints
            .as_ref()
            .map_or(0, ServiceEndpoints::count)
    }
}

/// Service endpoints arrive in two wire shapes: a proper JSON list, or a
/// single comma-delimited string. Collapsed here once at ingestion; callers
/// only ever use [`ServiceEndpoints::names`] / [`ServiceEndpoints::count`].
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum ServiceEndpoints {
    /// Pre-parsed list of endpoint service names.
    List(Vec<String>),
    /// Raw comma-delimited endpoint string.
    Raw(String),
}

impl ServiceEndpoints {
    /// Endpoint service names, trimmed, with empty segments dropped.
    pub fn names(&self) -> Vec<String> {
        match self {
            ServiceEndpoints::List(names) => names
                .iter()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect(),
            ServiceEndpoints::Raw(raw) => raw
                .split(',')
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    /// Number of non-empty endpoint names.
    pub fn count(&self) -> usize {
        self.names().len()
    }
}

/// A device (NIC owner) attached to a subnet.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ConnectedDevice {
    /// Display name of the device.
    pub name: String,
    /// Resource type of the device.
    pub device_type: Option<String>,
    /// Private IP address assigned to the device.
    pub ip_address: Option<String>,
}

/// A VNet peering, reported once per side.
///
/// Two VNets peered to each other each carry their own record referencing
/// the other; the graph builder collapses the pair to a single edge.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Peering {
    /// Name of the peering resource.
    pub name: String,
    /// Name of the remote VNet or Virtual-WAN hub.
    pub remote_network: String,
    /// Resource ID of the remote hub, when the remote side is a hub.
    pub remote_hub_id: Option<String>,
    /// Peering state ("Connected" or other).
    pub state: Option<String>,
    /// This side routes through the remote side's gateway.
    #[serde(default)]
    pub use_remote_gateways: bool,
    /// The remote side may route through this side's gateway.
    #[serde(default)]
    pub allow_gateway_transit: bool,
    /// The remote side is a Virtual-WAN hub.
    #[serde(default)]
    pub is_virtual_wan_hub: bool,
}

/// A virtual network gateway (VPN or ExpressRoute).
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Gateway {
    /// Full Azure resource ID.
    pub id: String,
    /// Name of the gateway.
    pub name: String,
    /// Gateway type, e.g. "Vpn" or "ExpressRoute".
    pub gateway_type: String,
    /// Gateway SKU name.
    pub sku: Option<String>,
    /// VPN type (route-based / policy-based).
    pub vpn_type: Option<String>,
    /// Connections terminated on this gateway.
    #[serde(default)]
    pub connections: Vec<GatewayConnection>,
}

impl Gateway {
    /// True when this gateway terminates ExpressRoute circuits.
    pub fn is_express_route(&self) -> bool {
        self.gateway_type.eq_ignore_ascii_case("ExpressRoute")
    }
}

/// A connection terminated on a classic virtual network gateway.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct GatewayConnection {
    /// Name of the connection resource.
    pub name: String,
    /// Connection type, e.g. "IPsec" or "ExpressRoute".
    pub connection_type: String,
    /// Connection status ("Connected" or other; None when unreported).
    pub status: Option<String>,
    /// The remote end of the connection.
    pub remote_network: RemoteNetwork,
}

impl GatewayConnection {
    /// True when this connection rides an ExpressRoute circuit.
    pub fn is_express_route(&self) -> bool {
        self.connection_type.eq_ignore_ascii_case("ExpressRoute")
    }
}

/// The remote end of a gateway connection.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RemoteNetwork {
    /// Whether the remote end is on-premises or another VNet.
    #[serde(default)]
    pub kind: RemoteNetworkKind,
    /// Name of the remote network or site.
    pub name: String,
    /// Address space of the remote network.
    #[serde(default)]
    pub address_space: Vec<String>,
    /// Public IP of the remote gateway endpoint.
    pub gateway_ip: Option<String>,
}

/// Classification of a gateway connection's remote end.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemoteNetworkKind {
    /// An on-premises site reached over the tunnel.
    #[default]
    OnPremises,
    /// Another virtual network.
    Vnet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_endpoints_from_list() {
        let se = ServiceEndpoints::List(vec![
            "Microsoft.Storage".to_string(),
            "Microsoft.Sql".to_string(),
        ]);
        assert_eq!(se.count(), 2);
    }

    #[test]
    fn test_service_endpoints_from_raw_string() {
        let se = ServiceEndpoints::Raw("Microsoft.Storage, Microsoft.KeyVault,".to_string());
        assert_eq!(se.names(), vec!["Microsoft.Storage", "Microsoft.KeyVault"]);
        assert_eq!(se.count(), 2);
    }

    #[test]
    fn test_service_endpoints_empty_raw() {
        let se = ServiceEndpoints::Raw("  ".to_string());
        assert_eq!(se.count(), 0);
    }

    #[test]
    fn test_service_endpoints_deserialize_both_shapes() {
        let from_list: Subnet =
            serde_json::from_str(r#"{"name":"a","service_endpoints":["Microsoft.Storage"]}"#)
                .expect("list shape should parse");
        let from_raw: Subnet =
            serde_json::from_str(r#"{"name":"b","service_endpoints":"Microsoft.Storage"}"#)
                .expect("raw shape should parse");
        assert_eq!(from_list.service_endpoint_count(), 1);
        assert_eq!(from_raw.service_endpoint_count(), 1);
    }
}
