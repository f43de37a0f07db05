//! Connectivity and risk aggregation.
//!
//! Computes the scalar and hierarchical counts of the report without
//! mutating the inventory: unique peering/NSG counts, connection totals,
//! missing-NSG coverage, service-endpoint totals and severity roll-ups at
//! subnet, VNet, subscription and global scope.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::{AzureFirewall, Peering, Severity, VirtualWanHub, Vnet};
use crate::processing::identity;

/// Subnets that legitimately carry no NSG and are excluded from the
/// missing-NSG count. Application-Gateway-v2 subnets are deliberately NOT
/// in this list and still count as missing. Policy decision tracked in
/// DESIGN.md; do not extend without product-owner sign-off.
pub const NSG_EXEMPT_SUBNETS: &[&str] =
    &["GatewaySubnet", "AzureBastionSubnet", "AzureFirewallSubnet"];

/// Risk counts for the three defined severities.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
}

impl SeverityCounts {
    /// Count one finding. Unrecognized severities are ignored for totals
    /// but remain in the per-subnet risk list for display.
    pub fn add(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Unknown => {}
        }
    }

    pub fn merge(&mut self, other: &SeverityCounts) {
        self.critical += other.critical;
        self.high += other.high;
        self.medium += other.medium;
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium
    }

    /// Worst severity present, for badge display.
    pub fn highest(&self) -> Option<Severity> {
        if self.critical > 0 {
            Some(Severity::Critical)
        } else if self.high > 0 {
            Some(Severity::High)
        } else if self.medium > 0 {
            Some(Severity::Medium)
        } else {
            None
        }
    }
}

/// Per-subnet slice of the roll-up.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SubnetSummary {
    pub name: String,
    pub has_nsg: bool,
    /// True when the subnet lacks an NSG and is not in the exception set.
    pub nsg_missing: bool,
    pub device_count: usize,
    pub service_endpoint_count: usize,
    pub risk_count: usize,
    pub severity: SeverityCounts,
}

/// Per-VNet slice of the roll-up.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VnetSummary {
    pub name: String,
    pub subscription_name: String,
    pub severity: SeverityCounts,
    /// Worst severity among this VNet's risks, for badge display.
    pub highest_severity: Option<Severity>,
    pub subnets: Vec<SubnetSummary>,
}

/// Per-subscription slice of the roll-up, in order of first appearance.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SubscriptionSummary {
    pub id: String,
    pub name: String,
    pub vnet_count: usize,
    pub severity: SeverityCounts,
    pub highest_severity: Option<Severity>,
}

/// Global scalar counts of the report.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct NetworkTotals {
    pub vnet_count: usize,
    pub subnet_count: usize,
    /// Distinct NSGs referenced by any subnet; sharing counts once.
    pub nsg_count: usize,
    /// Subnets without an NSG, exception set excluded.
    pub missing_nsg_count: usize,
    pub gateway_count: usize,
    /// Size of the peering dedup-key set, not the raw record count.
    pub unique_peering_count: usize,
    pub device_count: usize,
    pub s2s_connection_count: usize,
    pub express_route_connection_count: usize,
    /// Connections whose status is present and not "Connected".
    pub disconnected_connection_count: usize,
    pub service_endpoint_count: usize,
    pub hub_count: usize,
    pub firewall_count: usize,
    pub severity: SeverityCounts,
}

/// Aggregate output: global totals plus the VNet and subscription roll-ups.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Aggregates {
    pub totals: NetworkTotals,
    pub vnets: Vec<VnetSummary>,
    pub subscriptions: Vec<SubscriptionSummary>,
}

/// Dedup key for one peering record, canonicalized the same way the graph
/// builder keys its edges. None for a self-referential record.
fn peering_key(
    local_name: &str,
    peering: &Peering,
    local_is_hub: bool,
    hubs: &[VirtualWanHub],
) -> Option<String> {
    let remote_hub =
        identity::resolve_hub_proxy(&peering.remote_network, hubs).map(|h| h.name.clone());
    let remote_is_hub = peering.is_virtual_wan_hub || remote_hub.is_some();
    let remote_name = remote_hub.unwrap_or_else(|| peering.remote_network.clone());

    if local_name == remote_name {
        log::warn!("Ignoring self-referential peering on '{local_name}'");
        return None;
    }

    Some(match (local_is_hub, remote_is_hub) {
        (false, true) => identity::hub_peering_key(local_name, &remote_name),
        (true, false) => identity::hub_peering_key(&remote_name, local_name),
        _ => identity::vnet_peering_key(local_name, &remote_name),
    })
}

fn is_disconnected(status: Option<&str>) -> bool {
    matches!(status, Some(s) if s != "Connected")
}

/// Compute all aggregate counts for one inventory snapshot.
///
/// Pure function of the input; running it twice on the same snapshot yields
/// identical results.
pub fn aggregate(
    vnets: &[Vnet],
    hubs: &[VirtualWanHub],
    firewalls: &[AzureFirewall],
) -> Aggregates {
    let mut totals = NetworkTotals {
        hub_count: hubs.len(),
        ..Default::default()
    };

    let mut peering_keys: HashSet<String> = HashSet::new();
    let mut nsg_ids: HashSet<String> = HashSet::new();
    let mut firewall_ids: HashSet<String> = HashSet::new();

    let mut vnet_summaries: Vec<VnetSummary> = Vec::new();
    let mut subscriptions: Vec<SubscriptionSummary> = Vec::new();

    for vnet in vnets {
        let local_hub = identity::resolve_hub_proxy(&vnet.name, hubs);
        let local_is_hub = local_hub.is_some();
        let local_name = local_hub.map_or(vnet.name.as_str(), |h| h.name.as_str());

        for peering in &vnet.peerings {
            if let Some(key) = peering_key(local_name, peering, local_is_hub, hubs) {
                peering_keys.insert(key);
            }
        }

        // A hub proxy is a stand-in, not a VNet of its own; its peerings
        // count above but it contributes nothing to the VNet roll-up.
        if local_is_hub {
            continue;
        }
        totals.vnet_count += 1;
        totals.gateway_count += vnet.gateways.len();

        let mut vnet_severity = SeverityCounts::default();
        let mut subnet_summaries = Vec::new();

        for subnet in &vnet.subnets {
            totals.subnet_count += 1;

            let nsg_ref = subnet.nsg_id.as_ref().or(subnet.nsg_name.as_ref());
            let has_nsg = match nsg_ref {
                Some(nsg) => {
                    nsg_ids.insert(nsg.clone());
                    true
                }
                None => false,
            };
            let nsg_missing = !has_nsg && !NSG_EXEMPT_SUBNETS.contains(&subnet.name.as_str());
            if nsg_missing {
                totals.missing_nsg_count += 1;
            }

            let endpoint_count = subnet.service_endpoint_count();
            totals.service_endpoint_count += endpoint_count;
            totals.device_count += subnet.connected_devices.len();

            let mut subnet_severity = SeverityCounts::default();
            for risk in &subnet.nsg_risks {
                subnet_severity.add(risk.severity);
            }
            vnet_severity.merge(&subnet_severity);

            subnet_summaries.push(SubnetSummary {
                name: subnet.name.clone(),
                has_nsg,
                nsg_missing,
                device_count: subnet.connected_devices.len(),
                service_endpoint_count: endpoint_count,
                risk_count: subnet.nsg_risks.len(),
                severity: subnet_severity,
            });
        }

        // Classic gateway connections; an ExpressRoute gateway with no
        // recorded connections still counts as one circuit attachment.
        for gateway in &vnet.gateways {
            if gateway.is_express_route() && gateway.connections.is_empty() {
                totals.express_route_connection_count += 1;
            }
            for conn in &gateway.connections {
                if conn.is_express_route() {
                    totals.express_route_connection_count += 1;
                } else {
                    totals.s2s_connection_count += 1;
                }
                if is_disconnected(conn.status.as_deref()) {
                    totals.disconnected_connection_count += 1;
                }
            }
        }

        totals.severity.merge(&vnet_severity);

        match subscriptions
            .iter_mut()
            .find(|s| s.name == vnet.subscription_name)
        {
            Some(sub) => {
                sub.vnet_count += 1;
                sub.severity.merge(&vnet_severity);
            }
            None => subscriptions.push(SubscriptionSummary {
                id: vnet.subscription_id.clone(),
                name: vnet.subscription_name.clone(),
                vnet_count: 1,
                severity: vnet_severity,
                highest_severity: None,
            }),
        }

        vnet_summaries.push(VnetSummary {
            name: vnet.name.clone(),
            subscription_name: vnet.subscription_name.clone(),
            highest_severity: vnet_severity.highest(),
            severity: vnet_severity,
            subnets: subnet_summaries,
        });
    }

    // Hub-side peerings share the dedup-key space with the VNet side.
    for hub in hubs {
        for peering in &hub.peerings {
            if let Some(key) = peering_key(&hub.name, peering, true, hubs) {
                peering_keys.insert(key);
            }
        }
        totals.express_route_connection_count += hub.express_route_connections.len();
        totals.s2s_connection_count += hub.vpn_connections.len();
        for conn in &hub.express_route_connections {
            if is_disconnected(conn.status.as_deref()) {
                totals.disconnected_connection_count += 1;
            }
        }
        for conn in &hub.vpn_connections {
            if is_disconnected(conn.status.as_deref()) {
                totals.disconnected_connection_count += 1;
            }
        }
    }

    // Firewalls counted once by id, whatever path discovered them.
    for firewall in vnets
        .iter()
        .flat_map(|v| v.firewalls.iter())
        .chain(hubs.iter().flat_map(|h| h.firewalls.iter()))
        .chain(firewalls.iter())
    {
        let key = if firewall.id.trim().is_empty() {
            format!("name/{}", firewall.name)
        } else {
            firewall.id.clone()
        };
        firewall_ids.insert(key);
    }

    for sub in &mut subscriptions {
        sub.highest_severity = sub.severity.highest();
    }

    totals.unique_peering_count = peering_keys.len();
    totals.nsg_count = nsg_ids.len();
    totals.firewall_count = firewall_ids.len();

    log::info!(
        "Aggregated {} VNets, {} subnets, {} unique peerings, {} risks",
        totals.vnet_count,
        totals.subnet_count,
        totals.unique_peering_count,
        totals.severity.total()
    );

    Aggregates {
        totals,
        vnets: vnet_summaries,
        subscriptions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ConnectedDevice, Gateway, GatewayConnection, NsgRisk, Peering, ServiceEndpoints, Subnet,
    };

    fn vnet(name: &str, subscription: &str) -> Vnet {
        Vnet {
            name: name.to_string(),
            subscription_id: format!("id-{subscription}"),
            subscription_name: subscription.to_string(),
            ..Default::default()
        }
    }

    fn peering(remote: &str) -> Peering {
        Peering {
            remote_network: remote.to_string(),
            state: Some("Connected".to_string()),
            ..Default::default()
        }
    }

    fn risk(severity: Severity) -> NsgRisk {
        NsgRisk {
            severity,
            rule_name: "allow-any".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_unique_peering_count_collapses_both_sides() {
        let mut a = vnet("vnet-a", "S1");
        a.peerings.push(peering("vnet-b"));
        let mut b = vnet("vnet-b", "S2");
        b.peerings.push(peering("vnet-a"));

        let agg = aggregate(&[a, b], &[], &[]);
        assert_eq!(agg.totals.unique_peering_count, 1);
    }

    #[test]
    fn test_shared_nsg_counts_once() {
        let mut a = vnet("vnet-a", "S1");
        a.subnets.push(Subnet {
            name: "web".to_string(),
            nsg_id: Some("/nsg/shared".to_string()),
            ..Default::default()
        });
        a.subnets.push(Subnet {
            name: "app".to_string(),
            nsg_id: Some("/nsg/shared".to_string()),
            ..Default::default()
        });

        let agg = aggregate(&[a], &[], &[]);
        assert_eq!(agg.totals.nsg_count, 1);
        assert_eq!(agg.totals.missing_nsg_count, 0);
    }

    #[test]
    fn test_missing_nsg_exception_set() {
        let mut a = vnet("vnet-a", "S1");
        for name in ["GatewaySubnet", "AzureBastionSubnet", "AzureFirewallSubnet"] {
            a.subnets.push(Subnet {
                name: name.to_string(),
                ..Default::default()
            });
        }
        // AppGw v2 subnets are not exempt.
        a.subnets.push(Subnet {
            name: "AppGwSubnet".to_string(),
            ..Default::default()
        });

        let agg = aggregate(&[a], &[], &[]);
        assert_eq!(agg.totals.missing_nsg_count, 1);
        assert_eq!(agg.totals.nsg_count, 0);
    }

    #[test]
    fn test_express_route_gateway_without_connections_counts_once() {
        let mut a = vnet("vnet-a", "S1");
        a.gateways.push(Gateway {
            name: "er-gw".to_string(),
            gateway_type: "ExpressRoute".to_string(),
            ..Default::default()
        });

        let agg = aggregate(&[a], &[], &[]);
        assert_eq!(agg.totals.express_route_connection_count, 1);
        assert_eq!(agg.totals.s2s_connection_count, 0);
    }

    #[test]
    fn test_disconnected_requires_present_status() {
        let mut a = vnet("vnet-a", "S1");
        a.gateways.push(Gateway {
            name: "gw".to_string(),
            gateway_type: "Vpn".to_string(),
            connections: vec![
                GatewayConnection {
                    name: "up".to_string(),
                    connection_type: "IPsec".to_string(),
                    status: Some("Connected".to_string()),
                    ..Default::default()
                },
                GatewayConnection {
                    name: "down".to_string(),
                    connection_type: "IPsec".to_string(),
                    status: Some("NotConnected".to_string()),
                    ..Default::default()
                },
                GatewayConnection {
                    name: "unreported".to_string(),
                    connection_type: "IPsec".to_string(),
                    status: None,
                    ..Default::default()
                },
            ],
            ..Default::default()
        });

        let agg = aggregate(&[a], &[], &[]);
        assert_eq!(agg.totals.s2s_connection_count, 3);
        assert_eq!(agg.totals.disconnected_connection_count, 1);
    }

    #[test]
    fn test_service_endpoint_totals_both_shapes() {
        let mut a = vnet("vnet-a", "S1");
        a.subnets.push(Subnet {
            name: "one".to_string(),
            service_endpoints: Some(ServiceEndpoints::List(vec![
                "Microsoft.Storage".to_string(),
                "Microsoft.Sql".to_string(),
            ])),
            ..Default::default()
        });
        a.subnets.push(Subnet {
            name: "two".to_string(),
            service_endpoints: Some(ServiceEndpoints::Raw(
                "Microsoft.KeyVault, ,Microsoft.Storage".to_string(),
            )),
            ..Default::default()
        });

        let agg = aggregate(&[a], &[], &[]);
        assert_eq!(agg.totals.service_endpoint_count, 4);
    }

    #[test]
    fn test_severity_rollup_ignores_unknown_but_keeps_risk_count() {
        let mut a = vnet("vnet-a", "S1");
        a.subnets.push(Subnet {
            name: "web".to_string(),
            nsg_id: Some("/nsg/web".to_string()),
            nsg_risks: vec![
                risk(Severity::Critical),
                risk(Severity::Medium),
                risk(Severity::Unknown),
            ],
            ..Default::default()
        });

        let agg = aggregate(&[a], &[], &[]);
        assert_eq!(agg.totals.severity.critical, 1);
        assert_eq!(agg.totals.severity.medium, 1);
        assert_eq!(agg.totals.severity.total(), 2);
        assert_eq!(agg.vnets[0].subnets[0].risk_count, 3);
        assert_eq!(agg.vnets[0].highest_severity, Some(Severity::Critical));
        assert_eq!(agg.subscriptions[0].highest_severity, Some(Severity::Critical));
    }

    #[test]
    fn test_spec_scenario_two_vnets() {
        // vnet-a (S1) peered to vnet-b (S2); subnet "web" in vnet-a with no
        // NSG and no exception name.
        let mut a = vnet("vnet-a", "S1");
        a.peerings.push(Peering {
            remote_network: "vnet-b".to_string(),
            state: Some("Connected".to_string()),
            use_remote_gateways: true,
            ..Default::default()
        });
        a.subnets.push(Subnet {
            name: "web".to_string(),
            ..Default::default()
        });
        let mut b = vnet("vnet-b", "S2");
        b.peerings.push(Peering {
            remote_network: "vnet-a".to_string(),
            state: Some("Connected".to_string()),
            allow_gateway_transit: true,
            ..Default::default()
        });

        let agg = aggregate(&[a, b], &[], &[]);
        assert_eq!(agg.totals.unique_peering_count, 1);
        assert_eq!(agg.totals.missing_nsg_count, 1);
        assert_eq!(agg.totals.nsg_count, 0);
        assert_eq!(agg.totals.vnet_count, 2);
        assert_eq!(agg.subscriptions.len(), 2);
    }

    #[test]
    fn test_firewall_counted_once_across_paths() {
        let fw = AzureFirewall {
            id: "/fw/1".to_string(),
            name: "fw-01".to_string(),
            ..Default::default()
        };
        let mut a = vnet("vnet-a", "S1");
        a.firewalls.push(fw.clone());

        let agg = aggregate(&[a], &[], &[fw]);
        assert_eq!(agg.totals.firewall_count, 1);
    }

    #[test]
    fn test_device_count() {
        let mut a = vnet("vnet-a", "S1");
        a.subnets.push(Subnet {
            name: "web".to_string(),
            nsg_id: Some("/nsg/web".to_string()),
            connected_devices: vec![
                ConnectedDevice {
                    name: "vm-1".to_string(),
                    ..Default::default()
                },
                ConnectedDevice {
                    name: "vm-2".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        });

        let agg = aggregate(&[a], &[], &[]);
        assert_eq!(agg.totals.device_count, 2);
    }

    #[test]
    fn test_idempotent() {
        let mut a = vnet("vnet-a", "S1");
        a.peerings.push(peering("vnet-b"));
        a.subnets.push(Subnet {
            name: "web".to_string(),
            nsg_risks: vec![risk(Severity::High)],
            ..Default::default()
        });
        let input = vec![a];

        let first = aggregate(&input, &[], &[]);
        let second = aggregate(&input, &[], &[]);
        assert_eq!(
            serde_json::to_string(&first).expect("serializable"),
            serde_json::to_string(&second).expect("serializable")
        );
    }
}
