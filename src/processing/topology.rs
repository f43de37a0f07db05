//! Topology graph construction.
//!
//! Turns the normalized inventory into a deduplicated node/edge set:
//! one node per VNet, hub, gateway, firewall, on-premises site and circuit;
//! edges for peerings, gateway/firewall attachments and S2S/ExpressRoute
//! tunnels. All cross-reference resolution happens here, including hub proxy
//! aliasing and synthesis of placeholder nodes for resources outside the
//! caller's visibility.

use std::collections::{HashMap, HashSet};

use crate::models::{
    AzureFirewall, Edge, EdgeKind, FirewallDeployment, Node, NodeKind, RemoteNetworkKind,
    TopologyGraph, TransitDirection, VirtualWanHub, Vnet,
};
use crate::processing::identity;

/// Subscription group tag for resources whose subscription is not visible.
pub const UNKNOWN_SUBSCRIPTION: &str = "unknown";

/// Palette cycled through as subscriptions are first seen.
const SUBSCRIPTION_PALETTE: &[&str] = &[
    "#4c78a8", "#f58518", "#54a24b", "#b279a2", "#e45756", "#72b7b2", "#eeca3b", "#9d755d",
];

/// Color for resources grouped under the unknown subscription.
const UNKNOWN_COLOR: &str = "#9e9e9e";

const COLOR_CONNECTED: &str = "#2e7d32";
const COLOR_DEGRADED: &str = "#ed6c02";
const COLOR_DISCONNECTED: &str = "#c62828";
const COLOR_NEUTRAL: &str = "#757575";

/// Mutable assignment state threaded through one builder run.
///
/// Holds node-id, alias, edge-key and subscription-color assignments so the
/// builder stays a pure function of (input, fresh context).
pub struct BuilderContext {
    next_node: usize,
    /// Logical resource key -> assigned node id. Once assigned, never reused.
    node_ids: HashMap<String, String>,
    /// Proxy VNet name -> logical key of the hub it stands in for.
    aliases: HashMap<String, String>,
    /// Dedup keys of edges already emitted.
    edge_keys: HashSet<String>,
    /// Peering dedup key -> index of the edge it produced.
    peering_edges: HashMap<String, usize>,
    /// Accumulated (UseRemoteGateways, AllowGatewayTransit) flags per
    /// peering key, across both sides' records.
    peering_flags: HashMap<String, (bool, bool)>,
    /// Subscription name -> assigned group color.
    subscription_colors: HashMap<String, String>,
}

impl BuilderContext {
    pub fn new() -> Self {
        BuilderContext {
            next_node: 0,
            node_ids: HashMap::new(),
            aliases: HashMap::new(),
            edge_keys: HashSet::new(),
            peering_edges: HashMap::new(),
            peering_flags: HashMap::new(),
            subscription_colors: HashMap::new(),
        }
    }

    /// Node id for a logical key, if one was assigned.
    pub fn node_id(&self, key: &str) -> Option<&String> {
        self.node_ids.get(key)
    }

    /// Resolve a name through the proxy alias map to its logical key.
    fn resolve_alias<'a>(&'a self, name: &'a str) -> Option<&'a String> {
        self.aliases.get(name)
    }

    fn color_for(&mut self, subscription: &str) -> String {
        if subscription == UNKNOWN_SUBSCRIPTION {
            return UNKNOWN_COLOR.to_string();
        }
        if let Some(color) = self.subscription_colors.get(subscription) {
            return color.clone();
        }
        let color = SUBSCRIPTION_PALETTE[self.subscription_colors.len() % SUBSCRIPTION_PALETTE.len()];
        self.subscription_colors
            .insert(subscription.to_string(), color.to_string());
        color.to_string()
    }
}

impl Default for BuilderContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Get-or-create the node for a logical key; the id assigned on first sight
/// is reused for every later reference to the same resource.
fn add_node(
    ctx: &mut BuilderContext,
    graph: &mut TopologyGraph,
    key: &str,
    label: &str,
    kind: NodeKind,
    subscription: &str,
    tooltip: String,
) -> String {
    if let Some(id) = ctx.node_ids.get(key) {
        return id.clone();
    }
    let id = format!("node{}", ctx.next_node);
    ctx.next_node += 1;
    ctx.node_ids.insert(key.to_string(), id.clone());
    let color = ctx.color_for(subscription);
    graph.nodes.push(Node {
        id: id.clone(),
        label: label.to_string(),
        kind,
        subscription: subscription.to_string(),
        color,
        tooltip,
    });
    id
}

/// Emit a peering edge, or fold a counterpart record into the one already
/// emitted for the same dedup key.
///
/// Transit flags accumulate across both sides' records, so a pair where one
/// side sets UseRemoteGateways and the other AllowGatewayTransit ends up
/// with a single bidirectional gateway-transit edge.
#[allow(clippy::too_many_arguments)]
fn upsert_peering_edge(
    ctx: &mut BuilderContext,
    graph: &mut TopologyGraph,
    key: String,
    from: String,
    to: String,
    color: &str,
    dashed: bool,
    use_remote_gateways: bool,
    allow_gateway_transit: bool,
) {
    if let Some(&idx) = ctx.peering_edges.get(&key) {
        let flags = ctx.peering_flags.entry(key).or_default();
        flags.0 |= use_remote_gateways;
        flags.1 |= allow_gateway_transit;
        graph.edges[idx].direction = transit_direction(flags.0, flags.1);
        log::debug!("Peering counterpart record merged into existing edge");
        return;
    }
    let idx = graph.edges.len();
    graph.edges.push(Edge {
        from,
        to,
        kind: EdgeKind::Peering,
        color: color.to_string(),
        dashed,
        direction: transit_direction(use_remote_gateways, allow_gateway_transit),
    });
    ctx.peering_flags
        .insert(key.clone(), (use_remote_gateways, allow_gateway_transit));
    ctx.peering_edges.insert(key, idx);
}

/// Emit an edge unless its dedup key was already seen.
fn add_edge(
    ctx: &mut BuilderContext,
    graph: &mut TopologyGraph,
    dedup_key: String,
    edge: Edge,
) -> bool {
    if !ctx.edge_keys.insert(dedup_key) {
        return false;
    }
    graph.edges.push(edge);
    true
}

fn display_or<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => fallback,
    }
}

fn join_or(values: &[String], fallback: &str) -> String {
    if values.is_empty() {
        fallback.to_string()
    } else {
        values.join(", ")
    }
}

fn status_connected(status: Option<&str>) -> bool {
    matches!(status, Some("Connected"))
}

/// Edge color/style for a connection status. Absent status is rendered
/// neutral rather than disconnected.
fn status_style(status: Option<&str>) -> (&'static str, bool) {
    match status {
        Some("Connected") => (COLOR_CONNECTED, false),
        Some(_) => (COLOR_DISCONNECTED, true),
        None => (COLOR_NEUTRAL, false),
    }
}

/// Gateway-transit direction from the two independent peering flags.
fn transit_direction(use_remote_gateways: bool, allow_gateway_transit: bool) -> Option<TransitDirection> {
    match (use_remote_gateways, allow_gateway_transit) {
        (true, true) => Some(TransitDirection::Both),
        (true, false) => Some(TransitDirection::ToRemote),
        (false, true) => Some(TransitDirection::ToLocal),
        (false, false) => None,
    }
}

fn vnet_key(name: &str) -> String {
    format!("vnet:{name}")
}

fn hub_key(name: &str) -> String {
    format!("hub:{name}")
}

/// Build the topology graph with a fresh context.
pub fn build_graph(
    vnets: &[Vnet],
    hubs: &[VirtualWanHub],
    firewalls: &[AzureFirewall],
) -> TopologyGraph {
    let mut ctx = BuilderContext::new();
    build_graph_with(&mut ctx, vnets, hubs, firewalls)
}

/// Build the topology graph, threading an explicit context.
///
/// Traversal order is fixed (hubs, VNets with children, peerings, hub
/// connections, standalone firewalls) so node and edge order is identical
/// for identical input.
pub fn build_graph_with(
    ctx: &mut BuilderContext,
    vnets: &[Vnet],
    hubs: &[VirtualWanHub],
    firewalls: &[AzureFirewall],
) -> TopologyGraph {
    let mut graph = TopologyGraph::default();

    // Hub nodes first, so proxy VNets can alias onto them.
    for hub in hubs {
        let tooltip = format!(
            "Virtual WAN Hub\nLocation: {}\nAddress prefix: {}\nRouting preference: {}",
            hub.location,
            display_or(hub.address_prefix.as_deref(), "Unknown"),
            display_or(hub.routing_preference.as_deref(), "Default"),
        );
        let subscription = display_or(Some(hub.subscription_name.as_str()), UNKNOWN_SUBSCRIPTION);
        add_node(ctx, &mut graph, &hub_key(&hub.name), &hub.name, NodeKind::Hub, subscription, tooltip);
    }

    // VNet nodes, except proxies that resolve onto a hub.
    for vnet in vnets {
        if let Some(hub) = identity::resolve_hub_proxy(&vnet.name, hubs) {
            log::info!(
                "VNet '{}' is a hub proxy for '{}'; recording alias instead of a node",
                vnet.name,
                hub.name
            );
            ctx.aliases.insert(vnet.name.clone(), hub_key(&hub.name));
            continue;
        }
        let tooltip = format!(
            "VNet\nLocation: {}\nAddress space: {}\nSubnets: {}",
            vnet.location,
            join_or(&vnet.address_space, "Unknown"),
            vnet.subnets.len(),
        );
        add_node(
            ctx,
            &mut graph,
            &vnet_key(&vnet.name),
            &vnet.name,
            NodeKind::Vnet,
            &vnet.subscription_name,
            tooltip,
        );
    }

    // Gateway and firewall children of each VNet.
    for vnet in vnets {
        let host_key = match ctx.resolve_alias(&vnet.name) {
            Some(alias) => alias.clone(),
            None => vnet_key(&vnet.name),
        };
        for gateway in &vnet.gateways {
            let gw_key = gateway_key(&vnet.name, &gateway.id, &gateway.name);
            let tooltip = format!(
                "Gateway\nType: {}\nSKU: {}\nVPN type: {}",
                gateway.gateway_type,
                display_or(gateway.sku.as_deref(), "Unknown SKU"),
                display_or(gateway.vpn_type.as_deref(), "n/a"),
            );
            let gw_id = add_node(
                ctx,
                &mut graph,
                &gw_key,
                &gateway.name,
                NodeKind::Gateway,
                &vnet.subscription_name,
                tooltip,
            );
            let host_id = match ctx.node_id(&host_key) {
                Some(id) => id.clone(),
                None => continue,
            };
            add_edge(
                ctx,
                &mut graph,
                format!("att:{host_key}:{gw_key}"),
                Edge {
                    from: host_id,
                    to: gw_id,
                    kind: EdgeKind::GatewayAttachment,
                    color: COLOR_NEUTRAL.to_string(),
                    dashed: false,
                    direction: None,
                },
            );
        }
        for firewall in &vnet.firewalls {
            attach_firewall(ctx, &mut graph, firewall, &host_key, &vnet.subscription_name);
        }
    }

    // Firewalls deployed inside hubs.
    for hub in hubs {
        let host_key = hub_key(&hub.name);
        let subscription =
            display_or(Some(hub.subscription_name.as_str()), UNKNOWN_SUBSCRIPTION).to_string();
        for firewall in &hub.firewalls {
            attach_firewall(ctx, &mut graph, firewall, &host_key, &subscription);
        }
    }

    // Peering edges, VNet side.
    for vnet in vnets {
        for peering in &vnet.peerings {
            add_peering_edge(
                ctx,
                &mut graph,
                &vnet.name,
                peering.is_virtual_wan_hub,
                peering,
                vnets,
                hubs,
            );
        }
    }

    // Peering edges, hub side. Same dedup keys as the VNet side, so the
    // counterpart record collapses instead of re-adding.
    for hub in hubs {
        for peering in &hub.peerings {
            add_hub_peering_edge(ctx, &mut graph, hub, peering, vnets, hubs);
        }
    }

    // Classic gateway connections: S2S tunnels and ExpressRoute links.
    for vnet in vnets {
        for gateway in &vnet.gateways {
            let gw_key = gateway_key(&vnet.name, &gateway.id, &gateway.name);
            for conn in &gateway.connections {
                add_gateway_connection_edge(ctx, &mut graph, &gw_key, conn, vnets);
            }
        }
    }

    // Hub connections: circuits and VPN sites.
    for hub in hubs {
        let host_key = hub_key(&hub.name);
        for conn in &hub.express_route_connections {
            add_hub_circuit_edge(ctx, &mut graph, &host_key, conn);
        }
        for conn in &hub.vpn_connections {
            add_hub_vpn_edge(ctx, &mut graph, &host_key, conn);
        }
    }

    // Standalone firewalls not discovered through a VNet or hub.
    for firewall in firewalls {
        add_standalone_firewall(ctx, &mut graph, firewall, vnets, hubs);
    }

    log::info!(
        "Built topology graph: {} nodes, {} edges",
        graph.nodes.len(),
        graph.edges.len()
    );
    graph
}

fn gateway_key(vnet_name: &str, id: &str, name: &str) -> String {
    if id.trim().is_empty() {
        format!("gw:{vnet_name}/{name}")
    } else {
        format!("gw:{id}")
    }
}

fn firewall_node_key(firewall: &AzureFirewall) -> String {
    // Keyed by resource id, not discovery path, so a firewall seen from both
    // its host and the standalone list gets exactly one node.
    if firewall.id.trim().is_empty() {
        format!("fw:name/{}", firewall.name)
    } else {
        format!("fw:{}", firewall.id)
    }
}

fn firewall_tooltip(firewall: &AzureFirewall) -> String {
    format!(
        "Azure Firewall\nSKU tier: {}\nThreat intel: {}\nPrivate IP: {}",
        display_or(firewall.sku_tier.as_deref(), "Unknown"),
        display_or(firewall.threat_intel_mode.as_deref(), "Unknown"),
        display_or(firewall.private_ip.as_deref(), "n/a"),
    )
}

/// Create (or reuse) a firewall node and attach it to its host node.
fn attach_firewall(
    ctx: &mut BuilderContext,
    graph: &mut TopologyGraph,
    firewall: &AzureFirewall,
    host_key: &str,
    subscription: &str,
) {
    let fw_key = firewall_node_key(firewall);
    let fw_id = add_node(
        ctx,
        graph,
        &fw_key,
        &firewall.name,
        NodeKind::Firewall,
        subscription,
        firewall_tooltip(firewall),
    );
    let host_id = match ctx.node_id(host_key) {
        Some(id) => id.clone(),
        None => return,
    };
    add_edge(
        ctx,
        graph,
        format!("fwatt:{fw_key}:{host_key}"),
        Edge {
            from: host_id,
            to: fw_id,
            kind: EdgeKind::FirewallAttachment,
            color: COLOR_NEUTRAL.to_string(),
            dashed: false,
            direction: None,
        },
    );
}

/// Resolution of a peering's remote endpoint.
struct ResolvedRemote {
    /// Logical key of the remote node.
    key: String,
    /// Canonical display name used in dedup keys.
    name: String,
    /// Whether the remote side is a hub (known or presumed).
    is_hub: bool,
}

/// Resolve a peering remote name to a known VNet, a known hub, a hub alias,
/// or a placeholder for a network outside the visible inventory.
fn resolve_peering_remote(
    ctx: &mut BuilderContext,
    graph: &mut TopologyGraph,
    remote_name: &str,
    presumed_hub: bool,
    vnets: &[Vnet],
    hubs: &[VirtualWanHub],
) -> ResolvedRemote {
    if let Some(alias) = ctx.resolve_alias(remote_name).cloned() {
        let name = alias.trim_start_matches("hub:").to_string();
        return ResolvedRemote {
            key: alias,
            name,
            is_hub: true,
        };
    }
    if vnets
        .iter()
        .any(|v| v.name == remote_name && ctx.resolve_alias(&v.name).is_none())
    {
        return ResolvedRemote {
            key: vnet_key(remote_name),
            name: remote_name.to_string(),
            is_hub: false,
        };
    }
    if let Some(hub) = identity::resolve_hub_proxy(remote_name, hubs) {
        return ResolvedRemote {
            key: hub_key(&hub.name),
            name: hub.name.clone(),
            is_hub: true,
        };
    }

    // Outside the visible inventory: synthesize a placeholder exactly once
    // per distinct name.
    let kind = if presumed_hub {
        NodeKind::UnknownHub
    } else {
        NodeKind::UnknownVnet
    };
    let key = format!("unknown:{remote_name}");
    if ctx.node_id(&key).is_none() {
        log::warn!("Peering target '{remote_name}' not in visible inventory; adding placeholder node");
    }
    add_node(
        ctx,
        graph,
        &key,
        remote_name,
        kind,
        UNKNOWN_SUBSCRIPTION,
        "Peered network outside the visible inventory".to_string(),
    );
    ResolvedRemote {
        key,
        name: remote_name.to_string(),
        is_hub: presumed_hub,
    }
}

fn add_peering_edge(
    ctx: &mut BuilderContext,
    graph: &mut TopologyGraph,
    local_vnet: &str,
    presumed_hub: bool,
    peering: &crate::models::Peering,
    vnets: &[Vnet],
    hubs: &[VirtualWanHub],
) {
    let remote_name = peering.remote_network.as_str();
    let state = peering.state.as_deref();
    let (local_key, local_name, local_is_hub) = match ctx.resolve_alias(local_vnet).cloned() {
        Some(alias) => {
            let name = alias.trim_start_matches("hub:").to_string();
            (alias, name, true)
        }
        None => (vnet_key(local_vnet), local_vnet.to_string(), false),
    };
    let local_id = match ctx.node_id(&local_key).cloned() {
        Some(id) => id,
        None => return,
    };

    let remote = resolve_peering_remote(ctx, graph, remote_name, presumed_hub, vnets, hubs);
    let remote_id = match ctx.node_id(&remote.key).cloned() {
        Some(id) => id,
        None => return,
    };

    if local_id == remote_id {
        log::warn!("Skipping self-referential peering on '{local_name}'");
        return;
    }

    let dedup_key = match (local_is_hub, remote.is_hub) {
        (false, true) => identity::hub_peering_key(&local_name, &remote.name),
        (true, false) => identity::hub_peering_key(&remote.name, &local_name),
        _ => identity::vnet_peering_key(&local_name, &remote.name),
    };

    let connected = state.is_none() || status_connected(state);
    let (color, dashed) = if connected {
        (COLOR_CONNECTED, false)
    } else {
        (COLOR_DEGRADED, true)
    };

    upsert_peering_edge(
        ctx,
        graph,
        dedup_key,
        local_id,
        remote_id,
        color,
        dashed,
        peering.use_remote_gateways,
        peering.allow_gateway_transit,
    );
}

/// Peering recorded from the hub's own list; remote side is a VNet name.
fn add_hub_peering_edge(
    ctx: &mut BuilderContext,
    graph: &mut TopologyGraph,
    hub: &VirtualWanHub,
    peering: &crate::models::Peering,
    vnets: &[Vnet],
    hubs: &[VirtualWanHub],
) {
    let local_key = hub_key(&hub.name);
    let local_id = match ctx.node_id(&local_key).cloned() {
        Some(id) => id,
        None => return,
    };
    let remote = resolve_peering_remote(ctx, graph, &peering.remote_network, false, vnets, hubs);
    let remote_id = match ctx.node_id(&remote.key).cloned() {
        Some(id) => id,
        None => return,
    };
    if local_id == remote_id {
        log::warn!("Skipping self-referential hub peering on '{}'", hub.name);
        return;
    }
    let dedup_key = if remote.is_hub {
        identity::vnet_peering_key(&hub.name, &remote.name)
    } else {
        identity::hub_peering_key(&remote.name, &hub.name)
    };
    let connected = peering.state.is_none() || status_connected(peering.state.as_deref());
    let (color, dashed) = if connected {
        (COLOR_CONNECTED, false)
    } else {
        (COLOR_DEGRADED, true)
    };
    upsert_peering_edge(
        ctx,
        graph,
        dedup_key,
        remote_id,
        local_id,
        color,
        dashed,
        peering.use_remote_gateways,
        peering.allow_gateway_transit,
    );
}

/// One edge per classic gateway connection, to either an on-premises node or
/// the counterpart gateway when the remote network is a modeled VNet.
fn add_gateway_connection_edge(
    ctx: &mut BuilderContext,
    graph: &mut TopologyGraph,
    gw_key: &str,
    conn: &crate::models::GatewayConnection,
    vnets: &[Vnet],
) {
    let gw_id = match ctx.node_id(gw_key).cloned() {
        Some(id) => id,
        None => return,
    };

    let target_key = if conn.remote_network.kind == RemoteNetworkKind::Vnet {
        match vnets.iter().find(|v| v.name == conn.remote_network.name) {
            Some(target) => match target.gateways.first() {
                Some(gw) => gateway_key(&target.name, &gw.id, &gw.name),
                // Remote VNet has no gateway of its own; edge lands on the
                // VNet node (or its hub, for a proxy) instead of a phantom
                // gateway.
                None => match ctx.resolve_alias(&target.name) {
                    Some(alias) => alias.clone(),
                    None => vnet_key(&target.name),
                },
            },
            None => onprem_node_key(ctx, graph, &conn.remote_network.name, &conn.remote_network.address_space),
        }
    } else {
        onprem_node_key(ctx, graph, &conn.remote_network.name, &conn.remote_network.address_space)
    };

    let target_id = match ctx.node_id(&target_key).cloned() {
        Some(id) => id,
        None => return,
    };

    let kind = if conn.is_express_route() {
        EdgeKind::ExpressRoute
    } else {
        EdgeKind::SiteToSite
    };
    let (color, dashed) = status_style(conn.status.as_deref());
    add_edge(
        ctx,
        graph,
        format!("conn:{gw_key}:{target_key}:{}", conn.name),
        Edge {
            from: gw_id,
            to: target_id,
            kind,
            color: color.to_string(),
            dashed,
            direction: None,
        },
    );
}

fn onprem_node_key(
    ctx: &mut BuilderContext,
    graph: &mut TopologyGraph,
    name: &str,
    address_space: &[String],
) -> String {
    let label = display_or(Some(name), "Unknown Site");
    let key = format!("onprem:{label}");
    let tooltip = format!(
        "On-premises network\nAddress space: {}",
        join_or(address_space, "Unknown"),
    );
    add_node(ctx, graph, &key, label, NodeKind::OnPremises, UNKNOWN_SUBSCRIPTION, tooltip);
    key
}

/// Hub ExpressRoute connection: circuit node plus hub-to-circuit edge.
fn add_hub_circuit_edge(
    ctx: &mut BuilderContext,
    graph: &mut TopologyGraph,
    host_key: &str,
    conn: &crate::models::ExpressRouteConnection,
) {
    let host_id = match ctx.node_id(host_key).cloned() {
        Some(id) => id,
        None => return,
    };
    let circuit_name = identity::circuit_display_name(conn);
    let circuit = conn.circuit.as_ref();
    let tooltip = format!(
        "ExpressRoute circuit\nProvider: {}\nPeering location: {}\nBandwidth: {}\nSKU: {}\nPeer ASN: {}",
        display_or(circuit.and_then(|c| c.provider.as_deref()), "Unknown"),
        display_or(circuit.and_then(|c| c.peering_location.as_deref()), "Unknown"),
        circuit
            .and_then(|c| c.bandwidth_mbps)
            .map_or("Unknown".to_string(), |b| format!("{b} Mbps")),
        display_or(circuit.and_then(|c| c.sku.as_deref()), "Unknown"),
        circuit
            .and_then(|c| c.peer_asn)
            .map_or("Unknown".to_string(), |asn| asn.to_string()),
    );
    let circuit_key = format!("circuit:{circuit_name}");
    let circuit_id = add_node(
        ctx,
        graph,
        &circuit_key,
        &circuit_name,
        NodeKind::Circuit,
        UNKNOWN_SUBSCRIPTION,
        tooltip,
    );
    let (color, dashed) = status_style(conn.status.as_deref());
    add_edge(
        ctx,
        graph,
        format!("conn:{host_key}:{circuit_key}:{}", conn.name),
        Edge {
            from: host_id,
            to: circuit_id,
            kind: EdgeKind::ExpressRoute,
            color: color.to_string(),
            dashed,
            direction: None,
        },
    );
}

/// Hub VPN connection: on-premises site node plus hub-to-site edge.
fn add_hub_vpn_edge(
    ctx: &mut BuilderContext,
    graph: &mut TopologyGraph,
    host_key: &str,
    conn: &crate::models::VpnConnection,
) {
    let host_id = match ctx.node_id(host_key).cloned() {
        Some(id) => id,
        None => return,
    };
    let (site_name, address_space) = match conn.remote_site.as_ref() {
        Some(site) => (site.name.as_str(), site.address_space.clone()),
        None => (conn.name.as_str(), vec![]),
    };
    let site_key = onprem_node_key(ctx, graph, site_name, &address_space);
    let site_id = match ctx.node_id(&site_key).cloned() {
        Some(id) => id,
        None => return,
    };
    let (color, dashed) = status_style(conn.status.as_deref());
    add_edge(
        ctx,
        graph,
        format!("conn:{host_key}:{site_key}:{}", conn.name),
        Edge {
            from: host_id,
            to: site_id,
            kind: EdgeKind::SiteToSite,
            color: color.to_string(),
            dashed,
            direction: None,
        },
    );
}

/// A firewall from the standalone list: reuse the node if a host already
/// linked it; otherwise create it and attempt attachment by VNet name, then
/// hub name. No resolvable host is a coverage gap, not an error.
fn add_standalone_firewall(
    ctx: &mut BuilderContext,
    graph: &mut TopologyGraph,
    firewall: &AzureFirewall,
    vnets: &[Vnet],
    hubs: &[VirtualWanHub],
) {
    let fw_key = firewall_node_key(firewall);
    if ctx.node_id(&fw_key).is_some() {
        return;
    }

    let host_key = firewall.host_name.as_deref().and_then(|host| {
        let direct_vnet = vnets
            .iter()
            .any(|v| v.name == host && ctx.resolve_alias(&v.name).is_none());
        if firewall.deployment == FirewallDeployment::Vnet && direct_vnet {
            return Some(vnet_key(host));
        }
        if let Some(alias) = ctx.resolve_alias(host) {
            return Some(alias.clone());
        }
        if direct_vnet {
            return Some(vnet_key(host));
        }
        identity::resolve_hub_proxy(host, hubs).map(|h| hub_key(&h.name))
    });

    match host_key {
        Some(host_key) if ctx.node_id(&host_key).is_some() => {
            let subscription = graph
                .node(ctx.node_id(&host_key).expect("host id just checked"))
                .map(|n| n.subscription.clone())
                .unwrap_or_else(|| UNKNOWN_SUBSCRIPTION.to_string());
            attach_firewall(ctx, graph, firewall, &host_key, &subscription);
        }
        _ => {
            log::info!(
                "Firewall '{}' has no resolvable host; node created without an edge",
                firewall.name
            );
            add_node(
                ctx,
                graph,
                &fw_key,
                &firewall.name,
                NodeKind::Firewall,
                UNKNOWN_SUBSCRIPTION,
                firewall_tooltip(firewall),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gateway, GatewayConnection, Peering, RemoteNetwork};

    fn vnet(name: &str, subscription: &str) -> Vnet {
        Vnet {
            id: format!("/subscriptions/{subscription}/vnets/{name}"),
            name: name.to_string(),
            subscription_id: subscription.to_string(),
            subscription_name: subscription.to_string(),
            location: "westeurope".to_string(),
            address_space: vec!["10.0.0.0/16".to_string()],
            ..Default::default()
        }
    }

    fn peering(remote: &str) -> Peering {
        Peering {
            name: format!("to-{remote}"),
            remote_network: remote.to_string(),
            state: Some("Connected".to_string()),
            ..Default::default()
        }
    }

    fn hub(name: &str) -> VirtualWanHub {
        VirtualWanHub {
            id: format!("/hubs/{name}"),
            name: name.to_string(),
            location: "westeurope".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_peering_reported_from_both_sides_yields_one_edge() {
        let mut a = vnet("vnet-a", "S1");
        a.peerings.push(peering("vnet-b"));
        let mut b = vnet("vnet-b", "S2");
        b.peerings.push(peering("vnet-a"));

        let graph = build_graph(&[a, b], &[], &[]);
        assert_eq!(graph.edges_of_kind(EdgeKind::Peering).len(), 1);

        // Order-independent: process the records the other way around.
        let mut a = vnet("vnet-a", "S1");
        a.peerings.push(peering("vnet-b"));
        let mut b = vnet("vnet-b", "S2");
        b.peerings.push(peering("vnet-a"));
        let graph = build_graph(&[b, a], &[], &[]);
        assert_eq!(graph.edges_of_kind(EdgeKind::Peering).len(), 1);
    }

    #[test]
    fn test_hub_proxy_never_gets_own_node() {
        let hubs = vec![hub("weu-hub-01")];
        let proxy = vnet("HV_weu-hub-01_f3a9c2", "S1");
        let mut spoke = vnet("spoke-01", "S1");
        spoke.peerings.push(Peering {
            remote_network: "HV_weu-hub-01_f3a9c2".to_string(),
            is_virtual_wan_hub: true,
            state: Some("Connected".to_string()),
            ..Default::default()
        });

        let graph = build_graph(&[proxy, spoke], &hubs, &[]);
        assert_eq!(graph.nodes_of_kind(NodeKind::Hub).len(), 1);
        assert_eq!(graph.nodes_of_kind(NodeKind::Vnet).len(), 1);
        assert!(graph.nodes_of_kind(NodeKind::UnknownHub).is_empty());

        // The peering lands on the hub's node.
        let hub_node_id = &graph.nodes_of_kind(NodeKind::Hub)[0].id;
        let edge = &graph.edges_of_kind(EdgeKind::Peering)[0];
        assert!(&edge.from == hub_node_id || &edge.to == hub_node_id);
    }

    #[test]
    fn test_hub_side_peering_collapses_with_vnet_side() {
        let mut h = hub("weu-hub-01");
        h.peerings.push(peering("spoke-01"));
        let mut spoke = vnet("spoke-01", "S1");
        spoke.peerings.push(Peering {
            remote_network: "weu-hub-01".to_string(),
            is_virtual_wan_hub: true,
            state: Some("Connected".to_string()),
            ..Default::default()
        });

        let graph = build_graph(&[spoke], &[h], &[]);
        assert_eq!(graph.edges_of_kind(EdgeKind::Peering).len(), 1);
    }

    #[test]
    fn test_unknown_remote_synthesized_once() {
        let mut a = vnet("vnet-a", "S1");
        a.peerings.push(peering("ghost-vnet"));
        let mut b = vnet("vnet-b", "S1");
        b.peerings.push(peering("ghost-vnet"));

        let graph = build_graph(&[a, b], &[], &[]);
        let unknown = graph.nodes_of_kind(NodeKind::UnknownVnet);
        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].label, "ghost-vnet");
        assert_eq!(unknown[0].subscription, UNKNOWN_SUBSCRIPTION);
        assert_eq!(graph.edges_of_kind(EdgeKind::Peering).len(), 2);
    }

    #[test]
    fn test_self_referential_peering_skipped() {
        let mut a = vnet("vnet-a", "S1");
        a.peerings.push(peering("vnet-a"));
        let graph = build_graph(&[a], &[], &[]);
        assert!(graph.edges_of_kind(EdgeKind::Peering).is_empty());
    }

    #[test]
    fn test_transit_direction_inference() {
        assert_eq!(transit_direction(true, true), Some(TransitDirection::Both));
        assert_eq!(transit_direction(true, false), Some(TransitDirection::ToRemote));
        assert_eq!(transit_direction(false, true), Some(TransitDirection::ToLocal));
        assert_eq!(transit_direction(false, false), None);
    }

    #[test]
    fn test_transit_flags_merge_across_both_sides() {
        // vnet-a uses vnet-b's gateway; vnet-b allows transit. Together the
        // single kept edge is a bidirectional gateway-transit edge.
        let mut a = vnet("vnet-a", "S1");
        a.peerings.push(Peering {
            remote_network: "vnet-b".to_string(),
            state: Some("Connected".to_string()),
            use_remote_gateways: true,
            ..Default::default()
        });
        let mut b = vnet("vnet-b", "S2");
        b.peerings.push(Peering {
            remote_network: "vnet-a".to_string(),
            state: Some("Connected".to_string()),
            allow_gateway_transit: true,
            ..Default::default()
        });

        let graph = build_graph(&[a, b], &[], &[]);
        let edges = graph.edges_of_kind(EdgeKind::Peering);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].direction, Some(TransitDirection::Both));
    }

    #[test]
    fn test_no_transit_flags_means_undirected_peering() {
        let mut a = vnet("vnet-a", "S1");
        a.peerings.push(peering("vnet-b"));
        let b = vnet("vnet-b", "S2");

        let graph = build_graph(&[a, b], &[], &[]);
        let edges = graph.edges_of_kind(EdgeKind::Peering);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].direction, None);
    }

    #[test]
    fn test_disconnected_gateway_connection_still_produces_edge() {
        let mut a = vnet("vnet-a", "S1");
        a.gateways.push(Gateway {
            id: "/gw/1".to_string(),
            name: "gw-a".to_string(),
            gateway_type: "Vpn".to_string(),
            connections: vec![GatewayConnection {
                name: "to-dc".to_string(),
                connection_type: "IPsec".to_string(),
                status: Some("NotConnected".to_string()),
                remote_network: RemoteNetwork {
                    kind: RemoteNetworkKind::OnPremises,
                    name: "dc-site".to_string(),
                    address_space: vec!["192.168.0.0/24".to_string()],
                    gateway_ip: Some("203.0.113.9".to_string()),
                },
            }],
            ..Default::default()
        });

        let graph = build_graph(&[a], &[], &[]);
        let edges = graph.edges_of_kind(EdgeKind::SiteToSite);
        assert_eq!(edges.len(), 1);
        assert!(edges[0].dashed);
        assert_eq!(graph.nodes_of_kind(NodeKind::OnPremises).len(), 1);
    }

    #[test]
    fn test_vnet_to_vnet_connection_targets_counterpart_gateway() {
        let mut a = vnet("vnet-a", "S1");
        a.gateways.push(Gateway {
            id: "/gw/a".to_string(),
            name: "gw-a".to_string(),
            gateway_type: "Vpn".to_string(),
            connections: vec![GatewayConnection {
                name: "to-b".to_string(),
                connection_type: "IPsec".to_string(),
                status: Some("Connected".to_string()),
                remote_network: RemoteNetwork {
                    kind: RemoteNetworkKind::Vnet,
                    name: "vnet-b".to_string(),
                    ..Default::default()
                },
            }],
            ..Default::default()
        });
        let mut b = vnet("vnet-b", "S2");
        b.gateways.push(Gateway {
            id: "/gw/b".to_string(),
            name: "gw-b".to_string(),
            gateway_type: "Vpn".to_string(),
            ..Default::default()
        });

        let graph = build_graph(&[a, b], &[], &[]);
        let edges = graph.edges_of_kind(EdgeKind::SiteToSite);
        assert_eq!(edges.len(), 1);
        let target = graph.node(&edges[0].to).expect("target node exists");
        assert_eq!(target.kind, NodeKind::Gateway);
        assert_eq!(target.label, "gw-b");
        assert!(graph.nodes_of_kind(NodeKind::OnPremises).is_empty());
    }

    #[test]
    fn test_firewall_seen_from_host_and_standalone_list_gets_one_node() {
        let fw = AzureFirewall {
            id: "/fw/1".to_string(),
            name: "fw-01".to_string(),
            deployment: FirewallDeployment::Vnet,
            host_name: Some("vnet-a".to_string()),
            ..Default::default()
        };
        let mut a = vnet("vnet-a", "S1");
        a.firewalls.push(fw.clone());

        let graph = build_graph(&[a], &[], &[fw]);
        assert_eq!(graph.nodes_of_kind(NodeKind::Firewall).len(), 1);
        assert_eq!(graph.edges_of_kind(EdgeKind::FirewallAttachment).len(), 1);
    }

    #[test]
    fn test_unattached_firewall_is_node_without_edge() {
        let fw = AzureFirewall {
            id: "/fw/2".to_string(),
            name: "fw-orphan".to_string(),
            host_name: Some("nonexistent-vnet".to_string()),
            ..Default::default()
        };
        let graph = build_graph(&[], &[], &[fw]);
        assert_eq!(graph.nodes_of_kind(NodeKind::Firewall).len(), 1);
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn test_hub_express_route_connection_creates_circuit_node() {
        let mut h = hub("weu-hub-01");
        h.express_route_connections.push(crate::models::ExpressRouteConnection {
            name: "er-conn".to_string(),
            status: Some("Connected".to_string()),
            circuit_id: Some("/subscriptions/s/circuits/syd-er-01".to_string()),
            ..Default::default()
        });

        let graph = build_graph(&[], &[h], &[]);
        let circuits = graph.nodes_of_kind(NodeKind::Circuit);
        assert_eq!(circuits.len(), 1);
        assert_eq!(circuits[0].label, "syd-er-01");
        assert_eq!(graph.edges_of_kind(EdgeKind::ExpressRoute).len(), 1);
    }

    #[test]
    fn test_deterministic_output() {
        let mut a = vnet("vnet-a", "S1");
        a.peerings.push(peering("vnet-b"));
        let mut b = vnet("vnet-b", "S2");
        b.peerings.push(peering("vnet-a"));
        let hubs = vec![hub("weu-hub-01")];

        let g1 = build_graph(&[a.clone(), b.clone()], &hubs, &[]);
        let g2 = build_graph(&[a, b], &hubs, &[]);
        let ids1: Vec<_> = g1.nodes.iter().map(|n| (&n.id, &n.label)).collect();
        let ids2: Vec<_> = g2.nodes.iter().map(|n| (&n.id, &n.label)).collect();
        assert_eq!(ids1, ids2);
        assert_eq!(g1.edges.len(), g2.edges.len());
    }
}
