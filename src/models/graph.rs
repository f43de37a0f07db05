//! Topology graph output model consumed by the presentation layer.

use serde::{Deserialize, Serialize};

/// Kind of a topology node.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Vnet,
    Gateway,
    Hub,
    Firewall,
    OnPremises,
    Circuit,
    /// Peering target VNet outside the caller's visibility.
    UnknownVnet,
    /// Peering target hub outside the caller's visibility.
    UnknownHub,
}

/// A node in the topology graph.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Node {
    /// Synthetic node identifier, stable for identical input.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Kind of resource the node represents.
    pub kind: NodeKind,
    /// Subscription group tag, or "unknown" for unresolved resources.
    pub subscription: String,
    /// Group color assigned to the subscription.
    pub color: String,
    /// Free-text tooltip payload.
    pub tooltip: String,
}

/// Kind of a topology edge.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Peering,
    GatewayAttachment,
    FirewallAttachment,
    SiteToSite,
    ExpressRoute,
}

/// Gateway-transit directionality of a peering edge, inferred from the
/// UseRemoteGateways / AllowGatewayTransit flag pair.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitDirection {
    /// Both flags set: bidirectional gateway transit.
    Both,
    /// Local side routes through the remote side's gateway.
    ToRemote,
    /// Remote side routes through the local side's gateway.
    ToLocal,
}

/// An edge in the topology graph.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Edge {
    /// Source node id.
    pub from: String,
    /// Target node id.
    pub to: String,
    /// Kind of relationship.
    pub kind: EdgeKind,
    /// Status-derived color.
    pub color: String,
    /// Dashed style, used for disconnected or unverified links.
    pub dashed: bool,
    /// Gateway-transit direction hint, peering edges only.
    pub direction: Option<TransitDirection>,
}

/// The deduplicated node/edge set for one inventory snapshot.
///
/// Node and edge order is insertion order from the builder traversal, so
/// identical input always yields an identical sequence.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct TopologyGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl TopologyGraph {
    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Nodes of the given kind.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> Vec<&Node> {
        self.nodes.iter().filter(|n| n.kind == kind).collect()
    }

    /// Edges of the given kind.
    pub fn edges_of_kind(&self, kind: EdgeKind) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.kind == kind).collect()
    }
}
