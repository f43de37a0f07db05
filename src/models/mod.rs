//! Domain models for the Azure network topology engine.
//!
//! This module contains the core data structures used throughout the engine:
//! - [`Vnet`], [`Subnet`], [`Peering`], [`Gateway`] - virtual network inventory
//! - [`VirtualWanHub`] and its connections - Virtual-WAN inventory
//! - [`AzureFirewall`] - firewall inventory
//! - [`NsgRisk`] and [`Severity`] - NSG rule analysis findings
//! - [`Node`], [`Edge`], [`TopologyGraph`] - the graph output model

mod firewall;
mod graph;
mod hub;
mod risk;
mod vnet;

// Re-export public types
pub use firewall::{AzureFirewall, FirewallDeployment};
pub use graph::{Edge, EdgeKind, Node, NodeKind, TopologyGraph, TransitDirection};
pub use hub::{CircuitReference, ExpressRouteConnection, RemoteSite, VirtualWanHub, VpnConnection};
pub use risk::{NsgRisk, Severity};
pub use vnet::{
    ConnectedDevice, Gateway, GatewayConnection, Peering, RemoteNetwork, RemoteNetworkKind,
    ServiceEndpoints, Subnet, Vnet,
};
