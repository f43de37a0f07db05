//! Topology reconciliation and risk-aggregation logic.
//!
//! This module contains the engine pipeline:
//! - [`identity`] - resource identity normalization and dedup keys
//! - [`topology`] - node/edge graph construction
//! - [`aggregate`] - connectivity and risk roll-ups
//! - [`risk`] - global risk ordering and severity badges

pub mod identity;

mod aggregate;
mod risk;
mod topology;

// Re-export public types and functions
pub use aggregate::{
    aggregate, Aggregates, NetworkTotals, SeverityCounts, SubnetSummary, SubscriptionSummary,
    VnetSummary, NSG_EXEMPT_SUBNETS,
};
pub use risk::{collect_risks, highest_severity, sort_risks, RiskRow};
pub use topology::{build_graph, build_graph_with, BuilderContext, UNKNOWN_SUBSCRIPTION};
