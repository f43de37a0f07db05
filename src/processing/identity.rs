//! Resource identity normalization.
//!
//! Canonicalizes the identities the rest of the pipeline keys on:
//! - Virtual-WAN hub proxy VNets resolved back to their hub
//! - ExpressRoute circuit display names derived from partial data
//! - Stable dedup keys for peerings reported from both sides

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{ExpressRouteConnection, VirtualWanHub};

/// Fallback display name for a circuit nothing else could name.
pub const UNKNOWN_CIRCUIT: &str = "Unknown Circuit";

lazy_static! {
    /// Naming convention of the auto-generated VNet that stands in for a
    /// Virtual-WAN hub in peering records: "HV_<base>_<generated-id>".
    static ref HUB_PROXY_RE: Regex =
        Regex::new(r"^HV_(?P<base>.+)_[0-9A-Za-z-]+$").expect("hub proxy regex is valid");
}

/// True when a VNet name follows the hub proxy naming convention.
pub fn is_hub_proxy_name(name: &str) -> bool {
    HUB_PROXY_RE.is_match(name)
}

/// Strip the hub proxy prefix/suffix pattern, returning the base name.
///
/// Names not following the convention are returned unchanged, so the
/// function can be applied to both sides of a comparison.
pub fn strip_hub_proxy_name(name: &str) -> String {
    match HUB_PROXY_RE.captures(name) {
        Some(caps) => caps["base"].to_string(),
        None => name.to_string(),
    }
}

/// One strategy in the hub resolution chain.
struct HubMatcher {
    /// Label for trace logging.
    name: &'static str,
    /// Only applied to names that follow the proxy convention, so an
    /// ordinary VNet can never be aliased onto a hub by substring accident.
    proxy_only: bool,
    test: fn(&str, &str) -> bool,
}

fn match_exact(vnet_name: &str, hub_name: &str) -> bool {
    vnet_name == hub_name
}

fn match_stripped(vnet_name: &str, hub_name: &str) -> bool {
    strip_hub_proxy_name(vnet_name) == strip_hub_proxy_name(hub_name)
}

fn match_contains(vnet_name: &str, hub_name: &str) -> bool {
    let a = strip_hub_proxy_name(vnet_name);
    let b = strip_hub_proxy_name(hub_name);
    !a.is_empty() && !b.is_empty() && (a.contains(&b) || b.contains(&a))
}

/// Resolution precedence: exact match, then stripped-name match, then
/// stripped-name containment. The order is a deliberate policy; identical
/// input always resolves identically.
const HUB_MATCHERS: &[HubMatcher] = &[
    HubMatcher {
        name: "exact",
        proxy_only: false,
        test: match_exact,
    },
    HubMatcher {
        name: "stripped",
        proxy_only: false,
        test: match_stripped,
    },
    HubMatcher {
        name: "containment",
        proxy_only: true,
        test: match_contains,
    },
];

/// Resolve a VNet name to an existing Virtual-WAN hub, if it denotes one.
///
/// Each strategy is tried in precedence order over all hubs; the first
/// strategy that matches any hub wins. No match means the VNet is an
/// ordinary (unresolved) VNet.
pub fn resolve_hub_proxy<'a>(
    vnet_name: &str,
    hubs: &'a [VirtualWanHub],
) -> Option<&'a VirtualWanHub> {
    for matcher in HUB_MATCHERS {
        if matcher.proxy_only && !is_hub_proxy_name(vnet_name) {
            continue;
        }
        if let Some(hub) = hubs.iter().find(|h| (matcher.test)(vnet_name, &h.name)) {
            log::debug!(
                "Resolved VNet name '{vnet_name}' to hub '{hub}' via {strategy} match",
                hub = hub.name,
                strategy = matcher.name
            );
            return Some(hub);
        }
    }
    None
}

fn usable_name(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty() && !trimmed.eq_ignore_ascii_case("unknown")
}

/// Derive a display name for an ExpressRoute connection's circuit.
///
/// Priority: name on the attached circuit object, then the explicit
/// non-placeholder circuit name field, then the last path segment of the
/// circuit resource ID, then [`UNKNOWN_CIRCUIT`].
pub fn circuit_display_name(conn: &ExpressRouteConnection) -> String {
    if let Some(name) = conn.circuit.as_ref().and_then(|c| c.name.as_deref()) {
        if usable_name(name) {
            return name.to_string();
        }
    }
    if let Some(name) = conn.circuit_name.as_deref() {
        if usable_name(name) {
            return name.to_string();
        }
    }
    if let Some(id) = conn.circuit_id.as_deref() {
        if let Some(segment) = id.rsplit('/').find(|s| !s.trim().is_empty()) {
            return segment.to_string();
        }
    }
    UNKNOWN_CIRCUIT.to_string()
}

/// Dedup key for a VNet-to-VNet peering: both names sorted and joined, so
/// the record from either side produces the same key.
pub fn vnet_peering_key(local: &str, remote: &str) -> String {
    let (a, b) = if local <= remote {
        (local, remote)
    } else {
        (remote, local)
    };
    format!("peer:{a}:{b}")
}

/// Dedup key for a VNet-to-hub peering: (VNet name, hub name), so the hub's
/// own peering list collapses onto the VNet-side record.
pub fn hub_peering_key(vnet: &str, hub: &str) -> String {
    format!("hubpeer:{vnet}:{hub}")
}
