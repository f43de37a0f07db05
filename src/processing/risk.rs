//! Global risk ordering for presentation.
//!
//! Flattens per-subnet NSG findings into context-carrying rows and sorts
//! them for the report: severity first, then subscription / VNet / subnet
//! context, then rule priority. The sort is stable so repeated runs on
//! identical input are byte-identical.

use serde::{Deserialize, Serialize};

use crate::models::{NsgRisk, Severity, Vnet};

/// One NSG finding with its full location context attached.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RiskRow {
    pub subscription_name: String,
    pub vnet_name: String,
    pub subnet_name: String,
    pub risk: NsgRisk,
}

/// Flatten every subnet's findings into rows, in inventory order.
pub fn collect_risks(vnets: &[Vnet]) -> Vec<RiskRow> {
    let mut rows = Vec::new();
    for vnet in vnets {
        for subnet in &vnet.subnets {
            for risk in &subnet.nsg_risks {
                rows.push(RiskRow {
                    subscription_name: vnet.subscription_name.clone(),
                    vnet_name: vnet.name.clone(),
                    subnet_name: subnet.name.clone(),
                    risk: risk.clone(),
                });
            }
        }
    }
    rows
}

/// Sort risk rows for display.
///
/// Keys, in order: severity rank (Critical first, unrecognized last),
/// subscription name, VNet name, subnet name, numeric rule priority
/// ascending. Ties keep input order (stable sort).
pub fn sort_risks(mut rows: Vec<RiskRow>) -> Vec<RiskRow> {
    rows.sort_by(|a, b| {
        a.risk
            .severity
            .rank()
            .cmp(&b.risk.severity.rank())
            .then_with(|| a.subscription_name.cmp(&b.subscription_name))
            .then_with(|| a.vnet_name.cmp(&b.vnet_name))
            .then_with(|| a.subnet_name.cmp(&b.subnet_name))
            .then_with(|| a.risk.priority.cmp(&b.risk.priority))
    });
    rows
}

/// Worst defined severity among a set of findings, for badge display.
///
/// Only Critical/High/Medium participate; a set holding nothing but
/// unrecognized severities has no badge.
pub fn highest_severity<'a>(risks: impl IntoIterator<Item = &'a NsgRisk>) -> Option<Severity> {
    risks
        .into_iter()
        .map(|r| r.severity)
        .filter(Severity::is_counted)
        .min_by_key(Severity::rank)
}
