//! NSG rule risk findings, produced by the external NSG-rule analyzer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of an NSG rule finding.
///
/// Only the three defined severities participate in severity totals; any
/// other value deserializes to [`Severity::Unknown`] and is kept for display
/// but excluded from the counts.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Critical,
    High,
    Medium,
    #[serde(other)]
    Unknown,
}

impl Severity {
    /// Sort rank: Critical first, unrecognized values last.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::High => 1,
            Severity::Medium => 2,
            Severity::Unknown => 3,
        }
    }

    /// True for the three defined severities that participate in totals.
    pub fn is_counted(&self) -> bool {
        !matches!(self, Severity::Unknown)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Unknown => "Unknown",
        };
        write!(f, "{s}")
    }
}

/// A single risky NSG rule finding on a subnet.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NsgRisk {
    /// Severity of the finding.
    pub severity: Severity,
    /// Name of the offending NSG rule.
    pub rule_name: String,
    /// Rule direction (Inbound / Outbound).
    pub direction: String,
    /// Destination port or port range of the rule.
    pub port: String,
    /// Friendly name of the port (e.g. "RDP", "SSH").
    pub port_name: String,
    /// Source address filter of the rule.
    pub source: String,
    /// Destination address filter of the rule.
    pub destination: String,
    /// Protocol of the rule.
    pub protocol: String,
    /// Numeric rule priority (lower evaluates first).
    pub priority: u32,
    /// Free-text description of why the rule is risky.
    pub description: String,
    /// Name of the NSG the rule belongs to.
    pub nsg_name: String,
}

impl Default for NsgRisk {
    fn default() -> Self {
        NsgRisk {
            severity: Severity::Medium,
            rule_name: "".to_string(),
            direction: "Inbound".to_string(),
            port: "".to_string(),
            port_name: "".to_string(),
            source: "".to_string(),
            destination: "".to_string(),
            protocol: "*".to_string(),
            priority: 0,
            description: "".to_string(),
            nsg_name: "".to_string(),
        }
    }
}
