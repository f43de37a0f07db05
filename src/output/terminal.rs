//! Terminal output utilities.
//!
//! Prints the aggregate record and the sorted risk list as aligned,
//! colored text.

use colored::Colorize;
use itertools::Itertools;

use crate::models::Severity;
use crate::processing::{Aggregates, RiskRow};

/// Format a value as a quoted, right-aligned field.
///
/// # Arguments
/// * `value` - The value to format
/// * `width` - The minimum width of the field
///
/// # Returns
/// A quoted, right-aligned string
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let value_str = value.to_string();
    let quoted = format!("\"{value_str}\"");
    let quoted_len = quoted.len();

    if quoted_len >= width {
        quoted
    } else {
        format!("{quoted:>width$}")
    }
}

fn severity_badge(severity: Option<Severity>) -> String {
    match severity {
        Some(Severity::Critical) => "Critical".red().bold().to_string(),
        Some(Severity::High) => "High".yellow().bold().to_string(),
        Some(Severity::Medium) => "Medium".blue().to_string(),
        Some(Severity::Unknown) | None => "-".normal().to_string(),
    }
}

/// Print the aggregate totals, per-subscription badges and the sorted risk
/// list to stdout.
pub fn print_summary(aggregates: &Aggregates, risks: &[RiskRow]) {
    let t = &aggregates.totals;
    println!("{}", "Network summary".bold());
    println!(
        "  VNets: {}  Subnets: {}  Hubs: {}  Firewalls: {}  Gateways: {}",
        t.vnet_count, t.subnet_count, t.hub_count, t.firewall_count, t.gateway_count
    );
    println!(
        "  Peerings (unique): {}  S2S: {}  ExpressRoute: {}  Disconnected: {}",
        t.unique_peering_count,
        t.s2s_connection_count,
        t.express_route_connection_count,
        t.disconnected_connection_count
    );
    println!(
        "  NSGs: {}  Subnets missing NSG: {}  Service endpoints: {}  Devices: {}",
        t.nsg_count, t.missing_nsg_count, t.service_endpoint_count, t.device_count
    );
    println!(
        "  Risks: {} ({} critical, {} high, {} medium)",
        t.severity.total(),
        t.severity.critical.to_string().red(),
        t.severity.high.to_string().yellow(),
        t.severity.medium.to_string().blue()
    );

    if !aggregates.subscriptions.is_empty() {
        println!("\n{}", "Subscriptions".bold());
        for sub in &aggregates.subscriptions {
            println!(
                "  {} - {} VNets, worst severity: {}",
                format_field(&sub.name, 24),
                sub.vnet_count,
                severity_badge(sub.highest_severity)
            );
        }
    }

    if !risks.is_empty() {
        println!("\n{}", "Risks".bold());
        for row in risks {
            let context = [
                row.subscription_name.as_str(),
                row.vnet_name.as_str(),
                row.subnet_name.as_str(),
            ]
            .iter()
            .join(" / ");
            println!(
                "  [{}] {} {} ({} port {}, priority {})",
                severity_badge(Some(row.risk.severity)),
                context,
                row.risk.rule_name,
                row.risk.direction,
                row.risk.port,
                row.risk.priority
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_field_short() {
        assert_eq!(format_field("test", 10), "    \"test\"");
    }

    #[test]
    fn test_format_field_exact() {
        assert_eq!(format_field("test", 6), "\"test\"");
    }

    #[test]
    fn test_format_field_long() {
        assert_eq!(format_field("long_value", 5), "\"long_value\"");
    }

    #[test]
    fn test_format_field_number() {
        assert_eq!(format_field(42, 6), "  \"42\"");
    }
}
