// cargo watch -x 'fmt' -x 'run'  // 'run -- --some-arg'

pub mod inventory;
pub mod models;
pub mod output;
pub mod processing;

use std::error::Error;

use serde::{Deserialize, Serialize};

use inventory::Inventory;
use models::TopologyGraph;
use processing::{Aggregates, RiskRow};

/// Everything the presentation layer consumes for one snapshot: the
/// deduplicated topology graph, the aggregate counts and the sorted risks.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NetworkReport {
    pub graph: TopologyGraph,
    pub aggregates: Aggregates,
    pub risks: Vec<RiskRow>,
}

/// Read an inventory snapshot from its cache file.
pub fn load_inventory(cache_file: Option<&str>) -> Result<Inventory, Box<dyn Error>> {
    let inventory = inventory::read_inventory_cache(cache_file)?;
    Ok(inventory)
}

/// Run the whole engine over one snapshot.
///
/// Pure single-pass transformation: the snapshot is not mutated and
/// identical input always yields an identical report.
pub fn build_report(inventory: &Inventory) -> NetworkReport {
    let graph = processing::build_graph(&inventory.vnets, &inventory.hubs, &inventory.firewalls);
    let aggregates =
        processing::aggregate(&inventory.vnets, &inventory.hubs, &inventory.firewalls);
    let risks = processing::sort_risks(processing::collect_risks(&inventory.vnets));

    NetworkReport {
        graph,
        aggregates,
        risks,
    }
}
