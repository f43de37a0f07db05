//! Cache management for inventory snapshots.
//!
//! Collectors write the snapshot to a JSON cache file; the engine only ever
//! reads it back from there.

use std::error::Error;
use std::path::Path;

use super::snapshot::Inventory;

/// Read an inventory snapshot from a cache file.
///
/// # Arguments
/// * `cache_file` - Optional path to a specific cache file. If None, uses
///   today's default name (`inventory_cache_<YYYY-MM-DD>.json`).
///
/// # Returns
/// * `Ok(Inventory)` - The parsed snapshot
/// * `Err` - If the file is missing or the JSON does not parse
pub fn read_inventory_cache(cache_file: Option<&str>) -> Result<Inventory, Box<dyn Error>> {
    let now = chrono::Utc::now().with_timezone(&chrono_tz::Pacific::Auckland);

    let cache_file = match cache_file {
        Some(file) => {
            if !Path::new(file).exists() {
                return Err(format!("Cache file does not exist: {file}").into());
            }
            log::info!("Using provided cache file: {file}");
            file.to_string()
        }
        None => format!("inventory_cache_{}.json", now.format("%Y-%m-%d")),
    };

    let json = std::fs::read_to_string(&cache_file)
        .map_err(|e| format!("Error reading cache file {cache_file}: {e}"))?;
    log::info!("Reading from cache file: {cache_file}");

    // Report the JSON path of a parse failure, not just the line/column.
    let mut deserializer = serde_json::Deserializer::from_str(&json);
    let inventory: Inventory = serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|e| format!("Error parsing cache JSON at {}: {}", e.path(), e))?;

    log::info!(
        "Parsed inventory snapshot: {} vnets, {} hubs, {} firewalls",
        inventory.vnets.len(),
        inventory.hubs.len(),
        inventory.firewalls.len()
    );
    Ok(inventory)
}
