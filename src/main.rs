use azure_network_topology::build_report;
use azure_network_topology::load_inventory;
use azure_network_topology::output::print_summary;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    log4rs::init_file("log4rs.yml", Default::default()).expect("Error initializing log4rs");
    dotenv::dotenv().ok();
    //
    log::info!("#Start main()");

    let cache_file = std::env::args().nth(1);
    let inventory =
        load_inventory(cache_file.as_deref()).expect("Error reading inventory snapshot cache");

    let report = build_report(&inventory);
    print_summary(&report.aggregates, &report.risks);

    Ok(())
}
