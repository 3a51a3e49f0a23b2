//! Upgrade a shop data file to the current record shape in place.
//! Run: cargo run --bin migrate_shops -- [path/to/data-shops.json]

use std::path::PathBuf;

use foodmap::config::AppConfig;
use foodmap::{logging, ShopStore};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_tracing();

    let config = AppConfig::resolve(std::env::args().nth(1).map(PathBuf::from));
    let (store, report) = ShopStore::open(&config.data_path)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    println!(
        "Migrated {} of {} shops in {}",
        report.migrated,
        store.len(),
        store.path().display()
    );
    Ok(())
}
