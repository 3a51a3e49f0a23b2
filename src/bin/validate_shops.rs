//! Check a shop data file without rewriting it. Every entry is normalized and
//! validated; all problems are listed, not just the first.
//! Run: cargo run --bin validate_shops -- [path/to/data-shops.json]

use std::path::PathBuf;

use foodmap::config::AppConfig;
use foodmap::data::normalize::normalize_entry;
use foodmap::data::shop::timestamp_now;
use foodmap::data::validate::check_shop;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::resolve(std::env::args().nth(1).map(PathBuf::from));
    let path = &config.data_path;

    if !path.exists() {
        eprintln!("Data file not found: {}", path.display());
        std::process::exit(1);
    }

    let content = std::fs::read_to_string(path)?;
    let payload: serde_json::Value = serde_json::from_str(&content)?;
    let Some(entries) = payload.as_array() else {
        eprintln!("{}: top level must be a JSON array", path.display());
        std::process::exit(1);
    };

    let now = timestamp_now();
    let mut ok = 0;
    let mut err = 0;
    for (index, entry) in entries.iter().enumerate() {
        let shop = match normalize_entry(entry, &now) {
            Ok(shop) => shop,
            Err(e) => {
                eprintln!("[entry {index}] {e}");
                err += 1;
                continue;
            }
        };
        if let Err(e) = check_shop(&shop) {
            eprintln!("[entry {index}] '{}': {e}", shop.name);
            err += 1;
            continue;
        }
        ok += 1;
    }

    println!("Validated {} shops, {} ok, {} errors", entries.len(), ok, err);
    if err > 0 {
        std::process::exit(1);
    }
    Ok(())
}
