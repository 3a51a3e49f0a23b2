//! Shop record: the single entity persisted in the data file.
//! Field order here is the key order written to disk.

use chrono::Local;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DATA_PATH: &str = "database/data-shops.json";

/// Timestamp layout used for `updated`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const DEFAULT_NAME: &str = "unnamed shop";
pub const DEFAULT_ADDRESS: &str = "address not provided";
pub const DEFAULT_DISHES: &str = "no recommended dishes yet";
pub const DEFAULT_CUISINE: &str = "no category yet";
pub const DEFAULT_RECOMMENDATION: &str = "no recommendation yet";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub name: String,
    pub address: String,
    /// Comma-separated dish names.
    pub dishes: String,
    pub cuisine: String,
    /// Free text, at most [`crate::data::validate::MAX_RECOMMENDATION_CHARS`] characters.
    pub recommendation: String,
    pub latitude: f64,
    pub longitude: f64,
    pub updated: String,
}

impl Shop {
    /// Dishes split on commas, trimmed, empty entries dropped.
    pub fn dish_list(&self) -> Vec<&str> {
        self.dishes
            .split(',')
            .map(str::trim)
            .filter(|dish| !dish.is_empty())
            .collect()
    }

    /// Case-insensitive substring match against name, cuisine and dishes.
    /// `needle` must already be lowercased.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.cuisine.to_lowercase().contains(needle)
            || self.dishes.to_lowercase().contains(needle)
    }
}

/// Current local time formatted as [`TIMESTAMP_FORMAT`].
pub fn timestamp_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}
