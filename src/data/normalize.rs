//! Maps one raw element of the data file, in any historical shape, to a [`Shop`].
//!
//! Current keys always win. Legacy aliases are listed explicitly below:
//! - `location` / `position`: a `[latitude, longitude]` pair
//! - `description`: HTML text of the form `📍 address<br>dish, dish`
//!
//! Missing text falls back to a per-field placeholder, missing coordinates to
//! `0.0` and a missing `updated` to the migration time. Unknown keys are ignored.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::data::shop::{
    Shop, DEFAULT_ADDRESS, DEFAULT_CUISINE, DEFAULT_DISHES, DEFAULT_NAME, DEFAULT_RECOMMENDATION,
};

pub const POSITION_ALIASES: &[&str] = &["location", "position"];
pub const COMBINED_TEXT_ALIASES: &[&str] = &["description"];

const BREAK_MARKERS: &[&str] = &["<br>", "<br/>", "<br />"];
const LOCATION_PIN: char = '\u{1F4CD}';
const VARIATION_SELECTOR: char = '\u{FE0F}';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("entry is not a JSON object")]
    NotAnObject,
    #[error("field '{field}' must be text")]
    InvalidText { field: &'static str },
    #[error("field '{field}' must be a number, found {found}")]
    InvalidNumber { field: &'static str, found: String },
    #[error("field '{field}' must be a [latitude, longitude] pair of numbers")]
    InvalidPosition { field: &'static str },
}

pub fn normalize_entry(value: &Value, now: &str) -> Result<Shop, NormalizeError> {
    let object = value.as_object().ok_or(NormalizeError::NotAnObject)?;

    let (legacy_address, legacy_dishes) = match combined_text(object)? {
        Some((address, dishes)) => (Some(address), Some(dishes)),
        None => (None, None),
    };
    let position = legacy_position(object)?;

    let latitude = match number_field(object, "latitude")? {
        Some(latitude) => latitude,
        None => position.map_or(0.0, |(latitude, _)| latitude),
    };
    let longitude = match number_field(object, "longitude")? {
        Some(longitude) => longitude,
        None => position.map_or(0.0, |(_, longitude)| longitude),
    };

    Ok(Shop {
        name: text_field(object, "name")?.unwrap_or_else(|| DEFAULT_NAME.to_string()),
        address: text_field(object, "address")?
            .or(legacy_address)
            .unwrap_or_else(|| DEFAULT_ADDRESS.to_string()),
        dishes: text_field(object, "dishes")?
            .or(legacy_dishes)
            .unwrap_or_else(|| DEFAULT_DISHES.to_string()),
        cuisine: text_field(object, "cuisine")?.unwrap_or_else(|| DEFAULT_CUISINE.to_string()),
        recommendation: text_field(object, "recommendation")?
            .unwrap_or_else(|| DEFAULT_RECOMMENDATION.to_string()),
        latitude,
        longitude,
        updated: text_field(object, "updated")?.unwrap_or_else(|| now.to_string()),
    })
}

/// Splits legacy HTML text into `(address, dishes)`.
/// Without a break marker the whole text is the address and dishes are empty.
pub fn split_description(text: &str) -> (String, String) {
    let folded = text.to_ascii_lowercase();
    let marker = BREAK_MARKERS
        .iter()
        .filter_map(|marker| folded.find(marker).map(|at| (at, marker.len())))
        .min_by_key(|(at, _)| *at);

    match marker {
        Some((at, len)) => (
            strip_pin(&text[..at]),
            text[at + len..].trim().to_string(),
        ),
        None => (strip_pin(text), String::new()),
    }
}

fn strip_pin(text: &str) -> String {
    let text = text.trim_start();
    let text = match text.strip_prefix(LOCATION_PIN) {
        Some(rest) => rest.trim_start_matches(VARIATION_SELECTOR),
        None => text,
    };
    text.trim().to_string()
}

fn combined_text(object: &Map<String, Value>) -> Result<Option<(String, String)>, NormalizeError> {
    for &field in COMBINED_TEXT_ALIASES {
        if let Some(text) = text_field(object, field)? {
            return Ok(Some(split_description(&text)));
        }
    }
    Ok(None)
}

fn legacy_position(object: &Map<String, Value>) -> Result<Option<(f64, f64)>, NormalizeError> {
    for &field in POSITION_ALIASES {
        let Some(value) = object.get(field) else {
            continue;
        };
        let pair = value
            .as_array()
            .filter(|items| items.len() == 2)
            .and_then(|items| Some((coerce_number(&items[0])?, coerce_number(&items[1])?)));
        return pair
            .map(Some)
            .ok_or(NormalizeError::InvalidPosition { field });
    }
    Ok(None)
}

fn text_field(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, NormalizeError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(value @ (Value::Number(_) | Value::Bool(_))) => Ok(Some(value.to_string())),
        Some(_) => Err(NormalizeError::InvalidText { field }),
    }
}

fn number_field(object: &Map<String, Value>, field: &'static str) -> Result<Option<f64>, NormalizeError> {
    let Some(value) = object.get(field) else {
        return Ok(None);
    };
    coerce_number(value)
        .map(Some)
        .ok_or_else(|| NormalizeError::InvalidNumber {
            field,
            found: value.to_string(),
        })
}

/// JSON numbers and numeric strings; everything else is rejected.
/// `"inf"` and `"nan"` parse here and are caught by the range rules on load.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const NOW: &str = "2025-01-02 03:04:05";

    #[test]
    fn migrates_position_array_and_html_description() {
        let raw = json!({
            "name": "Noodle Bar",
            "location": [1.23, 4.56],
            "description": "📍 123 Main St<br>Noodles, Dumplings"
        });
        let shop = normalize_entry(&raw, NOW).expect("legacy entry should normalize");
        assert_eq!(shop.latitude, 1.23);
        assert_eq!(shop.longitude, 4.56);
        assert_eq!(shop.address, "123 Main St");
        assert_eq!(shop.dishes, "Noodles, Dumplings");
        assert_eq!(shop.cuisine, DEFAULT_CUISINE);
        assert_eq!(shop.updated, NOW);
    }

    #[test]
    fn description_without_marker_becomes_address_only() {
        let raw = json!({ "name": "Corner", "description": "123 Main St" });
        let shop = normalize_entry(&raw, NOW).expect("entry should normalize");
        assert_eq!(shop.address, "123 Main St");
        assert_eq!(shop.dishes, "");
    }

    #[test]
    fn split_description_accepts_marker_variants() {
        assert_eq!(
            split_description("📍\u{FE0F} 9 Quay<BR />Bao"),
            ("9 Quay".to_string(), "Bao".to_string())
        );
        assert_eq!(
            split_description("A<br/>B<br>C"),
            ("A".to_string(), "B<br>C".to_string())
        );
    }

    #[test]
    fn fills_placeholders_for_missing_fields() {
        let shop = normalize_entry(&json!({}), NOW).expect("empty object should normalize");
        assert_eq!(shop.name, DEFAULT_NAME);
        assert_eq!(shop.address, DEFAULT_ADDRESS);
        assert_eq!(shop.dishes, DEFAULT_DISHES);
        assert_eq!(shop.cuisine, DEFAULT_CUISINE);
        assert_eq!(shop.recommendation, DEFAULT_RECOMMENDATION);
        assert_eq!(shop.latitude, 0.0);
        assert_eq!(shop.longitude, 0.0);
        assert_eq!(shop.updated, NOW);
    }

    #[test]
    fn current_keys_take_precedence_over_legacy_aliases() {
        let raw = json!({
            "name": "Both",
            "address": "current address",
            "latitude": 10.0,
            "position": [1.0, 2.0],
            "description": "old address<br>old dishes"
        });
        let shop = normalize_entry(&raw, NOW).expect("entry should normalize");
        assert_eq!(shop.address, "current address");
        assert_eq!(shop.dishes, "old dishes");
        assert_eq!(shop.latitude, 10.0);
        assert_eq!(shop.longitude, 2.0);
    }

    #[test]
    fn current_shape_entry_is_unchanged() {
        let raw = json!({
            "name": "Café Ümlaut",
            "address": "1 Rue",
            "dishes": "Crêpe",
            "cuisine": "French",
            "recommendation": "buttery",
            "latitude": 48.85,
            "longitude": 2.35,
            "updated": "2023-03-03 03:03:03",
            "extra": "ignored"
        });
        let shop = normalize_entry(&raw, NOW).expect("entry should normalize");
        assert_eq!(shop.name, "Café Ümlaut");
        assert_eq!(shop.updated, "2023-03-03 03:03:03");
        let mut expected = raw.clone();
        if let Some(object) = expected.as_object_mut() {
            object.remove("extra");
        }
        assert_eq!(serde_json::to_value(&shop).expect("serialize"), expected);
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let raw = json!({ "latitude": " 12.5 ", "longitude": "-3" });
        let shop = normalize_entry(&raw, NOW).expect("entry should normalize");
        assert_eq!(shop.latitude, 12.5);
        assert_eq!(shop.longitude, -3.0);
    }

    #[test]
    fn non_numeric_coordinates_fail() {
        let err = normalize_entry(&json!({ "latitude": "north" }), NOW).unwrap_err();
        assert_eq!(
            err,
            NormalizeError::InvalidNumber {
                field: "latitude",
                found: "\"north\"".to_string()
            }
        );
        assert!(matches!(
            normalize_entry(&json!({ "longitude": null }), NOW),
            Err(NormalizeError::InvalidNumber { field: "longitude", .. })
        ));
    }

    #[test]
    fn non_finite_strings_parse_as_numbers() {
        let shop = normalize_entry(&json!({ "latitude": "inf", "longitude": " NaN " }), NOW)
            .expect("non-finite text should parse");
        assert_eq!(shop.latitude, f64::INFINITY);
        assert!(shop.longitude.is_nan());
    }

    #[test]
    fn malformed_position_fails() {
        assert_eq!(
            normalize_entry(&json!({ "location": [1.0] }), NOW),
            Err(NormalizeError::InvalidPosition { field: "location" })
        );
        assert_eq!(
            normalize_entry(&json!({ "position": ["a", 2] }), NOW),
            Err(NormalizeError::InvalidPosition { field: "position" })
        );
    }

    #[test]
    fn rejects_non_objects_and_structured_text() {
        assert_eq!(
            normalize_entry(&json!([1, 2]), NOW),
            Err(NormalizeError::NotAnObject)
        );
        assert_eq!(
            normalize_entry(&json!({ "name": ["x"] }), NOW),
            Err(NormalizeError::InvalidText { field: "name" })
        );
    }

    #[test]
    fn scalar_text_is_kept_as_json_text() {
        let shop = normalize_entry(&json!({ "name": 42, "cuisine": null }), NOW).expect("normalize");
        assert_eq!(shop.name, "42");
        assert_eq!(shop.cuisine, DEFAULT_CUISINE);
    }
}
