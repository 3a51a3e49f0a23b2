//! Form validation: turns raw user-entered values into an accepted [`Shop`].
//! Rules run in a fixed order and the first failure is reported.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::data::shop::{timestamp_now, Shop};

pub const MAX_RECOMMENDATION_CHARS: usize = 100;
pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("latitude and longitude must be numbers")]
    InvalidNumber,
    #[error("shop name must not be empty")]
    EmptyName,
    #[error("recommendation must be at most 100 characters")]
    TextTooLong,
    #[error("latitude must be between -90 and 90")]
    LatitudeOutOfRange,
    #[error("longitude must be between -180 and 180")]
    LongitudeOutOfRange,
}

impl ValidationError {
    /// Stable tag used in API payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidNumber => "invalid_number",
            Self::EmptyName => "empty_name",
            Self::TextTooLong => "text_too_long",
            Self::LatitudeOutOfRange => "latitude_out_of_range",
            Self::LongitudeOutOfRange => "longitude_out_of_range",
        }
    }
}

/// Raw form values. Coordinates stay unparsed text until validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Candidate {
    pub name: String,
    pub address: String,
    pub dishes: String,
    pub cuisine: String,
    pub recommendation: String,
    #[serde(deserialize_with = "text_or_number")]
    pub latitude: String,
    #[serde(deserialize_with = "text_or_number")]
    pub longitude: String,
}

impl Candidate {
    /// Pre-fills a form with the values of an existing shop.
    pub fn from_shop(shop: &Shop) -> Self {
        Self {
            name: shop.name.clone(),
            address: shop.address.clone(),
            dishes: shop.dishes.clone(),
            cuisine: shop.cuisine.clone(),
            recommendation: shop.recommendation.clone(),
            latitude: shop.latitude.to_string(),
            longitude: shop.longitude.to_string(),
        }
    }

    pub fn validate(&self) -> Result<Shop, ValidationError> {
        self.validate_at(timestamp_now())
    }

    /// Same as [`Candidate::validate`] with an explicit `updated` stamp.
    pub fn validate_at(&self, updated: String) -> Result<Shop, ValidationError> {
        let latitude = parse_coordinate(&self.latitude)?;
        let longitude = parse_coordinate(&self.longitude)?;

        let shop = Shop {
            name: self.name.trim().to_string(),
            address: self.address.trim().to_string(),
            dishes: self.dishes.trim().to_string(),
            cuisine: self.cuisine.trim().to_string(),
            recommendation: self.recommendation.trim().to_string(),
            latitude,
            longitude,
            updated,
        };
        check_shop(&shop)?;
        Ok(shop)
    }
}

/// Applies the name, length and range rules to an already typed shop.
pub fn check_shop(shop: &Shop) -> Result<(), ValidationError> {
    if shop.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if shop.recommendation.trim().chars().count() > MAX_RECOMMENDATION_CHARS {
        return Err(ValidationError::TextTooLong);
    }
    if !in_range(shop.latitude, LATITUDE_RANGE) {
        return Err(ValidationError::LatitudeOutOfRange);
    }
    if !in_range(shop.longitude, LONGITUDE_RANGE) {
        return Err(ValidationError::LongitudeOutOfRange);
    }
    Ok(())
}

fn in_range(value: f64, (min, max): (f64, f64)) -> bool {
    (min..=max).contains(&value)
}

fn parse_coordinate(raw: &str) -> Result<f64, ValidationError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ValidationError::InvalidNumber)
}

fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(text) => text,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}
