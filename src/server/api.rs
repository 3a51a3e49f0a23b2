use serde::Serialize;
use thiserror::Error;

use crate::data::shop::Shop;
use crate::data::store::{SaveError, ShopStore};
use crate::data::validate::{Candidate, ValidationError};

#[derive(Debug, Error)]
pub enum ShopApiError {
    #[error("invalid request body: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("no shop at index {0}")]
    NotFound(usize),
    #[error("{0}")]
    Save(#[from] SaveError),
    #[error("failed to serialize response: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct ShopRow<'a> {
    pub index: usize,
    pub name: &'a str,
    pub cuisine: &'a str,
    pub dishes: &'a str,
    pub updated: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShopListResponse<'a> {
    pub total: usize,
    pub query: String,
    pub rows: Vec<ShopRow<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShopResponse<'a> {
    pub status: &'static str,
    pub index: usize,
    pub shop: &'a Shop,
}

pub fn health_payload(store: &ShopStore) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "foodmap",
        "version": env!("CARGO_PKG_VERSION"),
        "records": store.len(),
    }))
}

/// Row list, filtered by the `q` query parameter when present.
pub fn shops_payload(store: &ShopStore, path: &str) -> Result<String, serde_json::Error> {
    let query = query_param(path, "q").unwrap_or_default();
    let rows = store
        .filter(&query)
        .into_iter()
        .map(|(index, shop)| ShopRow {
            index,
            name: &shop.name,
            cuisine: &shop.cuisine,
            dishes: &shop.dishes,
            updated: &shop.updated,
        })
        .collect();
    serde_json::to_string_pretty(&ShopListResponse {
        total: store.len(),
        query,
        rows,
    })
}

pub fn shop_payload(store: &ShopStore, index: usize) -> Result<String, ShopApiError> {
    let shop = store.get(index).ok_or(ShopApiError::NotFound(index))?;
    shop_response(index, shop)
}

pub fn create_payload(store: &mut ShopStore, body: &str) -> Result<String, ShopApiError> {
    let shop = parse_candidate(body)?.validate()?;
    let index = store.append(shop)?;
    shop_response(index, &store.shops()[index])
}

pub fn update_payload(store: &mut ShopStore, index: usize, body: &str) -> Result<String, ShopApiError> {
    if store.get(index).is_none() {
        return Err(ShopApiError::NotFound(index));
    }
    let shop = parse_candidate(body)?.validate()?;
    store.replace(index, shop)?;
    shop_response(index, &store.shops()[index])
}

pub fn delete_payload(store: &mut ShopStore, index: usize) -> Result<String, ShopApiError> {
    if store.get(index).is_none() {
        return Err(ShopApiError::NotFound(index));
    }
    let removed = store.remove(index)?;
    shop_response(index, &removed)
}

fn shop_response(index: usize, shop: &Shop) -> Result<String, ShopApiError> {
    serde_json::to_string_pretty(&ShopResponse {
        status: "ok",
        index,
        shop,
    })
    .map_err(ShopApiError::Serialize)
}

fn parse_candidate(body: &str) -> Result<Candidate, ShopApiError> {
    serde_json::from_str(body).map_err(ShopApiError::Parse)
}

/// Value of `key` in the query string, percent-decoded.
pub fn query_param(path: &str, key: &str) -> Option<String> {
    let query = path.split_once('?')?.1;
    query
        .split('&')
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(name, _)| *name == key)
        .map(|(_, value)| percent_decode(value))
}

fn percent_decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
                match hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                    Some(byte) => {
                        out.push(byte);
                        i += 2;
                    }
                    None => out.push(b'%'),
                }
            }
            byte => out.push(byte),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
