//! File-backed shop list. The store owns the list; every mutation rewrites the
//! whole file before returning.
//!
//! The file is assumed to belong to this process for the session. Changes made
//! by another writer between load and save are overwritten.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::data::normalize::{normalize_entry, NormalizeError};
use crate::data::shop::{timestamp_now, Shop};
use crate::data::validate::{check_shop, ValidationError};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read data file '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse data file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("data file '{}' must contain a JSON array", path.display())]
    NotAnArray { path: PathBuf },
    #[error("entry[{index}]: {source}")]
    Entry {
        index: usize,
        source: NormalizeError,
    },
    #[error("entry[{index}]: {source}")]
    Invalid {
        index: usize,
        source: ValidationError,
    },
    #[error("loaded data could not be written back: {0}")]
    Persist(#[from] SaveError),
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to serialize shops: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to write data file '{}': {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

impl SaveError {
    /// Notice shown next to the error so the user knows what to check.
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Serialize(_) => "the in-memory list is kept; retry after correcting the data",
            Self::Write { .. } => {
                "check that the file is not locked by another program and that you have write permission"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub records: usize,
    /// Records whose stored form changed when normalized.
    pub migrated: usize,
    pub created: bool,
}

#[derive(Debug, Clone)]
pub struct ShopStore {
    path: PathBuf,
    shops: Vec<Shop>,
}

impl ShopStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            shops: Vec::new(),
        }
    }

    /// Creates the store and loads it in one step.
    pub fn open(path: impl Into<PathBuf>) -> Result<(Self, LoadReport), LoadError> {
        let mut store = Self::new(path);
        let report = store.load()?;
        Ok((store, report))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn shops(&self) -> &[Shop] {
        &self.shops
    }

    pub fn get(&self, index: usize) -> Option<&Shop> {
        self.shops.get(index)
    }

    pub fn len(&self) -> usize {
        self.shops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shops.is_empty()
    }

    /// Reads, normalizes and validates the file, then writes the normalized
    /// form back. The list is only replaced once every entry has been accepted.
    pub fn load(&mut self) -> Result<LoadReport, LoadError> {
        let created = self.ensure_file()?;

        let raw = fs::read_to_string(&self.path).map_err(|source| LoadError::Read {
            path: self.path.clone(),
            source,
        })?;
        let payload: Value = serde_json::from_str(&raw).map_err(|source| LoadError::Parse {
            path: self.path.clone(),
            source,
        })?;
        let Value::Array(entries) = payload else {
            return Err(LoadError::NotAnArray {
                path: self.path.clone(),
            });
        };

        let now = timestamp_now();
        let mut shops = Vec::with_capacity(entries.len());
        let mut migrated = 0usize;
        for (index, entry) in entries.iter().enumerate() {
            let shop = normalize_entry(entry, &now)
                .map_err(|source| LoadError::Entry { index, source })?;
            check_shop(&shop).map_err(|source| LoadError::Invalid { index, source })?;
            if serde_json::to_value(&shop).ok().as_ref() != Some(entry) {
                migrated += 1;
            }
            shops.push(shop);
        }

        self.shops = shops;
        let report = LoadReport {
            records: self.shops.len(),
            migrated,
            created,
        };
        info!(
            path = %self.path.display(),
            records = report.records,
            migrated = report.migrated,
            created = report.created,
            "loaded shops"
        );

        self.save()?;
        Ok(report)
    }

    /// Rewrites the whole file. The in-memory list is kept on failure.
    pub fn save(&self) -> Result<(), SaveError> {
        let serialized = serde_json::to_string_pretty(&self.shops).map_err(SaveError::Serialize)?;
        fs::write(&self.path, serialized).map_err(|source| {
            warn!(path = %self.path.display(), error = %source, "save failed");
            SaveError::Write {
                path: self.path.clone(),
                source,
            }
        })?;
        debug!(path = %self.path.display(), records = self.shops.len(), "saved shops");
        Ok(())
    }

    /// Appends a validated shop and persists. Returns its index.
    pub fn append(&mut self, shop: Shop) -> Result<usize, SaveError> {
        info!(name = %shop.name, "appending shop");
        self.shops.push(shop);
        self.save()?;
        Ok(self.shops.len() - 1)
    }

    /// Replaces the shop at `index` and persists.
    ///
    /// # Panics
    /// If `index` is out of range. Callers take indices from the current list.
    pub fn replace(&mut self, index: usize, shop: Shop) -> Result<(), SaveError> {
        assert!(
            index < self.shops.len(),
            "replace index {index} out of range for {} shops",
            self.shops.len()
        );
        info!(index, name = %shop.name, "replacing shop");
        self.shops[index] = shop;
        self.save()
    }

    /// Removes the shop at `index` and persists. Returns the removed shop.
    ///
    /// # Panics
    /// If `index` is out of range.
    pub fn remove(&mut self, index: usize) -> Result<Shop, SaveError> {
        assert!(
            index < self.shops.len(),
            "remove index {index} out of range for {} shops",
            self.shops.len()
        );
        let removed = self.shops.remove(index);
        info!(index, name = %removed.name, "removed shop");
        self.save()?;
        Ok(removed)
    }

    /// Shops whose name, cuisine or dishes contain `term` (case-insensitive),
    /// paired with their position in the full list. The term is matched as
    /// given, spaces included; an empty term matches all.
    pub fn filter(&self, term: &str) -> Vec<(usize, &Shop)> {
        let needle = term.to_lowercase();
        self.shops
            .iter()
            .enumerate()
            .filter(|(_, shop)| shop.matches_lowercase(&needle))
            .collect()
    }

    fn ensure_file(&self) -> Result<bool, LoadError> {
        if self.path.exists() {
            return Ok(false);
        }
        let read_error = |source| LoadError::Read {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(read_error)?;
        }
        fs::write(&self.path, "[]").map_err(read_error)?;
        info!(path = %self.path.display(), "created empty data file");
        Ok(true)
    }
}
