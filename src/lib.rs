//! Food map shop list: a JSON-file backed store of restaurant records with
//! legacy-shape migration, form validation, a command-line surface and a
//! local browser console.

pub mod cli;
pub mod config;
pub mod data;
pub mod logging;
pub mod server;

pub use data::shop::Shop;
pub use data::store::{LoadError, LoadReport, SaveError, ShopStore};
pub use data::validate::{Candidate, ValidationError};
