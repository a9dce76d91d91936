//! Data-driven building definitions for tilewire.
//!
//! Reads `buildings.{ron,toml,json}` from a content directory and builds a
//! validated [`tilewire_core::registry::Registry`] from it.

pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, bundled_data_dir, load_buildings};
