//! Lumen Catalog Persistence Layer
//!
//! Provides:
//! - The current catalog schema (images, metadata, lists, selection, settings)
//! - Historical schemas and the migration chain
//! - Catalog file load/save

mod catalog;
mod legacy;
mod model;
mod schema;

pub use catalog::CatalogFile;
pub use legacy::{v1, v2};
pub use model::{
    FilterSettings, ImageAdjustments, ImageList, ImageMetadata, Label, ListColumn, ListColumnName,
    ListSettings, Rating, Rotation, Selection, State, ThumbnailRatio, ThumbnailSettings,
    CURRENT_VERSION,
};
pub use schema::{migrate, HistoricalState};

use directories::ProjectDirs;
use std::path::PathBuf;
use thiserror::Error;

/// Persistence errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported catalog version: {0}")]
    UnsupportedVersion(u64),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Default directory for catalog files
pub fn catalog_dir() -> PathBuf {
    ProjectDirs::from("com", "Lumen", "Lumen")
        .map(|dirs| dirs.data_dir().join("catalogs"))
        .unwrap_or_else(|| PathBuf::from("./catalogs"))
}
