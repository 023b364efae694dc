//! Catalog loading, validation, and introspection.

use std::path::Path;

use pl_catalog::Catalog;

use crate::error::{AppError, AppResult};

/// Summary of a catalog part for listing.
#[derive(Debug, Clone)]
pub struct PartSummary {
    pub id: String,
    pub title: String,
    pub cost: f64,
    pub child_count: usize,
}

/// Load and validate a catalog from a YAML file.
pub fn load_catalog(path: &Path) -> AppResult<Catalog> {
    if !path.exists() {
        return Err(AppError::CatalogFileRead {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "catalog file not found"),
        });
    }
    Ok(pl_catalog::load_yaml(path)?)
}

/// Validate catalog structure.
pub fn validate(catalog: &Catalog) -> AppResult<()> {
    pl_catalog::validate_catalog(catalog).map_err(|e| AppError::Validation(e.to_string()))
}

/// List all parts in the catalog with summaries.
pub fn list_parts(catalog: &Catalog) -> Vec<PartSummary> {
    catalog
        .parts
        .iter()
        .map(|part| PartSummary {
            id: part.id.clone(),
            title: part.title.clone(),
            cost: part.cost,
            child_count: part.children.len(),
        })
        .collect()
}
