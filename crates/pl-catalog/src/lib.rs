//! pl-catalog: a local YAML part catalog that plugs into the BOM engine.
//!
//! The catalog stands in for a remote part source: each `CatalogPart` fetches
//! its definition from a shared `CatalogStore` when resolved or refreshed,
//! and the store can be reloaded from disk to pick up upstream changes.

pub mod part;
pub mod schema;
pub mod store;
pub mod validate;

pub use part::{CatalogPart, CatalogPartFactory, REFERENCE_PREFIX};
pub use schema::*;
pub use store::CatalogStore;
pub use validate::{ValidationError, validate_catalog};

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Catalog has no backing file")]
    NoBackingFile,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub fn load_yaml(path: &std::path::Path) -> CatalogResult<Catalog> {
    let content = std::fs::read_to_string(path)?;
    let catalog: Catalog = serde_yaml::from_str(&content)?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

pub fn save_yaml(path: &std::path::Path, catalog: &Catalog) -> CatalogResult<()> {
    validate_catalog(catalog)?;
    let content = serde_yaml::to_string(catalog)?;
    std::fs::write(path, content)?;
    Ok(())
}
