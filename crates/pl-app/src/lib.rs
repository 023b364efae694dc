//! Shared application service layer for partledger.
//!
//! This crate provides the interface frontends use: catalog loading and
//! listing, BOM resolution with progress reporting, and report persistence.

pub mod catalog_service;
pub mod error;
pub mod progress;
pub mod report;
pub mod resolve_service;

// Re-export key types for convenience
pub use catalog_service::{PartSummary, list_parts, load_catalog, validate};
pub use error::{AppError, AppResult};
pub use progress::{ResolveProgressEvent, ResolveStage};
pub use report::{BomReport, load_report, save_report};
pub use resolve_service::{
    ResolveOptions, ResolveRequest, ResolveResponse, resolve_bom, resolve_bom_with_progress,
};
