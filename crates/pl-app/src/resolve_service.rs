//! BOM resolution service.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use pl_bom::Bom;
use pl_catalog::{CatalogPartFactory, CatalogStore};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::progress::{ResolveProgressEvent, ResolveStage};
use crate::report::BomReport;

/// Options for resolving a BOM.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Row limit; `None` falls back to the catalog settings (then unlimited).
    pub maximum_parts: Option<usize>,
    /// How many resolve calls to make before giving up on convergence.
    pub max_sweeps: usize,
    /// Refresh stale parts after resolution.
    pub refresh_stale: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            maximum_parts: None,
            max_sweeps: 8,
            refresh_stale: true,
        }
    }
}

/// Request to resolve a BOM rooted at `root`.
pub struct ResolveRequest<'a> {
    pub catalog_path: &'a Path,
    pub root: &'a str,
    pub options: ResolveOptions,
}

/// Response from a resolve run.
#[derive(Debug, Clone)]
pub struct ResolveResponse {
    pub report: BomReport,
    pub sweeps: usize,
    pub converged: bool,
    pub refreshed: usize,
    pub catalog_fetches: usize,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(ResolveProgressEvent)>,
    stage: ResolveStage,
    started: Instant,
    sweep: Option<usize>,
    rows: usize,
    message: Option<String>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(ResolveProgressEvent {
            stage,
            elapsed_wall_s: started.elapsed().as_secs_f64(),
            sweep,
            rows,
            message,
        });
    }
}

/// Resolve a BOM from a catalog file.
pub fn resolve_bom(request: &ResolveRequest) -> AppResult<ResolveResponse> {
    resolve_bom_with_progress(request, None)
}

/// Resolve a BOM from a catalog file and stream progress events.
pub fn resolve_bom_with_progress(
    request: &ResolveRequest,
    mut progress_cb: Option<&mut dyn FnMut(ResolveProgressEvent)>,
) -> AppResult<ResolveResponse> {
    let options = &request.options;
    if options.max_sweeps == 0 {
        return Err(AppError::InvalidInput(
            "max_sweeps must be at least 1".to_string(),
        ));
    }
    if request.root.trim().is_empty() {
        return Err(AppError::InvalidInput("root reference is empty".to_string()));
    }

    let started = Instant::now();
    emit_progress(
        &mut progress_cb,
        ResolveStage::OpeningCatalog,
        started,
        None,
        0,
        Some(request.catalog_path.display().to_string()),
    );

    let store = Arc::new(CatalogStore::open(request.catalog_path)?);
    let maximum_parts = options
        .maximum_parts
        .or(store.settings().maximum_parts)
        .unwrap_or(0);
    let factory = Arc::new(CatalogPartFactory::new(Arc::clone(&store)));
    let bom = Bom::new(request.root, factory)?.with_maximum_parts(maximum_parts);

    let mut sweeps = 0;
    let mut converged = false;
    while sweeps < options.max_sweeps {
        sweeps += 1;
        emit_progress(
            &mut progress_cb,
            ResolveStage::Resolving,
            started,
            Some(sweeps),
            bom.row_count(),
            None,
        );
        if bom.resolve()? {
            converged = true;
            break;
        }
    }

    if converged {
        info!(
            catalog = %store.name(),
            root = request.root,
            sweeps,
            rows = bom.row_count(),
            "resolved bom"
        );
    } else {
        warn!(
            root = request.root,
            sweeps,
            rows = bom.row_count(),
            "bom did not fully resolve"
        );
    }

    let mut refreshed = 0;
    if options.refresh_stale && !bom.is_fresh() {
        emit_progress(
            &mut progress_cb,
            ResolveStage::Refreshing,
            started,
            None,
            bom.row_count(),
            None,
        );
        refreshed = bom.refresh();
    }
    bom.sample();

    emit_progress(
        &mut progress_cb,
        ResolveStage::BuildingReport,
        started,
        None,
        bom.row_count(),
        None,
    );
    let report = BomReport::from_bom(&bom);

    emit_progress(
        &mut progress_cb,
        ResolveStage::Completed,
        started,
        Some(sweeps),
        report.rows.len(),
        Some(report.title.clone()),
    );

    Ok(ResolveResponse {
        report,
        sweeps,
        converged,
        refreshed,
        catalog_fetches: store.fetch_count(),
    })
}
