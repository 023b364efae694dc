//! Shared, reloadable catalog storage.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use tracing::{debug, info};

use crate::schema::{Catalog, CatalogSettings, PartDef};
use crate::{CatalogError, CatalogResult, load_yaml, validate_catalog};

/// The part source every `CatalogPart` fetches from.
#[derive(Debug)]
pub struct CatalogStore {
    path: Option<PathBuf>,
    catalog: RwLock<Catalog>,
    fetches: AtomicUsize,
}

impl CatalogStore {
    /// Wrap an in-memory catalog after validating it.
    pub fn new(catalog: Catalog) -> CatalogResult<Self> {
        validate_catalog(&catalog)?;
        Ok(Self {
            path: None,
            catalog: RwLock::new(catalog),
            fetches: AtomicUsize::new(0),
        })
    }

    /// Load a catalog from a YAML file and remember the path for reloads.
    pub fn open(path: &Path) -> CatalogResult<Self> {
        let catalog = load_yaml(path)?;
        info!(path = %path.display(), parts = catalog.parts.len(), "opened catalog");
        Ok(Self {
            path: Some(path.to_path_buf()),
            catalog: RwLock::new(catalog),
            fetches: AtomicUsize::new(0),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Re-read the backing file. Parts see the new data on their next fetch.
    pub fn reload(&self) -> CatalogResult<()> {
        let path = self.path.as_deref().ok_or(CatalogError::NoBackingFile)?;
        let catalog = load_yaml(path)?;
        info!(path = %path.display(), parts = catalog.parts.len(), "reloaded catalog");
        *self.catalog.write().unwrap_or_else(PoisonError::into_inner) = catalog;
        Ok(())
    }

    /// Swap in a new catalog after validating it.
    pub fn replace(&self, catalog: Catalog) -> CatalogResult<()> {
        validate_catalog(&catalog)?;
        *self.catalog.write().unwrap_or_else(PoisonError::into_inner) = catalog;
        Ok(())
    }

    /// Fetch the current definition of `id`.
    pub fn fetch(&self, id: &str) -> Option<PartDef> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        let part = self.read(|catalog| catalog.part(id).cloned());
        debug!(part = id, found = part.is_some(), "catalog fetch");
        part
    }

    /// Number of fetches served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    pub fn name(&self) -> String {
        self.read(|catalog| catalog.name.clone())
    }

    pub fn settings(&self) -> CatalogSettings {
        self.read(|catalog| catalog.settings.clone())
    }

    /// Freshness window; values too large for a `Duration` saturate.
    pub fn fresh_for(&self) -> Duration {
        Duration::try_from_secs_f64(self.read(Catalog::fresh_for_s)).unwrap_or(Duration::MAX)
    }

    /// Run `f` against the current catalog.
    pub fn read<R>(&self, f: impl FnOnce(&Catalog) -> R) -> R {
        let catalog = self.catalog.read().unwrap_or_else(PoisonError::into_inner);
        f(&catalog)
    }
}
