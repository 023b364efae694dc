//! Catalog-backed parts.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pl_bom::{BomError, BomResult, Expansion, Part, PartFactory, PartRef};
use pl_core::{PartId, Real, RefreshableTimer};
use tracing::{debug, warn};

use crate::schema::PartDef;
use crate::store::CatalogStore;

/// Optional scheme accepted in front of catalog references.
pub const REFERENCE_PREFIX: &str = "catalog:";

#[derive(Debug)]
struct CatalogPartState {
    def: Option<PartDef>,
    resolved: bool,
    timer: RefreshableTimer,
}

/// A part whose data lives in a [`CatalogStore`].
#[derive(Debug)]
pub struct CatalogPart {
    id: PartId,
    store: Arc<CatalogStore>,
    state: Mutex<CatalogPartState>,
}

impl CatalogPart {
    pub fn new(id: PartId, store: Arc<CatalogStore>) -> Self {
        Self {
            id,
            store,
            state: Mutex::new(CatalogPartState {
                def: None,
                resolved: false,
                timer: RefreshableTimer::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CatalogPartState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the current definition and stamp the timer. `None` if the
    /// catalog no longer knows this part; cached data is kept in that case.
    fn fetch(&self) -> Option<PartDef> {
        let Some(def) = self.store.fetch(self.id.as_str()) else {
            warn!(part = %self.id, "part not found in catalog");
            return None;
        };
        let mut state = self.lock();
        state.def = Some(def.clone());
        state.timer.sample();
        Some(def)
    }
}

impl Part for CatalogPart {
    fn id(&self) -> &PartId {
        &self.id
    }

    fn title(&self) -> String {
        self.lock()
            .def
            .as_ref()
            .map(|def| def.title.clone())
            .unwrap_or_else(|| self.id.to_string())
    }

    fn unit_cost(&self) -> Real {
        self.lock().def.as_ref().map_or(0.0, |def| def.cost)
    }

    fn source(&self) -> String {
        self.lock()
            .def
            .as_ref()
            .and_then(|def| def.source.clone())
            .unwrap_or_else(|| format!("{REFERENCE_PREFIX}{}", self.id))
    }

    fn is_fresh(&self) -> bool {
        let fresh_for = self.store.fresh_for();
        let state = self.lock();
        state.def.is_some() && !state.timer.is_older_than(fresh_for)
    }

    fn is_resolved(&self) -> bool {
        self.lock().resolved
    }

    fn refresh(&self) {
        self.fetch();
    }

    fn resolve(&self, expansion: &mut Expansion<'_>) -> BomResult<()> {
        let Some(def) = self.fetch() else {
            return Ok(());
        };
        for child in &def.children {
            expansion.add_reference(&child.part, child.quantity)?;
        }
        self.lock().resolved = true;
        debug!(part = %expansion.parent(), children = def.children.len(), "resolved catalog part");
        Ok(())
    }
}

/// Creates [`CatalogPart`]s from references like `bolt` or `catalog:bolt`.
#[derive(Debug, Clone)]
pub struct CatalogPartFactory {
    store: Arc<CatalogStore>,
}

impl CatalogPartFactory {
    pub fn new(store: Arc<CatalogStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<CatalogStore> {
        &self.store
    }
}

impl PartFactory for CatalogPartFactory {
    fn create_part(&self, reference: &str) -> BomResult<PartRef> {
        let id = reference
            .strip_prefix(REFERENCE_PREFIX)
            .unwrap_or(reference)
            .trim();
        let id = PartId::new(id).map_err(|_| BomError::InvalidReference {
            reference: reference.to_string(),
        })?;
        Ok(Arc::new(CatalogPart::new(id, Arc::clone(&self.store))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_strips_scheme() {
        let store = Arc::new(
            CatalogStore::new(crate::schema::Catalog {
                version: 1,
                name: "t".into(),
                settings: Default::default(),
                parts: vec![],
            })
            .unwrap(),
        );
        let factory = CatalogPartFactory::new(store);
        let part = factory.create_part("catalog:m3-nut").unwrap();
        assert_eq!(part.id().as_str(), "m3-nut");
        assert_eq!(part.source(), "catalog:m3-nut");
        assert!(!part.is_resolved());
        assert!(!part.is_fresh());

        assert!(matches!(
            factory.create_part("catalog:  "),
            Err(BomError::InvalidReference { .. })
        ));
    }
}
