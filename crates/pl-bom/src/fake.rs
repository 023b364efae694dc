//! In-memory parts for tests and examples.
//!
//! `FakeFactory` hands out one shared `FakePart` per reference. Parts that
//! were never `define`d behave like an unreachable upstream: they stay
//! unresolved and stale no matter how often they are resolved or refreshed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use pl_core::{PartId, Real};

use crate::error::{BomError, BomResult};
use crate::part::{Expansion, Part, PartFactory, PartRef};

#[derive(Debug, Clone, Default)]
struct FakeDef {
    title: String,
    cost: Real,
    children: Vec<(String, Real)>,
}

#[derive(Debug, Default)]
struct FakeState {
    def: Option<FakeDef>,
    title: String,
    cost: Real,
    resolved: bool,
    fresh: bool,
}

#[derive(Debug)]
pub struct FakePart {
    id: PartId,
    state: Mutex<FakeState>,
    resolve_calls: AtomicUsize,
    refresh_calls: AtomicUsize,
}

impl FakePart {
    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark the cached data as expired.
    pub fn expire(&self) {
        self.lock().fresh = false;
    }

    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

impl Part for FakePart {
    fn id(&self) -> &PartId {
        &self.id
    }

    fn title(&self) -> String {
        self.lock().title.clone()
    }

    fn unit_cost(&self) -> Real {
        self.lock().cost
    }

    fn source(&self) -> String {
        format!("fake://{}", self.id)
    }

    fn is_fresh(&self) -> bool {
        self.lock().fresh
    }

    fn is_resolved(&self) -> bool {
        self.lock().resolved
    }

    fn refresh(&self) {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.lock();
        if let Some(def) = state.def.clone() {
            state.title = def.title;
            state.cost = def.cost;
            state.fresh = true;
        }
    }

    fn resolve(&self, expansion: &mut Expansion<'_>) -> BomResult<()> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        let children = {
            let mut state = self.lock();
            let Some(def) = state.def.clone() else {
                return Ok(());
            };
            state.title = def.title;
            state.cost = def.cost;
            state.fresh = true;
            def.children
        };
        for (reference, per_unit) in children {
            expansion.add_reference(&reference, per_unit)?;
        }
        self.lock().resolved = true;
        Ok(())
    }
}

/// Factory handing out shared fake parts.
#[derive(Debug, Default)]
pub struct FakeFactory {
    defs: Mutex<HashMap<String, FakeDef>>,
    parts: Mutex<HashMap<String, Arc<FakePart>>>,
}

impl FakeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define (or redefine) what resolving `reference` yields.
    pub fn define(&self, reference: &str, title: &str, cost: Real, children: &[(&str, Real)]) {
        let def = FakeDef {
            title: title.to_string(),
            cost,
            children: children
                .iter()
                .map(|(child, quantity)| (child.to_string(), *quantity))
                .collect(),
        };
        if let Some(part) = self.parts_lock().get(reference) {
            part.lock().def = Some(def.clone());
        }
        self.defs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(reference.to_string(), def);
    }

    /// The shared part for `reference`, if one has been created.
    pub fn part(&self, reference: &str) -> Option<Arc<FakePart>> {
        self.parts_lock().get(reference).cloned()
    }

    fn parts_lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<FakePart>>> {
        self.parts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PartFactory for FakeFactory {
    fn create_part(&self, reference: &str) -> BomResult<PartRef> {
        let id = PartId::new(reference).map_err(|_| BomError::InvalidReference {
            reference: reference.to_string(),
        })?;
        let def = self
            .defs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(reference)
            .cloned();
        let part = self
            .parts_lock()
            .entry(reference.to_string())
            .or_insert_with(|| {
                Arc::new(FakePart {
                    id,
                    state: Mutex::new(FakeState {
                        def,
                        ..FakeState::default()
                    }),
                    resolve_calls: AtomicUsize::new(0),
                    refresh_calls: AtomicUsize::new(0),
                })
            })
            .clone();
        Ok(part)
    }
}
