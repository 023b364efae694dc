//! The BOM: a lock-guarded ledger rooted at one part reference.
//!
//! Every operation that touches the rows takes the same per-BOM mutex.
//! `resolve` holds it for its whole sweep, including the insertions parts make
//! through their `Expansion`, so parts must never call back into the `Bom`
//! itself while resolving.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use pl_core::{PartId, Real, RefreshableTimer};
use tracing::{debug, info};

use crate::columns::{BomColumn, ColumnDescription, RowSnapshot};
use crate::error::BomResult;
use crate::ledger::Ledger;
use crate::part::{Expansion, PartComparable, PartFactory};
use crate::usage::BomRow;

/// Title of a BOM whose root row has not resolved yet.
pub const UNRESOLVED_TITLE: &str = "(Processing...)";

#[derive(Debug)]
struct BomState {
    ledger: Ledger,
    title: String,
    timer: RefreshableTimer,
}

pub struct Bom {
    source: String,
    factory: Arc<dyn PartFactory>,
    columns: Vec<ColumnDescription>,
    state: Mutex<BomState>,
}

impl Bom {
    /// Create a BOM whose first row is one unit of the part behind `source`.
    pub fn new(source: impl Into<String>, factory: Arc<dyn PartFactory>) -> BomResult<Self> {
        let source = source.into();
        let root = factory.create_part(&source)?;
        let mut ledger = Ledger::new(0);
        ledger.add_part(root, 1.0)?;
        Ok(Self {
            source,
            factory,
            columns: ColumnDescription::all(),
            state: Mutex::new(BomState {
                ledger,
                title: UNRESOLVED_TITLE.to_string(),
                timer: RefreshableTimer::new(),
            }),
        })
    }

    /// Cap the number of distinct rows (0 = unlimited).
    pub fn with_maximum_parts(mut self, maximum_parts: usize) -> Self {
        self.state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .ledger
            .set_maximum_parts(maximum_parts);
        self
    }

    fn lock(&self) -> MutexGuard<'_, BomState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn maximum_parts(&self) -> usize {
        self.lock().ledger.maximum_parts()
    }

    pub fn title(&self) -> String {
        self.lock().title.clone()
    }

    pub fn set_title(&self, title: impl Into<String>) -> &Self {
        self.lock().title = title.into();
        self
    }

    pub fn describe_columns(&self) -> &[ColumnDescription] {
        &self.columns
    }

    pub fn column(&self, column: BomColumn) -> Option<&ColumnDescription> {
        self.columns.iter().find(|c| c.column == column)
    }

    pub fn row_count(&self) -> usize {
        self.lock().ledger.len()
    }

    /// Copy of the row for `id`, if present.
    pub fn lookup(&self, id: &PartId) -> Option<BomRow> {
        self.lock().ledger.lookup(id).cloned()
    }

    /// Run `f` against the rows while holding the lock.
    pub fn with_ledger<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&self.lock().ledger)
    }

    /// Run `f` against the title and the rows under one lock.
    pub fn with_state<R>(&self, f: impl FnOnce(&str, &Ledger) -> R) -> R {
        let state = self.lock();
        f(&state.title, &state.ledger)
    }

    /// Snapshot of every row in identity order.
    pub fn rows(&self) -> Vec<RowSnapshot> {
        self.with_ledger(|ledger| ledger.rows().map(RowSnapshot::from).collect())
    }

    /// Ask every unresolved row to resolve, then take the title from the
    /// identity-first row if it is resolved.
    ///
    /// Rows discovered during the sweep are resolved in later rounds of the
    /// same call; each part is asked at most once per call. Sub-part
    /// quantities follow later growth of their parent rows, so the result
    /// does not depend on expansion order. Returns whether every row is now
    /// resolved. A limit violation aborts the sweep and leaves every row
    /// inserted before it in place; the interrupted part stays unresolved.
    pub fn resolve(&self) -> BomResult<bool> {
        let mut state = self.lock();

        if !state.ledger.is_resolved() {
            let mut visited: BTreeSet<PartId> = BTreeSet::new();
            let mut round = 0usize;
            loop {
                let pending: Vec<PartId> = state
                    .ledger
                    .rows()
                    .map(|row| row.id())
                    .filter(|id| !visited.contains(*id))
                    .cloned()
                    .collect();
                if pending.is_empty() {
                    break;
                }
                round += 1;
                debug!(round, pending = pending.len(), rows = state.ledger.len(), "resolve sweep");

                for id in pending {
                    let Some(part) = state.ledger.lookup(&id).map(|row| row.part().clone())
                    else {
                        continue;
                    };
                    visited.insert(id.clone());
                    if part.is_resolved() {
                        continue;
                    }
                    let mut expansion =
                        Expansion::new(&mut state.ledger, self.factory.as_ref(), id);
                    part.resolve(&mut expansion)?;
                    debug!(part = %expansion.parent(), added = expansion.added(), "expanded part");
                }
            }
        }

        let BomState { ledger, title, .. } = &mut *state;
        if let Some(first) = ledger.first()
            && first.is_resolved()
        {
            *title = first.title();
        }

        let resolved = ledger.is_resolved();
        if resolved {
            info!(source = %self.source, rows = ledger.len(), "bom resolved");
        }
        Ok(resolved)
    }

    /// Refresh every part that reports stale. Returns how many were refreshed.
    pub fn refresh(&self) -> usize {
        let state = self.lock();
        let mut refreshed = 0;
        for row in state.ledger.rows() {
            if row.refresh_if_stale() {
                refreshed += 1;
            }
        }
        debug!(refreshed, "bom refresh");
        refreshed
    }

    pub fn is_fresh(&self) -> bool {
        self.lock().ledger.is_fresh()
    }

    /// Cheap pre-check: every part currently fresh.
    pub fn is_valid(&self) -> bool {
        self.is_fresh()
    }

    pub fn is_resolved(&self) -> bool {
        self.lock().ledger.is_resolved()
    }

    /// Stamp the BOM's own staleness timer.
    pub fn sample(&self) {
        self.lock().timer.sample();
    }

    /// Time since the last `sample` (or construction).
    pub fn age(&self) -> Duration {
        self.lock().timer.age()
    }

    pub fn total_cost(&self) -> Real {
        self.lock().ledger.total_cost()
    }

    pub fn part_count(&self) -> i64 {
        self.lock().ledger.part_count()
    }
}

impl fmt::Debug for Bom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bom")
            .field("source", &self.source)
            .field("state", &*self.lock())
            .finish()
    }
}

impl fmt::Display for Bom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let titles: Vec<&str> = self.columns.iter().map(|c| c.title.as_str()).collect();
        f.write_str(&titles.join(", "))
    }
}
