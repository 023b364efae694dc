//! Part contracts consumed by the engine.
//!
//! The engine never fetches or parses anything itself. A `PartFactory` turns
//! a reference into a `Part`, and a part completes its own data when asked to
//! resolve, registering any sub-parts it discovers through an `Expansion`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use pl_core::{PartId, Real};

use crate::error::BomResult;

/// Shared handle to an externally owned part.
pub type PartRef = Arc<dyn Part>;

/// An externally resolved part.
///
/// Implementations use interior mutability: `refresh` and `resolve` mutate
/// the part in place while rows hold shared handles to it. Both may block on
/// I/O; the engine does not bound or retry them.
pub trait Part: Send + Sync + fmt::Debug {
    /// Stable identity used for ordering and deduplication.
    fn id(&self) -> &PartId;

    /// Human readable title (quantity independent).
    fn title(&self) -> String;

    /// Cost of a single unit.
    fn unit_cost(&self) -> Real;

    /// Reference the part was created from.
    fn source(&self) -> String;

    /// Whether the cached data is still within its validity window.
    fn is_fresh(&self) -> bool;

    /// Whether the part has completed its data at least once.
    fn is_resolved(&self) -> bool;

    /// Re-fetch the part's own data. Side effect only.
    fn refresh(&self);

    /// Complete the part's data and register discovered sub-parts.
    ///
    /// A part that cannot be fetched should return `Ok(())` and keep
    /// reporting `is_resolved() == false`. A part must only report resolved
    /// once every sub-part has been registered: if `expansion` returns an
    /// error (the engine uses this for limit violations) the part stays
    /// unresolved and the error is returned, aborting the sweep. Resolving
    /// again later re-registers the same sub-parts; already counted
    /// quantities are not added twice.
    fn resolve(&self, expansion: &mut Expansion<'_>) -> BomResult<()>;
}

/// Strategy for turning a reference into a part.
pub trait PartFactory: Send + Sync {
    fn create_part(&self, reference: &str) -> BomResult<PartRef>;
}

/// Insertion point for sub-parts into an owning ledger.
pub trait PartSink {
    /// Make sure `per_unit` of `part` is counted for every unit of `parent`.
    ///
    /// Only the amount above what is already counted for this parent/child
    /// pair is added. Later growth of `parent` is carried down to `part`.
    fn link_sub_part(&mut self, parent: &PartId, part: PartRef, per_unit: Real) -> BomResult<()>;
}

/// Handle passed to [`Part::resolve`].
///
/// Sub-part quantities are given per unit of the part being resolved; the
/// ledger scales them by that part's row quantity, now and whenever the row
/// grows later.
pub struct Expansion<'a> {
    sink: &'a mut dyn PartSink,
    factory: &'a dyn PartFactory,
    parent: PartId,
    claimed: BTreeMap<PartId, Real>,
    added: usize,
}

impl<'a> Expansion<'a> {
    pub fn new(sink: &'a mut dyn PartSink, factory: &'a dyn PartFactory, parent: PartId) -> Self {
        Self {
            sink,
            factory,
            parent,
            claimed: BTreeMap::new(),
            added: 0,
        }
    }

    /// Identity of the part being resolved.
    pub fn parent(&self) -> &PartId {
        &self.parent
    }

    /// Number of sub-part additions made through this handle.
    pub fn added(&self) -> usize {
        self.added
    }

    /// Register `per_unit` of `part` for every unit of the resolving row.
    ///
    /// Repeated additions of the same identity accumulate.
    pub fn add_sub_part(&mut self, part: PartRef, per_unit: Real) -> BomResult<()> {
        let id = part.id().clone();
        let total = self.claimed.get(&id).copied().unwrap_or(0.0) + per_unit;
        self.sink.link_sub_part(&self.parent, part, total)?;
        self.claimed.insert(id, total);
        self.added += 1;
        Ok(())
    }

    /// Create a part from `reference` with the owning factory and register it.
    pub fn add_reference(&mut self, reference: &str, per_unit: Real) -> BomResult<()> {
        let part = self.factory.create_part(reference)?;
        self.add_sub_part(part, per_unit)
    }
}

/// Shared ordering capability for parts, usages and rows.
///
/// Everything that wraps a part compares by the wrapped part's identity. When
/// identities are equal and both sides carry a usage quantity, the quantities
/// break the tie (-1, 0 or 1). A bare part carries no quantity.
pub trait PartComparable {
    fn as_part(&self) -> &dyn Part;

    fn usage_quantity(&self) -> Option<Real> {
        None
    }

    fn identity(&self) -> &PartId {
        self.as_part().id()
    }

    fn compare_to<O: PartComparable + ?Sized>(&self, other: &O) -> i32 {
        let distance = self.identity().distance(other.identity());
        if distance != 0 {
            return distance;
        }
        match (self.usage_quantity(), other.usage_quantity()) {
            (Some(lhs), Some(rhs)) => lhs.total_cmp(&rhs) as i32,
            _ => 0,
        }
    }

    fn is_stale(&self) -> bool {
        !self.as_part().is_fresh()
    }

    /// Refresh the wrapped part if it reports stale. Returns whether it did.
    fn refresh_if_stale(&self) -> bool {
        if self.is_stale() {
            self.as_part().refresh();
            true
        } else {
            false
        }
    }
}

impl PartComparable for dyn Part {
    fn as_part(&self) -> &dyn Part {
        self
    }
}
