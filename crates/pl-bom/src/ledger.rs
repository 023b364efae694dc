//! Ordered, deduplicating set of BOM rows.

use std::collections::BTreeMap;

use pl_core::{PartId, Real, accumulate_count, ensure_finite};
use tracing::{debug, info};

use crate::error::{BomError, BomResult};
use crate::part::{PartRef, PartSink};
use crate::usage::BomRow;

/// Rows keyed and ordered by part identity.
///
/// `maximum_parts == 0` means unlimited. Rows are never removed.
///
/// Besides the rows, the ledger remembers how much of each sub-part every
/// expanded parent counts per unit. When a parent row grows, the growth is
/// carried down to its sub-parts, so flattened quantities do not depend on
/// the order in which rows were expanded.
#[derive(Debug, Default)]
pub struct Ledger {
    rows: BTreeMap<PartId, BomRow>,
    links: BTreeMap<PartId, BTreeMap<PartId, Link>>,
    maximum_parts: usize,
}

/// A sub-part counted for each unit of its parent.
#[derive(Debug, Clone)]
struct Link {
    part: PartRef,
    per_unit: Real,
}

impl Ledger {
    pub fn new(maximum_parts: usize) -> Self {
        Self {
            rows: BTreeMap::new(),
            links: BTreeMap::new(),
            maximum_parts,
        }
    }

    pub fn maximum_parts(&self) -> usize {
        self.maximum_parts
    }

    pub fn set_maximum_parts(&mut self, maximum_parts: usize) {
        self.maximum_parts = maximum_parts;
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Floor lookup: the greatest row at or below `id`, kept only if equal.
    pub fn lookup(&self, id: &PartId) -> Option<&BomRow> {
        self.rows
            .range::<PartId, _>(..=id)
            .next_back()
            .filter(|(key, _)| key.distance(id) == 0)
            .map(|(_, row)| row)
    }

    /// Insert `part` or grow the quantity of its existing row. Returns the
    /// row's new quantity.
    ///
    /// Fails with [`BomError::LimitExceeded`] when a new identity would push
    /// the row count past a positive `maximum_parts`; nothing is added then.
    /// Growth of a row that was already expanded is carried down to the
    /// sub-parts it links.
    pub fn add_part(&mut self, part: PartRef, quantity: Real) -> BomResult<Real> {
        let mut path = Vec::new();
        self.insert(part, quantity, &mut path)
    }

    fn insert(&mut self, part: PartRef, quantity: Real, path: &mut Vec<PartId>) -> BomResult<Real> {
        let id = part.id().clone();
        let quantity = ensure_finite(quantity, "quantity").map_err(|_| BomError::InvalidQuantity {
            part: id.clone(),
            value: quantity,
        })?;

        if self.lookup(&id).is_none() {
            if self.maximum_parts > 0 && self.rows.len() >= self.maximum_parts {
                return Err(BomError::LimitExceeded {
                    limit: self.maximum_parts,
                    part: id,
                });
            }
            info!(part = %id, quantity, rows = self.rows.len() + 1, "added part");
        } else {
            debug!(part = %id, quantity, "merged part");
        }

        let row = self
            .rows
            .entry(id.clone())
            .or_insert_with(|| BomRow::new(part, 0.0));
        row.add_quantity(quantity);
        let total = row.quantity();

        self.propagate(&id, quantity, path)?;
        Ok(total)
    }

    /// Carry `growth` of `parent` down to its linked sub-parts. Links back
    /// into the current propagation path are skipped.
    fn propagate(&mut self, parent: &PartId, growth: Real, path: &mut Vec<PartId>) -> BomResult<()> {
        let links: Vec<Link> = match self.links.get(parent) {
            Some(links) if growth != 0.0 => links.values().cloned().collect(),
            _ => return Ok(()),
        };

        path.push(parent.clone());
        for link in links {
            if path.contains(link.part.id()) {
                continue;
            }
            self.insert(link.part, growth * link.per_unit, path)?;
        }
        path.pop();
        Ok(())
    }

    /// Per-unit quantity of `child` already counted for `parent`.
    pub fn linked_per_unit(&self, parent: &PartId, child: &PartId) -> Real {
        self.links
            .get(parent)
            .and_then(|links| links.get(child))
            .map_or(0.0, |link| link.per_unit)
    }

    /// Rows in ascending identity order.
    pub fn rows(&self) -> impl Iterator<Item = &BomRow> {
        self.rows.values()
    }

    /// Identity-first row.
    pub fn first(&self) -> Option<&BomRow> {
        self.rows.values().next()
    }

    pub fn is_resolved(&self) -> bool {
        self.rows().all(BomRow::is_resolved)
    }

    pub fn is_fresh(&self) -> bool {
        self.rows().all(BomRow::is_fresh)
    }

    /// Sum of quantity times unit cost.
    pub fn total_cost(&self) -> Real {
        self.rows().map(BomRow::extended_cost).sum()
    }

    /// Sum of quantities as an integer count.
    pub fn part_count(&self) -> i64 {
        self.rows()
            .map(BomRow::quantity)
            .fold(0, accumulate_count)
    }
}

impl PartSink for Ledger {
    fn link_sub_part(&mut self, parent: &PartId, part: PartRef, per_unit: Real) -> BomResult<()> {
        let child = part.id().clone();
        let per_unit = ensure_finite(per_unit, "per-unit quantity").map_err(|_| {
            BomError::InvalidQuantity {
                part: child.clone(),
                value: per_unit,
            }
        })?;
        let Some(parent_quantity) = self.lookup(parent).map(BomRow::quantity) else {
            return Err(BomError::UnknownParent {
                parent: parent.clone(),
            });
        };

        let counted = self.linked_per_unit(parent, &child);
        if per_unit <= counted {
            return Ok(());
        }
        self.add_part(part.clone(), (per_unit - counted) * parent_quantity)?;
        self.links
            .entry(parent.clone())
            .or_default()
            .insert(child, Link { part, per_unit });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeFactory;
    use crate::part::{PartFactory, PartSink};

    fn id(s: &str) -> PartId {
        PartId::new(s).unwrap()
    }

    #[test]
    fn duplicate_identity_merges_quantity() {
        let factory = FakeFactory::new();
        let mut ledger = Ledger::new(0);

        ledger.add_part(factory.create_part("m3").unwrap(), 2.0).unwrap();
        // A second part object for the same reference is the same identity.
        ledger.add_part(factory.create_part("m3").unwrap(), 3.5).unwrap();

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.lookup(&id("m3")).unwrap().quantity(), 5.5);
    }

    #[test]
    fn lookup_requires_exact_identity() {
        let factory = FakeFactory::new();
        let mut ledger = Ledger::new(0);
        for r in ["b", "d", "f"] {
            ledger.add_part(factory.create_part(r).unwrap(), 1.0).unwrap();
        }

        assert!(ledger.lookup(&id("d")).is_some());
        // Floor of "e" is "d", which is not equal.
        assert!(ledger.lookup(&id("e")).is_none());
        // No floor at all below "b".
        assert!(ledger.lookup(&id("a")).is_none());
        assert!(ledger.lookup(&id("z")).is_none());
    }

    #[test]
    fn rows_iterate_in_identity_order() {
        let factory = FakeFactory::new();
        let mut ledger = Ledger::new(0);
        for r in ["zeta", "alpha", "Mu", "beta"] {
            ledger.add_part(factory.create_part(r).unwrap(), 1.0).unwrap();
        }
        let order: Vec<_> = ledger.rows().map(|r| r.id().to_string()).collect();
        assert_eq!(order, vec!["Mu", "alpha", "beta", "zeta"]);
        assert_eq!(ledger.first().unwrap().id(), &id("Mu"));
    }

    #[test]
    fn limit_rejects_new_identity_but_not_duplicates() {
        let factory = FakeFactory::new();
        let mut ledger = Ledger::new(2);
        ledger.add_part(factory.create_part("a").unwrap(), 1.0).unwrap();
        ledger.add_part(factory.create_part("b").unwrap(), 1.0).unwrap();

        let err = ledger
            .add_part(factory.create_part("c").unwrap(), 1.0)
            .unwrap_err();
        assert!(err.is_limit_exceeded());
        assert_eq!(ledger.len(), 2);
        assert!(ledger.lookup(&id("c")).is_none());

        ledger.add_part(factory.create_part("a").unwrap(), 4.0).unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.lookup(&id("a")).unwrap().quantity(), 5.0);
    }

    #[test]
    fn non_finite_quantity_rejected() {
        let factory = FakeFactory::new();
        let mut ledger = Ledger::new(0);
        let err = ledger
            .add_part(factory.create_part("a").unwrap(), f64::NAN)
            .unwrap_err();
        assert!(matches!(err, BomError::InvalidQuantity { .. }));
        assert!(ledger.is_empty());
    }

    #[test]
    fn growth_of_expanded_row_reaches_its_sub_parts() {
        let factory = FakeFactory::new();
        let mut ledger = Ledger::new(0);
        ledger.add_part(factory.create_part("sub").unwrap(), 1.0).unwrap();
        ledger
            .link_sub_part(&id("sub"), factory.create_part("screw").unwrap(), 3.0)
            .unwrap();
        ledger
            .link_sub_part(&id("screw"), factory.create_part("thread").unwrap(), 2.0)
            .unwrap();
        assert_eq!(ledger.lookup(&id("screw")).unwrap().quantity(), 3.0);
        assert_eq!(ledger.lookup(&id("thread")).unwrap().quantity(), 6.0);

        assert_eq!(ledger.add_part(factory.create_part("sub").unwrap(), 1.0).unwrap(), 2.0);
        assert_eq!(ledger.lookup(&id("screw")).unwrap().quantity(), 6.0);
        assert_eq!(ledger.lookup(&id("thread")).unwrap().quantity(), 12.0);
        assert_eq!(ledger.linked_per_unit(&id("sub"), &id("screw")), 3.0);
    }

    #[test]
    fn relinking_only_adds_the_missing_amount() {
        let factory = FakeFactory::new();
        let mut ledger = Ledger::new(0);
        ledger.add_part(factory.create_part("kit").unwrap(), 2.0).unwrap();
        let kit = id("kit");

        ledger.link_sub_part(&kit, factory.create_part("nut").unwrap(), 4.0).unwrap();
        ledger.link_sub_part(&kit, factory.create_part("nut").unwrap(), 4.0).unwrap();
        assert_eq!(ledger.lookup(&id("nut")).unwrap().quantity(), 8.0);

        ledger.link_sub_part(&kit, factory.create_part("nut").unwrap(), 5.0).unwrap();
        assert_eq!(ledger.lookup(&id("nut")).unwrap().quantity(), 10.0);
    }

    #[test]
    fn self_link_does_not_loop() {
        let factory = FakeFactory::new();
        let mut ledger = Ledger::new(0);
        ledger.add_part(factory.create_part("loop").unwrap(), 1.0).unwrap();
        ledger
            .link_sub_part(&id("loop"), factory.create_part("loop").unwrap(), 1.0)
            .unwrap();
        assert_eq!(ledger.lookup(&id("loop")).unwrap().quantity(), 2.0);
    }

    #[test]
    fn link_requires_parent_row() {
        let factory = FakeFactory::new();
        let mut ledger = Ledger::new(0);
        let err = ledger
            .link_sub_part(&id("ghost"), factory.create_part("nut").unwrap(), 1.0)
            .unwrap_err();
        assert!(matches!(err, BomError::UnknownParent { .. }));
        assert!(ledger.is_empty());
    }

    #[test]
    fn aggregates_over_rows() {
        let factory = FakeFactory::new();
        factory.define("a", "A", 2.0, &[]);
        factory.define("b", "B", 0.1, &[]);
        let mut ledger = Ledger::new(0);
        ledger.add_part(factory.create_part("a").unwrap(), 1.5).unwrap();
        ledger.add_part(factory.create_part("b").unwrap(), 10.0).unwrap();

        assert!((ledger.total_cost() - 4.0).abs() < 1e-12);
        // 1.5 -> 1, then 1 + 10.0 -> 11
        assert_eq!(ledger.part_count(), 11);
    }
}
