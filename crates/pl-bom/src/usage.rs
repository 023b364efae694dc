//! Ledger entries: a part plus an accumulated quantity.

use pl_core::{PartId, Real};

use crate::part::{Part, PartComparable, PartRef};

/// A part reference and how many of it are used.
#[derive(Debug, Clone)]
pub struct PartUsage {
    part: PartRef,
    quantity: Real,
}

impl PartUsage {
    /// Usage of a single unit of `part`.
    pub fn new(part: PartRef) -> Self {
        Self {
            part,
            quantity: 1.0,
        }
    }

    pub fn with_quantity(mut self, quantity: Real) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn part(&self) -> &PartRef {
        &self.part
    }

    pub fn id(&self) -> &PartId {
        self.part.id()
    }

    pub fn quantity(&self) -> Real {
        self.quantity
    }

    pub fn set_quantity(&mut self, quantity: Real) -> &mut Self {
        self.quantity = quantity;
        self
    }

    pub fn is_resolved(&self) -> bool {
        self.part.is_resolved()
    }

    /// Unit cost of the wrapped part. Quantity scaling happens in the BOM.
    pub fn unit_cost(&self) -> Real {
        self.part.unit_cost()
    }
}

impl PartComparable for PartUsage {
    fn as_part(&self) -> &dyn Part {
        self.part.as_ref()
    }

    fn usage_quantity(&self) -> Option<Real> {
        Some(self.quantity)
    }
}

/// A usage owned by a BOM ledger.
///
/// At most one row exists per identity in a ledger; repeated additions grow
/// the quantity. Rows are only created and mutated by the ledger.
#[derive(Debug, Clone)]
pub struct BomRow {
    usage: PartUsage,
}

impl BomRow {
    pub(crate) fn new(part: PartRef, quantity: Real) -> Self {
        Self {
            usage: PartUsage::new(part).with_quantity(quantity),
        }
    }

    pub(crate) fn add_quantity(&mut self, quantity: Real) {
        let total = self.usage.quantity() + quantity;
        self.usage.set_quantity(total);
    }

    pub fn usage(&self) -> &PartUsage {
        &self.usage
    }

    pub fn part(&self) -> &PartRef {
        self.usage.part()
    }

    pub fn id(&self) -> &PartId {
        self.usage.id()
    }

    pub fn title(&self) -> String {
        self.usage.part().title()
    }

    pub fn quantity(&self) -> Real {
        self.usage.quantity()
    }

    pub fn unit_cost(&self) -> Real {
        self.usage.unit_cost()
    }

    /// Quantity times unit cost.
    pub fn extended_cost(&self) -> Real {
        self.quantity() * self.unit_cost()
    }

    pub fn is_resolved(&self) -> bool {
        self.usage.is_resolved()
    }

    pub fn is_fresh(&self) -> bool {
        self.usage.part().is_fresh()
    }
}

impl PartComparable for BomRow {
    fn as_part(&self) -> &dyn Part {
        self.usage.as_part()
    }

    fn usage_quantity(&self) -> Option<Real> {
        self.usage.usage_quantity()
    }
}
