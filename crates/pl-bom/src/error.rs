//! Engine error types.

use pl_core::PartId;
use thiserror::Error;

pub type BomResult<T> = Result<T, BomError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BomError {
    /// Inserting a new identity would exceed the configured row limit.
    #[error("Maximum part limit exceeded: {limit} (rejected {part})")]
    LimitExceeded { limit: usize, part: PartId },

    #[error("Invalid quantity for {part}: {value}")]
    InvalidQuantity { part: PartId, value: f64 },

    #[error("Invalid part reference: {reference:?}")]
    InvalidReference { reference: String },

    /// A sub-part was registered for a parent that has no row.
    #[error("Unknown parent part: {parent}")]
    UnknownParent { parent: PartId },
}

impl BomError {
    /// True for resource-limit failures.
    pub fn is_limit_exceeded(&self) -> bool {
        matches!(self, BomError::LimitExceeded { .. })
    }
}
