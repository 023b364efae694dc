//! pl-bom: bill-of-materials resolution engine.
//!
//! Provides:
//! - Part contracts (`Part`, `PartFactory`, `PartSink`, `PartComparable`)
//! - Ledger entries (`PartUsage`, `BomRow`)
//! - An ordered, deduplicating `Ledger` with a row limit
//! - `Bom`: the lock-guarded ledger with resolve/refresh/aggregate operations
//! - Column descriptions and a `Row` view for tabular rendering
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use pl_bom::Bom;
//! use pl_bom::fake::FakeFactory;
//!
//! let factory = Arc::new(FakeFactory::new());
//! factory.define("assembly", "Frame assembly", 40.0, &[("bolt", 8.0)]);
//! factory.define("bolt", "M5 bolt", 0.25, &[]);
//!
//! let bom = Bom::new("assembly", factory).unwrap();
//! assert!(bom.resolve().unwrap());
//! assert_eq!(bom.row_count(), 2);
//! assert_eq!(bom.total_cost(), 42.0);
//! assert_eq!(bom.title(), "Frame assembly");
//! ```

pub mod bom;
pub mod columns;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod fake;
pub mod ledger;
pub mod part;
pub mod usage;

// Re-exports for ergonomics
pub use bom::{Bom, UNRESOLVED_TITLE};
pub use columns::{BomColumn, CellValue, ColumnDescription, Row, RowSnapshot};
pub use error::{BomError, BomResult};
pub use ledger::Ledger;
pub use part::{Expansion, Part, PartComparable, PartFactory, PartRef, PartSink};
pub use usage::{BomRow, PartUsage};
