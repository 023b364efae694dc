//! Column descriptions and the row view used to render a BOM as a table.
//!
//! Nothing here formats output; frontends decide how cells are laid out.

use std::fmt;

use pl_core::Real;
use serde::{Deserialize, Serialize};

use crate::usage::BomRow;

/// Columns of a rendered BOM, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BomColumn {
    Id,
    Title,
    Quantity,
    UnitCost,
    Cost,
    Source,
}

impl BomColumn {
    pub const ALL: [BomColumn; 6] = [
        BomColumn::Id,
        BomColumn::Title,
        BomColumn::Quantity,
        BomColumn::UnitCost,
        BomColumn::Cost,
        BomColumn::Source,
    ];

    pub fn title(self) -> &'static str {
        match self {
            BomColumn::Id => "Id",
            BomColumn::Title => "Title",
            BomColumn::Quantity => "Quantity",
            BomColumn::UnitCost => "Unit Cost",
            BomColumn::Cost => "Cost",
            BomColumn::Source => "Source",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            BomColumn::Quantity | BomColumn::UnitCost | BomColumn::Cost
        )
    }
}

/// Metadata for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescription {
    pub column: BomColumn,
    pub title: String,
    pub numeric: bool,
}

impl ColumnDescription {
    pub fn create(column: BomColumn) -> Self {
        Self {
            column,
            title: column.title().to_string(),
            numeric: column.is_numeric(),
        }
    }

    /// Descriptions for every column in display order.
    pub fn all() -> Vec<ColumnDescription> {
        BomColumn::ALL.into_iter().map(Self::create).collect()
    }
}

/// A single table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(Real),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(text) => f.write_str(text),
            CellValue::Number(value) => write!(f, "{value}"),
        }
    }
}

/// Tabular view of a BOM row.
pub trait Row {
    fn item(&self, column: BomColumn) -> CellValue;
}

impl Row for BomRow {
    fn item(&self, column: BomColumn) -> CellValue {
        match column {
            BomColumn::Id => CellValue::Text(self.id().to_string()),
            BomColumn::Title => CellValue::Text(self.title()),
            BomColumn::Quantity => CellValue::Number(self.quantity()),
            BomColumn::UnitCost => CellValue::Number(self.unit_cost()),
            BomColumn::Cost => CellValue::Number(self.extended_cost()),
            BomColumn::Source => CellValue::Text(self.part().source()),
        }
    }
}

/// Detached copy of a row, taken under the BOM lock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowSnapshot {
    pub id: String,
    pub title: String,
    pub quantity: Real,
    pub unit_cost: Real,
    pub cost: Real,
    pub source: String,
    pub resolved: bool,
    pub fresh: bool,
}

impl From<&BomRow> for RowSnapshot {
    fn from(row: &BomRow) -> Self {
        Self {
            id: row.id().to_string(),
            title: row.title(),
            quantity: row.quantity(),
            unit_cost: row.unit_cost(),
            cost: row.extended_cost(),
            source: row.part().source(),
            resolved: row.is_resolved(),
            fresh: row.is_fresh(),
        }
    }
}

impl Row for RowSnapshot {
    fn item(&self, column: BomColumn) -> CellValue {
        match column {
            BomColumn::Id => CellValue::Text(self.id.clone()),
            BomColumn::Title => CellValue::Text(self.title.clone()),
            BomColumn::Quantity => CellValue::Number(self.quantity),
            BomColumn::UnitCost => CellValue::Number(self.unit_cost),
            BomColumn::Cost => CellValue::Number(self.cost),
            BomColumn::Source => CellValue::Text(self.source.clone()),
        }
    }
}
