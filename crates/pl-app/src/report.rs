//! BOM reports: a detached, serializable view of a resolved BOM.

use std::path::Path;

use chrono::Utc;
use pl_bom::{Bom, ColumnDescription, RowSnapshot};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomReport {
    pub title: String,
    pub source: String,
    pub generated_at: String,
    pub maximum_parts: usize,
    pub columns: Vec<ColumnDescription>,
    pub rows: Vec<RowSnapshot>,
    pub total_cost: f64,
    pub part_count: i64,
    pub resolved: bool,
    pub fresh: bool,
}

impl BomReport {
    /// Capture `bom`. Rows and aggregates come from one locked snapshot.
    pub fn from_bom(bom: &Bom) -> Self {
        let (title, rows, total_cost, part_count, resolved, fresh, maximum_parts) =
            bom.with_state(|title, ledger| {
                (
                    title.to_string(),
                    ledger.rows().map(RowSnapshot::from).collect::<Vec<_>>(),
                    ledger.total_cost(),
                    ledger.part_count(),
                    ledger.is_resolved(),
                    ledger.is_fresh(),
                    ledger.maximum_parts(),
                )
            });

        Self {
            title,
            source: bom.source().to_string(),
            generated_at: Utc::now().to_rfc3339(),
            maximum_parts,
            columns: bom.describe_columns().to_vec(),
            rows,
            total_cost,
            part_count,
            resolved,
            fresh,
        }
    }
}

/// Save a report as pretty JSON.
pub fn save_report(path: &Path, report: &BomReport) -> AppResult<()> {
    let content = serde_json::to_string_pretty(report)?;
    std::fs::write(path, content).map_err(|e| AppError::ReportWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load a report saved by [`save_report`].
pub fn load_report(path: &Path) -> AppResult<BomReport> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ReportRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pl_bom::UNRESOLVED_TITLE;
    use pl_bom::fake::FakeFactory;
    use std::sync::Arc;

    #[test]
    fn title_and_rows_come_from_one_snapshot() {
        let factory = Arc::new(FakeFactory::new());
        factory.define("desk", "Standing desk", 120.0, &[("leg", 2.0)]);
        factory.define("leg", "Telescoping leg", 45.0, &[]);
        let bom = Bom::new("desk", factory).unwrap();

        let before = BomReport::from_bom(&bom);
        assert_eq!(before.title, UNRESOLVED_TITLE);
        assert_eq!(before.rows.len(), 1);
        assert!(!before.resolved);

        bom.resolve().unwrap();
        let after = BomReport::from_bom(&bom);
        // "desk" sorts before "leg".
        assert_eq!(after.title, "Standing desk");
        assert_eq!(after.rows.len(), 2);
        assert_eq!(after.total_cost, 210.0);
        assert_eq!(after.part_count, 3);
        assert!(after.resolved);
        assert_eq!(after.columns.len(), 6);
    }
}
