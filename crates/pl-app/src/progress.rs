/// Stages of a resolve run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStage {
    OpeningCatalog,
    Resolving,
    Refreshing,
    BuildingReport,
    Completed,
}

impl ResolveStage {
    pub fn label(self) -> &'static str {
        match self {
            ResolveStage::OpeningCatalog => "opening catalog",
            ResolveStage::Resolving => "resolving",
            ResolveStage::Refreshing => "refreshing",
            ResolveStage::BuildingReport => "building report",
            ResolveStage::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolveProgressEvent {
    pub stage: ResolveStage,
    pub elapsed_wall_s: f64,
    pub sweep: Option<usize>,
    pub rows: usize,
    pub message: Option<String>,
}
