//! Admin read side: deterministic filtering, statistics, and exports.

pub mod export;
pub mod query;

pub use export::{ExportFile, ExportFormat};
pub use query::AdminQueryService;
