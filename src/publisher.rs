pub mod json_lines;
pub mod log;

use error_stack::Report;

use crate::error::PublishError;
use crate::model::AnalysisReport;

/// Sink for analysis reports.
pub trait Publisher: Send + Sync {
    fn publish(&self, report: &AnalysisReport) -> Result<(), Report<PublishError>>;
}
