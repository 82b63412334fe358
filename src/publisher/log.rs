use error_stack::Report;

use crate::error::PublishError;
use crate::model::AnalysisReport;
use crate::publisher::Publisher;
use crate::summary::IndicatorSummary;

/// `RSI=54.21 MACD=0.1532 ... UO=n/a`
fn format_summary(summary: &IndicatorSummary) -> String {
    summary
        .iter()
        .map(|(kind, reading)| match reading.value() {
            Some(v) => format!("{kind}={v:.4}"),
            None => format!("{kind}=n/a"),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Emits each report as a structured `tracing` event.
pub struct LogPublisher;

impl Publisher for LogPublisher {
    fn publish(&self, report: &AnalysisReport) -> Result<(), Report<PublishError>> {
        tracing::info!(
            batch_id = %report.batch_id,
            symbol = report.symbol.as_deref().unwrap_or("-"),
            rows = report.rows,
            status = %report.status,
            indicators = report.summary.len(),
            summary = %format_summary(&report.summary),
            "momentum analysis",
        );
        Ok(())
    }
}
