use std::io::{self, Stdout, Write};
use std::sync::Mutex;

use error_stack::{Report, ResultExt};

use crate::error::PublishError;
use crate::model::AnalysisReport;
use crate::publisher::Publisher;

/// Writes one JSON object per report, newline terminated.
pub struct JsonLinesPublisher<W> {
    writer: Mutex<W>,
}

pub type StdoutPublisher = JsonLinesPublisher<Stdout>;

impl StdoutPublisher {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> JsonLinesPublisher<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> Publisher for JsonLinesPublisher<W> {
    fn publish(&self, report: &AnalysisReport) -> Result<(), Report<PublishError>> {
        let mut line = serde_json::to_vec(report)
            .change_context(PublishError::Serialize)
            .attach_with(|| format!("batch_id: {}", report.batch_id))?;
        line.push(b'\n');

        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        writer
            .write_all(&line)
            .and_then(|()| writer.flush())
            .change_context(PublishError::Write)
    }
}
