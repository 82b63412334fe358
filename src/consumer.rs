use std::path::Path;
use std::pin::pin;
use std::sync::Arc;

use chrono::Utc;
use error_stack::{Report, ResultExt, bail};
use futures::StreamExt;
use futures::stream;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::engine::compute;
use crate::error::IngestError;
use crate::indicator::IndicatorKind;
use crate::model::{AnalysisReport, AnalysisStatus, Batch, Observation, price_cell};
use crate::publisher::Publisher;
use crate::summary::{Reading, summarize};

/// Incoming message shapes, tried in order.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Message {
    Envelope(Envelope),
    Payload(Payload),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    batch_id: Option<Uuid>,
    data: Payload,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Payload {
    Records(Vec<Observation>),
    Columns(Columns),
}

/// Column-oriented batch: one array per price field. Cells are decoded
/// like [`Observation`] fields.
#[derive(Debug, Deserialize)]
struct Columns {
    #[serde(rename = "Close", default)]
    close: Option<Vec<serde_json::Value>>,
    #[serde(rename = "High", default)]
    high: Option<Vec<serde_json::Value>>,
    #[serde(rename = "Low", default)]
    low: Option<Vec<serde_json::Value>>,
}

impl Columns {
    /// A missing column leaves that field unset on every row, which the
    /// engine reports as a schema error.
    fn into_observations(self) -> Result<Vec<Observation>, Report<IngestError>> {
        let named = [("Close", &self.close), ("High", &self.high), ("Low", &self.low)];
        let Some(rows) = named.iter().find_map(|(_, c)| c.as_ref().map(Vec::len)) else {
            bail!(IngestError::NoPriceColumns);
        };
        for (column, values) in named {
            let Some(values) = values else {
                continue;
            };
            if values.len() != rows {
                bail!(IngestError::ColumnLength {
                    column,
                    expected: rows,
                    actual: values.len(),
                });
            }
        }

        let cell = |column: &Option<Vec<serde_json::Value>>, i: usize| {
            column.as_ref().and_then(|c| price_cell(&c[i]))
        };
        Ok((0..rows)
            .map(|i| Observation {
                close: cell(&self.close, i),
                high: cell(&self.high, i),
                low: cell(&self.low, i),
            })
            .collect())
    }
}

impl Payload {
    fn into_observations(self) -> Result<Vec<Observation>, Report<IngestError>> {
        match self {
            Self::Records(records) => Ok(records),
            Self::Columns(columns) => columns.into_observations(),
        }
    }
}

/// Decode one message line into a [`Batch`].
///
/// Accepts a bare records array, a column object, or an envelope with
/// `symbol`, `batch_id` and `data`.
pub fn decode_batch(line: &str) -> Result<Batch, Report<IngestError>> {
    let message: Message = serde_json::from_str(line).change_context(IngestError::Decode)?;

    let (batch_id, symbol, payload) = match message {
        Message::Envelope(envelope) => (envelope.batch_id, envelope.symbol, envelope.data),
        Message::Payload(payload) => (None, None, payload),
    };

    Ok(Batch {
        batch_id: batch_id.unwrap_or_else(Uuid::new_v4),
        symbol,
        observations: payload.into_observations()?,
    })
}

/// Run the engine and the reducer over one batch.
pub fn analyze(batch: &Batch, include_series: bool) -> AnalysisReport {
    let series = compute(&batch.observations);
    let summary = summarize(&series);
    let status = if series.is_empty() {
        AnalysisStatus::Unavailable
    } else {
        AnalysisStatus::Ok
    };

    AnalysisReport {
        batch_id: batch.batch_id,
        symbol: batch.symbol.clone(),
        analyzed_at: Utc::now(),
        rows: batch.observations.len(),
        status,
        summary,
        series: include_series.then_some(series).filter(|s| !s.is_empty()),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConsumerOptions {
    pub channel_capacity: usize,
    pub concurrency: usize,
    pub include_series: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerStats {
    /// Non-blank lines read from the source.
    pub received: usize,
    /// Batches that produced a full analysis.
    pub analyzed: usize,
    /// Batches whose analysis was unavailable.
    pub empty: usize,
    /// Lines that could not be decoded.
    pub rejected: usize,
}

enum Outcome {
    Rejected,
    Report(AnalysisReport),
}

/// Open the configured input source; `"-"` means stdin.
pub async fn open_source(
    source: &str,
) -> Result<Box<dyn AsyncRead + Unpin + Send>, Report<IngestError>> {
    if source == "-" {
        return Ok(Box::new(tokio::io::stdin()));
    }
    let file = tokio::fs::File::open(Path::new(source))
        .await
        .change_context(IngestError::Open {
            source_name: source.to_string(),
        })?;
    Ok(Box::new(file))
}

/// Consume newline-delimited batches from `reader` until it is exhausted or
/// `cancel` fires, publishing one report per decoded batch.
pub async fn run<R>(
    reader: R,
    options: ConsumerOptions,
    publisher: Arc<dyn Publisher>,
    cancel: CancellationToken,
) -> Result<ConsumerStats, Report<IngestError>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<String>(options.channel_capacity);
    let reader_handle = tokio::spawn(read_lines(reader, tx, cancel));

    let lines = stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|line| (line, rx))
    });

    let mut outcomes = pin!(
        lines
            .map(|line| dispatch(line, options.include_series))
            .buffer_unordered(options.concurrency.max(1))
    );

    let mut stats = ConsumerStats::default();
    while let Some(outcome) = outcomes.next().await {
        stats.received += 1;
        let report = match outcome {
            Outcome::Rejected => {
                stats.rejected += 1;
                continue;
            }
            Outcome::Report(report) => report,
        };

        match report.status {
            AnalysisStatus::Ok => stats.analyzed += 1,
            AnalysisStatus::Unavailable => stats.empty += 1,
        }

        if let Err(e) = publisher.publish(&report) {
            warn!(error = ?e, batch_id = %report.batch_id, "failed to publish report");
        }
    }

    reader_handle.await.change_context(IngestError::Read)??;

    info!(
        received = stats.received,
        analyzed = stats.analyzed,
        empty = stats.empty,
        rejected = stats.rejected,
        "input exhausted"
    );
    Ok(stats)
}

async fn read_lines<R>(
    reader: R,
    tx: mpsc::Sender<String>,
    cancel: CancellationToken,
) -> Result<(), Report<IngestError>>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("reader cancelled");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line.change_context(IngestError::Read)? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                if tx.send(line).await.is_err() {
                    break;
                }
            }
        }
    }

    Ok(())
}

async fn dispatch(line: String, include_series: bool) -> Outcome {
    let batch = match decode_batch(&line) {
        Ok(batch) => batch,
        Err(e) => {
            warn!(error = ?e, "rejected price batch");
            return Outcome::Rejected;
        }
    };

    let span = info_span!(
        "batch",
        batch_id = %batch.batch_id,
        symbol = batch.symbol.as_deref().unwrap_or("-"),
        rows = batch.observations.len(),
    );

    let (batch_id, symbol, rows) = (batch.batch_id, batch.symbol.clone(), batch.observations.len());
    let worker_span = span.clone();
    let analysis = tokio::task::spawn_blocking(move || {
        let _entered = worker_span.enter();
        analyze(&batch, include_series)
    });

    async move {
        match analysis.await {
            Ok(report) => {
                info!(
                    status = %report.status,
                    rsi = ?report.summary.get(IndicatorKind::Rsi).and_then(Reading::value),
                    "batch analyzed"
                );
                Outcome::Report(report)
            }
            Err(e) => {
                error!(error = %e, "analysis task failed");
                Outcome::Report(AnalysisReport::unavailable(batch_id, symbol, rows))
            }
        }
    }
    .instrument(span)
    .await
}
