use error_stack::{Report, bail};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use tracing::{debug, error};

use crate::error::IndicatorError;
use crate::indicator::{IndicatorKind, Intermediates, Series, battery};
use crate::model::Observation;

/// A price series with one appended column per indicator.
///
/// The empty value (no rows, no columns) means "analysis unavailable" and is
/// distinct from a series whose cells happen to be undefined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichedSeries {
    close: Vec<f64>,
    high: Vec<f64>,
    low: Vec<f64>,
    columns: Vec<(IndicatorKind, Series)>,
}

impl EnrichedSeries {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    #[cfg(test)]
    pub fn column(&self, kind: IndicatorKind) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, values)| values.as_slice())
    }

    /// Indicator columns in output order.
    pub fn columns(&self) -> impl Iterator<Item = (IndicatorKind, &[Option<f64>])> {
        self.columns.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// The indicator cells of row `index`, in output order.
    pub fn row(&self, index: usize) -> Option<Vec<(IndicatorKind, Option<f64>)>> {
        if index >= self.len() {
            return None;
        }
        Some(self.columns.iter().map(|(k, v)| (*k, v[index])).collect())
    }

    pub fn last_row(&self) -> Option<Vec<(IndicatorKind, Option<f64>)>> {
        self.len().checked_sub(1).and_then(|i| self.row(i))
    }
}

/// Rows serialize as objects keyed by `Close`, `High`, `Low` and the
/// indicator names; undefined cells become `null`.
impl Serialize for EnrichedSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for i in 0..self.len() {
            seq.serialize_element(&RowView { series: self, index: i })?;
        }
        seq.end()
    }
}

struct RowView<'a> {
    series: &'a EnrichedSeries,
    index: usize,
}

impl Serialize for RowView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let s = self.series;
        let mut map = serializer.serialize_map(Some(3 + s.columns.len()))?;
        map.serialize_entry("Close", &s.close[self.index])?;
        map.serialize_entry("High", &s.high[self.index])?;
        map.serialize_entry("Low", &s.low[self.index])?;
        for (kind, values) in &s.columns {
            map.serialize_entry(kind.as_str(), &values[self.index])?;
        }
        map.end()
    }
}

/// Compute every indicator for `observations`.
///
/// Never fails: a missing price field or a non-finite price is logged and
/// yields [`EnrichedSeries::empty`].
pub fn compute(observations: &[Observation]) -> EnrichedSeries {
    match try_compute(observations) {
        Ok(series) => series,
        Err(report) => {
            error!(
                error = ?report,
                rows = observations.len(),
                "error computing momentum indicators"
            );
            EnrichedSeries::empty()
        }
    }
}

/// Fallible core of [`compute`]; the caller's observations are only read.
pub fn try_compute(observations: &[Observation]) -> Result<EnrichedSeries, Report<IndicatorError>> {
    if observations.is_empty() {
        debug!("empty price series, nothing to compute");
        return Ok(EnrichedSeries::empty());
    }

    let (close, high, low) = validate(observations)?;
    let inputs = Intermediates::new(close, high, low);

    let mut columns = Vec::with_capacity(IndicatorKind::ALL.len());
    for indicator in battery()? {
        if inputs.len() < indicator.required_candles() {
            debug!(
                indicator = ?indicator.outputs(),
                required = indicator.required_candles(),
                available = inputs.len(),
                "series shorter than warm-up, values will be undefined"
            );
        }
        let outputs = indicator.calculate(&inputs);
        columns.extend(indicator.outputs().iter().copied().zip(outputs));
    }

    debug!(rows = inputs.len(), "momentum indicators computed successfully");

    let Intermediates {
        close, high, low, ..
    } = inputs;
    Ok(EnrichedSeries {
        close,
        high,
        low,
        columns,
    })
}

fn validate(
    observations: &[Observation],
) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>), Report<IndicatorError>> {
    let mut close = Vec::with_capacity(observations.len());
    let mut high = Vec::with_capacity(observations.len());
    let mut low = Vec::with_capacity(observations.len());

    for (index, obs) in observations.iter().enumerate() {
        close.push(require(obs.close, "Close", index)?);
        high.push(require(obs.high, "High", index)?);
        low.push(require(obs.low, "Low", index)?);
    }

    Ok((close, high, low))
}

fn require(value: Option<f64>, field: &'static str, index: usize) -> Result<f64, Report<IndicatorError>> {
    let Some(value) = value else {
        bail!(IndicatorError::MissingField { field, index });
    };
    if !value.is_finite() {
        bail!(IndicatorError::NonFinite { field, index });
    }
    Ok(value)
}
