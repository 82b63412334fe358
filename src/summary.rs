use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::engine::EnrichedSeries;
use crate::indicator::IndicatorKind;

/// Latest value of one indicator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    Value(f64),
    /// Undefined at the last row (warm-up, zero denominator).
    Unavailable,
}

impl Reading {
    fn from_cell(cell: Option<f64>) -> Self {
        match cell {
            Some(v) if v.is_finite() => Self::Value(v),
            _ => Self::Unavailable,
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(v),
            Self::Unavailable => None,
        }
    }
}

impl Serialize for Reading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => serializer.serialize_f64(*v),
            Self::Unavailable => serializer.serialize_none(),
        }
    }
}

/// Indicator name to latest reading; empty when no analysis was possible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSummary {
    readings: Vec<(IndicatorKind, Reading)>,
}

impl IndicatorSummary {
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// `None` when the summary is empty.
    pub fn get(&self, kind: IndicatorKind) -> Option<Reading> {
        self.readings
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, reading)| *reading)
    }

    pub fn iter(&self) -> impl Iterator<Item = (IndicatorKind, Reading)> + '_ {
        self.readings.iter().copied()
    }
}

impl Serialize for IndicatorSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.readings.len()))?;
        for (kind, reading) in &self.readings {
            map.serialize_entry(kind.as_str(), reading)?;
        }
        map.end()
    }
}

/// Reduce an enriched series to its last row.
pub fn summarize(series: &EnrichedSeries) -> IndicatorSummary {
    let Some(row) = series.last_row() else {
        return IndicatorSummary::default();
    };

    IndicatorSummary {
        readings: row
            .into_iter()
            .map(|(kind, cell)| (kind, Reading::from_cell(cell)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::compute;
    use crate::engine::test_support::{constant, random_walk};
    use crate::model::Observation;

    #[test]
    fn empty_series_gives_empty_summary() {
        let summary = summarize(&EnrichedSeries::empty());
        assert!(summary.is_empty());
        assert_eq!(summary.get(IndicatorKind::Rsi), None);
        assert_eq!(serde_json::to_string(&summary).unwrap(), "{}");
    }

    #[test]
    fn missing_field_gives_empty_summary() {
        let mut observations = random_walk(1, 40);
        observations[0].close = None;
        assert!(summarize(&compute(&observations)).is_empty());
    }

    #[test]
    fn summary_has_all_thirteen_keys_in_order() {
        let summary = summarize(&compute(&random_walk(2, 80)));
        assert_eq!(summary.len(), 13);
        let kinds: Vec<IndicatorKind> = summary.iter().map(|(k, _)| k).collect();
        assert_eq!(kinds, IndicatorKind::ALL);
        assert!(summary.iter().all(|(_, r)| matches!(r, Reading::Value(_))));
    }

    #[test]
    fn summary_takes_last_row() {
        let series = compute(&random_walk(3, 50));
        let summary = summarize(&series);
        let last = series.column(IndicatorKind::Momentum).unwrap()[49];
        assert_eq!(summary.get(IndicatorKind::Momentum).and_then(Reading::value), last);
    }

    #[test]
    fn warm_up_fields_are_unavailable() {
        let summary = summarize(&compute(&[Observation::new(10.0, 11.0, 9.0)]));
        assert_eq!(summary.len(), 13);
        assert_eq!(summary.get(IndicatorKind::Rsi), Some(Reading::Unavailable));
        assert_eq!(summary.get(IndicatorKind::Ao), Some(Reading::Unavailable));
        assert_eq!(summary.get(IndicatorKind::Macd), Some(Reading::Value(0.0)));
    }

    #[test]
    fn flat_market_serializes_nulls() {
        let summary = summarize(&compute(&constant(100.0, 40)));
        let json = serde_json::to_value(&summary).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 13);
        assert!(object["Stoch_%K"].is_null());
        assert!(object["Williams_%R"].is_null());
        assert!(object["CCI"].is_null());
        assert!(object["CMO"].is_null());
        assert_eq!(object["MACD"], 0.0);
        assert_eq!(object["AO"], 0.0);
    }
}
