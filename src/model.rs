use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::engine::EnrichedSeries;
use crate::summary::IndicatorSummary;

/// One price observation as it arrives from the message source.
///
/// Fields are optional at the decode boundary so that a missing price is
/// reported by the engine as a schema error instead of failing the decode.
/// A present but non-numeric price decodes as NaN and is rejected by the
/// engine as a non-finite value. Any other fields in the message are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(rename = "Close", default, deserialize_with = "deserialize_price")]
    pub close: Option<f64>,
    #[serde(rename = "High", default, deserialize_with = "deserialize_price")]
    pub high: Option<f64>,
    #[serde(rename = "Low", default, deserialize_with = "deserialize_price")]
    pub low: Option<f64>,
}

/// `null` is a missing price; any other non-number is NaN.
pub fn price_cell(value: &Value) -> Option<f64> {
    match value {
        Value::Null => None,
        other => Some(other.as_f64().unwrap_or(f64::NAN)),
    }
}

fn deserialize_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(price_cell(&Value::deserialize(deserializer)?))
}

impl Observation {
    pub fn new(close: f64, high: f64, low: f64) -> Self {
        Self {
            close: Some(close),
            high: Some(high),
            low: Some(low),
        }
    }
}

/// A decoded price batch for a single instrument, oldest observation first.
#[derive(Debug, Clone)]
pub struct Batch {
    pub batch_id: Uuid,
    pub symbol: Option<String>,
    pub observations: Vec<Observation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Ok,
    Unavailable,
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// Result of analyzing one batch, handed to a publisher.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub batch_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    pub analyzed_at: DateTime<Utc>,
    pub rows: usize,
    pub status: AnalysisStatus,
    pub summary: IndicatorSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<EnrichedSeries>,
}

impl AnalysisReport {
    /// Report for a batch whose analysis could not be produced.
    pub fn unavailable(batch_id: Uuid, symbol: Option<String>, rows: usize) -> Self {
        Self {
            batch_id,
            symbol,
            analyzed_at: Utc::now(),
            rows,
            status: AnalysisStatus::Unavailable,
            summary: IndicatorSummary::default(),
            series: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observation_uses_exact_field_names() {
        let obs: Observation =
            serde_json::from_str(r#"{"Close": 10.5, "High": 11, "Low": 9.75, "Volume": 3}"#)
                .unwrap();
        assert_eq!(obs, Observation::new(10.5, 11.0, 9.75));
    }

    #[test]
    fn observation_missing_field_decodes_as_none() {
        let obs: Observation = serde_json::from_str(r#"{"close": 10.0, "High": 11.0}"#).unwrap();
        assert_eq!(obs.close, None);
        assert_eq!(obs.high, Some(11.0));
        assert_eq!(obs.low, None);
    }

    #[test]
    fn observation_non_numeric_price_decodes_as_nan() {
        let obs: Observation =
            serde_json::from_str(r#"{"Close": "abc", "High": true, "Low": null}"#).unwrap();
        assert!(obs.close.is_some_and(f64::is_nan));
        assert!(obs.high.is_some_and(f64::is_nan));
        assert_eq!(obs.low, None);
    }

    #[test]
    fn analysis_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&AnalysisStatus::Ok).unwrap(), "\"ok\"");
        assert_eq!(AnalysisStatus::Unavailable.to_string(), "unavailable");
    }

    #[test]
    fn unavailable_report_has_empty_summary() {
        let report = AnalysisReport::unavailable(Uuid::new_v4(), Some("AAPL".into()), 3);
        assert_eq!(report.status, AnalysisStatus::Unavailable);
        assert!(report.summary.is_empty());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["summary"], serde_json::json!({}));
        assert_eq!(json["symbol"], "AAPL");
        assert!(json.get("series").is_none());
    }
}
