use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::Series;
use crate::indicator::window::rolling_mean;

/// Simple Moving Average.
#[derive(Debug, Clone, Copy)]
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        Ok(Self { period })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn calculate_series(&self, values: &[Option<f64>]) -> Series {
        rolling_mean(values, self.period)
    }
}

/// Exponential Moving Average with smoothing factor `2 / (span + 1)`.
///
/// Seeded at the first defined input, with no bias adjustment, so it is
/// defined from that point on and only settles after roughly `span`
/// observations.
#[derive(Debug, Clone, Copy)]
pub struct Ema {
    span: usize,
}

impl Ema {
    pub fn new(span: usize) -> Result<Self, Report<IndicatorError>> {
        if span == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "span must be > 0".into(),
            });
        }
        Ok(Self { span })
    }

    pub fn alpha(&self) -> f64 {
        2.0 / (self.span as f64 + 1.0)
    }

    /// Undefined inputs before the seed stay undefined; after it they carry
    /// the previous average forward. A constant input reproduces itself
    /// exactly.
    pub fn calculate_series(&self, values: &[Option<f64>]) -> Series {
        let alpha = self.alpha();
        let mut ema: Option<f64> = None;

        values
            .iter()
            .map(|value| {
                ema = match (ema, *value) {
                    (None, x) => x,
                    (Some(prev), Some(x)) => Some(prev + alpha * (x - prev)),
                    (Some(prev), None) => Some(prev),
                };
                ema
            })
            .collect()
    }
}
