use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::window::{ratio, rolling_mean, rolling_sum, zip_with};
use crate::indicator::{Indicator, IndicatorKind, Intermediates, Series};

fn check_period(period: usize) -> Result<(), Report<IndicatorError>> {
    if period == 0 {
        bail!(IndicatorError::InvalidParameter {
            name: "period must be > 0".into(),
        });
    }
    Ok(())
}

/// RSI (Relative Strength Index) over simple trailing means of gain and loss.
pub struct Rsi {
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        check_period(period)?;
        Ok(Self { period })
    }
}

impl Indicator for Rsi {
    fn outputs(&self) -> &'static [IndicatorKind] {
        &[IndicatorKind::Rsi]
    }

    fn required_candles(&self) -> usize {
        self.period + 1
    }

    fn calculate(&self, inputs: &Intermediates) -> Vec<Series> {
        let avg_gain = rolling_mean(&inputs.gain, self.period);
        let avg_loss = rolling_mean(&inputs.loss, self.period);
        let rsi = zip_with(&avg_gain, &avg_loss, rsi_value);
        vec![rsi]
    }
}

/// Undefined only when the window has neither gains nor losses.
fn rsi_value(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        return (avg_gain > 0.0).then_some(100.0);
    }
    ratio(avg_gain, avg_loss).map(|rs| 100.0 - 100.0 / (1.0 + rs))
}

/// Chande Momentum Oscillator.
pub struct Cmo {
    period: usize,
}

impl Cmo {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        check_period(period)?;
        Ok(Self { period })
    }
}

impl Indicator for Cmo {
    fn outputs(&self) -> &'static [IndicatorKind] {
        &[IndicatorKind::Cmo]
    }

    fn required_candles(&self) -> usize {
        self.period + 1
    }

    fn calculate(&self, inputs: &Intermediates) -> Vec<Series> {
        let gains = rolling_sum(&inputs.gain, self.period);
        let losses = rolling_sum(&inputs.loss, self.period);
        let cmo = zip_with(&gains, &losses, |up, down| {
            ratio(up - down, up + down).map(|r| 100.0 * r)
        });
        vec![cmo]
    }
}
