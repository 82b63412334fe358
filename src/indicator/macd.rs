use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::ma::Ema;
use crate::indicator::window::{defined, zip_with};
use crate::indicator::{Indicator, IndicatorKind, Intermediates, Series};

/// MACD line and its signal line.
pub struct Macd {
    fast: Ema,
    slow: Ema,
    signal: Ema,
    slow_period: usize,
}

impl Macd {
    pub fn new(
        fast_period: usize,
        slow_period: usize,
        signal_period: usize,
    ) -> Result<Self, Report<IndicatorError>> {
        if fast_period >= slow_period {
            bail!(IndicatorError::InvalidParameter {
                name: "fast_period must be < slow_period".into(),
            });
        }
        Ok(Self {
            fast: Ema::new(fast_period)?,
            slow: Ema::new(slow_period)?,
            signal: Ema::new(signal_period)?,
            slow_period,
        })
    }

    /// Calculate `(macd_line, signal_line)` over close prices.
    pub fn calculate_full(&self, close: &[f64]) -> (Series, Series) {
        let close = defined(close);
        let fast = self.fast.calculate_series(&close);
        let slow = self.slow.calculate_series(&close);
        let macd_line = zip_with(&fast, &slow, |f, s| Some(f - s));
        let signal_line = self.signal.calculate_series(&macd_line);
        (macd_line, signal_line)
    }
}

impl Indicator for Macd {
    fn outputs(&self) -> &'static [IndicatorKind] {
        &[IndicatorKind::Macd, IndicatorKind::MacdSignal]
    }

    /// Both lines are defined from the first observation; this is the span
    /// after which the slow average has settled.
    fn required_candles(&self) -> usize {
        self.slow_period
    }

    fn calculate(&self, inputs: &Intermediates) -> Vec<Series> {
        let (macd_line, signal_line) = self.calculate_full(&inputs.close);
        vec![macd_line, signal_line]
    }
}
