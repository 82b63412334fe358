use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::window::{ratio, rolling_sum, zip_with};
use crate::indicator::{Indicator, IndicatorKind, Intermediates, Series};

const WEIGHTS: [f64; 3] = [4.0, 2.0, 1.0];

/// Ultimate Oscillator over three buying-pressure / true-range horizons.
pub struct UltimateOscillator {
    periods: [usize; 3],
}

impl UltimateOscillator {
    pub fn new(short: usize, medium: usize, long: usize) -> Result<Self, Report<IndicatorError>> {
        if short == 0 || !(short < medium && medium < long) {
            bail!(IndicatorError::InvalidParameter {
                name: "periods must satisfy 0 < short < medium < long".into(),
            });
        }
        Ok(Self {
            periods: [short, medium, long],
        })
    }
}

/// Per-step buying pressure and true range.
///
/// Each step pairs its own low/high with the previous close; the very first
/// step has no previous close and uses its own low/high alone.
pub fn pressure_and_range(inputs: &Intermediates) -> (Series, Series) {
    let mut pressure = Vec::with_capacity(inputs.len());
    let mut range = Vec::with_capacity(inputs.len());

    for i in 0..inputs.len() {
        let (close, high, low) = (inputs.close[i], inputs.high[i], inputs.low[i]);
        let (true_low, true_high) = match inputs.prev_close[i] {
            Some(prev) => (low.min(prev), high.max(prev)),
            None => (low, high),
        };
        pressure.push(Some(close - true_low));
        range.push(Some(true_high - true_low));
    }
    (pressure, range)
}

impl Indicator for UltimateOscillator {
    fn outputs(&self) -> &'static [IndicatorKind] {
        &[IndicatorKind::Uo]
    }

    fn required_candles(&self) -> usize {
        self.periods[2]
    }

    fn calculate(&self, inputs: &Intermediates) -> Vec<Series> {
        let (pressure, range) = pressure_and_range(inputs);

        let averages: Vec<Series> = self
            .periods
            .iter()
            .map(|&period| {
                zip_with(
                    &rolling_sum(&pressure, period),
                    &rolling_sum(&range, period),
                    ratio,
                )
            })
            .collect();

        let total_weight: f64 = WEIGHTS.iter().sum();
        let uo: Series = (0..inputs.len())
            .map(|i| {
                let mut weighted = 0.0;
                for (average, weight) in averages.iter().zip(WEIGHTS) {
                    weighted += weight * average[i]?;
                }
                Some(100.0 * weighted / total_weight)
            })
            .collect();
        vec![uo]
    }
}
