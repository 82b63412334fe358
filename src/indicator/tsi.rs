use error_stack::Report;

use crate::error::IndicatorError;
use crate::indicator::ma::Ema;
use crate::indicator::window::{ratio, zip_with};
use crate::indicator::{Indicator, IndicatorKind, Intermediates, Series};

/// True Strength Index: double-smoothed close delta over the same double
/// smoothing of its absolute value.
pub struct Tsi {
    long: Ema,
    short: Ema,
    long_span: usize,
}

impl Tsi {
    pub fn new(long_span: usize, short_span: usize) -> Result<Self, Report<IndicatorError>> {
        Ok(Self {
            long: Ema::new(long_span)?,
            short: Ema::new(short_span)?,
            long_span,
        })
    }

    fn double_smooth(&self, values: &[Option<f64>]) -> Series {
        self.short.calculate_series(&self.long.calculate_series(values))
    }
}

impl Indicator for Tsi {
    fn outputs(&self) -> &'static [IndicatorKind] {
        &[IndicatorKind::Tsi]
    }

    fn required_candles(&self) -> usize {
        self.long_span + 1
    }

    fn calculate(&self, inputs: &Intermediates) -> Vec<Series> {
        let abs_delta: Series = inputs.delta.iter().map(|d| d.map(f64::abs)).collect();
        let smoothed = self.double_smooth(&inputs.delta);
        let smoothed_abs = self.double_smooth(&abs_delta);
        let tsi = zip_with(&smoothed, &smoothed_abs, |pc, apc| {
            ratio(pc, apc).map(|r| 100.0 * r)
        });
        vec![tsi]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::test_support::{assert_close, flat_inputs};

    fn tsi_of(closes: &[f64]) -> Series {
        Tsi::new(25, 13)
            .unwrap()
            .calculate(&flat_inputs(closes))
            .remove(0)
    }

    #[test]
    fn span_zero_invalid() {
        assert!(Tsi::new(0, 13).is_err());
        assert!(Tsi::new(25, 0).is_err());
    }

    #[test]
    fn defined_from_second_observation() {
        let values = tsi_of(&[1.0, 2.0, 4.0]);
        assert_eq!(values[0], None);
        // a single positive delta is its own smoothing
        assert_close(values[1], 100.0);
        assert_close(values[2], 100.0);
    }

    #[test]
    fn falling_prices_are_minus_100() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 - f64::from(i)).collect();
        let values = tsi_of(&closes);
        assert_close(values[29], -100.0);
    }

    #[test]
    fn flat_prices_are_undefined() {
        assert!(tsi_of(&[3.0; 30]).iter().all(Option::is_none));
    }

    #[test]
    fn mixed_prices_stay_within_bounds() {
        let closes = [10.0, 11.0, 10.5, 12.0, 11.0, 11.5, 13.0, 12.0];
        for v in tsi_of(&closes).into_iter().flatten() {
            assert!((-100.0..=100.0).contains(&v), "TSI out of range: {v}");
        }
    }
}
