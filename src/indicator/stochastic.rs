use error_stack::Report;

use crate::error::IndicatorError;
use crate::indicator::ma::Sma;
use crate::indicator::window::{defined, ratio, zip_with};
use crate::indicator::{EXTREMES_PERIOD, Indicator, IndicatorKind, Intermediates, Series};

/// Position of the close within the `EXTREMES_PERIOD` high/low range.
fn range_position(inputs: &Intermediates, f: impl Fn(f64, f64, f64) -> Option<f64>) -> Series {
    let range = zip_with(&inputs.highest_high, &inputs.lowest_low, |h, l| Some(h - l));
    let from_low = zip_with(&defined(&inputs.close), &inputs.lowest_low, |c, l| Some(c - l));
    let to_high = zip_with(&inputs.highest_high, &defined(&inputs.close), |h, c| Some(h - c));

    range
        .iter()
        .zip(from_low.iter().zip(&to_high))
        .map(|(range, (from_low, to_high))| match (range, from_low, to_high) {
            (Some(r), Some(fl), Some(th)) => f(*r, *fl, *th),
            _ => None,
        })
        .collect()
}

/// Stochastic oscillator: %K over the shared 14-period extremes and its
/// simple-average %D.
pub struct Stochastic {
    smoothing: Sma,
}

impl Stochastic {
    pub fn new(d_period: usize) -> Result<Self, Report<IndicatorError>> {
        Ok(Self {
            smoothing: Sma::new(d_period)?,
        })
    }
}

impl Indicator for Stochastic {
    fn outputs(&self) -> &'static [IndicatorKind] {
        &[IndicatorKind::StochK, IndicatorKind::StochD]
    }

    fn required_candles(&self) -> usize {
        EXTREMES_PERIOD + self.smoothing.period() - 1
    }

    fn calculate(&self, inputs: &Intermediates) -> Vec<Series> {
        let k = range_position(inputs, |range, from_low, _| {
            ratio(from_low, range).map(|r| 100.0 * r)
        });
        let d = self.smoothing.calculate_series(&k);
        vec![k, d]
    }
}

/// Williams %R over the shared 14-period extremes, in `[-100, 0]`.
pub struct WilliamsR;

impl Indicator for WilliamsR {
    fn outputs(&self) -> &'static [IndicatorKind] {
        &[IndicatorKind::WilliamsR]
    }

    fn required_candles(&self) -> usize {
        EXTREMES_PERIOD
    }

    fn calculate(&self, inputs: &Intermediates) -> Vec<Series> {
        let r = range_position(inputs, |range, _, to_high| {
            ratio(to_high, range).map(|r| -100.0 * r)
        });
        vec![r]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::test_support::{assert_close, banded_inputs, flat_inputs};

    fn rising(n: usize) -> Vec<f64> {
        (1..=n).map(|i| i as f64).collect()
    }

    #[test]
    fn stochastic_d_period_zero_invalid() {
        assert!(Stochastic::new(0).is_err());
    }

    #[test]
    fn stochastic_warm_up() {
        let stoch = Stochastic::new(3).unwrap();
        let out = stoch.calculate(&banded_inputs(&rising(20), 0.5));
        assert!(out[0][..13].iter().all(Option::is_none));
        assert!(out[0][13].is_some());
        assert!(out[1][..15].iter().all(Option::is_none));
        assert!(out[1][15].is_some());
        assert_eq!(stoch.required_candles(), 16);
    }

    #[test]
    fn stochastic_known_value() {
        // window 14: lows 0.5..13.5, highs 1.5..14.5, close 14
        // %K = 100 * (14 - 0.5) / (14.5 - 0.5)
        let out = Stochastic::new(3)
            .unwrap()
            .calculate(&banded_inputs(&rising(14), 0.5));
        assert_close(out[0][13], 100.0 * 13.5 / 14.0);
    }

    #[test]
    fn stochastic_d_averages_k() {
        let out = Stochastic::new(3)
            .unwrap()
            .calculate(&banded_inputs(&rising(20), 0.5));
        let expected = (out[0][17].unwrap() + out[0][18].unwrap() + out[0][19].unwrap()) / 3.0;
        assert_close(out[1][19], expected);
    }

    #[test]
    fn flat_range_is_undefined() {
        let inputs = flat_inputs(&[7.0; 20]);
        let stoch = Stochastic::new(3).unwrap().calculate(&inputs);
        let williams = WilliamsR.calculate(&inputs);
        assert!(stoch[0].iter().all(Option::is_none));
        assert!(stoch[1].iter().all(Option::is_none));
        assert!(williams[0].iter().all(Option::is_none));
    }

    #[test]
    fn williams_known_value() {
        // -100 * (14.5 - 14) / 14
        let out = WilliamsR.calculate(&banded_inputs(&rising(14), 0.5));
        assert_close(out[0][13], -100.0 * 0.5 / 14.0);
    }

    #[test]
    fn williams_is_k_minus_100() {
        let inputs = banded_inputs(&[5.0, 9.0, 4.0, 8.0, 6.0, 7.0, 3.0, 9.5, 6.0, 5.5, 8.0, 7.5, 4.5, 6.5, 7.0], 1.0);
        let k = Stochastic::new(3).unwrap().calculate(&inputs).remove(0);
        let r = WilliamsR.calculate(&inputs).remove(0);
        for i in 13..15 {
            assert_close(r[i], k[i].unwrap() - 100.0);
        }
    }
}
