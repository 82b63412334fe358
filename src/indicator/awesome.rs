use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::ma::Sma;
use crate::indicator::window::{defined, zip_with};
use crate::indicator::{Indicator, IndicatorKind, Intermediates, Series};

/// Awesome Oscillator: fast minus slow simple average of the median price.
pub struct AwesomeOscillator {
    fast: Sma,
    slow: Sma,
}

impl AwesomeOscillator {
    pub fn new(fast_period: usize, slow_period: usize) -> Result<Self, Report<IndicatorError>> {
        if fast_period >= slow_period {
            bail!(IndicatorError::InvalidParameter {
                name: "fast_period must be < slow_period".into(),
            });
        }
        Ok(Self {
            fast: Sma::new(fast_period)?,
            slow: Sma::new(slow_period)?,
        })
    }
}

impl Indicator for AwesomeOscillator {
    fn outputs(&self) -> &'static [IndicatorKind] {
        &[IndicatorKind::Ao]
    }

    fn required_candles(&self) -> usize {
        self.slow.period()
    }

    fn calculate(&self, inputs: &Intermediates) -> Vec<Series> {
        let median = defined(&inputs.median_price);
        let fast = self.fast.calculate_series(&median);
        let slow = self.slow.calculate_series(&median);
        vec![zip_with(&fast, &slow, |f, s| Some(f - s))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::test_support::{assert_close, flat_inputs};

    #[test]
    fn invalid_periods() {
        assert!(AwesomeOscillator::new(34, 5).is_err());
        assert!(AwesomeOscillator::new(0, 34).is_err());
    }

    #[test]
    fn warm_up_is_slow_period() {
        let ao = AwesomeOscillator::new(5, 34).unwrap();
        let out = ao.calculate(&flat_inputs(&[50.0; 40])).remove(0);
        assert!(out[..33].iter().all(Option::is_none));
        assert_eq!(out[33], Some(0.0));
        assert_eq!(ao.required_candles(), 34);
    }

    #[test]
    fn uses_median_price_not_close() {
        // median of high 12 / low 8 is 10 regardless of close
        let ao = AwesomeOscillator::new(2, 3).unwrap();
        let inputs = Intermediates::new(
            vec![1.0, 1.0, 1.0, 1.0],
            vec![12.0, 14.0, 16.0, 18.0],
            vec![8.0, 10.0, 12.0, 14.0],
        );
        let out = ao.calculate(&inputs).remove(0);
        // medians 10, 12, 14, 16: sma2 = 15, sma3 = 14
        assert_close(out[3], 1.0);
    }
}
