use error_stack::Report;

use crate::error::IndicatorError;
use crate::indicator::ma::Sma;
use crate::indicator::window::{defined, ratio, rolling_mean_abs_dev, zip_with};
use crate::indicator::{Indicator, IndicatorKind, Intermediates, Series};

/// Lambert's constant, scaling most CCI readings into `[-100, 100]`.
const CCI_SCALE: f64 = 0.015;

/// Commodity Channel Index over the typical price.
pub struct Cci {
    sma: Sma,
}

impl Cci {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        Ok(Self {
            sma: Sma::new(period)?,
        })
    }
}

impl Indicator for Cci {
    fn outputs(&self) -> &'static [IndicatorKind] {
        &[IndicatorKind::Cci]
    }

    fn required_candles(&self) -> usize {
        self.sma.period()
    }

    fn calculate(&self, inputs: &Intermediates) -> Vec<Series> {
        let typical = defined(&inputs.typical_price);
        let mean = self.sma.calculate_series(&typical);
        let mad = rolling_mean_abs_dev(&typical, self.sma.period());

        let deviation = zip_with(&typical, &mean, |tp, m| Some(tp - m));
        let cci = zip_with(&deviation, &mad, |dev, mad| ratio(dev, CCI_SCALE * mad));
        vec![cci]
    }
}
