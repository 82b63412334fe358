use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::window::{defined, lag, ratio, zip_with};
use crate::indicator::{Indicator, IndicatorKind, Intermediates, Series};

fn check_lookback(lookback: usize) -> Result<(), Report<IndicatorError>> {
    if lookback == 0 {
        bail!(IndicatorError::InvalidParameter {
            name: "lookback must be > 0".into(),
        });
    }
    Ok(())
}

/// Percentage change of the close over `lookback` observations.
pub struct RateOfChange {
    lookback: usize,
}

impl RateOfChange {
    pub fn new(lookback: usize) -> Result<Self, Report<IndicatorError>> {
        check_lookback(lookback)?;
        Ok(Self { lookback })
    }
}

impl Indicator for RateOfChange {
    fn outputs(&self) -> &'static [IndicatorKind] {
        &[IndicatorKind::Roc]
    }

    fn required_candles(&self) -> usize {
        self.lookback + 1
    }

    fn calculate(&self, inputs: &Intermediates) -> Vec<Series> {
        let past = lag(&inputs.close, self.lookback);
        let roc = zip_with(&defined(&inputs.close), &past, |now, then| {
            ratio(now - then, then).map(|r| 100.0 * r)
        });
        vec![roc]
    }
}

/// Absolute change of the close over `lookback` observations.
pub struct Momentum {
    lookback: usize,
}

impl Momentum {
    pub fn new(lookback: usize) -> Result<Self, Report<IndicatorError>> {
        check_lookback(lookback)?;
        Ok(Self { lookback })
    }
}

impl Indicator for Momentum {
    fn outputs(&self) -> &'static [IndicatorKind] {
        &[IndicatorKind::Momentum]
    }

    fn required_candles(&self) -> usize {
        self.lookback + 1
    }

    fn calculate(&self, inputs: &Intermediates) -> Vec<Series> {
        let past = lag(&inputs.close, self.lookback);
        let momentum = zip_with(&defined(&inputs.close), &past, |now, then| Some(now - then));
        vec![momentum]
    }
}
