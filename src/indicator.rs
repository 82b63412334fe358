pub mod awesome;
pub mod cci;
pub mod change;
pub mod ma;
pub mod macd;
pub mod rsi;
pub mod stochastic;
pub mod tsi;
pub mod ultimate;
pub mod window;

use std::fmt;

use error_stack::Report;
use serde::{Serialize, Serializer};

use crate::error::IndicatorError;
use crate::indicator::window::{lag, rolling_max, rolling_min};

/// One value per observation; `None` marks an undefined cell (warm-up or a
/// zero denominator).
pub type Series = Vec<Option<f64>>;

/// Period of the shared high/low extremes used by Stochastic and Williams %R.
pub const EXTREMES_PERIOD: usize = 14;

/// The fixed set of indicator columns, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndicatorKind {
    Rsi,
    Macd,
    MacdSignal,
    StochK,
    StochD,
    Roc,
    Momentum,
    WilliamsR,
    Tsi,
    Ao,
    Cci,
    Cmo,
    Uo,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 13] = [
        Self::Rsi,
        Self::Macd,
        Self::MacdSignal,
        Self::StochK,
        Self::StochD,
        Self::Roc,
        Self::Momentum,
        Self::WilliamsR,
        Self::Tsi,
        Self::Ao,
        Self::Cci,
        Self::Cmo,
        Self::Uo,
    ];

    /// Column name used in enriched series and summaries.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rsi => "RSI",
            Self::Macd => "MACD",
            Self::MacdSignal => "MACD_Signal",
            Self::StochK => "Stoch_%K",
            Self::StochD => "Stoch_%D",
            Self::Roc => "ROC",
            Self::Momentum => "Momentum",
            Self::WilliamsR => "Williams_%R",
            Self::Tsi => "TSI",
            Self::Ao => "AO",
            Self::Cci => "CCI",
            Self::Cmo => "CMO",
            Self::Uo => "UO",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for IndicatorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Validated price columns plus the quantities several indicators share.
///
/// Built once per invocation so each indicator reads the same delta and
/// extremes instead of rescanning the prices.
#[derive(Debug, Clone)]
pub struct Intermediates {
    pub close: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    /// `close[t] - close[t-1]`, undefined at index 0.
    pub delta: Series,
    pub gain: Series,
    pub loss: Series,
    pub lowest_low: Series,
    pub highest_high: Series,
    /// `(high + low) / 2`
    pub median_price: Vec<f64>,
    /// `(high + low + close) / 3`
    pub typical_price: Vec<f64>,
    pub prev_close: Series,
}

impl Intermediates {
    /// All three columns must have the same length.
    pub fn new(close: Vec<f64>, high: Vec<f64>, low: Vec<f64>) -> Self {
        let prev_close = lag(&close, 1);
        let delta: Series = close
            .iter()
            .zip(prev_close.iter())
            .map(|(&c, prev)| prev.map(|p| c - p))
            .collect();
        let gain = delta.iter().map(|d| d.map(|d| d.max(0.0))).collect();
        let loss = delta.iter().map(|d| d.map(|d| (-d).max(0.0))).collect();

        let lowest_low = rolling_min(&window::defined(&low), EXTREMES_PERIOD);
        let highest_high = rolling_max(&window::defined(&high), EXTREMES_PERIOD);

        let median_price = high.iter().zip(&low).map(|(h, l)| (h + l) / 2.0).collect();
        let typical_price = high
            .iter()
            .zip(&low)
            .zip(&close)
            .map(|((h, l), c)| (h + l + c) / 3.0)
            .collect();

        Self {
            close,
            high,
            low,
            delta,
            gain,
            loss,
            lowest_low,
            highest_high,
            median_price,
            typical_price,
            prev_close,
        }
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }
}

/// A technical analysis indicator computed over a whole price series.
///
/// Observations must be in ascending chronological order (oldest first).
/// Every returned series has one cell per observation.
pub trait Indicator: Send + Sync {
    /// Columns this indicator produces, in output order.
    fn outputs(&self) -> &'static [IndicatorKind];

    /// Minimum number of observations before the last output column is
    /// defined.
    fn required_candles(&self) -> usize;

    /// Calculate one series per entry of [`Indicator::outputs`].
    fn calculate(&self, inputs: &Intermediates) -> Vec<Series>;
}

/// The fixed indicator battery, ordered so that the flattened outputs follow
/// [`IndicatorKind::ALL`].
pub fn battery() -> Result<Vec<Box<dyn Indicator>>, Report<IndicatorError>> {
    Ok(vec![
        Box::new(rsi::Rsi::new(14)?),
        Box::new(macd::Macd::new(12, 26, 9)?),
        Box::new(stochastic::Stochastic::new(3)?),
        Box::new(change::RateOfChange::new(12)?),
        Box::new(change::Momentum::new(10)?),
        Box::new(stochastic::WilliamsR),
        Box::new(tsi::Tsi::new(25, 13)?),
        Box::new(awesome::AwesomeOscillator::new(5, 34)?),
        Box::new(cci::Cci::new(20)?),
        Box::new(rsi::Cmo::new(14)?),
        Box::new(ultimate::UltimateOscillator::new(7, 14, 28)?),
    ])
}
