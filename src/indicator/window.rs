//! Trailing-window statistics over series with undefined cells.
//!
//! A window of size `period` ending at index `i` is defined only when all
//! `period` cells in it are defined; the first `period - 1` outputs are
//! always undefined.

use crate::indicator::Series;

/// Lift a fully defined column into a [`Series`].
pub fn defined(values: &[f64]) -> Series {
    values.iter().copied().map(Some).collect()
}

/// Shift values forward by `periods` positions; the first `periods` cells are
/// undefined.
pub fn lag(values: &[f64], periods: usize) -> Series {
    (0..values.len())
        .map(|i| i.checked_sub(periods).map(|j| values[j]))
        .collect()
}

/// `numerator / denominator`, undefined for a zero denominator or a
/// non-finite quotient.
pub fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    Some(numerator / denominator).filter(|v| v.is_finite())
}

/// Cell-wise combination of two aligned series; undefined wherever either
/// side is.
pub fn zip_with(a: &[Option<f64>], b: &[Option<f64>], f: impl Fn(f64, f64) -> Option<f64>) -> Series {
    a.iter()
        .zip(b)
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => f(*x, *y),
            _ => None,
        })
        .collect()
}

/// Apply `f` to every complete trailing window of `period` defined cells.
pub fn rolling(values: &[Option<f64>], period: usize, f: impl Fn(&[f64]) -> f64) -> Series {
    let mut output = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return output;
    }

    let mut buffer = Vec::with_capacity(period);
    for end in (period - 1)..values.len() {
        buffer.clear();
        buffer.extend(values[end + 1 - period..=end].iter().map_while(|v| *v));
        if buffer.len() == period {
            output[end] = Some(f(buffer.as_slice()));
        }
    }
    output
}

pub fn rolling_sum(values: &[Option<f64>], period: usize) -> Series {
    rolling(values, period, |w| w.iter().sum())
}

pub fn rolling_mean(values: &[Option<f64>], period: usize) -> Series {
    rolling(values, period, |w| w.iter().sum::<f64>() / w.len() as f64)
}

pub fn rolling_min(values: &[Option<f64>], period: usize) -> Series {
    rolling(values, period, |w| w.iter().copied().fold(f64::INFINITY, f64::min))
}

pub fn rolling_max(values: &[Option<f64>], period: usize) -> Series {
    rolling(values, period, |w| {
        w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

/// Mean absolute deviation from the window mean.
pub fn rolling_mean_abs_dev(values: &[Option<f64>], period: usize) -> Series {
    rolling(values, period, |w| {
        let mean = w.iter().sum::<f64>() / w.len() as f64;
        w.iter().map(|x| (x - mean).abs()).sum::<f64>() / w.len() as f64
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolling_min_max_known_values() {
        let data = defined(&[5.0, 3.0, 8.0, 2.0, 7.0, 1.0, 9.0]);
        let min = rolling_min(&data, 3);
        let max = rolling_max(&data, 3);

        assert_eq!(&min[..2], &[None, None]);
        assert_eq!(&min[2..], &[Some(3.0), Some(2.0), Some(2.0), Some(1.0), Some(1.0)]);
        assert_eq!(&max[2..], &[Some(8.0), Some(8.0), Some(8.0), Some(7.0), Some(9.0)]);
    }

    #[test]
    fn rolling_mean_and_sum() {
        let data = defined(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(rolling_mean(&data, 3), vec![None, None, Some(2.0), Some(3.0)]);
        assert_eq!(rolling_sum(&data, 2), vec![None, Some(3.0), Some(5.0), Some(7.0)]);
    }

    #[test]
    fn undefined_cell_poisons_its_windows() {
        let data = vec![None, Some(1.0), Some(2.0), Some(3.0)];
        assert_eq!(rolling_sum(&data, 2), vec![None, None, Some(3.0), Some(5.0)]);
        assert_eq!(rolling_sum(&data, 4), vec![None; 4]);
    }

    #[test]
    fn window_longer_than_series_is_all_undefined() {
        let data = defined(&[1.0, 2.0]);
        assert_eq!(rolling_mean(&data, 5), vec![None, None]);
        assert!(rolling_mean(&[], 3).is_empty());
    }

    #[test]
    fn mean_abs_dev_known_value() {
        // mean 2.5, deviations 1.5 0.5 0.5 1.5
        let mad = rolling_mean_abs_dev(&defined(&[1.0, 2.0, 3.0, 4.0]), 4);
        assert_eq!(mad[3], Some(1.0));
    }

    #[test]
    fn lag_shifts_forward() {
        assert_eq!(lag(&[1.0, 2.0, 3.0], 2), vec![None, None, Some(1.0)]);
        assert_eq!(lag(&[1.0], 3), vec![None]);
    }

    #[test]
    fn ratio_zero_denominator_is_undefined() {
        assert_eq!(ratio(1.0, 0.0), None);
        assert_eq!(ratio(0.0, 0.0), None);
        assert_eq!(ratio(3.0, 2.0), Some(1.5));
        assert_eq!(ratio(f64::MAX, f64::MIN_POSITIVE), None);
    }

    #[test]
    fn zip_with_requires_both_sides() {
        let a = vec![Some(1.0), None, Some(3.0)];
        let b = vec![Some(1.0), Some(2.0), None];
        assert_eq!(zip_with(&a, &b, |x, y| Some(x + y)), vec![Some(2.0), None, None]);
    }
}
