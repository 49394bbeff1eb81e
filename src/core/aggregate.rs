use std::ops::{Add, Mul, Sub};

use itertools::Itertools;

impl<T> Aggregate for T where T: ?Sized {}

pub trait Aggregate {
    /// Percentile with linear interpolation between the closest order statistics.
    ///
    /// Returns [`None`] for an empty input or for a percentile outside `0..=100`.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn percentile<V>(self, percentile: f64) -> Option<V>
    where
        Self: Sized + IntoIterator<Item = V>,
        V: Copy + Ord + Add<Output = V> + Sub<Output = V> + Mul<f64, Output = V>,
    {
        if !(0.0..=100.0).contains(&percentile) {
            return None;
        }
        let mut values = self.into_iter().collect_vec();
        if values.is_empty() {
            return None;
        }
        values.sort_unstable();
        let rank = percentile / 100.0 * (values.len() - 1) as f64;
        let lower_rank = rank.floor();
        let lower_value = values[lower_rank as usize];
        let upper_value = values[rank.ceil() as usize];
        Some(lower_value + (upper_value - lower_value) * (rank - lower_rank))
    }

    #[must_use]
    fn median<V>(self) -> Option<V>
    where
        Self: Sized + IntoIterator<Item = V>,
        V: Copy + Ord + Add<Output = V> + Sub<Output = V> + Mul<f64, Output = V>,
    {
        self.percentile(50.0)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::quantity::rate::KilowattHourRate;

    fn rates(values: &[f64]) -> Vec<KilowattHourRate> {
        values.iter().copied().map(KilowattHourRate::from).collect()
    }

    #[test]
    fn test_percentile_exact_order_statistic() {
        let threshold = rates(&[10.0, 5.0, 8.0]).percentile(50.0).unwrap();
        assert_abs_diff_eq!(threshold.0.0, 8.0);
    }

    #[test]
    fn test_percentile_interpolates() {
        // Rank is 0.25 × 4 = 1.0 for the first one, and 0.9 × 4 = 3.6 for the second one.
        let values = rates(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_abs_diff_eq!(values.clone().percentile(25.0).unwrap().0.0, 2.0);
        assert_abs_diff_eq!(values.percentile(90.0).unwrap().0.0, 4.6, epsilon = 1e-9);
    }

    #[test]
    fn test_percentile_bounds() {
        let values = rates(&[3.0, 1.0, 2.0]);
        assert_abs_diff_eq!(values.clone().percentile(0.0).unwrap().0.0, 1.0);
        assert_abs_diff_eq!(values.percentile(100.0).unwrap().0.0, 3.0);
    }

    #[test]
    fn test_percentile_single_value() {
        assert_abs_diff_eq!(rates(&[7.5]).percentile(33.0).unwrap().0.0, 7.5);
    }

    #[test]
    fn test_percentile_empty() {
        assert!(rates(&[]).percentile(50.0).is_none());
    }

    #[test]
    fn test_percentile_out_of_range() {
        assert!(rates(&[1.0]).percentile(-1.0).is_none());
        assert!(rates(&[1.0]).percentile(100.5).is_none());
        assert!(rates(&[1.0]).percentile(f64::NAN).is_none());
    }

    #[test]
    fn test_median_even() {
        assert_abs_diff_eq!(rates(&[1.0, 0.0, 2.0, 3.0]).median().unwrap().0.0, 1.5);
    }
}
