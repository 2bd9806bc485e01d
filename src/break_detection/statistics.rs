// Window statistics for break detection
//
// Compares a baseline window of daily conversion rates against the current
// window: means, sample standard deviation, and the z-score of the drop.

/// Lower bound on the baseline standard deviation used for z-scoring
///
/// A perfectly flat baseline would otherwise turn any drop into an infinite
/// z-score.
pub const MIN_EFFECTIVE_STD_DEV: f64 = 0.01;

/// Result of comparing the current window against its baseline
#[derive(Debug, Clone, PartialEq)]
pub struct WindowComparison {
    pub baseline_mean: f64,

    /// Sample standard deviation (n - 1) of the baseline, 0 with < 2 points
    pub baseline_std_dev: f64,

    pub current_mean: f64,

    /// `max(baseline_std_dev, MIN_EFFECTIVE_STD_DEV)`
    pub effective_std_dev: f64,

    /// `baseline_mean - current_mean` (negative for an improvement)
    pub absolute_drop: f64,

    /// `absolute_drop / baseline_mean`
    pub relative_drop: f64,

    /// `absolute_drop / effective_std_dev`
    pub z_score: f64,
}

/// Arithmetic mean, 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation with Bessel's correction (n - 1)
///
/// Returns 0 for fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Compare current-window rates against baseline-window rates
///
/// Returns `None` when either window is empty or the baseline mean is 0
/// (a relative drop is undefined there).
pub fn compare_windows(baseline: &[f64], current: &[f64]) -> Option<WindowComparison> {
    if baseline.is_empty() || current.is_empty() {
        return None;
    }

    let baseline_mean = mean(baseline);
    if baseline_mean == 0.0 {
        return None;
    }

    let baseline_std_dev = sample_std_dev(baseline);
    let current_mean = mean(current);
    let effective_std_dev = baseline_std_dev.max(MIN_EFFECTIVE_STD_DEV);
    let absolute_drop = baseline_mean - current_mean;

    Some(WindowComparison {
        baseline_mean,
        baseline_std_dev,
        current_mean,
        effective_std_dev,
        absolute_drop,
        relative_drop: absolute_drop / baseline_mean,
        z_score: absolute_drop / effective_std_dev,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_basic() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0]), 2.5);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_sample_std_dev_uses_n_minus_one() {
        // mean=5, squared deviations sum to 20, 20/3 rather than 20/4
        let std_dev = sample_std_dev(&[2.0, 4.0, 6.0, 8.0]);
        assert!((std_dev - (20.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_sample_std_dev_small_inputs() {
        assert_eq!(sample_std_dev(&[]), 0.0);
        assert_eq!(sample_std_dev(&[0.42]), 0.0);
        assert_eq!(sample_std_dev(&[0.5, 0.5, 0.5]), 0.0);
    }

    #[test]
    fn test_compare_windows_flat_baseline_uses_floor() {
        let comparison = compare_windows(&[0.5; 10], &[0.4, 0.4, 0.4]).unwrap();

        assert_eq!(comparison.baseline_std_dev, 0.0);
        assert_eq!(comparison.effective_std_dev, MIN_EFFECTIVE_STD_DEV);
        assert!((comparison.absolute_drop - 0.1).abs() < 1e-12);
        assert!((comparison.relative_drop - 0.2).abs() < 1e-12);
        assert!((comparison.z_score - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_compare_windows_improvement_is_negative() {
        let comparison = compare_windows(&[0.5; 10], &[0.6]).unwrap();
        assert!(comparison.absolute_drop < 0.0);
        assert!(comparison.relative_drop < 0.0);
        assert!(comparison.z_score < 0.0);
    }

    #[test]
    fn test_compare_windows_zero_baseline_mean() {
        assert!(compare_windows(&[0.0; 10], &[0.0]).is_none());
    }

    #[test]
    fn test_compare_windows_empty_windows() {
        assert!(compare_windows(&[], &[0.3]).is_none());
        assert!(compare_windows(&[0.3, 0.3], &[]).is_none());
    }
}
