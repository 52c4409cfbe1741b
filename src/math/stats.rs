/// Sample mean and standard error of the mean (unbiased variance).
///
/// Returns `(0.0, 0.0)` for an empty slice and a zero standard error for a single value.
pub fn mean_and_stderr(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = if values.len() > 1 {
        values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1.0)
    } else {
        0.0
    };
    (mean, (var / n).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn known_sample() {
        let (mean, se) = mean_and_stderr(&[1.0, 2.0, 3.0, 4.0]);
        assert_relative_eq!(mean, 2.5);
        // s^2 = 5/3, se = sqrt(5/12)
        assert_relative_eq!(se, (5.0_f64 / 12.0).sqrt(), epsilon = 1e-15);
    }

    #[test]
    fn degenerate_samples() {
        assert_eq!(mean_and_stderr(&[]), (0.0, 0.0));
        assert_eq!(mean_and_stderr(&[7.0]), (7.0, 0.0));
    }
}
