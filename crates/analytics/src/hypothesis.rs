//! Statistical edge tests on strategy returns.
//!
//! - Welch's two-sample t-test of strategy vs market daily returns
//! - Augmented Dickey-Fuller unit-root test with a constant, lag chosen by AIC
//! - Autocorrelation function

use nalgebra::{DMatrix, DVector};
use quantbt_core::{BacktestError, Result};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::greeks::normal_cdf;
use crate::stats::{mean, variance};

// ============================================================
// Welch t-test
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WelchTTest {
    pub t_statistic: f64,
    /// Welch-Satterthwaite degrees of freedom.
    pub degrees_of_freedom: f64,
    /// Two-sided p-value.
    pub p_value: f64,
}

/// Two-sample t-test without assuming equal variances.
///
/// # Errors
///
/// Returns `BacktestError::Data` if either sample has fewer than two values.
#[allow(clippy::cast_precision_loss)]
pub fn welch_t_test(a: &[f64], b: &[f64]) -> Result<WelchTTest> {
    if a.len() < 2 || b.len() < 2 {
        return Err(BacktestError::data(format!(
            "t-test needs two observations per sample, got {} and {}",
            a.len(),
            b.len()
        )));
    }
    let (na, nb) = (a.len() as f64, b.len() as f64);
    let va = variance(a, 1) / na;
    let vb = variance(b, 1) / nb;
    let se = (va + vb).sqrt();
    let t_statistic = (mean(a) - mean(b)) / se;
    let degrees_of_freedom = (va + vb).powi(2) / (va.powi(2) / (na - 1.0) + vb.powi(2) / (nb - 1.0));

    let p_value = StudentsT::new(0.0, 1.0, degrees_of_freedom)
        .map(|dist| 2.0 * (1.0 - dist.cdf(t_statistic.abs())))
        .unwrap_or(f64::NAN);

    Ok(WelchTTest {
        t_statistic,
        degrees_of_freedom,
        p_value,
    })
}

// ============================================================
// Augmented Dickey-Fuller
// ============================================================

/// MacKinnon (2010) critical values for the constant-only regression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalValues {
    pub one_percent: f64,
    pub five_percent: f64,
    pub ten_percent: f64,
}

impl CriticalValues {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn for_nobs(nobs: usize) -> Self {
        let t = 1.0 / nobs as f64;
        let poly = |c: [f64; 4]| c[0] + c[1] * t + c[2] * t.powi(2) + c[3] * t.powi(3);
        Self {
            one_percent: poly([-3.43035, -6.5393, -16.786, -79.433]),
            five_percent: poly([-2.86154, -2.8903, -4.234, -40.040]),
            ten_percent: poly([-2.56677, -1.5384, -2.809, 0.0]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdfResult {
    /// t-value of the lagged level coefficient.
    pub statistic: f64,
    pub p_value: f64,
    /// Lagged differences in the final regression.
    pub used_lag: usize,
    /// Observations in the final regression.
    pub nobs: usize,
    pub critical_values: CriticalValues,
    /// AIC of the selected lag.
    pub ic_best: f64,
}

impl AdfResult {
    /// Unit root rejected at `alpha`.
    #[must_use]
    pub fn is_stationary(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// MacKinnon (1994) approximate p-value for a constant-only ADF statistic.
#[must_use]
pub fn mackinnon_p_value(statistic: f64) -> f64 {
    const MAX_STAT: f64 = 2.74;
    const MIN_STAT: f64 = -18.83;
    const STAR_STAT: f64 = -1.61;
    const SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
    const LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

    if statistic > MAX_STAT {
        return 1.0;
    }
    if statistic < MIN_STAT {
        return 0.0;
    }
    let coefs: &[f64] = if statistic <= STAR_STAT {
        &SMALL_P
    } else {
        &LARGE_P
    };
    let z = coefs.iter().rev().fold(0.0, |acc, c| acc * statistic + c);
    normal_cdf(z)
}

struct OlsFit {
    params: DVector<f64>,
    ssr: f64,
    xtx_inv: DMatrix<f64>,
    nobs: usize,
}

impl OlsFit {
    #[allow(clippy::cast_precision_loss)]
    fn aic(&self) -> f64 {
        let n = self.nobs as f64;
        let llf = -n / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / n).ln() + 1.0);
        -2.0 * llf + 2.0 * self.params.len() as f64
    }

    #[allow(clippy::cast_precision_loss)]
    fn t_value(&self, index: usize) -> f64 {
        let dof = (self.nobs - self.params.len()) as f64;
        let sigma2 = self.ssr / dof;
        self.params[index] / (sigma2 * self.xtx_inv[(index, index)]).sqrt()
    }
}

fn ols(y: &DVector<f64>, x: &DMatrix<f64>) -> Option<OlsFit> {
    let xtx_inv = (x.transpose() * x).try_inverse()?;
    let params = &xtx_inv * x.transpose() * y;
    let residuals = y - x * &params;
    Some(OlsFit {
        ssr: residuals.norm_squared(),
        params,
        xtx_inv,
        nobs: y.len(),
    })
}

/// Design matrix `[level, Δx_{t-1} .. Δx_{t-lags}, 1]` and response `Δx_t`
/// for the last `nobs` differences.
fn adf_design(series: &[f64], diffs: &[f64], lags: usize, nobs: usize) -> (DVector<f64>, DMatrix<f64>) {
    let offset = diffs.len() - nobs;
    let cols = lags + 2;
    let x = DMatrix::from_fn(nobs, cols, |row, col| {
        let t = offset + row;
        match col {
            0 => series[t],
            c if c <= lags => diffs[t - c],
            _ => 1.0,
        }
    });
    let y = DVector::from_iterator(nobs, diffs[offset..].iter().copied());
    (y, x)
}

/// Augmented Dickey-Fuller test with a constant.
///
/// The maximum lag is `ceil(12 * (n / 100)^(1/4))`, capped at `n / 2 - 2`.
/// Every candidate lag is fitted on the same sample and the one with the
/// lowest AIC is refitted on the longest sample it allows.
///
/// # Errors
///
/// Returns `BacktestError::Data` if the series is too short or a regression
/// is singular (for example a constant series).
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn adf_test(series: &[f64]) -> Result<AdfResult> {
    let n = series.len();
    if n < 6 {
        return Err(BacktestError::data(format!(
            "ADF test needs at least 6 observations, got {n}"
        )));
    }

    let schwert = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    let max_lag = schwert.min(n / 2 - 2);
    let diffs: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

    let common_nobs = diffs.len() - max_lag;
    let (y, full) = adf_design(series, &diffs, max_lag, common_nobs);

    let mut best: Option<(f64, usize)> = None;
    for lag in 0..=max_lag {
        let x = DMatrix::from_fn(common_nobs, lag + 2, |row, col| {
            if col <= lag {
                full[(row, col)]
            } else {
                1.0
            }
        });
        let Some(fit) = ols(&y, &x) else { continue };
        let aic = fit.aic();
        if best.map_or(true, |(ic, _)| aic < ic) {
            best = Some((aic, lag));
        }
    }
    let (ic_best, used_lag) =
        best.ok_or_else(|| BacktestError::data("ADF regression is singular for every lag"))?;

    let nobs = diffs.len() - used_lag;
    let (y, x) = adf_design(series, &diffs, used_lag, nobs);
    if nobs <= x.ncols() {
        return Err(BacktestError::data("ADF regression has no residual degrees of freedom"));
    }
    let fit = ols(&y, &x).ok_or_else(|| BacktestError::data("ADF regression is singular"))?;
    let statistic = fit.t_value(0);
    if !statistic.is_finite() {
        return Err(BacktestError::data("ADF statistic is not finite"));
    }

    tracing::debug!(statistic, used_lag, nobs, "ADF test complete");

    Ok(AdfResult {
        statistic,
        p_value: mackinnon_p_value(statistic),
        used_lag,
        nobs,
        critical_values: CriticalValues::for_nobs(nobs),
        ic_best,
    })
}

// ============================================================
// Autocorrelation
// ============================================================

/// Sample autocorrelation for lags `0..=nlags` (capped at `n - 1`).
///
/// Autocovariances are normalized by `n` and the series is demeaned first, so
/// lag 0 is 1 for any non-constant series.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn acf(series: &[f64], nlags: usize) -> Vec<f64> {
    let n = series.len();
    if n == 0 {
        return Vec::new();
    }
    let m = mean(series);
    let demeaned: Vec<f64> = series.iter().map(|v| v - m).collect();
    let autocov = |k: usize| -> f64 {
        demeaned[..n - k]
            .iter()
            .zip(&demeaned[k..])
            .map(|(a, b)| a * b)
            .sum::<f64>()
            / n as f64
    };
    let c0 = autocov(0);
    (0..=nlags.min(n - 1)).map(|k| autocov(k) / c0).collect()
}

// ============================================================
// Combined
// ============================================================

/// Every edge test that could be computed for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticalTests {
    /// Present when market returns were supplied.
    pub welch: Option<WelchTTest>,
    /// Absent when the regression could not be fitted.
    pub adf: Option<AdfResult>,
    pub acf: Vec<f64>,
}

impl StatisticalTests {
    /// Runs all tests; failures of individual tests are logged and left out.
    #[must_use]
    pub fn run(strategy: &[f64], market: Option<&[f64]>, acf_lags: usize) -> Self {
        let welch = market.and_then(|m| match welch_t_test(strategy, m) {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping t-test");
                None
            }
        });
        let adf = match adf_test(strategy) {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping ADF test");
                None
            }
        };
        Self {
            welch,
            adf,
            acf: acf(strategy, acf_lags),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn noise(n: usize, seed: u64) -> Vec<f64> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect()
    }

    // ============================================================
    // Welch
    // ============================================================

    #[test]
    fn welch_matches_hand_computation() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [2.0, 4.0, 6.0, 8.0];
        let result = welch_t_test(&a, &b).unwrap();
        // var(a)/4 = 5/12, var(b)/4 = 20/12, se = sqrt(25/12)
        let expected_t = -2.5 / (25.0_f64 / 12.0).sqrt();
        assert!((result.t_statistic - expected_t).abs() < 1e-12);
        // (25/12)^2 / ((5/12)^2/3 + (20/12)^2/3) = 625 / 425 * 3
        assert!((result.degrees_of_freedom - 625.0 * 3.0 / 425.0).abs() < 1e-9);
        assert!(result.p_value > 0.05 && result.p_value < 0.5);
    }

    #[test]
    fn identical_samples_have_p_value_one() {
        let a = [0.01, -0.02, 0.03, 0.0];
        let result = welch_t_test(&a, &a).unwrap();
        assert_eq!(result.t_statistic, 0.0);
        assert!((result.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn welch_needs_two_values() {
        assert!(welch_t_test(&[1.0], &[1.0, 2.0]).is_err());
    }

    // ============================================================
    // ADF
    // ============================================================

    #[test]
    fn white_noise_is_stationary() {
        let result = adf_test(&noise(250, 7)).unwrap();
        assert!(result.statistic < result.critical_values.one_percent);
        assert!(result.is_stationary(0.01));
    }

    #[test]
    fn random_walk_scores_far_above_noise() {
        let steps = noise(250, 11);
        let walk: Vec<f64> = steps
            .iter()
            .scan(0.0, |level, step| {
                *level += step;
                Some(*level)
            })
            .collect();
        let walk_result = adf_test(&walk).unwrap();
        let noise_result = adf_test(&steps).unwrap();
        assert!(walk_result.statistic > -5.0);
        assert!(walk_result.statistic > noise_result.statistic);
        assert!(walk_result.p_value > noise_result.p_value);
    }

    #[test]
    fn lag_selection_respects_cap() {
        let result = adf_test(&noise(40, 3)).unwrap();
        // ceil(12 * 0.4^0.25) = 10, capped at 40 / 2 - 2 = 18
        assert!(result.used_lag <= 10);
        assert_eq!(result.nobs, 39 - result.used_lag);
    }

    #[test]
    fn constant_series_is_an_error() {
        assert!(adf_test(&[0.0; 30]).is_err());
        assert!(adf_test(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn critical_values_approach_asymptotes() {
        let cv = CriticalValues::for_nobs(1_000_000);
        assert!((cv.one_percent - -3.43035).abs() < 1e-4);
        assert!((cv.five_percent - -2.86154).abs() < 1e-4);
        assert!((cv.ten_percent - -2.56677).abs() < 1e-4);
        let small = CriticalValues::for_nobs(100);
        assert!(small.one_percent < cv.one_percent);
    }

    #[test]
    fn mackinnon_p_value_at_known_points() {
        // the 5% asymptotic critical value maps to roughly 0.05
        assert!((mackinnon_p_value(-2.86154) - 0.05).abs() < 0.005);
        assert_eq!(mackinnon_p_value(3.0), 1.0);
        assert_eq!(mackinnon_p_value(-20.0), 0.0);
        assert!(mackinnon_p_value(-1.0) > mackinnon_p_value(-2.0));
    }

    // ============================================================
    // ACF
    // ============================================================

    #[test]
    fn acf_of_alternating_series() {
        let series = [1.0, -1.0, 1.0, -1.0, 1.0, -1.0];
        let r = acf(&series, 20);
        assert_eq!(r.len(), 6);
        assert_eq!(r[0], 1.0);
        // lag 1: -5/6, lag 2: 4/6
        assert!((r[1] - (-5.0 / 6.0)).abs() < 1e-12);
        assert!((r[2] - (4.0 / 6.0)).abs() < 1e-12);
    }

    #[test]
    fn combined_tests_skip_failures() {
        let flat = [0.0; 10];
        let tests = StatisticalTests::run(&flat, None, 5);
        assert!(tests.welch.is_none());
        assert!(tests.adf.is_none());
        assert_eq!(tests.acf.len(), 6);

        let returns = noise(100, 5);
        let market = noise(100, 6);
        let tests = StatisticalTests::run(&returns, Some(&market), 20);
        assert!(tests.welch.is_some());
        assert!(tests.adf.is_some());
        assert_eq!(tests.acf.len(), 21);
    }
}
