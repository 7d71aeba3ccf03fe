//! Signal conditioning primitives shared by the curve-analysis workflows:
//! local-polynomial smoothing, finite-difference gradients, prominence-based
//! peak detection, and trapezoidal integration.

/// Default Savitzky–Golay window, in samples. Shrunk to the largest odd
/// number not exceeding the series length for short series.
pub const DEFAULT_SMOOTH_WINDOW: usize = 101;
/// Default local polynomial order.
pub const DEFAULT_SMOOTH_ORDER: usize = 3;

/// Savitzky–Golay smoothing: fit a polynomial of `order` to each sliding
/// window of `window` samples and evaluate it at the sample position. Windows
/// are clamped at the edges, so the first and last half-windows are smoothed
/// against the nearest full window (matching the usual "interp" edge mode).
pub fn savgol_filter(values: &[f64], window: usize, order: usize) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }

    let window = effective_window(window, n);
    if window < 3 {
        return values.to_vec();
    }
    let order = order.min(window - 1);
    let half = window / 2;

    let mut smoothed = Vec::with_capacity(n);
    for i in 0..n {
        let start = i.saturating_sub(half).min(n - window);
        // x runs over window offsets; evaluate the fit at this sample.
        let xs: Vec<f64> = (0..window).map(|k| k as f64).collect();
        let ys = &values[start..start + window];
        let coeffs = polyfit(&xs, ys, order);
        let x = (i - start) as f64;
        smoothed.push(polyval(&coeffs, x));
    }
    smoothed
}

/// Largest odd window not exceeding the series length (minimum 3).
fn effective_window(window: usize, len: usize) -> usize {
    let mut w = window.min(len);
    if w % 2 == 0 {
        w = w.saturating_sub(1);
    }
    w.max(1)
}

/// Least-squares polynomial fit via normal equations. The systems here are
/// tiny (order ≤ 3, so at most 4×4) and well conditioned over window offsets.
fn polyfit(xs: &[f64], ys: &[f64], order: usize) -> Vec<f64> {
    let terms = order + 1;
    let mut ata = vec![vec![0.0; terms]; terms];
    let mut atb = vec![0.0; terms];

    for (&x, &y) in xs.iter().zip(ys.iter()) {
        let mut powers = vec![1.0; terms];
        for p in 1..terms {
            powers[p] = powers[p - 1] * x;
        }
        for row in 0..terms {
            for col in 0..terms {
                ata[row][col] += powers[row] * powers[col];
            }
            atb[row] += powers[row] * y;
        }
    }

    solve(ata, atb)
}

fn polyval(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Vec<f64> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| {
                a[i][col]
                    .abs()
                    .partial_cmp(&a[j][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        a.swap(col, pivot);
        b.swap(col, pivot);

        let diag = a[col][col];
        if diag.abs() < 1e-12 {
            continue;
        }
        for row in (col + 1)..n {
            let factor = a[row][col] / diag;
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let mut sum = b[row];
        for col in (row + 1)..n {
            sum -= a[row][col] * x[col];
        }
        let diag = a[row][row];
        x[row] = if diag.abs() < 1e-12 { 0.0 } else { sum / diag };
    }
    x
}

/// Finite-difference gradient of `y` with respect to `x`, second order in the
/// interior for non-uniform spacing, one-sided at the ends.
pub fn gradient(y: &[f64], x: &[f64]) -> Vec<f64> {
    let n = y.len().min(x.len());
    if n < 2 {
        return vec![0.0; n];
    }

    let mut grad = vec![0.0; n];
    grad[0] = slope(y[1] - y[0], x[1] - x[0]);
    grad[n - 1] = slope(y[n - 1] - y[n - 2], x[n - 1] - x[n - 2]);

    for i in 1..n - 1 {
        let hd = x[i] - x[i - 1];
        let hs = x[i + 1] - x[i];
        if hd.abs() < f64::EPSILON || hs.abs() < f64::EPSILON {
            grad[i] = slope(y[i + 1] - y[i - 1], x[i + 1] - x[i - 1]);
            continue;
        }
        grad[i] = (hd * hd * y[i + 1] + (hs * hs - hd * hd) * y[i] - hs * hs * y[i - 1])
            / (hs * hd * (hd + hs));
    }
    grad
}

fn slope(dy: f64, dx: f64) -> f64 {
    if dx.abs() < f64::EPSILON {
        0.0
    } else {
        dy / dx
    }
}

/// Parameters for [`find_peaks`].
#[derive(Debug, Clone, Copy)]
pub struct PeakParams {
    /// Minimum prominence relative to the surrounding bases.
    pub min_prominence: f64,
    /// Minimum separation between kept peaks, in samples.
    pub min_distance: usize,
}

/// Indices of prominent local maxima, ascending. Plateaus count once, at
/// their midpoint. When peaks crowd within `min_distance`, the taller one
/// wins.
pub fn find_peaks(values: &[f64], params: PeakParams) -> Vec<usize> {
    let n = values.len();
    if n < 3 {
        return Vec::new();
    }

    let mut candidates = Vec::new();
    let mut i = 1;
    while i < n - 1 {
        if values[i] > values[i - 1] {
            // Walk any plateau.
            let mut j = i;
            while j + 1 < n && values[j + 1] == values[i] {
                j += 1;
            }
            if j + 1 < n && values[j + 1] < values[i] {
                candidates.push((i + j) / 2);
            }
            i = j + 1;
        } else {
            i += 1;
        }
    }

    let mut kept: Vec<usize> = candidates
        .into_iter()
        .filter(|&idx| prominence(values, idx) >= params.min_prominence)
        .collect();

    if params.min_distance > 1 {
        kept.sort_by(|&a, &b| {
            values[b]
                .partial_cmp(&values[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let mut selected: Vec<usize> = Vec::new();
        for idx in kept {
            if selected
                .iter()
                .all(|&s| idx.abs_diff(s) >= params.min_distance)
            {
                selected.push(idx);
            }
        }
        selected.sort_unstable();
        return selected;
    }

    kept.sort_unstable();
    kept
}

/// Topographic prominence of the peak at `idx`: height above the higher of
/// the two key saddles found walking out to the next taller sample (or the
/// series edge).
fn prominence(values: &[f64], idx: usize) -> f64 {
    let peak = values[idx];

    let mut left_base = peak;
    for &value in values[..idx].iter().rev() {
        if value > peak {
            break;
        }
        left_base = left_base.min(value);
    }

    let mut right_base = peak;
    for &value in values[idx + 1..].iter() {
        if value > peak {
            break;
        }
        right_base = right_base.min(value);
    }

    peak - left_base.max(right_base)
}

/// Trapezoidal integral of `y dx`.
pub fn trapezoid(y: &[f64], x: &[f64]) -> f64 {
    let n = y.len().min(x.len());
    let mut area = 0.0;
    for i in 1..n {
        area += 0.5 * (y[i] + y[i - 1]) * (x[i] - x[i - 1]);
    }
    area
}

/// Ordinary least-squares line fit; returns (intercept, slope).
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let sum_x: f64 = xs[..n].iter().sum();
    let sum_y: f64 = ys[..n].iter().sum();
    let sum_xx: f64 = xs[..n].iter().map(|x| x * x).sum();
    let sum_xy: f64 = xs[..n].iter().zip(&ys[..n]).map(|(x, y)| x * y).sum();

    let denom = nf * sum_xx - sum_x * sum_x;
    if denom.abs() < 1e-12 {
        return None;
    }
    let slope = (nf * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / nf;
    Some((intercept, slope))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn savgol_reproduces_a_cubic_exactly() {
        // A degree-3 fit is exact on degree-3 data regardless of window.
        let xs: Vec<f64> = (0..200).map(|i| i as f64 / 10.0).collect();
        let values: Vec<f64> = xs.iter().map(|x| 0.5 * x * x * x - x * x + 2.0).collect();
        let smoothed = savgol_filter(&values, 101, 3);
        for (raw, smooth) in values.iter().zip(&smoothed) {
            assert!((raw - smooth).abs() < 1e-6, "{raw} vs {smooth}");
        }
    }

    #[test]
    fn savgol_shrinks_the_window_for_short_series() {
        let values = vec![1.0, 2.0, 4.0, 2.0, 1.0];
        let smoothed = savgol_filter(&values, 101, 3);
        assert_eq!(smoothed.len(), values.len());
        assert!(smoothed.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn savgol_attenuates_alternating_noise() {
        let clean: Vec<f64> = (0..300).map(|i| (i as f64) * 0.01).collect();
        let noisy: Vec<f64> = clean
            .iter()
            .enumerate()
            .map(|(i, v)| v + if i % 2 == 0 { 0.2 } else { -0.2 })
            .collect();
        let smoothed = savgol_filter(&noisy, 101, 3);
        let mid = 150;
        assert!((smoothed[mid] - clean[mid]).abs() < 0.05);
    }

    #[test]
    fn gradient_of_a_line_is_its_slope() {
        let x: Vec<f64> = (0..50).map(|i| i as f64 * 0.5).collect();
        let y: Vec<f64> = x.iter().map(|v| 3.0 * v + 1.0).collect();
        for g in gradient(&y, &x) {
            assert!((g - 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn find_peaks_locates_a_gaussian_bump() {
        let values: Vec<f64> = (0..200)
            .map(|i| (-((i as f64 - 100.0) / 12.0).powi(2)).exp())
            .collect();
        let peaks = find_peaks(
            &values,
            PeakParams {
                min_prominence: 0.01,
                min_distance: 50,
            },
        );
        assert_eq!(peaks, vec![100]);
    }

    #[test]
    fn find_peaks_enforces_distance_keeping_the_taller() {
        let mut values = vec![0.0; 120];
        values[30] = 1.0;
        values[50] = 2.0;
        let peaks = find_peaks(
            &values,
            PeakParams {
                min_prominence: 0.01,
                min_distance: 50,
            },
        );
        assert_eq!(peaks, vec![50]);
    }

    #[test]
    fn low_prominence_ripples_are_ignored() {
        let values: Vec<f64> = (0..100).map(|i| (i as f64 * 0.7).sin() * 0.001).collect();
        let peaks = find_peaks(
            &values,
            PeakParams {
                min_prominence: 0.01,
                min_distance: 1,
            },
        );
        assert!(peaks.is_empty());
    }

    #[test]
    fn trapezoid_integrates_a_constant() {
        let x: Vec<f64> = (0..11).map(|i| i as f64).collect();
        let y = vec![2.0; 11];
        assert!((trapezoid(&y, &x) - 20.0).abs() < 1e-12);
    }

    #[test]
    fn linear_fit_recovers_a_line() {
        let xs: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 2.5 * x - 4.0).collect();
        let (intercept, slope) = linear_fit(&xs, &ys).expect("fit");
        assert!((slope - 2.5).abs() < 1e-9);
        assert!((intercept + 4.0).abs() < 1e-9);
    }
}
