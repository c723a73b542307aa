//! Descriptive statistics over plain `f64` columns.

// ── Statistics ────────────────────────────────────────────────────────────────

/// Stateless collection of column reductions.
///
/// Every function returning `Option` yields `None` when the statistic is
/// undefined for the input (empty column, too few values, zero variance).
pub struct Statistics;

impl Statistics {
    pub fn sum(values: &[f64]) -> f64 {
        values.iter().sum()
    }

    /// Arithmetic mean.
    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Some(Self::sum(values) / values.len() as f64)
    }

    pub fn min(values: &[f64]) -> Option<f64> {
        values.iter().copied().reduce(f64::min)
    }

    pub fn max(values: &[f64]) -> Option<f64> {
        values.iter().copied().reduce(f64::max)
    }

    /// `max - min`.
    pub fn range(values: &[f64]) -> Option<f64> {
        Some(Self::max(values)? - Self::min(values)?)
    }

    /// Sample standard deviation (Bessel's correction, `n - 1` denominator).
    ///
    /// Returns `None` for fewer than two values.
    pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
        if values.len() < 2 {
            return None;
        }
        let mean = Self::mean(values)?;
        let sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        Some((sq / (values.len() - 1) as f64).sqrt())
    }

    /// Pearson correlation coefficient of two equally long columns.
    ///
    /// Returns `None` when the lengths differ, fewer than two pairs exist,
    /// or either column is constant. The result is clamped to `[-1, 1]` to
    /// absorb floating-point overshoot.
    pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
        if xs.len() != ys.len() || xs.len() < 2 {
            return None;
        }
        let mean_x = Self::mean(xs)?;
        let mean_y = Self::mean(ys)?;

        let mut cov = 0.0;
        let mut var_x = 0.0;
        let mut var_y = 0.0;
        for (x, y) in xs.iter().zip(ys) {
            let dx = x - mean_x;
            let dy = y - mean_y;
            cov += dx * dy;
            var_x += dx * dx;
            var_y += dy * dy;
        }

        if var_x == 0.0 || var_y == 0.0 {
            return None;
        }
        Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
    }

    /// Ordinary least-squares fit `y = slope * x + intercept`.
    ///
    /// Returns `(slope, intercept)`, or `None` when fewer than two points
    /// exist or all `x` are equal.
    pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
        if xs.len() != ys.len() || xs.len() < 2 {
            return None;
        }
        let mean_x = Self::mean(xs)?;
        let mean_y = Self::mean(ys)?;
        let mut num = 0.0;
        let mut den = 0.0;
        for (x, y) in xs.iter().zip(ys) {
            num += (x - mean_x) * (y - mean_y);
            den += (x - mean_x).powi(2);
        }
        if den == 0.0 {
            return None;
        }
        let slope = num / den;
        Some((slope, mean_y - slope * mean_x))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
