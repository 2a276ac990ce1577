//! Quartile-based risk bucketing.

use crime_dash_crime_models::RiskLevel;

/// The three quartile cut points of a count distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskThresholds {
    /// 25th percentile.
    pub p25: f64,
    /// Median.
    pub p50: f64,
    /// 75th percentile.
    pub p75: f64,
}

impl RiskThresholds {
    /// Computes the quartiles of `counts`, or `None` when empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_counts(counts: &[u64]) -> Option<Self> {
        let mut sorted: Vec<f64> = counts.iter().map(|c| *c as f64).collect();
        sorted.sort_by(f64::total_cmp);

        Some(Self {
            p25: quantile(&sorted, 0.25)?,
            p50: quantile(&sorted, 0.5)?,
            p75: quantile(&sorted, 0.75)?,
        })
    }

    /// Labels a single value. Ties at a cut point take the lower tier.
    #[must_use]
    pub fn label(&self, value: f64) -> RiskLevel {
        if value <= self.p25 {
            RiskLevel::Baixo
        } else if value <= self.p50 {
            RiskLevel::Medio
        } else if value <= self.p75 {
            RiskLevel::Alto
        } else {
            RiskLevel::Critico
        }
    }
}

/// Linear-interpolated quantile of an ascending slice.
///
/// The position is `(n - 1) * q`; values between order statistics are
/// interpolated. Returns `None` for an empty slice.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let position = last as f64 * q.clamp(0.0, 1.0);
    let lower = position.floor() as usize;
    let upper = (lower + 1).min(last);
    let fraction = position - lower as f64;

    Some((sorted[upper] - sorted[lower]).mul_add(fraction, sorted[lower]))
}

/// Assigns a risk tier to every count, preserving length and order.
///
/// Empty input yields empty output.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn classify(counts: &[u64]) -> Vec<RiskLevel> {
    let Some(thresholds) = RiskThresholds::from_counts(counts) else {
        return Vec::new();
    };

    log::debug!(
        "Risk thresholds over {} value(s): p25={} p50={} p75={}",
        counts.len(),
        thresholds.p25,
        thresholds.p50,
        thresholds.p75
    );

    counts
        .iter()
        .map(|c| thresholds.label(*c as f64))
        .collect()
}
