//! Chart descriptors.
//!
//! Plain serializable structs consumed by the page template's SVG
//! renderers. Building a descriptor does no computation beyond formatting
//! and color mapping; the one exception is the forest plot's error bars,
//! which are back-derived from each row's p-value because the upstream
//! table carries no variance columns.

use serde::Serialize;

use crate::model::{FunnelStep, LaunchPhase, SegmentResult};

/// Green for significant, red for not.
pub const SIGNIFICANT_COLOR: &str = "#4CAF50";
pub const NOT_SIGNIFICANT_COLOR: &str = "#f44336";

/// Funnel stage palette, darkest first.
pub const FUNNEL_PALETTE: [&str; 7] = [
    "#1E88E5", "#2196F3", "#42A5F5", "#64B5F6", "#90CAF9", "#BBDEFB", "#E3F2FD",
];

pub fn significance_color(significant: bool) -> &'static str {
    if significant {
        SIGNIFICANT_COLOR
    } else {
        NOT_SIGNIFICANT_COLOR
    }
}

/// Categorical scatter of per-segment lift with error bars.
#[derive(Debug, Clone, Serialize)]
pub struct ForestPlot {
    pub points: Vec<ForestPoint>,
    /// Lift the launch gate asks for, in percent.
    pub target_pct: f64,
    pub x_label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForestPoint {
    pub segment: String,
    pub lift_pct: f64,
    pub ci_low_pct: f64,
    pub ci_high_pct: f64,
    pub p_value: f64,
    pub significant: bool,
    pub color: String,
}

/// Build the forest plot from segment rows (the pooled `overall` row is
/// excluded by the caller).
pub fn forest_plot<'a>(segments: impl Iterator<Item = &'a SegmentResult>) -> ForestPlot {
    let points = segments
        .map(|r| {
            let lift_pct = r.relative_lift * 100.0;
            let half = ci_half_width_pct(lift_pct, r.p_value);
            ForestPoint {
                segment: r.segment.clone(),
                lift_pct,
                ci_low_pct: lift_pct - half,
                ci_high_pct: lift_pct + half,
                p_value: r.p_value,
                significant: r.significant,
                color: significance_color(r.significant).into(),
            }
        })
        .collect();
    ForestPlot {
        points,
        target_pct: 10.0,
        x_label: "Relative Lift (%)".into(),
    }
}

/// 95% interval half-width recovered from the p-value under a normal
/// approximation: z = |lift| / se, so half = 1.96 * |lift| / z(p). Bars
/// clear zero exactly when p < 0.05. Degenerate rows (p outside (0, 1),
/// zero lift) fall back to half the lift magnitude.
fn ci_half_width_pct(lift_pct: f64, p: f64) -> f64 {
    let fallback = lift_pct.abs() / 2.0;
    if lift_pct == 0.0 {
        return fallback;
    }
    let p = p.clamp(1e-12, 1.0 - 1e-12);
    let z = inverse_normal_cdf(1.0 - p / 2.0);
    if z <= 0.0 || !z.is_finite() {
        return fallback;
    }
    1.96 * lift_pct.abs() / z
}

/// Acklam's rational approximation to the standard normal quantile.
/// Absolute error under 1.15e-9 over (0, 1).
fn inverse_normal_cdf(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];
    const P_LOW: f64 = 0.02425;

    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}

/// Dual panel: funnel of sessions per step plus per-step drop-off bars.
#[derive(Debug, Clone, Serialize)]
pub struct FunnelCombo {
    pub bars: Vec<FunnelBar>,
    /// The step losing the largest share of its predecessor's sessions.
    pub worst: Option<WorstDropoff>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunnelBar {
    pub step: String,
    pub sessions: u64,
    pub conversion_pct: f64,
    pub dropoff_pct: f64,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorstDropoff {
    pub step: String,
    pub dropoff_pct: f64,
}

pub fn funnel_combo(steps: &[FunnelStep]) -> FunnelCombo {
    let bars = steps
        .iter()
        .enumerate()
        .map(|(i, s)| FunnelBar {
            step: s.step.clone(),
            sessions: s.sessions_reached,
            conversion_pct: s.conversion_rate * 100.0,
            dropoff_pct: s.dropoff_rate * 100.0,
            color: FUNNEL_PALETTE[i.min(FUNNEL_PALETTE.len() - 1)].into(),
        })
        .collect();
    let worst = steps
        .iter()
        .skip(1)
        .max_by(|a, b| a.dropoff_rate.total_cmp(&b.dropoff_rate))
        .map(|s| WorstDropoff {
            step: s.step.clone(),
            dropoff_pct: s.dropoff_rate * 100.0,
        });
    FunnelCombo { bars, worst }
}

/// Single-value card with an optional reference delta.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorCard {
    pub label: String,
    /// Preformatted display value.
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Relative delta against a fixed reference, in percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta_pct: Option<f64>,
    pub color: String,
    /// Rebind key for slider-dependent cards.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
}

impl IndicatorCard {
    pub fn new(label: &str, value: String, color: &str) -> Self {
        Self {
            label: label.into(),
            value,
            detail: None,
            delta_pct: None,
            color: color.into(),
            bind: None,
        }
    }

    pub fn detail(mut self, detail: &str) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn delta_against(mut self, reference: f64, value: f64) -> Self {
        if reference != 0.0 {
            self.delta_pct = Some((value - reference) / reference * 100.0);
        }
        self
    }

    pub fn bound(mut self, bind: &str) -> Self {
        self.bind = Some(bind.into());
        self
    }
}

/// One bar per launch phase between its start and end dates.
#[derive(Debug, Clone, Serialize)]
pub struct Timeline {
    pub bars: Vec<TimelineBar>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineBar {
    pub name: String,
    pub start: String,
    pub end: String,
    pub description: String,
    pub target_lift_pct: f64,
    pub audience: String,
    pub color: String,
}

pub fn timeline(phases: &[LaunchPhase]) -> Timeline {
    let bars = phases
        .iter()
        .enumerate()
        .map(|(i, p)| TimelineBar {
            name: p.name.clone(),
            start: p.start.clone(),
            end: p.end.clone(),
            description: p.description.clone(),
            target_lift_pct: p.target_lift * 100.0,
            audience: p.audience.clone(),
            color: FUNNEL_PALETTE[i.min(3)].into(),
        })
        .collect();
    Timeline { bars }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic;

    #[test]
    fn inverse_normal_matches_known_quantiles() {
        // Standard table values.
        assert!((inverse_normal_cdf(0.975) - 1.959964).abs() < 1e-4);
        assert!((inverse_normal_cdf(0.5) - 0.0).abs() < 1e-9);
        assert!((inverse_normal_cdf(0.8413) - 1.0).abs() < 1e-3);
        assert!(inverse_normal_cdf(0.0001) < -3.0);
    }

    #[test]
    fn significant_bars_clear_zero() {
        let bundle = synthetic::bundle();
        let plot = forest_plot(bundle.segments());
        assert_eq!(plot.points.len(), 4, "overall row must be excluded");
        for p in &plot.points {
            assert!(p.significant);
            assert!(
                p.ci_low_pct > 0.0,
                "{}: interval [{:.2}, {:.2}] should clear zero",
                p.segment,
                p.ci_low_pct,
                p.ci_high_pct
            );
            assert_eq!(p.color, SIGNIFICANT_COLOR);
        }
    }

    #[test]
    fn non_significant_bars_straddle_zero() {
        let row = SegmentResult {
            segment: "tablet".into(),
            control_mean: 0.2,
            treatment_mean: 0.202,
            relative_lift: 0.01,
            p_value: 0.5702,
            significant: false,
        };
        let plot = forest_plot([&row].into_iter());
        let p = &plot.points[0];
        assert!(p.ci_low_pct < 0.0 && p.ci_high_pct > 0.0);
        assert_eq!(p.color, NOT_SIGNIFICANT_COLOR);
    }

    #[test]
    fn worst_dropoff_is_computed_from_data() {
        let combo = funnel_combo(&synthetic::funnel_overall());
        let worst = combo.worst.unwrap();
        assert_eq!(worst.step, "reels_posted");
        assert!((worst.dropoff_pct - 25.0).abs() < 1e-9);
    }

    #[test]
    fn delta_is_relative_to_reference() {
        let card = IndicatorCard::new("Revenue", "$2,108,638".into(), "#4CAF50")
            .delta_against(1_500_000.0, 2_108_638.0);
        let delta = card.delta_pct.unwrap();
        assert!((delta - 40.6).abs() < 0.1);
    }
}
