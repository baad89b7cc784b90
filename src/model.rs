//! Result-bundle data model.
//!
//! Everything here is read-only within a render pass: the bundle is loaded
//! once and treated as immutable for the process lifetime. All analysis
//! (t-tests, funnel aggregation) happened upstream; these types only carry
//! what the upstream pipeline wrote out.

use serde::{Deserialize, Serialize};

/// Expected header of the A/B results table.
pub const AB_COLUMNS: [&str; 6] = [
    "segment",
    "control_mean",
    "treatment_mean",
    "relative_lift",
    "p_value",
    "significant",
];

/// Expected header of the overall funnel table.
pub const FUNNEL_COLUMNS: [&str; 4] = [
    "funnel_step",
    "sessions_reached",
    "conversion_rate",
    "dropoff_rate",
];

/// Expected header of the per-cohort funnel table.
pub const COHORT_FUNNEL_COLUMNS: [&str; 5] = [
    "cohort",
    "funnel_step",
    "sessions_reached",
    "conversion_rate",
    "dropoff_rate",
];

/// Row name of the pooled result in the A/B table. Segment breakdowns
/// exclude it.
pub const OVERALL_SEGMENT: &str = "overall";

/// Significance threshold used by the upstream computation. The dashboard
/// displays `significant` as written; it does not recompute it.
pub const SIGNIFICANCE_ALPHA: f64 = 0.05;

/// One row of the A/B results table: a named sub-population with its
/// control/treatment means and the upstream test verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentResult {
    pub segment: String,
    pub control_mean: f64,
    pub treatment_mean: f64,
    pub relative_lift: f64,
    pub p_value: f64,
    pub significant: bool,
}

impl SegmentResult {
    /// Whether the stored verdict agrees with the stored p-value. Assumed,
    /// not enforced: a disagreement is logged by the loader, never fixed up.
    pub fn significance_consistent(&self) -> bool {
        self.significant == (self.p_value < SIGNIFICANCE_ALPHA)
    }
}

/// One stage of the creation funnel. `conversion_rate` is relative to the
/// first step; `dropoff_rate` is relative to the preceding step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelStep {
    pub step: String,
    pub sessions_reached: u64,
    pub conversion_rate: f64,
    pub dropoff_rate: f64,
}

/// The overall funnel table grouped by an additional cohort key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortFunnel {
    pub cohort: String,
    pub steps: Vec<FunnelStep>,
}

/// Per-period business-impact figures as written by the upstream analysis,
/// observed at the experiment's adoption rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodImpact {
    pub additional_creators: f64,
    pub additional_reels: f64,
    pub additional_watch_time_hours: f64,
    pub additional_revenue: f64,
}

/// The business-impact JSON artifact: one record per period, full field set
/// in both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BusinessImpactRecord {
    pub daily: PeriodImpact,
    pub monthly: PeriodImpact,
}

/// All four loaded artifacts. Downstream rendering never branches on which
/// source produced a table; synthetic substitutes carry the identical shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultBundle {
    pub business_impact: BusinessImpactRecord,
    pub ab_results: Vec<SegmentResult>,
    pub funnel_overall: Vec<FunnelStep>,
    pub funnel_cohort: Vec<CohortFunnel>,
}

impl ResultBundle {
    /// Segment rows excluding the pooled `overall` row.
    pub fn segments(&self) -> impl Iterator<Item = &SegmentResult> {
        self.ab_results
            .iter()
            .filter(|r| r.segment != OVERALL_SEGMENT)
    }
}

/// Check the funnel table invariants: at least one step, sessions
/// non-increasing, first conversion rate exactly 1.0, all rates in [0, 1].
/// Returns a human-readable reason on the first violation.
pub fn validate_funnel(steps: &[FunnelStep]) -> Result<(), String> {
    let first = match steps.first() {
        Some(s) => s,
        None => return Err("funnel table has no steps".into()),
    };
    if (first.conversion_rate - 1.0).abs() > 1e-9 {
        return Err(format!(
            "first step {} has conversion_rate {} (must be 1.0)",
            first.step, first.conversion_rate
        ));
    }
    let mut prev_sessions = first.sessions_reached;
    for (i, s) in steps.iter().enumerate() {
        if s.sessions_reached > prev_sessions {
            return Err(format!(
                "sessions_reached increases at step {} ({} > {})",
                s.step, s.sessions_reached, prev_sessions
            ));
        }
        if !(0.0..=1.0).contains(&s.conversion_rate) {
            return Err(format!(
                "step {} conversion_rate {} outside [0, 1]",
                s.step, s.conversion_rate
            ));
        }
        if !(0.0..=1.0).contains(&s.dropoff_rate) {
            return Err(format!(
                "step {} dropoff_rate {} outside [0, 1]",
                s.step, s.dropoff_rate
            ));
        }
        if i > 0 && s.conversion_rate > steps[i - 1].conversion_rate + 1e-9 {
            return Err(format!(
                "conversion_rate increases at step {}",
                s.step
            ));
        }
        prev_sessions = s.sessions_reached;
    }
    Ok(())
}

/// Check the A/B table shape: non-empty, unique segment names, means and
/// p-values inside [0, 1].
pub fn validate_ab_results(rows: &[SegmentResult]) -> Result<(), String> {
    if rows.is_empty() {
        return Err("A/B results table has no rows".into());
    }
    for r in rows {
        for (name, v) in [
            ("control_mean", r.control_mean),
            ("treatment_mean", r.treatment_mean),
            ("p_value", r.p_value),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(format!("segment {}: {} {} outside [0, 1]", r.segment, name, v));
            }
        }
    }
    for (i, r) in rows.iter().enumerate() {
        if rows[..i].iter().any(|other| other.segment == r.segment) {
            return Err(format!("duplicate segment name {}", r.segment));
        }
    }
    Ok(())
}

/// One phase of the rollout plan. Static reference data, not derived from
/// the loaded bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchPhase {
    pub name: String,
    /// ISO date, inclusive.
    pub start: String,
    /// ISO date, inclusive.
    pub end: String,
    pub description: String,
    /// Minimum creation-success lift the phase must hold to proceed.
    pub target_lift: f64,
    pub audience: String,
}

/// The phased rollout plan shown in the Launch Strategy view.
pub fn launch_phases() -> Vec<LaunchPhase> {
    let phase = |name: &str, start: &str, end: &str, description: &str, target_lift: f64, audience: &str| LaunchPhase {
        name: name.into(),
        start: start.into(),
        end: end.into(),
        description: description.into(),
        target_lift,
        audience: audience.into(),
    };
    vec![
        phase(
            "Phase 1",
            "2024-03-01",
            "2024-03-14",
            "10% rollout to iPhone casual creators",
            0.12,
            "10M users",
        ),
        phase(
            "Phase 2",
            "2024-03-15",
            "2024-03-28",
            "50% rollout to iPhone users",
            0.08,
            "50M users",
        ),
        phase(
            "Phase 3",
            "2024-04-01",
            "2024-04-30",
            "100% rollout to casual creators",
            0.08,
            "225M users",
        ),
        phase(
            "Phase 4",
            "2024-05-01",
            "2024-05-31",
            "Optimize and expand to Android",
            0.08,
            "Full Android",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn step(name: &str, sessions: u64, conv: f64, drop: f64) -> FunnelStep {
        FunnelStep {
            step: name.into(),
            sessions_reached: sessions,
            conversion_rate: conv,
            dropoff_rate: drop,
        }
    }

    #[test]
    fn funnel_invariants_hold_for_well_formed_table() {
        let steps = vec![
            step("opened", 100, 1.0, 0.0),
            step("clicked", 80, 0.8, 0.2),
            step("posted", 40, 0.4, 0.5),
        ];
        assert!(validate_funnel(&steps).is_ok());
    }

    #[test]
    fn funnel_rejects_increasing_sessions() {
        let steps = vec![
            step("opened", 100, 1.0, 0.0),
            step("clicked", 120, 0.9, 0.0),
        ];
        let err = validate_funnel(&steps).unwrap_err();
        assert!(err.contains("sessions_reached increases"), "{}", err);
    }

    #[test]
    fn funnel_rejects_bad_first_conversion() {
        let steps = vec![step("opened", 100, 0.9, 0.0)];
        assert!(validate_funnel(&steps).is_err());
    }

    #[test]
    fn funnel_rejects_empty_table() {
        assert!(validate_funnel(&[]).is_err());
    }

    #[test]
    fn ab_rejects_duplicate_segments() {
        let row = SegmentResult {
            segment: "iPhone".into(),
            control_mean: 0.3,
            treatment_mean: 0.35,
            relative_lift: 0.16,
            p_value: 0.001,
            significant: true,
        };
        let err = validate_ab_results(&[row.clone(), row]).unwrap_err();
        assert!(err.contains("duplicate"), "{}", err);
    }

    #[test]
    fn launch_phases_are_ordered_and_dated() {
        let phases = launch_phases();
        assert_eq!(phases.len(), 4);
        let mut prev_end: Option<NaiveDate> = None;
        for p in &phases {
            let start = NaiveDate::parse_from_str(&p.start, "%Y-%m-%d").unwrap();
            let end = NaiveDate::parse_from_str(&p.end, "%Y-%m-%d").unwrap();
            assert!(start <= end, "{} starts after it ends", p.name);
            if let Some(prev) = prev_end {
                assert!(start > prev, "{} overlaps the previous phase", p.name);
            }
            assert!(p.target_lift > 0.0 && p.target_lift < 1.0);
            prev_end = Some(end);
        }
    }
}
