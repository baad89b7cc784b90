//! The six dashboard views.
//!
//! Each builder is a pure function of the loaded results and the render
//! context: it formats, maps colors, and assembles chart descriptors, but
//! computes nothing new beyond the business-impact projection it is handed.
//! Numbers the upstream page hardcoded (lift range, worst funnel step, ROI)
//! are derived from the data here instead.

use serde::Serialize;

use crate::error::ImpactError;
use crate::impact::{
    self, project, Assumptions, BusinessImpactEstimate, Period, ENGINEERING_COST,
    REELS_REFERENCE, REVENUE_REFERENCE,
};
use crate::model::{launch_phases, ResultBundle};
use crate::render::charts::{
    forest_plot, funnel_combo, timeline, ForestPlot, FunnelCombo, IndicatorCard, Timeline,
};
use crate::render::format::{self, Table};
use crate::session::{RenderContext, View};
use crate::source::{ArtifactOrigin, LoadedResults};

/// Everything one view displays, preformatted.
#[derive(Debug, Clone, Serialize)]
pub struct ViewContent {
    pub slug: String,
    pub title: String,
    pub intro: Vec<String>,
    pub cards: Vec<IndicatorCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forest: Option<ForestPlot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funnel: Option<FunnelCombo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<Timeline>,
    pub tables: Vec<Table>,
    pub notes: Vec<String>,
}

impl ViewContent {
    fn new(view: View) -> Self {
        Self {
            slug: view.slug().into(),
            title: view.title().into(),
            intro: Vec::new(),
            cards: Vec::new(),
            forest: None,
            funnel: None,
            timeline: None,
            tables: Vec::new(),
            notes: Vec::new(),
        }
    }
}

/// Build one view. Fails only if the context's assumptions are out of
/// domain, which callers surface as a validation message.
pub fn build_view(results: &LoadedResults, ctx: &RenderContext) -> Result<ViewContent, ImpactError> {
    let bundle = &results.bundle;
    let monthly = project(&bundle.business_impact, Period::Monthly, &ctx.assumptions)?;
    Ok(match ctx.view {
        View::ExecutiveSummary => executive_summary(bundle, &monthly, &ctx.assumptions),
        View::AbTestResults => ab_test_results(bundle),
        View::FunnelAnalysis => funnel_analysis(bundle),
        View::BusinessImpact => business_impact(&monthly, &ctx.assumptions),
        View::LaunchStrategy => launch_strategy(),
        View::Methodology => methodology(results),
    })
}

/// Build all six views under one context (the generated page embeds them
/// all and switches client-side).
pub fn build_all_views(
    results: &LoadedResults,
    ctx: &RenderContext,
) -> Result<Vec<ViewContent>, ImpactError> {
    View::ALL
        .iter()
        .map(|v| build_view(results, &ctx.with_view(*v)))
        .collect()
}

/// Min and max relative lift across segment rows (pooled row excluded).
fn lift_range(bundle: &ResultBundle) -> Option<(f64, f64)> {
    let mut range: Option<(f64, f64)> = None;
    for r in bundle.segments() {
        range = Some(match range {
            None => (r.relative_lift, r.relative_lift),
            Some((lo, hi)) => (lo.min(r.relative_lift), hi.max(r.relative_lift)),
        });
    }
    range
}

fn executive_summary(
    bundle: &ResultBundle,
    monthly: &BusinessImpactEstimate,
    assumptions: &Assumptions,
) -> ViewContent {
    let mut view = ViewContent::new(View::ExecutiveSummary);

    view.intro = vec![
        "Reels creation bleeds sessions at the editing stage: casual creators find the \
         existing tools too complex and abandon their drafts."
            .into(),
        "Quick Edit, a one-tap editing flow that syncs clips to audio automatically, was \
         tested against the current editor in a user-randomized experiment."
            .into(),
    ];

    let total = bundle.segments().count();
    let significant = bundle.segments().filter(|r| r.significant).count();
    let lift_detail = if significant == total && total > 0 {
        "statistically significant in every segment".to_string()
    } else {
        format!("significant in {} of {} segments", significant, total)
    };
    if let Some((lo, hi)) = lift_range(bundle) {
        view.cards.push(
            IndicatorCard::new(
                "Creation Lift",
                format!("{}\u{2013}{}", format::percent(lo), format::percent(hi)),
                "#1E88E5",
            )
            .detail(&lift_detail),
        );
    }
    view.cards.push(
        IndicatorCard::new("Monthly Revenue", format::currency(monthly.additional_revenue), "#4CAF50")
            .detail("under current assumptions")
            .bound("revenue_monthly"),
    );
    view.cards.push(
        IndicatorCard::new("Additional Reels", format::count_short(monthly.additional_reels), "#FF9800")
            .detail("per month")
            .bound("reels_monthly"),
    );
    view.cards.push(
        IndicatorCard::new("Feature Adoption", format::percent(assumptions.adoption_rate), "#9C27B0")
            .detail("assumed share of treatment group")
            .bound("adoption"),
    );

    view.notes.push(
        "Recommendation: launch with a phased rollout, starting at 10% of iPhone casual \
         creators and expanding while the lift holds above the phase targets."
            .into(),
    );
    view
}

fn ab_test_results(bundle: &ResultBundle) -> ViewContent {
    let mut view = ViewContent::new(View::AbTestResults);
    view.intro.push(
        "Per-segment creation success rates, as computed upstream. Green markers cleared \
         the 0.05 significance threshold; error bars are 95% intervals recovered from the \
         reported p-values."
            .into(),
    );
    view.forest = Some(forest_plot(bundle.segments()));

    let rows = bundle
        .ab_results
        .iter()
        .map(|r| {
            vec![
                r.segment.clone(),
                format::percent(r.control_mean),
                format::percent(r.treatment_mean),
                format::percent(r.relative_lift),
                format::p_value(r.p_value),
                (if r.significant { "yes" } else { "no" }).to_string(),
            ]
        })
        .collect();
    view.tables.push(Table::new(
        "Detailed Results",
        &["Segment", "Control Rate", "Treatment Rate", "Lift", "p-value", "Significant"],
        rows,
    ));

    view.tables.push(Table::new(
        "Guardrail Metrics",
        &["Metric", "Change", "p-value", "Interpretation"],
        vec![
            vec![
                "Edit tools used".into(),
                "-0.6%".into(),
                "0.0003".into(),
                "Quick Edit is replacing manual editing".into(),
            ],
            vec![
                "Quick Edit used".into(),
                "+60.0%".into(),
                "<0.0001".into(),
                "Strong feature appeal in treatment".into(),
            ],
            vec![
                "Session duration".into(),
                "+0.1%".into(),
                "0.5702".into(),
                "No detectable UX regression".into(),
            ],
        ],
    ));
    view
}

fn funnel_analysis(bundle: &ResultBundle) -> ViewContent {
    let mut view = ViewContent::new(View::FunnelAnalysis);
    view.intro.push(
        "Sessions surviving each stage of the creation flow, with the share lost at every \
         hand-off."
            .into(),
    );
    let combo = funnel_combo(&bundle.funnel_overall);
    if let Some(worst) = &combo.worst {
        view.notes.push(format!(
            "{:.0}% of remaining sessions drop off at {}, the biggest single opportunity \
             in the creation funnel.",
            worst.dropoff_pct, worst.step
        ));
    }
    view.funnel = Some(combo);

    for cohort in &bundle.funnel_cohort {
        let rows = cohort
            .steps
            .iter()
            .map(|s| {
                vec![
                    s.step.clone(),
                    format::count(s.sessions_reached as f64),
                    format::percent(s.conversion_rate),
                    format::percent(s.dropoff_rate),
                ]
            })
            .collect();
        view.tables.push(Table::new(
            &format!("Cohort: {}", cohort.cohort),
            &["Funnel Step", "Sessions", "Conversion", "Drop-off"],
            rows,
        ));
    }
    view
}

/// The ROI table rows for a monthly revenue estimate. Split out so the
/// page JS can mirror it cell-for-cell.
pub fn roi_rows(monthly_revenue: f64) -> Vec<Vec<String>> {
    let payback = if monthly_revenue > 0.0 {
        let months = ENGINEERING_COST / monthly_revenue;
        if months < 1.0 {
            "under 1 month".to_string()
        } else {
            format!("{:.1} months", months)
        }
    } else {
        "n/a".to_string()
    };
    let annualized = if monthly_revenue > 0.0 {
        format!(
            "{}%",
            format::count(((monthly_revenue * 12.0 - ENGINEERING_COST) / ENGINEERING_COST * 100.0).round())
        )
    } else {
        "n/a".to_string()
    };
    vec![
        vec!["Monthly revenue impact".into(), format::currency(monthly_revenue)],
        vec!["Engineering cost".into(), format::currency(ENGINEERING_COST)],
        vec!["Payback period".into(), payback],
        vec!["Annualized ROI".into(), annualized],
    ]
}

fn business_impact(monthly: &BusinessImpactEstimate, assumptions: &Assumptions) -> ViewContent {
    let mut view = ViewContent::new(View::BusinessImpact);
    view.intro.push(
        "Projection under the sidebar assumptions. Every figure recomputes as the sliders \
         move; nothing here is persisted."
            .into(),
    );

    view.cards.push(
        IndicatorCard::new("Monthly Revenue Impact", format::currency(monthly.additional_revenue), "#4CAF50")
            .delta_against(REVENUE_REFERENCE, monthly.additional_revenue)
            .detail("vs $1.5M planning reference")
            .bound("revenue_monthly_delta"),
    );
    view.cards.push(
        IndicatorCard::new("Monthly Additional Reels", format::count_short(monthly.additional_reels), "#1E88E5")
            .delta_against(REELS_REFERENCE, monthly.additional_reels)
            .detail("vs 150M planning reference")
            .bound("reels_monthly_delta"),
    );
    view.cards.push(
        IndicatorCard::new("Additional Watch Time", format!("{} hrs", format::count_short(monthly.additional_watch_time_hours)), "#FF9800")
            .detail("per month")
            .bound("watch_monthly"),
    );
    view.cards.push(
        IndicatorCard::new("Additional Creators", format::count_short(monthly.additional_creators), "#9C27B0")
            .detail("per month")
            .bound("creators_monthly"),
    );

    view.tables.push(
        Table::new(
            "Assumptions",
            &["Parameter", "Value", "Industry Benchmark"],
            vec![
                vec!["Feature adoption".into(), format::percent(assumptions.adoption_rate), "50-70%".into()],
                vec!["Reels monetized".into(), format::percent(assumptions.monetization_rate), "30-40%".into()],
                vec!["Average CPM".into(), format::currency(assumptions.cpm), "$15-50".into()],
                vec![
                    "Avg plays per reel".into(),
                    format!("{:.1}", impact::AVG_PLAYS_PER_REEL),
                    "1-3".into(),
                ],
                vec!["Creator distribution".into(), "15% casual, 10% power".into(), "varies by platform".into()],
            ],
        )
        .bound("assumptions"),
    );

    view.tables
        .push(Table::new("ROI", &["Metric", "Value"], roi_rows(monthly.additional_revenue)).bound("roi"));
    view
}

fn launch_strategy() -> ViewContent {
    let mut view = ViewContent::new(View::LaunchStrategy);
    let phases = launch_phases();
    view.intro.push(
        "Four phases, each gated on the previous phase holding its lift target."
            .into(),
    );
    view.timeline = Some(timeline(&phases));

    let rows = phases
        .iter()
        .map(|p| {
            vec![
                p.name.clone(),
                format!("lift \u{2265} {}", format::percent(p.target_lift)),
                "adoption \u{2265} 50%".into(),
                "watch time \u{2265} 28s".into(),
                "crash rate < 0.1%".into(),
            ]
        })
        .collect();
    view.tables.push(Table::new(
        "Success Metrics by Phase",
        &["Phase", "Primary Metric", "Adoption", "Watch Time", "Stability"],
        rows,
    ));

    view.tables.push(Table::new(
        "Risks & Mitigations",
        &["Risk", "Probability", "Impact", "Mitigation"],
        vec![
            vec!["Lower Android adoption".into(), "medium".into(), "medium".into(), "Android-specific UX pass before Phase 4".into()],
            vec!["Content quality decline".into(), "low".into(), "high".into(), "monitor watch time and negative feedback".into()],
            vec!["Feature fatigue".into(), "low".into(), "medium".into(), "track 7-day and 30-day retention".into()],
            vec!["Infrastructure scaling".into(), "low".into(), "medium".into(), "gradual rollout with monitoring".into()],
        ],
    ));
    view
}

fn methodology(results: &LoadedResults) -> ViewContent {
    let mut view = ViewContent::new(View::Methodology);
    view.intro.push(
        "How the upstream experiment was run and where this dashboard's numbers come from. \
         All statistics were computed upstream; this page only reads the exported artifacts."
            .into(),
    );

    view.tables.push(Table::new(
        "Experiment Design",
        &["Parameter", "Value"],
        vec![
            vec!["Experiment type".into(), "A/B test".into()],
            vec!["Population".into(), "5% of users".into()],
            vec!["Duration".into(), "14 days".into()],
            vec!["Sample size".into(), "500,000 user sessions".into()],
            vec!["Randomization".into(), "user-level".into()],
            vec!["Primary metric".into(), "creation success rate".into()],
        ],
    ));

    view.notes.push(
        "Significance: two-sample Welch t-test, 95% confidence intervals by normal \
         approximation, 80% power to detect a 10% lift; single primary metric, so no \
         multiple-testing correction."
            .into(),
    );

    let rows = results
        .manifest
        .iter()
        .map(|m| {
            vec![
                m.artifact.clone(),
                match m.origin {
                    ArtifactOrigin::File => "file".into(),
                    ArtifactOrigin::Synthetic => "synthetic".into(),
                },
                m.rows.to_string(),
                m.sha256
                    .as_deref()
                    .map(|h| h[..12].to_string())
                    .unwrap_or_else(|| "-".into()),
            ]
        })
        .collect();
    view.tables.push(Table::new(
        "Loaded Artifacts",
        &["Artifact", "Origin", "Rows", "SHA-256"],
        rows,
    ));
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ResultSource, SyntheticSource};

    fn loaded() -> LoadedResults {
        SyntheticSource.load().unwrap()
    }

    #[test]
    fn every_view_builds_from_synthetic_data() {
        let results = loaded();
        let ctx = RenderContext::default();
        for v in View::ALL {
            let content = build_view(&results, &ctx.with_view(v)).unwrap();
            assert_eq!(content.slug, v.slug());
            assert!(!content.title.is_empty());
        }
    }

    #[test]
    fn executive_lift_range_is_computed_from_segments() {
        let results = loaded();
        let content = build_view(&results, &RenderContext::default()).unwrap();
        let lift = &content.cards[0];
        assert_eq!(lift.label, "Creation Lift");
        // min 9.4% (Android), max 12.7% (iPhone) in the synthetic table.
        assert_eq!(lift.value, "9.4%\u{2013}12.7%");
    }

    #[test]
    fn roi_payback_handles_zero_revenue() {
        let rows = roi_rows(0.0);
        assert_eq!(rows[2][1], "n/a");
        assert_eq!(rows[3][1], "n/a");
    }

    #[test]
    fn roi_payback_under_a_month_at_defaults() {
        let rows = roi_rows(2_108_638.0);
        assert_eq!(rows[2][1], "under 1 month");
        assert!(rows[3][1].ends_with('%'));
    }

    #[test]
    fn building_views_does_not_mutate_the_bundle() {
        let results = loaded();
        let before = results.bundle.clone();
        let ctx = RenderContext::default();
        for v in View::ALL {
            build_view(&results, &ctx.with_view(v)).unwrap();
        }
        assert_eq!(results.bundle, before);
    }

    #[test]
    fn out_of_domain_assumptions_surface_as_errors() {
        let results = loaded();
        let mut ctx = RenderContext::default();
        ctx.assumptions.cpm = -5.0;
        assert!(build_view(&results, &ctx).is_err());
    }
}
