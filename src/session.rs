//! View selection and the per-render context.
//!
//! The dashboard has six terminal, mutually exclusive views entered by
//! direct selection; there is no history stack. Slider values live in the
//! context alongside the selected view, so switching views never resets
//! them.

use serde::{Deserialize, Serialize};

use crate::impact::Assumptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    ExecutiveSummary,
    AbTestResults,
    FunnelAnalysis,
    BusinessImpact,
    LaunchStrategy,
    Methodology,
}

impl View {
    pub const ALL: [View; 6] = [
        View::ExecutiveSummary,
        View::AbTestResults,
        View::FunnelAnalysis,
        View::BusinessImpact,
        View::LaunchStrategy,
        View::Methodology,
    ];

    /// Stable identifier used in URLs and the nav list.
    pub fn slug(&self) -> &'static str {
        match self {
            View::ExecutiveSummary => "executive-summary",
            View::AbTestResults => "ab-test-results",
            View::FunnelAnalysis => "funnel-analysis",
            View::BusinessImpact => "business-impact",
            View::LaunchStrategy => "launch-strategy",
            View::Methodology => "methodology",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::ExecutiveSummary => "Executive Summary",
            View::AbTestResults => "A/B Test Results",
            View::FunnelAnalysis => "Funnel Analysis",
            View::BusinessImpact => "Business Impact",
            View::LaunchStrategy => "Launch Strategy",
            View::Methodology => "Methodology",
        }
    }

    pub fn from_slug(slug: &str) -> Option<View> {
        View::ALL.iter().copied().find(|v| v.slug() == slug)
    }
}

/// Everything one render depends on. Immutable: a slider change or view
/// switch builds a new context and re-renders from scratch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderContext {
    pub view: View,
    pub assumptions: Assumptions,
}

impl RenderContext {
    pub fn new(view: View, assumptions: Assumptions) -> Self {
        Self { view, assumptions }
    }

    /// Keep the slider values, change the view.
    pub fn with_view(self, view: View) -> Self {
        Self { view, ..self }
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            view: View::ExecutiveSummary,
            assumptions: Assumptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_round_trip() {
        for v in View::ALL {
            assert_eq!(View::from_slug(v.slug()), Some(v));
        }
        assert_eq!(View::from_slug("nope"), None);
    }

    #[test]
    fn view_switch_keeps_assumptions() {
        let mut ctx = RenderContext::default();
        ctx.assumptions.adoption_rate = 0.25;
        let switched = ctx.with_view(View::FunnelAnalysis);
        assert_eq!(switched.view, View::FunnelAnalysis);
        assert_eq!(switched.assumptions.adoption_rate, 0.25);
    }
}
