//! Business-impact projection.
//!
//! The one place where user-adjustable state feeds back into displayed
//! numbers. `project` is a pure function of the loaded record and the three
//! what-if parameters; it does no I/O and is the single authority for the
//! revenue formula. The generated page ships its constants in the data
//! blob and mirrors the same chain client-side.
//!
//! Derivation, per period:
//!
//! ```text
//! additional_reels      = baseline_reels  x (adoption / 0.60)
//! ad_impressions        = additional_reels x 1.5
//! monetized_impressions = ad_impressions  x monetization
//! additional_revenue    = monetized_impressions x (cpm / 1000)
//! ```
//!
//! The record's volume figures were observed at 60% adoption, so scaling is
//! relative to that observed rate. Each projected reel is assumed to average
//! 1.5 ad-eligible plays, which reconciles the record's revenue with its
//! reels volume. Every stage is a non-negative multiplier: the chain is
//! monotone in each parameter and zero whenever any rate is zero.

use serde::{Deserialize, Serialize};

use crate::error::ImpactError;
use crate::model::{BusinessImpactRecord, PeriodImpact};

/// Adoption rate observed in the treatment group; record volumes are
/// baselined at this rate.
pub const OBSERVED_ADOPTION: f64 = 0.60;

/// Average ad-eligible plays per additional reel.
pub const AVG_PLAYS_PER_REEL: f64 = 1.5;

/// Engineering cost assumed by the ROI table, in dollars.
pub const ENGINEERING_COST: f64 = 500_000.0;

/// Reference values the indicator cards show deltas against.
pub const REVENUE_REFERENCE: f64 = 1_500_000.0;
pub const REELS_REFERENCE: f64 = 150_000_000.0;

/// The three what-if parameters. Held in the per-render context; never
/// mutated by rendering code.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assumptions {
    /// Share of users expected to use the feature, in [0, 1].
    pub adoption_rate: f64,
    /// Share of reels that show ads, in [0, 1].
    pub monetization_rate: f64,
    /// Revenue per 1000 ad impressions, in dollars, >= 0.
    pub cpm: f64,
}

impl Default for Assumptions {
    fn default() -> Self {
        Self {
            adoption_rate: 0.60,
            monetization_rate: 0.35,
            cpm: 20.0,
        }
    }
}

impl Assumptions {
    /// Reject out-of-domain parameters instead of clamping them.
    pub fn validate(&self) -> Result<(), ImpactError> {
        let unit_interval = |name: &'static str, value: f64| {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                Err(ImpactError::InvalidParameter {
                    name,
                    value,
                    expected: "a value in [0, 1]",
                })
            } else {
                Ok(())
            }
        };
        unit_interval("adoption_rate", self.adoption_rate)?;
        unit_interval("monetization_rate", self.monetization_rate)?;
        if !self.cpm.is_finite() || self.cpm < 0.0 {
            return Err(ImpactError::InvalidParameter {
                name: "cpm",
                value: self.cpm,
                expected: "a non-negative dollar amount",
            });
        }
        Ok(())
    }
}

/// Reporting period of an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Monthly,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Monthly => "monthly",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "daily" => Some(Period::Daily),
            "monthly" => Some(Period::Monthly),
            _ => None,
        }
    }
}

/// Projected impact under the current assumptions. Recomputed on every
/// render, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BusinessImpactEstimate {
    pub period: Period,
    pub additional_creators: f64,
    pub additional_reels: f64,
    pub additional_watch_time_hours: f64,
    pub additional_revenue: f64,
}

/// Projected additional revenue for a reels volume baselined at the
/// observed adoption rate.
pub fn projected_revenue(
    baseline_reels: f64,
    assumptions: &Assumptions,
) -> Result<f64, ImpactError> {
    assumptions.validate()?;
    let reels = baseline_reels * (assumptions.adoption_rate / OBSERVED_ADOPTION);
    let impressions = reels * AVG_PLAYS_PER_REEL;
    let monetized = impressions * assumptions.monetization_rate;
    Ok(monetized * (assumptions.cpm / 1000.0))
}

/// Project the full estimate for one period of the loaded record.
pub fn project(
    record: &BusinessImpactRecord,
    period: Period,
    assumptions: &Assumptions,
) -> Result<BusinessImpactEstimate, ImpactError> {
    assumptions.validate()?;
    let baseline: &PeriodImpact = match period {
        Period::Daily => &record.daily,
        Period::Monthly => &record.monthly,
    };
    let adoption_scale = assumptions.adoption_rate / OBSERVED_ADOPTION;
    Ok(BusinessImpactEstimate {
        period,
        additional_creators: baseline.additional_creators * adoption_scale,
        additional_reels: baseline.additional_reels * adoption_scale,
        additional_watch_time_hours: baseline.additional_watch_time_hours * adoption_scale,
        additional_revenue: projected_revenue(baseline.additional_reels, assumptions)?,
    })
}

/// One slider definition for the page template. Ranges and steps match the
/// upstream dashboard controls.
#[derive(Debug, Clone, Serialize)]
pub struct SliderSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
    pub help: &'static str,
}

/// The three what-if sliders, in sidebar order.
pub fn slider_specs() -> [SliderSpec; 3] {
    let defaults = Assumptions::default();
    [
        SliderSpec {
            id: "adoption_rate",
            label: "Feature Adoption Rate",
            min: 0.0,
            max: 1.0,
            step: 0.05,
            default: defaults.adoption_rate,
            help: "Share of users expected to use the feature",
        },
        SliderSpec {
            id: "monetization_rate",
            label: "Monetization Rate",
            min: 0.0,
            max: 1.0,
            step: 0.05,
            default: defaults.monetization_rate,
            help: "Share of reels that show ads",
        },
        SliderSpec {
            id: "cpm",
            label: "Average CPM ($)",
            min: 5.0,
            max: 50.0,
            step: 5.0,
            default: defaults.cpm,
            help: "Revenue per 1000 ad impressions",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic;

    fn assumptions(a: f64, m: f64, c: f64) -> Assumptions {
        Assumptions {
            adoption_rate: a,
            monetization_rate: m,
            cpm: c,
        }
    }

    #[test]
    fn default_assumptions_validate() {
        Assumptions::default().validate().unwrap();
    }

    #[test]
    fn rejects_out_of_domain_rates() {
        assert!(assumptions(-0.1, 0.5, 10.0).validate().is_err());
        assert!(assumptions(1.1, 0.5, 10.0).validate().is_err());
        assert!(assumptions(0.5, -0.01, 10.0).validate().is_err());
        assert!(assumptions(0.5, 0.5, -5.0).validate().is_err());
    }

    #[test]
    fn rejects_non_finite_parameters() {
        assert!(assumptions(f64::NAN, 0.5, 10.0).validate().is_err());
        assert!(assumptions(0.5, 0.5, f64::INFINITY).validate().is_err());
    }

    #[test]
    fn error_names_the_offending_parameter() {
        let err = assumptions(0.5, 0.5, -5.0).validate().unwrap_err();
        assert!(err.to_string().contains("cpm"), "{}", err);
    }

    #[test]
    fn projection_scales_volume_relative_to_observed_adoption() {
        let record = synthetic::business_impact();
        let at_default = project(&record, Period::Monthly, &Assumptions::default()).unwrap();
        // At the observed adoption the estimate reproduces the record volume.
        assert!((at_default.additional_reels - record.monthly.additional_reels).abs() < 1.0);

        let at_thirty = project(&record, Period::Monthly, &assumptions(0.3, 0.35, 20.0)).unwrap();
        assert!(
            (at_thirty.additional_reels - record.monthly.additional_reels * 0.5).abs() < 1.0
        );
    }

    #[test]
    fn daily_and_monthly_use_their_own_baselines() {
        let record = synthetic::business_impact();
        let a = Assumptions::default();
        let daily = project(&record, Period::Daily, &a).unwrap();
        let monthly = project(&record, Period::Monthly, &a).unwrap();
        assert!(daily.additional_revenue < monthly.additional_revenue);
        assert!((daily.additional_revenue * 30.0 - monthly.additional_revenue).abs() < 100.0);
    }
}
