//! Behavioral properties of the business-impact calculator.
//!
//! The projection is the only place user-adjustable state feeds back into
//! displayed numbers, so it is the one component with behavioral (not just
//! visual) correctness requirements: non-negativity, the zero law,
//! monotonicity in each parameter, the documented default regression, and
//! loud rejection of out-of-domain inputs.

use liftboard::error::ImpactError;
use liftboard::impact::{project, projected_revenue, Assumptions, Period, OBSERVED_ADOPTION};
use liftboard::synthetic;

/// The sample record's monthly reels volume, observed at 60% adoption.
const SAMPLE_BASELINE_REELS: f64 = 200_822_672.0;
/// The sample record's monthly additional revenue.
const SAMPLE_REVENUE: f64 = 2_108_638.0;

fn assumptions(a: f64, m: f64, c: f64) -> Assumptions {
    Assumptions {
        adoption_rate: a,
        monetization_rate: m,
        cpm: c,
    }
}

// ---------------------------------------------------------------------------
// Non-negativity over a grid of the valid domain
// ---------------------------------------------------------------------------
#[test]
fn revenue_is_never_negative_on_the_valid_domain() {
    for ai in 0..=10 {
        for mi in 0..=10 {
            for cpm in [0.0, 5.0, 20.0, 50.0, 500.0] {
                let a = assumptions(ai as f64 / 10.0, mi as f64 / 10.0, cpm);
                let revenue = projected_revenue(SAMPLE_BASELINE_REELS, &a).unwrap();
                assert!(
                    revenue >= 0.0,
                    "negative revenue {} at {:?}",
                    revenue,
                    a
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Zero law: any zero rate produces zero revenue
// ---------------------------------------------------------------------------
#[test]
fn any_zero_rate_produces_zero_revenue() {
    let cases = [
        assumptions(0.0, 0.35, 20.0),
        assumptions(0.6, 0.0, 20.0),
        assumptions(0.6, 0.35, 0.0),
        assumptions(0.0, 0.0, 0.0),
    ];
    for a in cases {
        let revenue = projected_revenue(SAMPLE_BASELINE_REELS, &a).unwrap();
        assert_eq!(revenue, 0.0, "expected zero revenue at {:?}", a);
    }
}

// ---------------------------------------------------------------------------
// Monotonicity in each parameter, others held fixed
// ---------------------------------------------------------------------------
#[test]
fn revenue_is_monotone_in_each_parameter() {
    let steps: Vec<f64> = (0..=20).map(|i| i as f64 / 20.0).collect();

    let mut prev = -1.0;
    for &a in &steps {
        let r = projected_revenue(SAMPLE_BASELINE_REELS, &assumptions(a, 0.35, 20.0)).unwrap();
        assert!(r >= prev, "revenue decreased as adoption rose to {}", a);
        prev = r;
    }

    prev = -1.0;
    for &m in &steps {
        let r = projected_revenue(SAMPLE_BASELINE_REELS, &assumptions(0.6, m, 20.0)).unwrap();
        assert!(r >= prev, "revenue decreased as monetization rose to {}", m);
        prev = r;
    }

    prev = -1.0;
    for cpm in (0..=20).map(|i| i as f64 * 5.0) {
        let r = projected_revenue(SAMPLE_BASELINE_REELS, &assumptions(0.6, 0.35, cpm)).unwrap();
        assert!(r >= prev, "revenue decreased as cpm rose to {}", cpm);
        prev = r;
    }
}

// ---------------------------------------------------------------------------
// Default-input regression against the documented sample figure
// ---------------------------------------------------------------------------
#[test]
fn defaults_reproduce_the_documented_sample_revenue() {
    let revenue =
        projected_revenue(SAMPLE_BASELINE_REELS, &Assumptions::default()).unwrap();
    let relative_error = (revenue - SAMPLE_REVENUE).abs() / SAMPLE_REVENUE;
    assert!(
        relative_error < 0.01,
        "default projection {} deviates {:.4}% from the documented {}",
        revenue,
        relative_error * 100.0,
        SAMPLE_REVENUE
    );
}

#[test]
fn defaults_reproduce_the_record_estimate_end_to_end() {
    let record = synthetic::business_impact();
    let estimate = project(&record, Period::Monthly, &Assumptions::default()).unwrap();
    assert!((estimate.additional_reels - record.monthly.additional_reels).abs() < 1.0);
    assert!(
        (estimate.additional_revenue - record.monthly.additional_revenue).abs()
            / record.monthly.additional_revenue
            < 0.01
    );
    assert!(
        (estimate.additional_watch_time_hours - record.monthly.additional_watch_time_hours).abs()
            < 1.0
    );
}

// ---------------------------------------------------------------------------
// Domain rejection: errors, not numbers, and no silent clamping
// ---------------------------------------------------------------------------
#[test]
fn out_of_domain_inputs_raise_invalid_parameter() {
    let record = synthetic::business_impact();
    for bad in [
        assumptions(-0.1, 0.5, 10.0),
        assumptions(0.5, 0.5, -5.0),
        assumptions(1.5, 0.5, 10.0),
        assumptions(0.5, -0.2, 10.0),
    ] {
        let err = project(&record, Period::Monthly, &bad).unwrap_err();
        assert!(
            matches!(err, ImpactError::InvalidParameter { .. }),
            "expected InvalidParameter for {:?}",
            bad
        );
    }
}

#[test]
fn rejection_is_not_clamping() {
    // If the calculator clamped instead of rejecting, adoption 1.5 would
    // quietly produce the same number as adoption 1.0. It must not produce
    // a number at all.
    assert!(projected_revenue(SAMPLE_BASELINE_REELS, &assumptions(1.5, 0.35, 20.0)).is_err());
}

// ---------------------------------------------------------------------------
// Scaling semantics
// ---------------------------------------------------------------------------
#[test]
fn volume_scales_linearly_against_observed_adoption() {
    let record = synthetic::business_impact();
    let half = assumptions(OBSERVED_ADOPTION / 2.0, 0.35, 20.0);
    let estimate = project(&record, Period::Monthly, &half).unwrap();
    assert!(
        (estimate.additional_reels - record.monthly.additional_reels / 2.0).abs() < 1.0,
        "halving adoption must halve the reels estimate"
    );
    assert!(
        (estimate.additional_creators - record.monthly.additional_creators / 2.0).abs() < 1.0
    );
}

#[test]
fn revenue_is_linear_in_cpm() {
    let r20 = projected_revenue(SAMPLE_BASELINE_REELS, &assumptions(0.6, 0.35, 20.0)).unwrap();
    let r40 = projected_revenue(SAMPLE_BASELINE_REELS, &assumptions(0.6, 0.35, 40.0)).unwrap();
    assert!((r40 - 2.0 * r20).abs() < 1e-6);
}
