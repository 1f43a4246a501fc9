use rand::Rng;
use serde::Serialize;

use crate::service::SemesterForecast;

/// Fallback estimate for students with no completed semester: a fixed
/// 70% midterm / 30% attendance weighting, not a learned model.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FirstTermEstimate {
    pub sgpa: f64,
    /// Fixed bucket label in percent, not a continuous function.
    pub pass_probability: u8,
}

pub fn estimate(attendance: f64, midterm: f64) -> FirstTermEstimate {
    let midterm_contribution = (midterm / 50.0) * 4.0 * 0.7;
    let attendance_contribution = (attendance / 100.0) * 4.0 * 0.3;
    let sgpa = (midterm_contribution + attendance_contribution).clamp(0.0, 4.0);
    FirstTermEstimate {
        sgpa,
        pass_probability: pass_probability(sgpa),
    }
}

/// Threshold buckets; reproduce exactly for compatibility with issued reports.
pub fn pass_probability(sgpa: f64) -> u8 {
    if sgpa >= 3.5 {
        95
    } else if sgpa >= 3.0 {
        85
    } else if sgpa >= 2.5 {
        70
    } else if sgpa >= 2.0 {
        55
    } else {
        30
    }
}

pub fn risk_label(sgpa: f64) -> &'static str {
    if sgpa >= 3.0 {
        "Low Risk"
    } else if sgpa >= 2.5 {
        "Moderate Risk"
    } else {
        "High Risk"
    }
}

/// Rough forecasts for the semesters still ahead of a first-term student:
/// the estimate with a small random spread (±0.1), clamped to the scale.
pub fn project_remaining(estimate: FirstTermEstimate, current_semester: u8) -> Vec<SemesterForecast> {
    let mut rng = rand::thread_rng();
    (current_semester.saturating_add(1)..=8)
        .map(|semester| {
            let variation: f64 = rng.gen_range(-0.1..0.1);
            SemesterForecast {
                semester,
                predicted_sgpa: (estimate.sgpa + variation).clamp(0.0, 4.0),
            }
        })
        .collect()
}

/// Narrative shown alongside a first-term estimate.
pub fn insight(attendance: f64, midterm: f64) -> String {
    let mut text = if midterm >= 40.0 {
        format!("Excellent midterm performance ({midterm:.0}/50)! ")
    } else if midterm >= 30.0 {
        format!("Good midterm score ({midterm:.0}/50). ")
    } else {
        format!("Your midterm score ({midterm:.0}/50) needs improvement. ")
    };

    if attendance >= 85.0 {
        text.push_str(&format!("Your attendance ({attendance:.0}%) is excellent. Keep it up!"));
    } else if attendance >= 75.0 {
        text.push_str(&format!("Maintain your attendance ({attendance:.0}%) above 75%."));
    } else {
        text.push_str(&format!("Improve your attendance ({attendance:.0}%) to at least 75%."));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_inputs_give_exactly_four() {
        let est = estimate(100.0, 50.0);
        assert!((est.sgpa - 4.0).abs() < 1e-9);
        assert_eq!(est.pass_probability, 95);
    }

    #[test]
    fn zero_inputs_give_zero_and_lowest_tier() {
        let est = estimate(0.0, 0.0);
        assert_eq!(est.sgpa, 0.0);
        assert_eq!(est.pass_probability, 30);
    }

    #[test]
    fn midterm_carries_seventy_percent_of_the_weight() {
        // Full midterm, no attendance: 4.0 * 0.7
        let est = estimate(0.0, 50.0);
        assert!((est.sgpa - 2.8).abs() < 1e-9);
        // Full attendance, no midterm: 4.0 * 0.3
        let est = estimate(100.0, 0.0);
        assert!((est.sgpa - 1.2).abs() < 1e-9);
    }

    #[test]
    fn pass_probability_buckets_are_exact() {
        assert_eq!(pass_probability(3.5), 95);
        assert_eq!(pass_probability(3.49), 85);
        assert_eq!(pass_probability(3.0), 85);
        assert_eq!(pass_probability(2.5), 70);
        assert_eq!(pass_probability(2.0), 55);
        assert_eq!(pass_probability(1.99), 30);
    }

    #[test]
    fn risk_label_follows_estimate() {
        assert_eq!(risk_label(3.2), "Low Risk");
        assert_eq!(risk_label(2.7), "Moderate Risk");
        assert_eq!(risk_label(2.1), "High Risk");
    }

    #[test]
    fn projection_covers_remaining_semesters_within_scale() {
        let est = estimate(100.0, 50.0);
        let forecasts = project_remaining(est, 1);
        assert_eq!(forecasts.len(), 7);
        assert_eq!(forecasts[0].semester, 2);
        assert_eq!(forecasts[6].semester, 8);
        for f in &forecasts {
            assert!((0.0..=4.0).contains(&f.predicted_sgpa));
            assert!((f.predicted_sgpa - est.sgpa).abs() <= 0.1 + 1e-9);
        }
    }

    #[test]
    fn projection_is_empty_for_final_semester() {
        let est = estimate(80.0, 40.0);
        assert!(project_remaining(est, 8).is_empty());
        assert!(project_remaining(est, u8::MAX).is_empty());
    }

    #[test]
    fn insight_mentions_both_inputs() {
        let text = insight(90.0, 45.0);
        assert!(text.contains("Excellent midterm"));
        assert!(text.contains("90"));
        let text = insight(60.0, 20.0);
        assert!(text.contains("needs improvement"));
        assert!(text.contains("at least 75%"));
    }

    #[test]
    fn insight_rounds_fractional_means() {
        let text = insight(83.333333, 36.666666);
        assert!(text.contains("(37/50)"), "got: {text}");
        assert!(text.contains("(83%)"), "got: {text}");
        assert!(!text.contains("83.3"));
    }
}
