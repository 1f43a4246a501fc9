use serde::{Deserialize, Serialize};

/// Snapshot of the last real prediction's current average. Held by the
/// application layer and overwritten on each successful prediction; the
/// simulator only ever reads it. It must not exist before the first
/// prediction, which is why callers hold an `Option<WhatIfBaseline>`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhatIfBaseline {
    pub current_average: f64,
}

/// Hypothetical across-the-board grade improvement. Only the four published
/// steps are accepted; arbitrary deltas are rejected at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum GradeImprovement {
    Hold,
    Slight,
    Strong,
    Leap,
}

impl GradeImprovement {
    pub fn delta(self) -> f64 {
        match self {
            GradeImprovement::Hold => 0.0,
            GradeImprovement::Slight => 0.3,
            GradeImprovement::Strong => 0.5,
            GradeImprovement::Leap => 1.0,
        }
    }
}

impl TryFrom<f64> for GradeImprovement {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value == 0.0 {
            Ok(GradeImprovement::Hold)
        } else if value == 0.3 {
            Ok(GradeImprovement::Slight)
        } else if value == 0.5 {
            Ok(GradeImprovement::Strong)
        } else if value == 1.0 {
            Ok(GradeImprovement::Leap)
        } else {
            Err(format!(
                "grade improvement must be one of 0, 0.3, 0.5 or 1.0, got {value}"
            ))
        }
    }
}

impl From<GradeImprovement> for f64 {
    fn from(value: GradeImprovement) -> f64 {
        value.delta()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outlook {
    StrongPositive,
    Positive,
    MildPositive,
    Negative,
    Neutral,
}

impl Outlook {
    fn from_change(change: f64) -> Outlook {
        if change > 0.5 {
            Outlook::StrongPositive
        } else if change > 0.2 {
            Outlook::Positive
        } else if change > 0.0 {
            Outlook::MildPositive
        } else if change < -0.2 {
            Outlook::Negative
        } else {
            Outlook::Neutral
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Outlook::StrongPositive => {
                "Excellent! These changes could significantly boost your CGPA!"
            }
            Outlook::Positive => "Good improvement! Keep up the effort for better results.",
            Outlook::MildPositive => {
                "Small positive impact. Consider more improvements for better gains."
            }
            Outlook::Negative => "Warning: These factors could negatively impact your performance.",
            Outlook::Neutral => "Minimal change expected. Current performance level maintained.",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WhatIfOutcome {
    pub cgpa: f64,
    pub change: f64,
    pub pass_probability: f64,
    pub pass_band: &'static str,
    pub outlook: Outlook,
    pub message: &'static str,
}

/// Linear-impact recomputation of a hypothetical CGPA against the baseline.
///
/// Attendance is neutral at 75% (max ±0.5 swing over its 0-100 range) and
/// the midterm at 25/50 (max ±0.3), so a simulation at the neutral point
/// with no grade improvement reproduces the baseline exactly.
pub fn simulate(
    baseline: &WhatIfBaseline,
    attendance: f64,
    midterm: f64,
    improvement: GradeImprovement,
) -> WhatIfOutcome {
    let attendance_impact = (attendance - 75.0) / 100.0 * 0.5;
    let midterm_impact = (midterm - 25.0) / 50.0 * 0.3;

    let cgpa = (baseline.current_average + improvement.delta() + attendance_impact + midterm_impact)
        .clamp(0.0, 4.0);
    let change = cgpa - baseline.current_average;
    let pass_probability =
        (50.0 + (cgpa - 2.0) * 25.0 + attendance * 0.3).clamp(0.0, 100.0);
    let outlook = Outlook::from_change(change);

    WhatIfOutcome {
        cgpa,
        change,
        pass_probability,
        pass_band: pass_band(pass_probability),
        outlook,
        message: outlook.message(),
    }
}

pub fn pass_band(pass_probability: f64) -> &'static str {
    if pass_probability >= 75.0 {
        "High probability"
    } else if pass_probability >= 50.0 {
        "Moderate probability"
    } else {
        "Needs improvement"
    }
}
