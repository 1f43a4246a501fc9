use serde::Serialize;
use std::collections::BTreeMap;

use crate::grades::LetterGrade;

/// One graded course occurrence, as entered for a completed semester.
#[derive(Debug, Clone)]
pub struct GradeEntry {
    pub semester: u8,
    pub subject: String,
    pub grade: LetterGrade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectRisk {
    Low,
    Moderate,
    High,
    Critical,
}

impl SubjectRisk {
    pub fn label(self) -> &'static str {
        match self {
            SubjectRisk::Low => "Low Risk",
            SubjectRisk::Moderate => "Moderate",
            SubjectRisk::High => "High Risk",
            SubjectRisk::Critical => "Critical",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubjectAnalysis {
    pub subject: String,
    pub average: f64,
    pub trend: Trend,
    pub predicted_next: f64,
    pub risk: SubjectRisk,
    pub risk_label: &'static str,
    /// 0-100, derived from the population variance of the grade points.
    pub consistency: f64,
    pub last_grade: LetterGrade,
    pub samples: usize,
}

/// Derives per-subject statistics from a multi-semester grade history.
///
/// Histories are keyed by course *title*, not course code, so a title that
/// recurs across semesters collapses into a single history, matching how
/// existing reports group them.
pub struct SubjectAnalyzer;

impl SubjectAnalyzer {
    pub fn new() -> Self {
        SubjectAnalyzer
    }

    /// Fresh derivation on every call; nothing is cached between passes.
    /// Output is sorted ascending by average so the weakest subjects lead.
    pub fn analyze(&self, entries: &[GradeEntry]) -> Vec<SubjectAnalysis> {
        let mut histories: BTreeMap<String, Vec<(u8, LetterGrade, f64)>> = BTreeMap::new();
        for entry in entries {
            // Incomplete carries no grade points and never enters a history.
            if let Some(points) = entry.grade.analysis_points() {
                histories
                    .entry(entry.subject.clone())
                    .or_default()
                    .push((entry.semester, entry.grade, points));
            }
        }

        let mut analyses: Vec<SubjectAnalysis> = histories
            .into_iter()
            .filter_map(|(subject, mut history)| {
                history.sort_by_key(|(semester, _, _)| *semester);
                let &(_, last_grade, _) = history.last()?;
                let values: Vec<f64> = history.iter().map(|(_, _, v)| *v).collect();

                let average = values.iter().sum::<f64>() / values.len() as f64;
                let trend = self.classify_trend(&values);
                let predicted_next = match trend {
                    Trend::Improving => (average + 0.2).min(4.0),
                    Trend::Declining => (average - 0.2).max(0.0),
                    Trend::Stable => average,
                };
                let consistency = self.consistency(&values, average);
                let risk = self.classify_risk(average);

                Some(SubjectAnalysis {
                    subject,
                    average,
                    trend,
                    predicted_next,
                    risk,
                    risk_label: risk.label(),
                    consistency,
                    last_grade,
                    samples: values.len(),
                })
            })
            .collect();

        analyses.sort_by(|a, b| a.average.total_cmp(&b.average));
        analyses
    }

    /// Subjects whose average has slipped below 3.0, weakest first.
    pub fn needs_attention<'a>(&self, analyses: &'a [SubjectAnalysis]) -> Vec<&'a SubjectAnalysis> {
        analyses.iter().filter(|s| s.average < 3.0).collect()
    }

    /// Subjects holding an average of 3.5 or better.
    pub fn strong<'a>(&self, analyses: &'a [SubjectAnalysis]) -> Vec<&'a SubjectAnalysis> {
        analyses.iter().filter(|s| s.average >= 3.5).collect()
    }

    /// Chronological half-split with a 0.3 dead band. The first half takes
    /// the ceil(n/2) earliest points so a single sample is always stable.
    fn classify_trend(&self, values: &[f64]) -> Trend {
        if values.len() < 2 {
            return Trend::Stable;
        }
        let split = values.len().div_ceil(2);
        let (first, second) = values.split_at(split);
        let first_avg = first.iter().sum::<f64>() / first.len() as f64;
        let second_avg = second.iter().sum::<f64>() / second.len() as f64;

        if second_avg > first_avg + 0.3 {
            Trend::Improving
        } else if second_avg < first_avg - 0.3 {
            Trend::Declining
        } else {
            Trend::Stable
        }
    }

    fn consistency(&self, values: &[f64], average: f64) -> f64 {
        if values.len() < 2 {
            return 100.0;
        }
        let variance =
            values.iter().map(|v| (v - average).powi(2)).sum::<f64>() / values.len() as f64;
        (100.0 - variance * 50.0).max(0.0)
    }

    fn classify_risk(&self, average: f64) -> SubjectRisk {
        if average < 2.0 {
            SubjectRisk::Critical
        } else if average < 2.5 {
            SubjectRisk::High
        } else if average < 3.0 {
            SubjectRisk::Moderate
        } else {
            SubjectRisk::Low
        }
    }
}

impl Default for SubjectAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Letter-family counts over all entered grades ("A-" counts toward A).
/// Incomplete entries are not counted.
pub fn grade_counts<'a, I>(grades: I) -> BTreeMap<char, u32>
where
    I: IntoIterator<Item = &'a LetterGrade>,
{
    let mut counts = BTreeMap::new();
    for grade in grades {
        if let Some(family) = grade.family() {
            *counts.entry(family).or_insert(0) += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(semester: u8, subject: &str, grade: &str) -> GradeEntry {
        GradeEntry {
            semester,
            subject: subject.to_string(),
            grade: grade.parse().unwrap(),
        }
    }

    #[test]
    fn single_sample_is_always_stable() {
        let analyzer = SubjectAnalyzer::new();
        let analyses = analyzer.analyze(&[entry(1, "Programming Fundamentals", "B")]);
        assert_eq!(analyses.len(), 1);
        assert_eq!(analyses[0].trend, Trend::Stable);
        assert_eq!(analyses[0].samples, 1);
        assert!((analyses[0].consistency - 100.0).abs() < 1e-9);
        assert!((analyses[0].predicted_next - 3.0).abs() < 1e-9);
    }

    #[test]
    fn improvement_beyond_margin_is_detected() {
        let analyzer = SubjectAnalyzer::new();
        // halves: [2.0, 2.0] vs [3.0, 3.3] — second mean exceeds by > 0.3
        let analyses = analyzer.analyze(&[
            entry(1, "Calculus", "C"),
            entry(2, "Calculus", "C"),
            entry(3, "Calculus", "B"),
            entry(4, "Calculus", "B+"),
        ]);
        assert_eq!(analyses[0].trend, Trend::Improving);
        let expected_avg = (2.0 + 2.0 + 3.0 + 3.3) / 4.0;
        assert!((analyses[0].average - expected_avg).abs() < 1e-9);
        assert!((analyses[0].predicted_next - (expected_avg + 0.2)).abs() < 1e-9);
    }

    #[test]
    fn decline_beyond_margin_is_detected() {
        let analyzer = SubjectAnalyzer::new();
        let analyses = analyzer.analyze(&[
            entry(1, "Physics", "A"),
            entry(2, "Physics", "A"),
            entry(3, "Physics", "C"),
            entry(4, "Physics", "C"),
        ]);
        assert_eq!(analyses[0].trend, Trend::Declining);
    }

    #[test]
    fn shift_within_dead_band_is_stable() {
        let analyzer = SubjectAnalyzer::new();
        // [3.0, 3.0] vs [3.3, 3.3]: delta 0.3 does not exceed the margin
        let analyses = analyzer.analyze(&[
            entry(1, "Databases", "B"),
            entry(2, "Databases", "B"),
            entry(3, "Databases", "B+"),
            entry(4, "Databases", "B+"),
        ]);
        assert_eq!(analyses[0].trend, Trend::Stable);
    }

    #[test]
    fn odd_history_puts_extra_point_in_first_half() {
        let analyzer = SubjectAnalyzer::new();
        // n=3, first half = 2 earliest points [4.0, 4.0], second = [2.0]
        let analyses = analyzer.analyze(&[
            entry(1, "Networks", "A"),
            entry(2, "Networks", "A"),
            entry(3, "Networks", "C"),
        ]);
        assert_eq!(analyses[0].trend, Trend::Declining);
    }

    #[test]
    fn predicted_next_clamps_at_scale_bounds() {
        let analyzer = SubjectAnalyzer::new();
        let analyses = analyzer.analyze(&[
            entry(1, "Automata", "C"),
            entry(2, "Automata", "C"),
            entry(3, "Automata", "A"),
            entry(4, "Automata", "A"),
        ]);
        assert_eq!(analyses[0].trend, Trend::Improving);
        assert!(analyses[0].predicted_next <= 4.0);
    }

    #[test]
    fn risk_tiers_follow_thresholds() {
        let analyzer = SubjectAnalyzer::new();
        let analyses = analyzer.analyze(&[
            entry(1, "Weak", "D"),      // 1.0 -> critical
            entry(1, "Shaky", "C+"),    // 2.3 -> high
            entry(1, "Middling", "B-"), // 2.7 -> moderate
            entry(1, "Solid", "A-"),    // 3.7 -> low
        ]);
        let by_name: BTreeMap<_, _> =
            analyses.iter().map(|a| (a.subject.as_str(), a.risk)).collect();
        assert_eq!(by_name["Weak"], SubjectRisk::Critical);
        assert_eq!(by_name["Shaky"], SubjectRisk::High);
        assert_eq!(by_name["Middling"], SubjectRisk::Moderate);
        assert_eq!(by_name["Solid"], SubjectRisk::Low);
    }

    #[test]
    fn output_is_sorted_weakest_first() {
        let analyzer = SubjectAnalyzer::new();
        let analyses = analyzer.analyze(&[
            entry(1, "Strongest", "A"),
            entry(1, "Weakest", "F"),
            entry(1, "Middle", "B"),
        ]);
        let names: Vec<_> = analyses.iter().map(|a| a.subject.as_str()).collect();
        assert_eq!(names, vec!["Weakest", "Middle", "Strongest"]);
    }

    #[test]
    fn same_title_collapses_across_semesters() {
        let analyzer = SubjectAnalyzer::new();
        let analyses = analyzer.analyze(&[
            entry(1, "Programming Fundamentals", "B"),
            entry(3, "Programming Fundamentals", "A"),
        ]);
        assert_eq!(analyses.len(), 1);
        assert_eq!(analyses[0].samples, 2);
        assert_eq!(analyses[0].last_grade, LetterGrade::A);
    }

    #[test]
    fn incomplete_grades_never_enter_history() {
        let analyzer = SubjectAnalyzer::new();
        let analyses = analyzer.analyze(&[
            entry(1, "Electronics", "I"),
            entry(2, "Electronics", "B"),
        ]);
        assert_eq!(analyses.len(), 1);
        assert_eq!(analyses[0].samples, 1);
        // A subject with only Incomplete entries vanishes entirely.
        let empty = analyzer.analyze(&[entry(1, "Ghost", "I")]);
        assert!(empty.is_empty());
    }

    #[test]
    fn consistency_penalizes_variance() {
        let analyzer = SubjectAnalyzer::new();
        let analyses =
            analyzer.analyze(&[entry(1, "Erratic", "A"), entry(2, "Erratic", "F")]);
        // values [4.0, 0.0], mean 2.0, population variance 4.0
        assert_eq!(analyses[0].consistency, 0.0);
    }

    #[test]
    fn partitions_split_on_published_cutoffs() {
        let analyzer = SubjectAnalyzer::new();
        let analyses = analyzer.analyze(&[
            entry(1, "Needs Work", "C"),
            entry(1, "Borderline", "B"), // 3.0: neither weak nor strong
            entry(1, "Star", "A"),
        ]);
        let weak = analyzer.needs_attention(&analyses);
        let strong = analyzer.strong(&analyses);
        assert_eq!(weak.len(), 1);
        assert_eq!(weak[0].subject, "Needs Work");
        assert_eq!(strong.len(), 1);
        assert_eq!(strong[0].subject, "Star");
    }

    #[test]
    fn grade_counts_group_by_family() {
        let grades = [
            LetterGrade::A,
            LetterGrade::AMinus,
            LetterGrade::BPlus,
            LetterGrade::F,
            LetterGrade::Incomplete,
        ];
        let counts = grade_counts(grades.iter());
        assert_eq!(counts.get(&'A'), Some(&2));
        assert_eq!(counts.get(&'B'), Some(&1));
        assert_eq!(counts.get(&'F'), Some(&1));
        assert!(!counts.contains_key(&'I'));
    }
}
