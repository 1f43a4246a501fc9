use serde::Serialize;

/// Display order is the derived order: critical first, low last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub title: String,
    pub priority: Priority,
    pub description: String,
    pub action: String,
}

impl Recommendation {
    fn new(title: &str, priority: Priority, description: String, action: &str) -> Self {
        Recommendation {
            title: title.to_string(),
            priority,
            description,
            action: action.to_string(),
        }
    }
}

/// Guidance for first-term students, from the estimated SGPA alone.
/// Deterministic threshold policy, not a model; the cutoffs are fixed.
pub fn first_term_recommendations(
    attendance: f64,
    midterm: f64,
    sgpa: f64,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if sgpa < 2.0 {
        recommendations.push(Recommendation::new(
            "Critical: Immediate Action Required",
            Priority::Critical,
            format!(
                "Your estimated SGPA of {sgpa:.2} is below passing threshold. This requires immediate attention."
            ),
            "Meet with your academic advisor immediately, attend all classes, seek tutoring help, and form study groups.",
        ));
    }

    if midterm < 25.0 {
        recommendations.push(Recommendation::new(
            "Focus on Exam Preparation",
            Priority::High,
            format!("Your midterm score of {midterm:.0}/50 indicates you need stronger exam strategies."),
            "Start preparing for finals now. Review class notes daily, practice past papers, join study groups, and clarify doubts with instructors during office hours.",
        ));
    } else if midterm < 35.0 {
        recommendations.push(Recommendation::new(
            "Strengthen Your Exam Skills",
            Priority::Medium,
            format!("Midterm score of {midterm:.0}/50 is decent but has room for improvement."),
            "Practice more problems, focus on weak topics, and time yourself during practice sessions to improve speed and accuracy.",
        ));
    } else {
        recommendations.push(Recommendation::new(
            "Excellent Exam Performance!",
            Priority::Low,
            format!("Great midterm score of {midterm:.0}/50! You're on the right track."),
            "Maintain your study routine and help classmates who are struggling. Teaching others reinforces your own understanding.",
        ));
    }

    if attendance < 70.0 {
        recommendations.push(Recommendation::new(
            "Critical Attendance Issue",
            Priority::Critical,
            format!("Your {attendance:.0}% attendance is critically low and may affect your eligibility."),
            "Attend all remaining classes without exception. Set multiple alarms, find a study buddy for accountability, and communicate with professors about any genuine issues.",
        ));
    } else if attendance < 85.0 {
        recommendations.push(Recommendation::new(
            "Improve Class Attendance",
            Priority::High,
            format!("Attendance at {attendance:.0}% should be improved to 85%+ for better learning outcomes."),
            "Make attending classes a top priority. Missing classes means missing important information that may not be in textbooks.",
        ));
    } else {
        recommendations.push(Recommendation::new(
            "Great Attendance!",
            Priority::Low,
            format!("Excellent attendance of {attendance:.0}%! Regular class participation is key to success."),
            "Keep it up! Your consistent attendance gives you an advantage in understanding course material.",
        ));
    }

    recommendations.push(Recommendation::new(
        "First Semester Success Tips",
        Priority::Medium,
        "As a first-semester student, building good habits now will set the foundation for your entire academic career.".to_string(),
        "Create a study schedule, identify your learning style, build relationships with professors, join academic clubs, and don't hesitate to ask for help when needed.",
    ));
    recommendations.push(Recommendation::new(
        "Master Time Management",
        Priority::Medium,
        "Effective time management is crucial for first semester success.".to_string(),
        "Use a planner or digital calendar, break large assignments into smaller tasks, avoid procrastination, and balance study time across all subjects.",
    ));

    recommendations.sort_by_key(|r| r.priority);
    recommendations
}

/// Guidance after a full prediction, from the forecast average plus the
/// current semester's raw inputs and the weakest subject titles. The
/// attendance and midterm groups are optional in the submission, so their
/// items are only generated when the group was present.
pub fn forecast_recommendations(
    current_average: f64,
    attendance: Option<f64>,
    midterm: Option<f64>,
    weak_subjects: &[String],
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if let Some(attendance) = attendance {
        if attendance < 75.0 {
            recommendations.push(Recommendation::new(
                "Improve Attendance",
                Priority::High,
                format!(
                    "Your current attendance is {attendance:.0}%. Aim for at least 85% attendance to significantly boost your performance."
                ),
                "Set reminders for classes and track your attendance weekly.",
            ));
        } else if attendance < 85.0 {
            recommendations.push(Recommendation::new(
                "Maintain Good Attendance",
                Priority::Medium,
                format!("You have {attendance:.0}% attendance. Push it above 85% for optimal results."),
                "Keep up the consistency and avoid unnecessary absences.",
            ));
        }
    }

    if !weak_subjects.is_empty() {
        let top_weak: Vec<&str> = weak_subjects.iter().take(2).map(String::as_str).collect();
        recommendations.push(Recommendation::new(
            "Focus on Weak Subjects",
            Priority::High,
            format!("You need improvement in: {}", top_weak.join(", ")),
            "Dedicate extra study hours, seek tutor help, and practice more problems in these subjects.",
        ));
    }

    if let Some(midterm) = midterm {
        if midterm < 30.0 {
            recommendations.push(Recommendation::new(
                "Strengthen Exam Preparation",
                Priority::High,
                format!("Midterm score of {midterm:.0}/50 indicates need for better exam strategies."),
                "Practice past papers, join study groups, and review concepts regularly.",
            ));
        } else if midterm < 40.0 {
            recommendations.push(Recommendation::new(
                "Good Exam Performance",
                Priority::Medium,
                format!("Midterm score of {midterm:.0}/50 is decent. Aim for 40+ for excellence."),
                "Continue your preparation routine and tackle advanced problems.",
            ));
        }
    }

    if current_average < 2.5 {
        recommendations.push(Recommendation::new(
            "Critical: CGPA Below Threshold",
            Priority::Critical,
            format!(
                "Your CGPA of {current_average:.2} is below the minimum requirement of 2.5."
            ),
            "Meet with academic advisor immediately, consider tutoring, reduce extracurricular load.",
        ));
    } else if current_average < 3.0 {
        recommendations.push(Recommendation::new(
            "Work Towards Better CGPA",
            Priority::High,
            format!("CGPA of {current_average:.2} needs improvement to reach 3.0+"),
            "Focus on consistency across all subjects, especially core courses.",
        ));
    } else if current_average >= 3.5 {
        recommendations.push(Recommendation::new(
            "Excellent Performance!",
            Priority::Low,
            format!("Outstanding CGPA of {current_average:.2}! Keep up the great work."),
            "Maintain this level, mentor peers, and consider advanced coursework.",
        ));
    }

    if current_average < 3.0 || weak_subjects.len() > 2 {
        recommendations.push(Recommendation::new(
            "Optimize Study Strategy",
            Priority::Medium,
            "Your current approach may need refinement for better results.".to_string(),
            "Try active recall, spaced repetition, and Pomodoro technique. Use office hours effectively.",
        ));
    }

    recommendations.push(Recommendation::new(
        "Enhance Time Management",
        Priority::Medium,
        "Effective time allocation is key to academic success.".to_string(),
        "Create a weekly study schedule, prioritize difficult subjects, and avoid procrastination.",
    ));

    recommendations.sort_by_key(|r| r.priority);
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(recs: &[Recommendation]) -> Vec<&str> {
        recs.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn failing_estimate_leads_with_critical_item() {
        let recs = first_term_recommendations(60.0, 15.0, 1.5);
        assert_eq!(recs[0].priority, Priority::Critical);
        assert!(titles(&recs).contains(&"Critical: Immediate Action Required"));
        assert!(titles(&recs).contains(&"Critical Attendance Issue"));
        assert!(titles(&recs).contains(&"Focus on Exam Preparation"));
    }

    #[test]
    fn strong_estimate_gets_no_critical_items() {
        let recs = first_term_recommendations(95.0, 45.0, 3.8);
        assert!(recs.iter().all(|r| r.priority != Priority::Critical));
        assert!(titles(&recs).contains(&"Excellent Exam Performance!"));
        assert!(titles(&recs).contains(&"Great Attendance!"));
    }

    #[test]
    fn generic_first_term_items_are_always_present() {
        for (att, mid, sgpa) in [(100.0, 50.0, 4.0), (0.0, 0.0, 0.0), (80.0, 30.0, 2.6)] {
            let recs = first_term_recommendations(att, mid, sgpa);
            assert!(titles(&recs).contains(&"First Semester Success Tips"));
            assert!(titles(&recs).contains(&"Master Time Management"));
        }
    }

    #[test]
    fn midterm_thresholds_pick_one_item_each() {
        let low = first_term_recommendations(90.0, 24.9, 3.0);
        assert!(titles(&low).contains(&"Focus on Exam Preparation"));
        let mid = first_term_recommendations(90.0, 25.0, 3.0);
        assert!(titles(&mid).contains(&"Strengthen Your Exam Skills"));
        let high = first_term_recommendations(90.0, 35.0, 3.0);
        assert!(titles(&high).contains(&"Excellent Exam Performance!"));
    }

    #[test]
    fn output_is_sorted_by_display_priority() {
        let recs = first_term_recommendations(60.0, 20.0, 1.5);
        let priorities: Vec<Priority> = recs.iter().map(|r| r.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort();
        assert_eq!(priorities, sorted);
    }

    #[test]
    fn forecast_recommendations_name_weakest_two_subjects() {
        let weak = vec![
            "Theory of Automata".to_string(),
            "Multivariable Calculus".to_string(),
            "Applied Physics".to_string(),
        ];
        let recs = forecast_recommendations(2.8, Some(80.0), Some(35.0), &weak);
        let focus = recs
            .iter()
            .find(|r| r.title == "Focus on Weak Subjects")
            .expect("weak subject item missing");
        assert!(focus.description.contains("Theory of Automata"));
        assert!(focus.description.contains("Multivariable Calculus"));
        assert!(!focus.description.contains("Applied Physics"));
    }

    #[test]
    fn low_cgpa_is_critical_after_prediction() {
        let recs = forecast_recommendations(2.2, Some(90.0), Some(42.0), &[]);
        assert_eq!(recs[0].priority, Priority::Critical);
        assert!(recs[0].title.contains("CGPA Below Threshold"));
    }

    #[test]
    fn time_management_item_is_unconditional() {
        let recs = forecast_recommendations(3.9, Some(95.0), Some(48.0), &[]);
        assert!(titles(&recs).contains(&"Enhance Time Management"));
        assert!(titles(&recs).contains(&"Excellent Performance!"));
    }

    #[test]
    fn absent_groups_generate_no_attendance_or_midterm_items() {
        let recs = forecast_recommendations(2.8, None, None, &[]);
        for title in titles(&recs) {
            assert!(!title.contains("Attendance"), "unexpected item: {title}");
            assert!(!title.contains("Exam"), "unexpected item: {title}");
        }
        assert!(titles(&recs).contains(&"Work Towards Better CGPA"));
    }

    #[test]
    fn fractional_means_render_as_whole_numbers() {
        let recs = forecast_recommendations(3.2, Some(83.333333), Some(33.333333), &[]);
        let attendance = recs
            .iter()
            .find(|r| r.title == "Maintain Good Attendance")
            .expect("attendance item missing");
        assert!(attendance.description.contains("83%"));
        assert!(!attendance.description.contains("83.3"));
        let midterm = recs
            .iter()
            .find(|r| r.title == "Good Exam Performance")
            .expect("midterm item missing");
        assert!(midterm.description.contains("33/50"));
    }
}
