use serde::{Deserialize, Serialize};

use crate::catalog::{CourseCatalog, CourseRecord};
use crate::grades::LetterGrade;

/// Outcome of a semester aggregation. A semester is never partially valid:
/// either every course had a grade and the weighted average was computable,
/// or the whole semester is unavailable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sgpa {
    Computed(f64),
    Unavailable,
}

impl Sgpa {
    pub fn value(self) -> Option<f64> {
        match self {
            Sgpa::Computed(v) => Some(v),
            Sgpa::Unavailable => None,
        }
    }
}

/// A semester with a computed SGPA, as submitted to the prediction service.
/// Unavailable semesters are never put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SemesterResult {
    pub semester: u8,
    pub sgpa: f64,
}

/// Credit-weighted SGPA over one semester's courses.
///
/// The completeness gate comes first: if any course lacks a grade the whole
/// semester is unavailable, so an incomplete entry set can never leak a
/// partial average. Incomplete (`I`) grades are then excluded from both the
/// numerator and the denominator; if that leaves no credits, the result is
/// unavailable as well. The clamp guards against catalog data errors only —
/// individual grade points are already within [0, 4].
pub fn compute_sgpa(courses: &[CourseRecord], grades: &[Option<LetterGrade>]) -> Sgpa {
    if courses.is_empty() || grades.len() != courses.len() {
        return Sgpa::Unavailable;
    }
    let mut weighted = 0.0;
    let mut credits = 0u32;
    for (course, grade) in courses.iter().zip(grades.iter()) {
        let Some(grade) = grade else {
            return Sgpa::Unavailable;
        };
        if let Some(points) = grade.grade_points() {
            weighted += points * f64::from(course.credits.total);
            credits += course.credits.total;
        }
    }

    if credits == 0 {
        return Sgpa::Unavailable;
    }
    Sgpa::Computed((weighted / f64::from(credits)).clamp(0.0, 4.0))
}

/// Recompute every completed semester (1..current) from scratch. Semesters
/// with no catalog entry or an unavailable SGPA are skipped on the wire.
pub fn semester_results(
    catalog: &dyn CourseCatalog,
    program: &str,
    semester_count: u8,
    grades_by_semester: &dyn Fn(u8) -> Vec<Option<LetterGrade>>,
) -> Vec<SemesterResult> {
    let mut results = Vec::new();
    for semester in 1..semester_count {
        let courses = catalog.courses(program, semester);
        if courses.is_empty() {
            continue;
        }
        if let Sgpa::Computed(sgpa) = compute_sgpa(courses, &grades_by_semester(semester)) {
            results.push(SemesterResult { semester, sgpa });
        }
    }
    results
}
