use std::collections::BTreeMap;

use crate::catalog::CourseCatalog;
use crate::error::PredictorError;
use crate::grades::LetterGrade;
use crate::service::{MarksGroup, PredictionRequest};
use crate::sgpa::SemesterResult;

pub const ATTENDANCE_MESSAGE: &str = "Please enter all attendance values (0-100).";
pub const MIDTERM_MESSAGE: &str = "Please enter all midterm marks (0-50).";
pub const GRADES_MESSAGE: &str =
    "Please enter all subject grades. Do not leave any field blank.";
pub const SEMESTER_MESSAGE: &str = "Semester must be between 1 and 8.";

/// The current semester must be one of the eight catalog semesters.
pub fn validate_semester_count(semester_count: u8) -> Result<(), PredictorError> {
    if (1..=8).contains(&semester_count) {
        Ok(())
    } else {
        Err(PredictorError::Validation(SEMESTER_MESSAGE.to_string()))
    }
}

/// Raw entries for one field group, aligned to the catalog's course order
/// for the semester they belong to. `None` is an untouched field.
pub type RawEntries = Vec<Option<String>>;

/// Best-effort parse of one semester's grade entries for SGPA recomputation.
/// Unparseable entries come back as `None` and trip the completeness gate
/// downstream; hard validation happens in [`validate_grades`].
pub fn parse_grades(entries: &[Option<String>]) -> Vec<Option<LetterGrade>> {
    entries
        .iter()
        .map(|entry| entry.as_deref().and_then(|s| s.parse().ok()))
        .collect()
}

/// Validate grade entries for every completed semester (1..semester_count).
///
/// All-or-nothing per group: one blank or malformed entry anywhere fails the
/// whole group with a single aggregate message. On success the grades come
/// back normalized (uppercase letters) and keyed `"<code> <title>"`.
/// `Ok(None)` means the group is legitimately empty (no completed semesters
/// or no catalog coverage) and should be omitted from the payload.
pub fn validate_grades(
    catalog: &dyn CourseCatalog,
    program: &str,
    semester_count: u8,
    entries: &BTreeMap<u8, RawEntries>,
) -> Result<Option<BTreeMap<u8, BTreeMap<String, LetterGrade>>>, PredictorError> {
    if semester_count <= 1 {
        return Ok(None);
    }

    let mut all_grades = BTreeMap::new();
    for semester in 1..semester_count {
        let courses = catalog.courses(program, semester);
        if courses.is_empty() {
            continue;
        }
        let semester_entries = entries.get(&semester);

        let mut semester_grades = BTreeMap::new();
        for (idx, course) in courses.iter().enumerate() {
            let raw = semester_entries
                .and_then(|e| e.get(idx))
                .and_then(|e| e.as_deref())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| PredictorError::Validation(GRADES_MESSAGE.to_string()))?;
            let grade: LetterGrade = raw
                .parse()
                .map_err(|_| PredictorError::Validation(GRADES_MESSAGE.to_string()))?;
            semester_grades.insert(course.payload_key(), grade);
        }
        if !semester_grades.is_empty() {
            all_grades.insert(semester, semester_grades);
        }
    }

    if all_grades.is_empty() {
        Ok(None)
    } else {
        Ok(Some(all_grades))
    }
}

/// Validate current-semester attendance percentages (0-100), all-or-nothing.
pub fn validate_attendance(
    catalog: &dyn CourseCatalog,
    program: &str,
    current_semester: u8,
    values: &[Option<f64>],
) -> Result<Option<MarksGroup>, PredictorError> {
    validate_marks(
        catalog,
        program,
        current_semester,
        values,
        0.0..=100.0,
        ATTENDANCE_MESSAGE,
    )
}

/// Validate current-semester midterm marks (0-50), all-or-nothing.
pub fn validate_midterm(
    catalog: &dyn CourseCatalog,
    program: &str,
    current_semester: u8,
    values: &[Option<f64>],
) -> Result<Option<MarksGroup>, PredictorError> {
    validate_marks(
        catalog,
        program,
        current_semester,
        values,
        0.0..=50.0,
        MIDTERM_MESSAGE,
    )
}

fn validate_marks(
    catalog: &dyn CourseCatalog,
    program: &str,
    current_semester: u8,
    values: &[Option<f64>],
    range: std::ops::RangeInclusive<f64>,
    message: &str,
) -> Result<Option<MarksGroup>, PredictorError> {
    if current_semester == 0 {
        return Ok(None);
    }
    let courses = catalog.courses(program, current_semester);
    if courses.is_empty() {
        return Ok(None);
    }

    let mut marks = BTreeMap::new();
    for (idx, course) in courses.iter().enumerate() {
        let value = values
            .get(idx)
            .copied()
            .flatten()
            .filter(|v| v.is_finite() && range.contains(v))
            .ok_or_else(|| PredictorError::Validation(message.to_string()))?;
        marks.insert(course.payload_key(), value);
    }

    Ok(Some(MarksGroup {
        semester: current_semester,
        marks,
    }))
}

/// Assemble the immutable submission payload from validated groups.
pub fn build_request(
    student_name: &str,
    department: &str,
    semesters: Vec<SemesterResult>,
    subject_grades: Option<BTreeMap<u8, BTreeMap<String, LetterGrade>>>,
    attendance: Option<MarksGroup>,
    midterm: Option<MarksGroup>,
) -> PredictionRequest {
    PredictionRequest {
        semesters,
        student_name: student_name.to_string(),
        department: department.to_string(),
        subject_grades,
        attendance,
        midterm,
    }
}
