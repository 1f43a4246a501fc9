use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Theory/lab credit-hour breakdown of a course. `total` is the SGPA weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credits {
    pub theory: u32,
    pub lab: u32,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub code: String,
    pub title: String,
    pub credits: Credits,
}

impl CourseRecord {
    /// Key used in submission payloads and reports, e.g. "CS111 Programming Fundamentals".
    pub fn payload_key(&self) -> String {
        format!("{} {}", self.code, self.title)
    }
}

/// Read-only lookup from (program, semester 1..=8) to the ordered course
/// list. Unknown combinations yield an empty slice, never an error.
pub trait CourseCatalog: Send + Sync {
    fn courses(&self, program: &str, semester: u8) -> &[CourseRecord];
}

pub struct StaticCatalog {
    programs: HashMap<(String, u8), Vec<CourseRecord>>,
}

impl CourseCatalog for StaticCatalog {
    fn courses(&self, program: &str, semester: u8) -> &[CourseRecord] {
        self.programs
            .get(&(program.to_string(), semester))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    program: String,
    semester: u8,
    code: String,
    title: String,
    theory: u32,
    lab: u32,
}

impl StaticCatalog {
    /// Load a catalog from a CSV file with columns
    /// `program,semester,code,title,theory,lab`.
    pub fn from_csv(path: &Path) -> Result<Self, csv::Error> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut programs: HashMap<(String, u8), Vec<CourseRecord>> = HashMap::new();
        for row in reader.deserialize() {
            let row: CatalogRow = row?;
            programs
                .entry((row.program, row.semester))
                .or_default()
                .push(CourseRecord {
                    code: row.code,
                    title: row.title,
                    credits: Credits {
                        theory: row.theory,
                        lab: row.lab,
                        total: row.theory + row.lab,
                    },
                });
        }
        Ok(StaticCatalog { programs })
    }

    /// The built-in degree programs.
    pub fn builtin() -> Self {
        fn course(code: &str, title: &str, theory: u32, lab: u32) -> CourseRecord {
            CourseRecord {
                code: code.to_string(),
                title: title.to_string(),
                credits: Credits {
                    theory,
                    lab,
                    total: theory + lab,
                },
            }
        }

        let mut programs: HashMap<(String, u8), Vec<CourseRecord>> = HashMap::new();
        let mut add = |program: &str, semester: u8, courses: Vec<CourseRecord>| {
            programs.insert((program.to_string(), semester), courses);
        };

        let cs = "Computer Science";
        add(cs, 1, vec![
            course("HU119", "English Comprehension and Composition", 3, 0),
            course("PH102", "Applied Physics", 3, 1),
            course("HU115", "Pakistan Studies", 2, 0),
            course("CS180", "Introduction to ICT", 2, 0),
            course("CS180L", "Introduction to ICT Lab", 0, 1),
            course("CS111", "Programming Fundamentals", 3, 0),
            course("CS111L", "Programming Fundamentals Lab", 0, 1),
        ]);
        add(cs, 2, vec![
            course("HU120", "Communication and Presentation Skills", 3, 0),
            course("MA110", "Calculus & Analytical Geometry", 3, 0),
            course("CS112", "Object Oriented Programming", 3, 0),
            course("CS112L", "Object Oriented Programming Lab", 0, 1),
            course("HU118", "Islamic Studies", 2, 0),
            course("EE223", "Digital Logic Design", 3, 0),
            course("EE223L", "Digital Logic Design Lab", 0, 1),
        ]);
        add(cs, 3, vec![
            course("CS270", "Professional Practices", 3, 0),
            course("CS214", "Data Structures and Algorithms", 3, 0),
            course("CS214L", "Data Structures and Algorithms Lab", 0, 1),
            course("CS223", "Computer Organization and Assembly Language", 3, 0),
            course("CS223L", "Computer Organization & Assembly Language Lab", 0, 1),
            course("MA105", "Multivariable Calculus", 3, 0),
            course("MA216", "Discrete Structures", 3, 0),
        ]);
        add(cs, 4, vec![
            course("MA301", "Probability and Statistics", 3, 0),
            course("CS225", "Operating Systems", 3, 0),
            course("CS225L", "Operating Systems Lab", 0, 1),
            course("CS281", "Mobile Computing (CS-Elective-I)", 2, 0),
            course("CS281L", "Mobile Computing Lab", 0, 1),
            course("CS230", "Database Systems", 3, 0),
            course("CS230L", "Database Systems Lab", 0, 1),
            course("MA201", "Linear Algebra", 3, 0),
        ]);
        add(cs, 5, vec![
            course("CS360", "Computer Networks", 3, 0),
            course("CS360L", "Computer Networks Lab", 0, 1),
            course("MA202", "Numerical Analysis and Computation", 3, 0),
            course("CS332", "Design and Analysis of Algorithms", 3, 0),
            course("HU317", "Interpersonal Skills / Public Relations", 3, 0),
            course("CS382", "Visual Programming (CS Elective-II)", 3, 0),
            course("CS382L", "Visual Programming Lab", 0, 1),
        ]);
        add(cs, 6, vec![
            course("CS333", "Theory of Automata", 3, 0),
            course("CS340", "Artificial Intelligence", 3, 0),
            course("CS340L", "Artificial Intelligence Lab", 0, 1),
            course("CS371", "Software Engineering", 2, 0),
            course("CS371L", "Software Engineering Lab", 0, 1),
            course("CS3XX", "CS Elective-III", 3, 0),
            course("CS3XXL", "CS Elective-III Lab", 0, 1),
            course("CS3XX", "CS Elective-IV", 3, 0),
            course("CS494", "Final Project-I", 0, 1),
        ]);
        add(cs, 7, vec![
            course("HU401", "Technical and Business Writing", 3, 0),
            course("CS426", "Parallel and Distributed Computing", 2, 0),
            course("CS426L", "Parallel and Distributed Computing Lab", 0, 1),
            course("CS415", "Information Security", 3, 0),
            course("CS495", "Final Project – II", 0, 2),
            course("BA356", "University Elective-I (Management)", 3, 0),
            course("MA478", "Graph Theory", 3, 0),
        ]);
        add(cs, 8, vec![
            course("CS434", "Compiler Construction", 2, 0),
            course("CS434L", "Compiler Construction Lab", 0, 1),
            course("HU414", "University Elective-V", 1, 0),
            course("CS406", "CS Elective-V", 3, 0),
            course("CS406L", "CS Elective-V Lab", 0, 1),
            course("BA354", "University Elective-II (Management)", 3, 0),
            course("EN212", "Chinese (Foreign Language)", 3, 0),
            course("CS496", "Final Project-III", 0, 3),
        ]);

        let se = "Software Engineering";
        add(se, 1, vec![
            course("CS180", "Introduction to Info. & Comm. Technologies", 2, 0),
            course("CS180L", "Introduction to ICT Lab", 0, 1),
            course("CS111", "Programming Fundamentals", 3, 0),
            course("CS111L", "Programming Fundamentals Lab", 0, 1),
            course("EL100", "Reading and Writing Skills", 3, 0),
            course("MA113", "Pre-calculus", 2, 0),
            course("HU124", "Islamic Studies and Ethics", 2, 0),
            course("MA114", "Foundational Mathematics", 4, 0),
        ]);
        add(se, 2, vec![
            course("CS112", "Object Oriented Programming", 3, 0),
            course("CS112L", "Object Oriented Programming Lab", 0, 1),
            course("EL200", "Communication & Presentation Skills", 3, 0),
            course("SE100", "Software Engineering", 3, 0),
            course("MA110", "Calculus & Analytical Geometry", 3, 0),
            course("MA216", "Discrete Structures", 3, 0),
            course("HU125", "Pakistan Studies & Global Perspectives", 2, 0),
        ]);
        add(se, 3, vec![
            course("CS214", "Data Structures & Algorithms", 3, 0),
            course("CS214L", "Data Structures & Algorithms Lab", 0, 1),
            course("SE210", "Software Requirement Engineering", 3, 0),
            course("MA301", "Probability and Statistics", 3, 0),
            course("PH109", "Physics", 3, 0),
            course("SE211", "Human Computer Interaction", 3, 0),
        ]);
        add(se, 4, vec![
            course("SEXXX", "SE Supporting –I (Stochastic Processes)", 3, 0),
            course("CS230", "Database Systems", 3, 0),
            course("CS230L", "Database Systems Lab", 0, 1),
            course("CS225", "Operating System", 3, 0),
            course("CS225L", "Operating System Lab", 0, 1),
            course("SE212", "Software Design & Architecture", 2, 0),
            course("SE212L", "Software Design & Architecture Lab", 0, 1),
            course("MA201", "Linear Algebra", 3, 0),
        ]);
        add(se, 5, vec![
            course("SE313", "Software Construction and Development", 2, 0),
            course("SE313L", "Software Construction and Development Lab", 0, 1),
            course("SEXXX", "SE Supporting –II (Formal Methods in SE)", 3, 0),
            course("SEXXX", "SE-Elective-I", 3, 0),
            course("SEXXX", "SE-Elective-II", 3, 0),
            course("SE330", "Web Engineering", 3, 0),
            course("HU/BAXXX", "University Elective-I", 3, 0),
        ]);
        add(se, 6, vec![
            course("CS360", "Computer Networks", 3, 0),
            course("CS360L", "Computer Networks Lab", 0, 1),
            course("SE340", "Software Quality Engineering", 3, 0),
            course("SEXXX", "SE-Elective-III", 3, 0),
            course("SEXXX", "SE-Elective-IV", 3, 0),
            course("EL400", "Technical & Business Writing", 3, 0),
            course("SE497", "Final Year Project – I", 0, 1),
        ]);
        add(se, 7, vec![
            course("SE421", "Software Project Management", 3, 0),
            course("SE301", "Software Re-Engineering", 3, 0),
            course("SEXXX", "SE-Elective-V", 3, 0),
            course("SEXXX", "SE Supporting – III (Business Process Eng.)", 3, 0),
            course("SE498", "Final Year Project – II", 0, 2),
            course("HU/BAXXX", "University Elective-II", 3, 0),
        ]);
        add(se, 8, vec![
            course("CS270", "Professional Practices", 3, 0),
            course("HU414", "Social Services", 1, 0),
            course("CY406", "Information Security", 3, 0),
            course("SE499", "Final Year Project – III", 0, 3),
            course("HUXXX", "University Elective-III (Foreign Language)", 2, 0),
            course("HUXXX", "University Elective – IV", 3, 0),
        ]);

        let cy = "Cyber Security";
        add(cy, 1, vec![
            course("HU119", "English Comprehension and Composition", 3, 0),
            course("CY102", "Introduction to Cyber Security", 3, 0),
            course("HU115", "Pakistan Studies", 2, 0),
            course("CS180", "Introduction to ICT", 2, 0),
            course("CS180L", "Introduction to ICT Lab", 0, 1),
            course("CS111", "Programming Fundamentals", 3, 0),
            course("CS111L", "Programming Fundamentals Lab", 0, 1),
        ]);
        add(cy, 2, vec![
            course("CYXXX", "Cyber Security Elective I", 2, 0),
            course("CYXXXL", "Cyber Security Elective I Lab", 0, 1),
            course("CY103", "Information Assurance", 3, 0),
            course("CS112", "Object Oriented Programming", 3, 0),
            course("CS112L", "Object Oriented Programming Lab", 0, 1),
            course("MA216", "Discrete Structures", 3, 0),
            course("HU120", "Communication & Presentation Skills", 3, 0),
        ]);
        add(cy, 3, vec![
            course("EE223", "Digital Logic Design", 3, 0),
            course("EE223L", "Digital Logic Design Lab", 0, 1),
            course("MA201", "Linear Algebra", 3, 0),
            course("CS214", "Data Structure & Algorithm", 3, 0),
            course("CS214L", "Data Structure & Algorithm Lab", 0, 1),
            course("MA110", "Calculus & Analytical Geometry", 3, 0),
            course("CS360", "Computer Networks", 3, 0),
            course("CS360L", "Computer Networks Lab", 0, 1),
        ]);
        add(cy, 4, vec![
            course("CS225", "Operating Systems", 3, 0),
            course("CS225L", "Operating Systems Lab", 0, 1),
            course("CS223", "Computer Organization & Assembly Language", 3, 0),
            course("CS223L", "Computer Organization & Assembly Language Lab", 0, 1),
            course("CYXXX", "CYS Elective II", 2, 0),
            course("CY222", "Network Security", 3, 0),
            course("CY222L", "Network Security Lab", 0, 1),
            course("CS371", "Software Engineering", 3, 0),
            course("CS371L", "Software Engineering Lab", 0, 1),
        ]);
        add(cy, 5, vec![
            course("CS332", "Design and analysis of Algorithm", 3, 0),
            course("CY334", "Digital Forensics", 2, 0),
            course("CY334L", "Digital Forensics Lab", 0, 1),
            course("CY250", "Secure Software Development", 2, 0),
            course("CY250L", "Secure Software Development Lab", 0, 1),
            course("CYXXX", "Cyber Security Elective-III", 3, 0),
            course("CS230", "Database Systems", 3, 0),
            course("CS230L", "Database Systems Lab", 0, 1),
            course("MA106", "Differential Equations", 3, 0),
        ]);
        add(cy, 6, vec![
            course("CY355", "Vulnerability Assessment & Reverse Engineering", 3, 0),
            course("CY355L", "Vuln. Assessment & Reverse Eng. Lab", 0, 1),
            course("CS340", "Artificial Intelligence", 3, 0),
            course("CS340L", "Artificial Intelligence Lab", 0, 1),
            course("CYXXX", "Cyber Security Elective IV", 3, 0),
            course("CY206", "Information Security", 3, 0),
            course("CY497", "Final Project-I", 0, 1),
            course("MA301", "Probability and Statistics", 3, 0),
        ]);
        add(cy, 7, vec![
            course("BAXXX", "University Elective I", 3, 0),
            course("HU401", "Technical & Business Writing", 2, 0),
            course("CS426", "Parallel and Distributed Computing", 2, 0),
            course("CS426L", "Parallel and Distributed Computing Lab", 0, 1),
            course("CY498", "Final Project –II", 0, 2),
            course("BAXXX", "University Elective II", 2, 0),
        ]);
        add(cy, 8, vec![
            course("BAXXX", "University Elective III", 3, 0),
            course("HU414", "Social Service (University Elective V)", 1, 0),
            course("CY499", "Final Project – III", 0, 3),
            course("CS270", "Professional Practices", 3, 0),
            course("BAXXX", "University Elective IV", 3, 0),
        ]);

        StaticCatalog { programs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_covers_all_eight_semesters() {
        let catalog = StaticCatalog::builtin();
        for program in ["Computer Science", "Software Engineering", "Cyber Security"] {
            for semester in 1..=8 {
                assert!(
                    !catalog.courses(program, semester).is_empty(),
                    "{program} semester {semester} is empty"
                );
            }
        }
    }

    #[test]
    fn unknown_keys_yield_empty_not_error() {
        let catalog = StaticCatalog::builtin();
        assert!(catalog.courses("Fine Arts", 1).is_empty());
        assert!(catalog.courses("Computer Science", 9).is_empty());
        assert!(catalog.courses("Computer Science", 0).is_empty());
    }

    #[test]
    fn credit_totals_are_theory_plus_lab() {
        let catalog = StaticCatalog::builtin();
        for semester in 1..=8 {
            for course in catalog.courses("Computer Science", semester) {
                assert_eq!(
                    course.credits.total,
                    course.credits.theory + course.credits.lab,
                    "bad credit split for {}",
                    course.code
                );
            }
        }
    }

    #[test]
    fn first_semester_cs_matches_published_scheme() {
        let catalog = StaticCatalog::builtin();
        let courses = catalog.courses("Computer Science", 1);
        assert_eq!(courses.len(), 7);
        assert_eq!(courses[5].code, "CS111");
        assert_eq!(courses[5].title, "Programming Fundamentals");
        assert_eq!(courses[5].credits.total, 3);
        assert_eq!(courses[1].payload_key(), "PH102 Applied Physics");
    }

    #[test]
    fn csv_loader_round_trips_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "program,semester,code,title,theory,lab").unwrap();
        writeln!(file, "Data Science,1,DS101,Intro to Data Science,3,0").unwrap();
        writeln!(file, "Data Science,1,DS101L,Intro to Data Science Lab,0,1").unwrap();
        file.flush().unwrap();

        let catalog = StaticCatalog::from_csv(file.path()).unwrap();
        let courses = catalog.courses("Data Science", 1);
        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0].code, "DS101");
        assert_eq!(courses[0].credits.total, 3);
        assert_eq!(courses[1].credits.lab, 1);
        assert!(catalog.courses("Data Science", 2).is_empty());
    }
}
