use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Letter grades on the university transcript. `I` (Incomplete) is a real
/// transcript entry but carries no grade points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
    #[serde(rename = "I")]
    Incomplete,
}

impl LetterGrade {
    pub const ALL: [LetterGrade; 11] = [
        LetterGrade::A,
        LetterGrade::AMinus,
        LetterGrade::BPlus,
        LetterGrade::B,
        LetterGrade::BMinus,
        LetterGrade::CPlus,
        LetterGrade::C,
        LetterGrade::CMinus,
        LetterGrade::D,
        LetterGrade::F,
        LetterGrade::Incomplete,
    ];

    /// Grade points used for credit-weighted SGPA aggregation.
    /// `None` means "excluded from averaging" — distinct from 0.0.
    pub fn grade_points(self) -> Option<f64> {
        match self {
            LetterGrade::A => Some(4.0),
            LetterGrade::AMinus => Some(3.67),
            LetterGrade::BPlus => Some(3.33),
            LetterGrade::B => Some(3.0),
            LetterGrade::BMinus => Some(2.67),
            LetterGrade::CPlus => Some(2.33),
            LetterGrade::C => Some(2.0),
            LetterGrade::CMinus => Some(1.67),
            LetterGrade::D => Some(1.0),
            LetterGrade::F => Some(0.0),
            LetterGrade::Incomplete => None,
        }
    }

    /// Grade points used by the subject history analyzer. Slightly coarser
    /// rounding on the minus/plus grades than the SGPA table, kept as-is for
    /// compatibility with existing transcripts and reports.
    pub fn analysis_points(self) -> Option<f64> {
        match self {
            LetterGrade::A => Some(4.0),
            LetterGrade::AMinus => Some(3.7),
            LetterGrade::BPlus => Some(3.3),
            LetterGrade::B => Some(3.0),
            LetterGrade::BMinus => Some(2.7),
            LetterGrade::CPlus => Some(2.3),
            LetterGrade::C => Some(2.0),
            LetterGrade::CMinus => Some(1.7),
            LetterGrade::D => Some(1.0),
            LetterGrade::F => Some(0.0),
            LetterGrade::Incomplete => None,
        }
    }

    /// Letter family for grade-count summaries ("A-" counts as A).
    pub fn family(self) -> Option<char> {
        match self {
            LetterGrade::A | LetterGrade::AMinus => Some('A'),
            LetterGrade::BPlus | LetterGrade::B | LetterGrade::BMinus => Some('B'),
            LetterGrade::CPlus | LetterGrade::C | LetterGrade::CMinus => Some('C'),
            LetterGrade::D => Some('D'),
            LetterGrade::F => Some('F'),
            LetterGrade::Incomplete => None,
        }
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LetterGrade::A => "A",
            LetterGrade::AMinus => "A-",
            LetterGrade::BPlus => "B+",
            LetterGrade::B => "B",
            LetterGrade::BMinus => "B-",
            LetterGrade::CPlus => "C+",
            LetterGrade::C => "C",
            LetterGrade::CMinus => "C-",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
            LetterGrade::Incomplete => "I",
        };
        f.write_str(s)
    }
}

impl FromStr for LetterGrade {
    type Err = ParseGradeError;

    /// Case-insensitive: "a-" and "A-" both parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(LetterGrade::A),
            "A-" => Ok(LetterGrade::AMinus),
            "B+" => Ok(LetterGrade::BPlus),
            "B" => Ok(LetterGrade::B),
            "B-" => Ok(LetterGrade::BMinus),
            "C+" => Ok(LetterGrade::CPlus),
            "C" => Ok(LetterGrade::C),
            "C-" => Ok(LetterGrade::CMinus),
            "D" => Ok(LetterGrade::D),
            "F" => Ok(LetterGrade::F),
            "I" => Ok(LetterGrade::Incomplete),
            _ => Err(ParseGradeError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseGradeError(pub String);

impl fmt::Display for ParseGradeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a valid letter grade: {:?}", self.0)
    }
}

impl std::error::Error for ParseGradeError {}
