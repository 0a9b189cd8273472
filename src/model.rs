use crate::error::{ServiceError, ServiceResult};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const EXAM_SLOTS: [&str; 4] = ["1", "2", "3", "4"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Semester {
    First,
    Second,
}

impl Semester {
    pub fn parse(raw: &str) -> ServiceResult<Self> {
        match raw.trim() {
            "1" => Ok(Semester::First),
            "2" => Ok(Semester::Second),
            other => Err(ServiceError::validation(format!(
                "semester must be \"1\" or \"2\", got {:?}",
                other
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Semester::First => "1",
            Semester::Second => "2",
        }
    }
}

pub fn parse_exam(raw: &str) -> ServiceResult<&'static str> {
    let t = raw.trim();
    EXAM_SLOTS
        .iter()
        .copied()
        .find(|slot| *slot == t)
        .ok_or_else(|| {
            ServiceError::validation(format!("exam must be one of 1, 2, 3, 4, got {:?}", t))
        })
}

pub fn parse_year(raw: &str) -> ServiceResult<String> {
    let t = raw.trim();
    if t.is_empty() {
        return Err(ServiceError::validation("year must not be empty"));
    }
    Ok(t.to_string())
}

/// A (year, semester) pair identifying an academic period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Term {
    pub year: String,
    pub semester: String,
}

impl Term {
    pub fn new(year: &str, semester: &str) -> ServiceResult<Self> {
        Ok(Term {
            year: parse_year(year)?,
            semester: Semester::parse(semester)?.as_str().to_string(),
        })
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.year, self.semester)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassRow {
    pub id: String,
    pub name: String,
    pub value: Option<String>,
    pub student_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentRow {
    pub id: String,
    pub name: String,
    pub class_name: Option<String>,
    pub class_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GradeRow {
    pub id: String,
    pub score: Option<f64>,
    pub year: String,
    pub semester: String,
    pub exam: String,
    pub date: String,
    pub student_name: String,
    pub class_name: Option<String>,
}

/// One stored grade reduced to what the term views need.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamScore {
    pub exam: String,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExamSlot {
    pub exam: String,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExamComparison {
    pub exam: String,
    pub current_score: Option<f64>,
    pub previous_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub total_count: i64,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

impl PageRequest {
    pub fn parse(page: Option<u32>, page_size: Option<u32>) -> ServiceResult<Self> {
        let page = page.unwrap_or(1);
        if page == 0 {
            return Err(ServiceError::validation("page must be >= 1"));
        }
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ServiceError::validation(format!(
                "page_size must be in range 1..={}",
                MAX_PAGE_SIZE
            )));
        }
        Ok(PageRequest { page, page_size })
    }

    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn wrap<T>(&self, data: Vec<T>, total_count: i64) -> Page<T> {
        Page {
            data,
            pagination: Pagination {
                total_count,
                page: self.page,
                page_size: self.page_size,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewClass {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StudentInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub class_id: String,
}

impl StudentInput {
    /// Trimmed `(name, class_id)`; both must be non-empty.
    pub fn validated(&self) -> ServiceResult<(String, String)> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ServiceError::validation("Student name cannot be empty"));
        }
        let class_id = self.class_id.trim();
        if class_id.is_empty() {
            return Err(ServiceError::validation("class id cannot be empty"));
        }
        Ok((name.to_string(), class_id.to_string()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewGrade {
    pub name: String,
    pub class_id: String,
    pub year: String,
    pub semester: String,
    pub exam: String,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GradeUpdate {
    pub year: String,
    pub semester: String,
    pub exam: String,
    #[serde(default)]
    pub score: Option<f64>,
}

/// Validated year/semester/exam triple shared by grade writes and imports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeTarget {
    pub year: String,
    pub semester: String,
    pub exam: String,
}

impl GradeTarget {
    pub fn parse(year: &str, semester: &str, exam: &str) -> ServiceResult<Self> {
        let term = Term::new(year, semester)?;
        Ok(GradeTarget {
            year: term.year,
            semester: term.semester,
            exam: parse_exam(exam)?.to_string(),
        })
    }
}
