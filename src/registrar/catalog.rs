mod course;
mod lesson;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use course::{Course, CourseType};
pub use lesson::{DayOfWeek, Lesson, LessonType, DEFAULT_CAPACITY};

/// 学期
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Semester {
    Fall,
    Spring,
}

impl Semester {
    pub fn next(self) -> Semester {
        match self {
            Semester::Fall => Semester::Spring,
            Semester::Spring => Semester::Fall,
        }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Semester::Fall => f.write_str("FALL"),
            Semester::Spring => f.write_str("SPRING"),
        }
    }
}

/// 学院
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Faculty(String);

impl Faculty {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Faculty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// All courses offered, keyed by course code.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    courses: BTreeMap<String, Course>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加课程, 课程代码已存在时返回 false
    pub fn insert(&mut self, course: Course) -> bool {
        if self.courses.contains_key(course.code()) {
            return false;
        }
        self.courses.insert(course.code().to_string(), course);
        true
    }

    /// 仅供 `AppState::remove_course` 在确认无引用后调用
    pub(crate) fn remove(&mut self, code: &str) -> Option<Course> {
        self.courses.remove(code)
    }

    pub fn get(&self, code: &str) -> Option<&Course> {
        self.courses.get(code)
    }

    pub fn get_mut(&mut self, code: &str) -> Option<&mut Course> {
        self.courses.get_mut(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.courses.contains_key(code)
    }

    /// Credit value of a course; unknown codes weigh nothing.
    pub fn credits_of(&self, code: &str) -> u32 {
        self.courses.get(code).map_or(0, Course::credits)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Course> {
        self.courses.values()
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semester_wraps() {
        assert_eq!(Semester::Fall.next(), Semester::Spring);
        assert_eq!(Semester::Spring.next(), Semester::Fall);
    }

    #[test]
    fn test_insert_rejects_duplicate_code() {
        let mut catalog = Catalog::new();
        assert!(catalog.insert(Course::new("MATH1101", "Calculus", 5, 2024, Semester::Fall)));
        assert!(!catalog.insert(Course::new("MATH1101", "Calculus II", 5, 2024, Semester::Fall)));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.credits_of("MATH1101"), 5);
        assert_eq!(catalog.credits_of("NOPE0000"), 0);
        assert!(catalog.remove("MATH1101").is_some());
        assert!(catalog.is_empty());
    }
}
