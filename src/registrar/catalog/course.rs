use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::lesson::{Lesson, LessonType};
use super::{Faculty, Semester};

/// 学生所属学院与课程的关系
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourseType {
    Major,
    Minor,
    FreeElective,
}

/// 课程定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    // 课程代码, 唯一
    code: String,
    title: String,
    description: String,
    // 讲座/练习/实验 课时数
    lectures: u32,
    practices: u32,
    labs: u32,
    credits: u32,
    year: i32,
    semester: Semester,
    // 先修课程代码
    prerequisites: BTreeSet<String>,
    major_faculties: BTreeSet<Faculty>,
    minor_faculties: BTreeSet<Faculty>,
    free_elective_faculties: BTreeSet<Faculty>,
    lessons: BTreeSet<Lesson>,
}

impl Course {
    pub fn new(
        code: impl Into<String>,
        title: impl Into<String>,
        credits: u32,
        year: i32,
        semester: Semester,
    ) -> Self {
        Self {
            code: code.into(),
            title: title.into(),
            description: String::new(),
            lectures: 0,
            practices: 0,
            labs: 0,
            credits,
            year,
            semester,
            prerequisites: BTreeSet::new(),
            major_faculties: BTreeSet::new(),
            minor_faculties: BTreeSet::new(),
            free_elective_faculties: BTreeSet::new(),
            lessons: BTreeSet::new(),
        }
    }

    pub fn with_hours(mut self, lectures: u32, practices: u32, labs: u32) -> Self {
        self.lectures = lectures;
        self.practices = practices;
        self.labs = labs;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn credits(&self) -> u32 {
        self.credits
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn semester(&self) -> Semester {
        self.semester
    }

    pub fn lectures(&self) -> u32 {
        self.lectures
    }

    pub fn practices(&self) -> u32 {
        self.practices
    }

    pub fn labs(&self) -> u32 {
        self.labs
    }

    /// Number of lessons of `kind` a student has to pick for this course.
    pub fn required(&self, kind: LessonType) -> u32 {
        match kind {
            LessonType::Lecture => self.lectures,
            LessonType::Practice => self.practices,
            LessonType::Lab => self.labs,
        }
    }

    /// `lectures/labs/practices`
    pub fn formula(&self) -> String {
        format!("{}/{}/{}", self.lectures, self.labs, self.practices)
    }

    pub fn prerequisites(&self) -> &BTreeSet<String> {
        &self.prerequisites
    }

    pub fn has_prerequisite(&self, code: &str) -> bool {
        self.prerequisites.contains(code)
    }

    /// 添加先修课程, 不允许引用自身
    pub fn add_prerequisite(&mut self, code: impl Into<String>) -> bool {
        let code = code.into();
        if code == self.code {
            return false;
        }
        self.prerequisites.insert(code)
    }

    pub fn remove_prerequisite(&mut self, code: &str) -> bool {
        self.prerequisites.remove(code)
    }

    pub fn faculties(&self, kind: CourseType) -> &BTreeSet<Faculty> {
        match kind {
            CourseType::Major => &self.major_faculties,
            CourseType::Minor => &self.minor_faculties,
            CourseType::FreeElective => &self.free_elective_faculties,
        }
    }

    pub fn add_faculty(&mut self, kind: CourseType, faculty: Faculty) -> bool {
        self.faculties_mut(kind).insert(faculty)
    }

    pub fn remove_faculty(&mut self, kind: CourseType, faculty: &Faculty) -> bool {
        self.faculties_mut(kind).remove(faculty)
    }

    fn faculties_mut(&mut self, kind: CourseType) -> &mut BTreeSet<Faculty> {
        match kind {
            CourseType::Major => &mut self.major_faculties,
            CourseType::Minor => &mut self.minor_faculties,
            CourseType::FreeElective => &mut self.free_elective_faculties,
        }
    }

    pub fn lessons(&self) -> impl Iterator<Item = &Lesson> {
        self.lessons.iter()
    }

    pub fn lessons_of(&self, kind: LessonType) -> impl Iterator<Item = &Lesson> {
        self.lessons.iter().filter(move |l| l.kind() == kind)
    }

    /// 添加课时, 已存在的相同课时不会重复添加
    pub fn add_lesson(&mut self, lesson: Lesson) -> bool {
        self.lessons.insert(lesson)
    }

    pub fn remove_lesson(&mut self, lesson: &Lesson) -> bool {
        self.lessons.remove(lesson)
    }

    /// Same course offered in another term under its own code; lessons,
    /// prerequisites and faculties are carried over.
    pub fn copy_for(&self, code: impl Into<String>, year: i32, semester: Semester) -> Course {
        let mut copy = self.clone();
        copy.code = code.into();
        copy.prerequisites.remove(&copy.code);
        copy.year = year;
        copy.semester = semester;
        copy
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} (year: {}, semester: {}, credits: {} ECTS)",
            self.code, self.title, self.year, self.semester, self.credits
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registrar::catalog::lesson::DayOfWeek;
    use crate::registrar::catalog::Catalog;

    fn course() -> Course {
        Course::new("CSCI2104", "Databases", 6, 2024, Semester::Fall).with_hours(1, 2, 1)
    }

    #[test]
    fn test_prerequisite_rejects_self_reference() {
        let mut c = course();
        assert!(!c.add_prerequisite("CSCI2104"));
        assert!(c.add_prerequisite("CSCI1101"));
        assert!(!c.add_prerequisite("CSCI1101"));
        assert!(c.has_prerequisite("CSCI1101"));
        assert!(c.remove_prerequisite("CSCI1101"));
        assert!(c.prerequisites().is_empty());
    }

    #[test]
    fn test_duplicate_lesson_is_rejected() {
        let mut c = course();
        assert!(c.add_lesson(Lesson::lecture("T1", DayOfWeek::Monday, 9, 10)));
        assert!(!c.add_lesson(Lesson::lecture("T1", DayOfWeek::Monday, 9, 11)));
        assert_eq!(c.lessons().count(), 1);
        assert_eq!(c.lessons_of(LessonType::Lecture).count(), 1);
        assert_eq!(c.lessons_of(LessonType::Lab).count(), 0);
    }

    #[test]
    fn test_required_and_formula() {
        let c = course();
        assert_eq!(c.required(LessonType::Lecture), 1);
        assert_eq!(c.required(LessonType::Practice), 2);
        assert_eq!(c.required(LessonType::Lab), 1);
        assert_eq!(c.formula(), "1/1/2");
    }

    #[test]
    fn test_copy_for_keeps_lessons() {
        let mut c = course();
        c.add_lesson(Lesson::lecture("T1", DayOfWeek::Monday, 9, 10));
        let copy = c.copy_for("CSCI2104S", 2025, Semester::Spring);
        assert_eq!(copy.code(), "CSCI2104S");
        assert_eq!(copy.year(), 2025);
        assert_eq!(copy.semester(), Semester::Spring);
        assert_eq!(copy.lessons().count(), 1);

        // both offerings live in the catalog side by side
        let mut catalog = Catalog::new();
        assert!(catalog.insert(c.clone()));
        assert!(catalog.insert(copy));
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("CSCI2104").map(Course::year), Some(2024));
    }

    #[test]
    fn test_copy_drops_self_prerequisite() {
        let mut c = course();
        c.add_prerequisite("MATH1001");
        c.add_prerequisite("CSCI2104S");
        let copy = c.copy_for("CSCI2104S", 2025, Semester::Spring);
        assert!(copy.has_prerequisite("MATH1001"));
        assert!(!copy.has_prerequisite("CSCI2104S"));
    }
}
