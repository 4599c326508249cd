use std::path::Path;

use log::{info, warn};
use regex::Regex;
use serde::Deserialize;

use super::catalog::{Course, CourseType, DayOfWeek, Faculty, Lesson, LessonType, Semester, DEFAULT_CAPACITY};
use super::err::ImportError;
use super::AppState;

const COURSE_CODE_PATTERN: &str = r"^[A-Z]{2,5}\d{3,4}[A-Z]?$";
const LIST_SEPARATOR: char = ';';

/// 课程表中的一行
#[derive(Debug, Deserialize)]
struct CourseRow {
    code: String,
    title: String,
    credits: u32,
    year: i32,
    semester: Semester,
    #[serde(default)]
    lectures: u32,
    #[serde(default)]
    practices: u32,
    #[serde(default)]
    labs: u32,
    // 以下为 ';' 分隔的列表
    #[serde(default)]
    prerequisites: String,
    #[serde(default)]
    major: String,
    #[serde(default)]
    minor: String,
    #[serde(default)]
    free_elective: String,
    #[serde(default)]
    description: String,
}

/// 课时表中的一行
#[derive(Debug, Deserialize)]
struct LessonRow {
    course: String,
    teacher: String,
    #[serde(rename = "type")]
    kind: LessonType,
    day: DayOfWeek,
    start: u8,
    end: u8,
    #[serde(deserialize_with = "csv::invalid_option")]
    capacity: Option<u32>,
}

fn split_list(field: &str) -> impl Iterator<Item = &str> {
    field
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// 检查课程代码格式
fn check_course_code(re: &Regex, code: &str) -> Result<(), ImportError> {
    if re.is_match(code) {
        Ok(())
    } else {
        Err(ImportError::InvalidCourseCode(code.to_string()))
    }
}

impl CourseRow {
    fn into_course(self, re: &Regex) -> Result<Course, ImportError> {
        check_course_code(re, &self.code)?;
        let mut course = Course::new(self.code, self.title, self.credits, self.year, self.semester)
            .with_hours(self.lectures, self.practices, self.labs)
            .with_description(self.description);
        for code in split_list(&self.prerequisites) {
            check_course_code(re, code)?;
            if code == course.code() {
                return Err(ImportError::InvalidField(format!(
                    "{} lists itself as a prerequisite",
                    code
                )));
            }
            course.add_prerequisite(code);
        }
        for (kind, field) in [
            (CourseType::Major, &self.major),
            (CourseType::Minor, &self.minor),
            (CourseType::FreeElective, &self.free_elective),
        ] {
            for faculty in split_list(field) {
                course.add_faculty(kind, Faculty::new(faculty));
            }
        }
        Ok(course)
    }
}

impl LessonRow {
    fn into_lesson(self) -> Result<(String, Lesson), ImportError> {
        if self.start > self.end || self.end > 24 {
            return Err(ImportError::InvalidField(format!(
                "invalid hours {}-{} for a lesson of {}",
                self.start, self.end, self.course
            )));
        }
        let lesson = Lesson::new(
            self.teacher,
            self.kind,
            self.day,
            self.start,
            self.end,
            self.capacity.unwrap_or(DEFAULT_CAPACITY),
        );
        Ok((self.course, lesson))
    }
}

/// Read every course row of a csv file. Nothing is returned unless all rows
/// are valid.
pub fn read_courses(path: &Path) -> Result<Vec<Course>, ImportError> {
    let re = Regex::new(COURSE_CODE_PATTERN)?;
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

    let mut courses = vec![];
    for row in rdr.deserialize() {
        let row: CourseRow = row?;
        courses.push(row.into_course(&re)?);
    }
    Ok(courses)
}

/// 读取课时表, 返回 (课程代码, 课时)
pub fn read_lessons(path: &Path) -> Result<Vec<(String, Lesson)>, ImportError> {
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

    let mut lessons = vec![];
    for row in rdr.deserialize() {
        let row: LessonRow = row?;
        lessons.push(row.into_lesson()?);
    }
    Ok(lessons)
}

impl AppState {
    /// Add the courses of a csv file to the catalog; codes already present
    /// are skipped. Returns how many courses were added.
    pub fn import_courses(&mut self, path: &Path) -> Result<usize, ImportError> {
        let courses = read_courses(path)?;
        let mut added = 0;
        for course in courses {
            let code = course.code().to_string();
            if self.add_course(course) {
                added += 1;
            } else {
                warn!("course {} already exists, row skipped", code);
            }
        }
        info!("imported {} courses from {}", added, path.display());
        Ok(added)
    }

    /// Attach the lessons of a csv file to their courses. Every referenced
    /// course must already be in the catalog. Returns how many were new.
    pub fn import_lessons(&mut self, path: &Path) -> Result<usize, ImportError> {
        let lessons = read_lessons(path)?;
        if let Some((code, _)) = lessons.iter().find(|(code, _)| !self.catalog.contains(code)) {
            return Err(ImportError::UnknownCourse(code.clone()));
        }
        let added = lessons
            .into_iter()
            .filter(|(code, lesson)| self.add_lesson(code, lesson.clone()))
            .count();
        info!("imported {} lessons from {}", added, path.display());
        Ok(added)
    }
}
