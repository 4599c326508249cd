use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// 未指定容量时的默认人数上限
pub const DEFAULT_CAPACITY: u32 = 100;

/// 课时类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LessonType {
    Lecture,
    Practice,
    Lab,
}

impl LessonType {
    pub const ALL: [LessonType; 3] = [LessonType::Lecture, LessonType::Practice, LessonType::Lab];
}

impl fmt::Display for LessonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LessonType::Lecture => "LECTURE",
            LessonType::Practice => "PRACTICE",
            LessonType::Lab => "LAB",
        };
        f.write_str(name)
    }
}

/// 星期, 顺序即排课顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

/// A weekly time slot of a course.
///
/// Two lessons are the same lesson when teacher, type, day and start hour
/// match; the end hour and capacity do not take part in identity. Lessons
/// sort by day, then start hour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    teacher: String,
    #[serde(rename = "type")]
    kind: LessonType,
    day: DayOfWeek,
    start: u8,
    end: u8,
    capacity: u32,
}

impl Lesson {
    pub fn new(
        teacher: impl Into<String>,
        kind: LessonType,
        day: DayOfWeek,
        start: u8,
        end: u8,
        capacity: u32,
    ) -> Self {
        Self {
            teacher: teacher.into(),
            kind,
            day,
            start,
            end,
            capacity,
        }
    }

    /// 默认容量的讲座课
    pub fn lecture(teacher: impl Into<String>, day: DayOfWeek, start: u8, end: u8) -> Self {
        Self::new(teacher, LessonType::Lecture, day, start, end, DEFAULT_CAPACITY)
    }

    pub fn teacher(&self) -> &str {
        &self.teacher
    }

    pub fn set_teacher(&mut self, teacher: impl Into<String>) {
        self.teacher = teacher.into();
    }

    pub fn kind(&self) -> LessonType {
        self.kind
    }

    pub fn day(&self) -> DayOfWeek {
        self.day
    }

    pub fn start(&self) -> u8 {
        self.start
    }

    pub fn end(&self) -> u8 {
        self.end
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn set_capacity(&mut self, capacity: u32) {
        self.capacity = capacity;
    }

    /// Slot clash test used by scheduling: a shared start hour, a shared end
    /// hour, or `self` lying inside `other`. The day is not compared.
    pub fn clashes_with(&self, other: &Lesson) -> bool {
        self.start == other.start
            || self.end == other.end
            || (self.start >= other.start && self.end <= other.end)
    }

    pub fn is_full(&self, enrolled: usize) -> bool {
        enrolled as u64 >= u64::from(self.capacity)
    }
}

impl PartialEq for Lesson {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start
            && self.teacher == other.teacher
            && self.kind == other.kind
            && self.day == other.day
    }
}

impl Eq for Lesson {}

impl Hash for Lesson {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.teacher.hash(state);
        self.kind.hash(state);
        self.day.hash(state);
        self.start.hash(state);
    }
}

impl Ord for Lesson {
    fn cmp(&self, other: &Self) -> Ordering {
        self.day
            .cmp(&other.day)
            .then(self.start.cmp(&other.start))
            .then(self.kind.cmp(&other.kind))
            .then_with(|| self.teacher.cmp(&other.teacher))
    }
}

impl PartialOrd for Lesson {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Lesson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:?} {}:00 - {}:00, teacher: {}",
            self.kind, self.day, self.start, self.end, self.teacher
        )
    }
}
