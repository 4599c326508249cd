use log::{info, warn};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::catalog::LessonType;
use super::registered_course::RegisteredCourse;
use super::AppState;

/// 两次阶段考核之和低于该值需要重修
pub const ATTESTATION_PASS: f64 = 29.5;
/// 期末成绩低于该值需要重修
pub const FINAL_EXAM_PASS: f64 = 20.0;
/// 期末成绩上限
pub const FINAL_EXAM_MAX: f64 = 40.0;

/// 单次成绩
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    value: f64,
    lesson_type: LessonType,
    #[serde(with = "time::serde::rfc3339")]
    date: OffsetDateTime,
}

impl Mark {
    /// 练习课成绩, 时间为当前时间
    pub fn new(value: f64) -> Self {
        Self::of(value, LessonType::Practice)
    }

    pub fn of(value: f64, lesson_type: LessonType) -> Self {
        Self::at(value, lesson_type, OffsetDateTime::now_utc())
    }

    pub fn at(value: f64, lesson_type: LessonType, date: OffsetDateTime) -> Self {
        Self {
            value,
            lesson_type,
            date,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn lesson_type(&self) -> LessonType {
        self.lesson_type
    }

    pub fn date(&self) -> OffsetDateTime {
        self.date
    }
}

/// Map a composite score onto the grade-point scale.
#[allow(clippy::if_same_then_else)]
pub fn grade_to_gpa(grade: f64) -> f64 {
    if grade >= 97.0 {
        4.0
    } else if grade >= 93.0 {
        4.0
    } else if grade >= 90.0 {
        3.7
    } else if grade >= 87.0 {
        3.3
    } else if grade >= 83.0 {
        3.0
    } else if grade >= 80.0 {
        2.7
    } else if grade >= 77.0 {
        2.3
    } else if grade >= 73.0 {
        2.0
    } else if grade >= 70.0 {
        1.7
    } else if grade >= 67.0 {
        1.3
    } else if grade >= 65.0 {
        1.0
    } else {
        0.0
    }
}

impl AppState {
    fn current_registration_mut(&mut self, student_id: &str, course_code: &str) -> Option<&mut RegisteredCourse> {
        self.people
            .get_mut(student_id)
            .and_then(|p| p.as_student_mut())
            .and_then(|s| s.enrollment.current_course_mut(course_code))
    }

    /// 教师为在读课程登记一次成绩
    pub fn put_mark(&mut self, student_id: &str, course_code: &str, mark: Mark) -> bool {
        let Some(registered) = self.current_registration_mut(student_id, course_code) else {
            warn!("{} is not taking {}, mark ignored", student_id, course_code);
            return false;
        };
        registered.add_mark(mark)
    }

    pub fn put_attestation(&mut self, student_id: &str, course_code: &str) -> bool {
        let Some(registered) = self.current_registration_mut(student_id, course_code) else {
            return false;
        };
        let done = registered.put_attestation();
        if done {
            info!(
                target: "audit",
                "attestation for {} in {}: {} / {}",
                student_id,
                course_code,
                registered.first_attestation(),
                registered.second_attestation()
            );
        }
        done
    }

    /// Record the final exam; scores outside `0..=40` are refused.
    pub fn put_final_exam(&mut self, student_id: &str, course_code: &str, score: f64) -> bool {
        if !(0.0..=FINAL_EXAM_MAX).contains(&score) {
            warn!("final exam score {} out of range for {}", score, course_code);
            return false;
        }
        let Some(registered) = self.current_registration_mut(student_id, course_code) else {
            return false;
        };
        let done = registered.put_final_exam(score);
        if done {
            info!(target: "audit", "final exam for {} in {}: {}", student_id, course_code, score);
        }
        done
    }
}
