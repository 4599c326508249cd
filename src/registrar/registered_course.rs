use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::catalog::{CourseType, Lesson, LessonType};
use super::grading::{grade_to_gpa, Mark, ATTESTATION_PASS, FINAL_EXAM_PASS};

/// Progress of the two mid-semester attestations.
///
/// The state is read off the scores themselves: a checkpoint counts as unset
/// while its score is exactly zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttestationState {
    New,
    FirstDone,
    SecondDone,
}

/// 学生某一学期对某门课程的一次修读
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredCourse {
    // 课程代码
    course: String,
    // 学院未出现在课程的任何学院列表中时为空
    course_type: Option<CourseType>,
    retake: bool,
    lessons: BTreeSet<Lesson>,
    marks: Vec<Mark>,
    first_attestation: f64,
    second_attestation: f64,
    final_exam: f64,
    #[serde(with = "time::serde::rfc3339")]
    last_update: OffsetDateTime,
}

impl RegisteredCourse {
    pub fn new(course: impl Into<String>, course_type: Option<CourseType>) -> Self {
        Self {
            course: course.into(),
            course_type,
            retake: false,
            lessons: BTreeSet::new(),
            marks: Vec::new(),
            first_attestation: 0.0,
            second_attestation: 0.0,
            final_exam: 0.0,
            last_update: OffsetDateTime::now_utc(),
        }
    }

    pub fn course(&self) -> &str {
        &self.course
    }

    pub fn course_type(&self) -> Option<CourseType> {
        self.course_type
    }

    pub fn is_retake(&self) -> bool {
        self.retake
    }

    pub fn first_attestation(&self) -> f64 {
        self.first_attestation
    }

    pub fn second_attestation(&self) -> f64 {
        self.second_attestation
    }

    pub fn final_exam(&self) -> f64 {
        self.final_exam
    }

    pub fn last_update(&self) -> OffsetDateTime {
        self.last_update
    }

    pub fn lessons(&self) -> impl Iterator<Item = &Lesson> {
        self.lessons.iter()
    }

    pub fn has_lesson(&self, lesson: &Lesson) -> bool {
        self.lessons.contains(lesson)
    }

    /// 已选的某类课时数量
    pub fn lesson_count(&self, kind: LessonType) -> u32 {
        self.lessons.iter().filter(|l| l.kind() == kind).count() as u32
    }

    pub(crate) fn add_lesson(&mut self, lesson: Lesson) -> bool {
        self.lessons.insert(lesson)
    }

    pub(crate) fn remove_lesson(&mut self, lesson: &Lesson) -> bool {
        self.lessons.remove(lesson)
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    pub fn add_mark(&mut self, mark: Mark) -> bool {
        self.marks.push(mark);
        true
    }

    pub fn attestation_state(&self) -> AttestationState {
        if self.first_attestation == 0.0 && self.second_attestation == 0.0 {
            AttestationState::New
        } else if self.second_attestation == 0.0 {
            AttestationState::FirstDone
        } else {
            AttestationState::SecondDone
        }
    }

    pub fn put_attestation(&mut self) -> bool {
        self.put_attestation_at(OffsetDateTime::now_utc())
    }

    /// Close the next attestation checkpoint as of `now`.
    ///
    /// The first checkpoint sums every mark; the second sums only the marks
    /// dated strictly after the previous checkpoint and flags a retake when the
    /// two together stay below the pass line. Returns `false` without touching
    /// anything once both checkpoints are set.
    pub fn put_attestation_at(&mut self, now: OffsetDateTime) -> bool {
        match self.attestation_state() {
            AttestationState::New => {
                self.first_attestation = self.marks.iter().map(Mark::value).sum();
                self.last_update = now;
            }
            AttestationState::FirstDone => {
                let since = self.last_update;
                self.second_attestation = self
                    .marks
                    .iter()
                    .filter(|m| m.date() > since)
                    .map(Mark::value)
                    .sum();
                self.last_update = now;
                if self.first_attestation + self.second_attestation < ATTESTATION_PASS {
                    self.retake = true;
                }
            }
            AttestationState::SecondDone => return false,
        }
        true
    }

    pub fn put_final_exam(&mut self, score: f64) -> bool {
        self.put_final_exam_at(score, OffsetDateTime::now_utc())
    }

    pub fn put_final_exam_at(&mut self, score: f64, now: OffsetDateTime) -> bool {
        if self.retake {
            return false;
        }
        self.final_exam = score;
        if self.final_exam < FINAL_EXAM_PASS {
            self.retake = true;
        }
        self.last_update = now;
        true
    }

    /// 两次阶段考核与期末成绩之和
    pub fn composite(&self) -> f64 {
        self.first_attestation + self.second_attestation + self.final_exam
    }

    /// Grade points earned by this attempt; zero until a final exam is in,
    /// unless the attempt already failed.
    pub fn gpa(&self) -> f64 {
        if self.final_exam == 0.0 && !self.retake {
            return 0.0;
        }
        grade_to_gpa(self.composite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn registered() -> RegisteredCourse {
        RegisteredCourse::new("CSCI2104", Some(CourseType::Major))
    }

    #[test]
    fn test_two_attestations_without_retake() {
        let t0 = OffsetDateTime::now_utc();
        let mut r = registered();
        r.add_mark(Mark::at(10.0, LessonType::Practice, t0));
        r.add_mark(Mark::at(15.0, LessonType::Lab, t0));

        assert_eq!(r.attestation_state(), AttestationState::New);
        assert!(r.put_attestation_at(t0 + Duration::seconds(1)));
        assert_eq!(r.first_attestation(), 25.0);
        assert_eq!(r.attestation_state(), AttestationState::FirstDone);

        r.add_mark(Mark::at(5.0, LessonType::Practice, t0 + Duration::seconds(2)));
        assert!(r.put_attestation_at(t0 + Duration::seconds(3)));
        assert_eq!(r.second_attestation(), 5.0);
        assert_eq!(r.attestation_state(), AttestationState::SecondDone);
        assert!(!r.is_retake());
    }

    #[test]
    fn test_third_attestation_is_rejected() {
        let t0 = OffsetDateTime::now_utc();
        let mut r = registered();
        r.add_mark(Mark::at(20.0, LessonType::Practice, t0));
        assert!(r.put_attestation_at(t0 + Duration::seconds(1)));
        r.add_mark(Mark::at(12.0, LessonType::Practice, t0 + Duration::seconds(2)));
        assert!(r.put_attestation_at(t0 + Duration::seconds(3)));

        r.add_mark(Mark::at(30.0, LessonType::Practice, t0 + Duration::seconds(4)));
        let stamp = r.last_update();
        assert!(!r.put_attestation_at(t0 + Duration::seconds(5)));
        assert_eq!(r.first_attestation(), 20.0);
        assert_eq!(r.second_attestation(), 12.0);
        assert_eq!(r.last_update(), stamp);
    }

    #[test]
    fn test_low_attestations_set_retake() {
        let t0 = OffsetDateTime::now_utc();
        let mut r = registered();
        r.add_mark(Mark::at(10.0, LessonType::Practice, t0));
        r.put_attestation_at(t0 + Duration::seconds(1));
        r.add_mark(Mark::at(19.0, LessonType::Practice, t0 + Duration::seconds(2)));
        r.put_attestation_at(t0 + Duration::seconds(3));

        assert_eq!(r.first_attestation() + r.second_attestation(), 29.0);
        assert!(r.is_retake());
    }

    #[test]
    fn test_second_attestation_skips_marks_at_checkpoint() {
        let t0 = OffsetDateTime::now_utc();
        let mut r = registered();
        r.add_mark(Mark::at(25.0, LessonType::Practice, t0));
        r.put_attestation_at(t0);
        // dated exactly at the checkpoint, so not strictly after it
        r.add_mark(Mark::at(10.0, LessonType::Practice, t0));
        r.add_mark(Mark::at(6.0, LessonType::Practice, t0 + Duration::seconds(1)));
        r.put_attestation_at(t0 + Duration::seconds(2));

        assert_eq!(r.second_attestation(), 6.0);
        assert!(!r.is_retake());
    }

    #[test]
    fn test_zero_first_attestation_stays_new() {
        let mut r = registered();
        assert!(r.put_attestation());
        assert_eq!(r.first_attestation(), 0.0);
        assert_eq!(r.attestation_state(), AttestationState::New);
    }

    #[test]
    fn test_failed_final_exam_blocks_another() {
        let mut r = registered();
        assert!(r.put_final_exam(18.0));
        assert_eq!(r.final_exam(), 18.0);
        assert!(r.is_retake());
        assert!(!r.put_final_exam(35.0));
        assert_eq!(r.final_exam(), 18.0);
    }

    #[test]
    fn test_passing_final_exam_can_be_corrected() {
        let mut r = registered();
        assert!(r.put_final_exam(25.0));
        assert!(!r.is_retake());
        assert!(r.put_final_exam(30.0));
        assert_eq!(r.final_exam(), 30.0);
    }

    #[test]
    fn test_gpa_waits_for_final_exam() {
        let t0 = OffsetDateTime::now_utc();
        let mut r = registered();
        r.add_mark(Mark::at(30.0, LessonType::Practice, t0));
        r.put_attestation_at(t0 + Duration::seconds(1));
        r.add_mark(Mark::at(30.0, LessonType::Practice, t0 + Duration::seconds(2)));
        r.put_attestation_at(t0 + Duration::seconds(3));
        assert_eq!(r.gpa(), 0.0);

        r.put_final_exam(33.0);
        assert_eq!(r.composite(), 93.0);
        assert_eq!(r.gpa(), 4.0);
    }

    #[test]
    fn test_lesson_counts() {
        use crate::registrar::catalog::DayOfWeek;

        let mut r = registered();
        assert!(r.add_lesson(Lesson::lecture("T1", DayOfWeek::Monday, 9, 10)));
        assert!(!r.add_lesson(Lesson::lecture("T1", DayOfWeek::Monday, 9, 10)));
        assert_eq!(r.lesson_count(LessonType::Lecture), 1);
        assert_eq!(r.lesson_count(LessonType::Lab), 0);
        assert!(r.remove_lesson(&Lesson::lecture("T1", DayOfWeek::Monday, 9, 10)));
        assert_eq!(r.lessons().count(), 0);
    }
}
