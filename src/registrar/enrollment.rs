use serde::{Deserialize, Serialize};

use super::catalog::{Catalog, Lesson};
use super::registered_course::RegisteredCourse;

/// 学生的选课记录: 在读, 已完成, 未完成
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    current: Vec<RegisteredCourse>,
    completed: Vec<RegisteredCourse>,
    not_completed: Vec<RegisteredCourse>,
}

impl Enrollment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &[RegisteredCourse] {
        &self.current
    }

    pub fn completed(&self) -> &[RegisteredCourse] {
        &self.completed
    }

    pub fn not_completed(&self) -> &[RegisteredCourse] {
        &self.not_completed
    }

    pub fn current_course(&self, code: &str) -> Option<&RegisteredCourse> {
        self.current.iter().find(|r| r.course() == code)
    }

    pub fn current_course_mut(&mut self, code: &str) -> Option<&mut RegisteredCourse> {
        self.current.iter_mut().find(|r| r.course() == code)
    }

    pub(crate) fn current_mut(&mut self) -> impl Iterator<Item = &mut RegisteredCourse> {
        self.current.iter_mut()
    }

    pub fn is_current(&self, code: &str) -> bool {
        self.current_course(code).is_some()
    }

    pub fn has_completed(&self, code: &str) -> bool {
        self.completed.iter().any(|r| r.course() == code)
    }

    /// 添加在读课程, 同一课程只能有一条在读记录
    pub fn add_current(&mut self, registered: RegisteredCourse) -> bool {
        if self.is_current(registered.course()) {
            return false;
        }
        self.current.push(registered);
        true
    }

    /// Drops every current registration of `code`; true if any was removed.
    pub fn remove_current(&mut self, code: &str) -> bool {
        let before = self.current.len();
        self.current.retain(|r| r.course() != code);
        self.current.len() != before
    }

    /// Move every current registration into history: retakes to
    /// not-completed, the rest to completed.
    pub fn end_semester(&mut self) {
        for registered in self.current.drain(..) {
            if registered.is_retake() {
                self.not_completed.push(registered);
            } else {
                self.completed.push(registered);
            }
        }
    }

    pub fn current_credits(&self, catalog: &Catalog) -> u32 {
        credits(&self.current, catalog)
    }

    pub fn completed_credits(&self, catalog: &Catalog) -> u32 {
        credits(&self.completed, catalog)
    }

    pub fn not_completed_credits(&self, catalog: &Catalog) -> u32 {
        credits(&self.not_completed, catalog)
    }

    /// Credit-weighted grade points of completed courses over the credits of
    /// both completed and not-completed ones.
    pub fn gpa(&self, catalog: &Catalog) -> f64 {
        let weighted: f64 = self
            .completed
            .iter()
            .map(|r| r.gpa() * f64::from(catalog.credits_of(r.course())))
            .sum();
        let total = self.completed_credits(catalog) + self.not_completed_credits(catalog);
        if total > 0 {
            weighted / f64::from(total)
        } else {
            0.0
        }
    }

    /// 所有在读课程已选的课时
    pub fn lessons(&self) -> impl Iterator<Item = &Lesson> {
        self.current.iter().flat_map(RegisteredCourse::lessons)
    }

    /// Every registration in any of the three lists.
    pub fn all(&self) -> impl Iterator<Item = &RegisteredCourse> {
        self.current
            .iter()
            .chain(self.completed.iter())
            .chain(self.not_completed.iter())
    }
}

fn credits(list: &[RegisteredCourse], catalog: &Catalog) -> u32 {
    list.iter().map(|r| catalog.credits_of(r.course())).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registrar::catalog::{Course, CourseType, LessonType, Semester};
    use crate::registrar::grading::Mark;
    use time::{Duration, OffsetDateTime};

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.insert(Course::new("A1001", "A", 6, 2024, Semester::Fall));
        catalog.insert(Course::new("B1001", "B", 4, 2024, Semester::Fall));
        catalog.insert(Course::new("C1001", "C", 5, 2024, Semester::Fall));
        catalog
    }

    /// attempt with the given attestations and final exam
    fn graded(code: &str, first: f64, second: f64, final_exam: f64) -> RegisteredCourse {
        let t0 = OffsetDateTime::now_utc();
        let mut r = RegisteredCourse::new(code, Some(CourseType::Major));
        r.add_mark(Mark::at(first, LessonType::Practice, t0));
        r.put_attestation_at(t0 + Duration::seconds(1));
        r.add_mark(Mark::at(second, LessonType::Practice, t0 + Duration::seconds(2)));
        r.put_attestation_at(t0 + Duration::seconds(3));
        r.put_final_exam_at(final_exam, t0 + Duration::seconds(4));
        r
    }

    #[test]
    fn test_add_and_remove_current() {
        let mut e = Enrollment::new();
        assert!(e.add_current(RegisteredCourse::new("A1001", None)));
        assert!(!e.add_current(RegisteredCourse::new("A1001", Some(CourseType::Minor))));
        assert!(e.is_current("A1001"));
        assert_eq!(e.current_credits(&catalog()), 6);

        assert!(e.remove_current("A1001"));
        assert!(!e.remove_current("A1001"));
        assert!(e.current().is_empty());
    }

    #[test]
    fn test_end_semester_partitions_by_retake() {
        let mut e = Enrollment::new();
        e.add_current(graded("A1001", 30.0, 30.0, 35.0));
        e.add_current(graded("B1001", 10.0, 10.0, 0.0));
        e.add_current(graded("C1001", 30.0, 30.0, 10.0));

        e.end_semester();

        assert!(e.current().is_empty());
        let completed: Vec<&str> = e.completed().iter().map(|r| r.course()).collect();
        let failed: Vec<&str> = e.not_completed().iter().map(|r| r.course()).collect();
        assert_eq!(completed, vec!["A1001"]);
        assert_eq!(failed, vec!["B1001", "C1001"]);
        assert!(e.has_completed("A1001"));
        assert!(!e.has_completed("B1001"));
    }

    #[test]
    fn test_gpa_weights_by_credits() {
        let catalog = catalog();
        let mut e = Enrollment::new();
        // 95 -> 4.0 over 6 credits, 80 -> 2.7 over 4 credits
        e.add_current(graded("A1001", 30.0, 30.0, 35.0));
        e.add_current(graded("B1001", 25.0, 25.0, 30.0));
        e.end_semester();

        let expected = (4.0 * 6.0 + 2.7 * 4.0) / 10.0;
        assert!((e.gpa(&catalog) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_gpa_counts_failed_credits_in_denominator() {
        let catalog = catalog();
        let mut e = Enrollment::new();
        e.add_current(graded("A1001", 30.0, 30.0, 35.0));
        e.add_current(graded("C1001", 10.0, 10.0, 0.0));
        e.end_semester();

        let expected = (4.0 * 6.0) / 11.0;
        assert!((e.gpa(&catalog) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_gpa_is_order_independent() {
        let catalog = catalog();
        let mut forward = Enrollment::new();
        forward.add_current(graded("A1001", 30.0, 30.0, 35.0));
        forward.add_current(graded("B1001", 25.0, 25.0, 30.0));
        forward.end_semester();

        let mut backward = Enrollment::new();
        backward.add_current(graded("B1001", 25.0, 25.0, 30.0));
        backward.add_current(graded("A1001", 30.0, 30.0, 35.0));
        backward.end_semester();

        assert!((forward.gpa(&catalog) - backward.gpa(&catalog)).abs() < 1e-9);
    }

    #[test]
    fn test_gpa_without_history_is_zero() {
        assert_eq!(Enrollment::new().gpa(&catalog()), 0.0);
    }
}
