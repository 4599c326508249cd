use std::collections::BTreeMap;

use log::{debug, info};

use super::catalog::{Lesson, LessonType};
use super::enrollment::Enrollment;
use super::err::Result;
use super::registered_course::RegisteredCourse;
use super::AppState;

impl AppState {
    /// 当前所有学生在读课程中选了该课时的人数
    pub fn enrolled_count(&self, lesson: &Lesson) -> usize {
        self.people
            .values()
            .filter_map(|p| p.as_student())
            .flat_map(|s| s.enrollment.lessons())
            .filter(|l| *l == lesson)
            .count()
    }

    /// Put `lesson` into the student's timetable for `course_code`.
    ///
    /// Refused while the scheduling window is closed, when the course is not
    /// current, when the same lesson is already taken, when it clashes with
    /// any lesson of any current course, when the lesson is not yet full, or
    /// when the course already has its required number of lessons of that
    /// type.
    pub fn add_lesson_to_schedule(&mut self, student_id: &str, course_code: &str, lesson: &Lesson) -> bool {
        if !self.policy.scheduling_open {
            debug!("scheduling closed, {} cannot add {}", student_id, lesson);
            return false;
        }
        let Some(course) = self.catalog.get(course_code) else {
            return false;
        };
        let enrolled = self.enrolled_count(lesson);
        let Ok(student) = self.student(student_id) else {
            return false;
        };
        let Some(registered) = student.enrollment.current_course(course_code) else {
            return false;
        };
        if registered.has_lesson(lesson) {
            return false;
        }
        if student.enrollment.lessons().any(|taken| lesson.clashes_with(taken)) {
            debug!("{} clashes with the timetable of {}", lesson, student_id);
            return false;
        }
        if !lesson.is_full(enrolled) {
            debug!("{} has {} of {} seats taken", lesson, enrolled, lesson.capacity());
            return false;
        }
        if registered.lesson_count(lesson.kind()) >= course.required(lesson.kind()) {
            return false;
        }

        let added = self
            .people
            .get_mut(student_id)
            .and_then(|p| p.as_student_mut())
            .and_then(|s| s.enrollment.current_course_mut(course_code))
            .map_or(false, |r| r.add_lesson(lesson.clone()));
        if added {
            info!(target: "audit", "{} added {} to the schedule of {}", student_id, lesson, course_code);
        }
        added
    }

    /// Take a lesson out of whichever current course holds it. Only allowed
    /// while the scheduling window is closed.
    pub fn remove_lesson_from_schedule(&mut self, student_id: &str, lesson: &Lesson) -> bool {
        if self.policy.scheduling_open {
            return false;
        }
        let Some(student) = self.people.get_mut(student_id).and_then(|p| p.as_student_mut()) else {
            return false;
        };
        student
            .enrollment
            .current_mut()
            .find(|r| r.has_lesson(lesson))
            .map_or(false, |r| r.remove_lesson(lesson))
    }

    /// 某门在读课程的课时是否已选齐
    pub fn is_course_schedule_complete(&self, student_id: &str, course_code: &str) -> bool {
        let Ok(student) = self.student(student_id) else {
            return false;
        };
        student
            .enrollment
            .current_course(course_code)
            .map_or(false, |r| self.registration_schedule_complete(r))
    }

    /// True when every current course has all its lessons; false with no
    /// current courses at all.
    pub fn is_schedule_complete(&self, student_id: &str) -> bool {
        let Ok(student) = self.student(student_id) else {
            return false;
        };
        let current = student.enrollment.current();
        !current.is_empty() && current.iter().all(|r| self.registration_schedule_complete(r))
    }

    fn registration_schedule_complete(&self, registered: &RegisteredCourse) -> bool {
        let Some(course) = self.catalog.get(registered.course()) else {
            return false;
        };
        LessonType::ALL
            .iter()
            .all(|kind| registered.lesson_count(*kind) == course.required(*kind))
    }

    /// 课程代码 -> 已选课时
    pub fn schedule_view(&self, student_id: &str) -> Result<BTreeMap<String, Vec<Lesson>>> {
        let student = self.student(student_id)?;
        Ok(student
            .enrollment
            .current()
            .iter()
            .map(|r| (r.course().to_string(), r.lessons().cloned().collect()))
            .collect())
    }

    pub fn lesson_view(&self, student_id: &str) -> Result<Vec<Lesson>> {
        let student = self.student(student_id)?;
        Ok(all_lessons(&student.enrollment))
    }
}

fn all_lessons(enrollment: &Enrollment) -> Vec<Lesson> {
    let mut lessons: Vec<Lesson> = enrollment.lessons().cloned().collect();
    lessons.sort();
    lessons
}
