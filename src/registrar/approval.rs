use log::{info, warn};

use super::catalog::{Course, CourseType, Faculty};
use super::enrollment::Enrollment;
use super::err::{RegistrarError, Result};
use super::notify::Notifier;
use super::registered_course::RegisteredCourse;
use super::registration::{RegistrationRequest, RequestId, RequestKind, RequestStatus};
use super::AppState;

const NOTIFY_TITLE: &str = "Course registration request";

/// 审批结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approved,
    Rejected,
}

/// Which list of the course names the student's faculty.
///
/// Sets are consulted major, free-elective, minor, and a later match
/// overwrites an earlier one, so a faculty listed both as major and minor
/// resolves to minor.
pub fn resolve_course_type(course: &Course, faculty: &Faculty) -> Option<CourseType> {
    let mut course_type = None;
    for kind in [CourseType::Major, CourseType::FreeElective, CourseType::Minor] {
        if course.faculties(kind).contains(faculty) {
            course_type = Some(kind);
        }
    }
    course_type
}

/// Eligibility test applied on approval: every course the student has
/// completed must be listed among the target's prerequisites. A student with
/// no completed courses is always eligible.
pub fn prerequisites_satisfied(course: &Course, enrollment: &Enrollment) -> bool {
    enrollment
        .completed()
        .iter()
        .all(|r| course.has_prerequisite(r.course()))
}

impl AppState {
    /// Review a pending request: apply it to the student's enrollment when it
    /// passes, mark it DONE or REFUSED accordingly and notify the sender.
    pub fn decide(&mut self, request_id: RequestId, notifier: &mut dyn Notifier) -> Result<Decision> {
        let mut request = self.take_pending(request_id)?;
        let decision = if self.assign_course_to_student(&request) {
            Decision::Approved
        } else {
            Decision::Rejected
        };
        self.finish(&mut request, decision, notifier);
        Ok(decision)
    }

    /// 人工驳回, 不修改学生的选课记录
    pub fn reject(&mut self, request_id: RequestId, notifier: &mut dyn Notifier) -> Result<Decision> {
        let mut request = self.take_pending(request_id)?;
        self.finish(&mut request, Decision::Rejected, notifier);
        Ok(Decision::Rejected)
    }

    fn take_pending(&mut self, request_id: RequestId) -> Result<RegistrationRequest> {
        if let Some(index) = self.pending.iter().position(|r| r.id() == request_id) {
            return Ok(self.pending.remove(index));
        }
        match self.history.iter().find(|r| r.id() == request_id) {
            Some(decided) => Err(RegistrarError::RequestAlreadyDecided {
                id: request_id,
                status: decided.status(),
            }),
            None => Err(RegistrarError::UnknownRequest(request_id)),
        }
    }

    fn finish(
        &mut self,
        request: &mut RegistrationRequest,
        decision: Decision,
        notifier: &mut dyn Notifier,
    ) {
        let (status, text) = match decision {
            Decision::Approved => (RequestStatus::Done, "Your request has been approved."),
            Decision::Rejected => (RequestStatus::Refused, "Your request has been rejected."),
        };
        request.set_status(status);
        notifier.notify(request.sender(), NOTIFY_TITLE, text);
        info!(
            target: "audit",
            "request #{} ({:?} {} for {}) -> {:?}",
            request.id(),
            request.kind(),
            request.course(),
            request.sender(),
            status
        );
        self.history.push(request.clone());
    }

    /// Apply a request to the sender's enrollment; true on success.
    ///
    /// DROP removes the current registration of the course. ADD resolves the
    /// course type from the student's faculty, checks eligibility and the
    /// credit cap, then opens a new current registration.
    pub fn assign_course_to_student(&mut self, request: &RegistrationRequest) -> bool {
        let Some(course) = self.catalog.get(request.course()) else {
            warn!("request #{} refers to unknown course {}", request.id(), request.course());
            return false;
        };
        let Some(student) = self
            .people
            .get_mut(request.sender())
            .and_then(|p| p.as_student_mut())
        else {
            warn!("request #{} sent by unknown student {}", request.id(), request.sender());
            return false;
        };

        if request.kind() == RequestKind::Drop {
            return student.enrollment.remove_current(request.course());
        }

        let course_type = resolve_course_type(course, &student.faculty);
        if !prerequisites_satisfied(course, &student.enrollment) {
            return false;
        }
        let current = student.enrollment.current_credits(&self.catalog);
        if current + course.credits() > self.policy.max_credits {
            return false;
        }
        student
            .enrollment
            .add_current(RegisteredCourse::new(request.course(), course_type))
    }
}
