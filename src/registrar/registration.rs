use std::str::FromStr;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::err::{RegistrarError, Result};
use super::AppState;

pub type RequestId = u64;

/// 申请类型: 选课或退课
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestKind {
    Add,
    Drop,
}

impl FromStr for RequestKind {
    type Err = RegistrarError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "add" => Ok(RequestKind::Add),
            "drop" => Ok(RequestKind::Drop),
            _ => Err(RegistrarError::InvalidRequestKind(s.to_string())),
        }
    }
}

/// 申请状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    /// 已提交, 等待审批
    Shipped,
    Done,
    Refused,
}

impl RequestStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Shipped)
    }
}

/// 选课/退课申请
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    id: RequestId,
    sender: String,
    course: String,
    kind: RequestKind,
    status: RequestStatus,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

impl RegistrationRequest {
    pub(crate) fn new(id: RequestId, sender: &str, course: &str, kind: RequestKind) -> Self {
        Self {
            id,
            sender: sender.to_string(),
            course: course.to_string(),
            kind,
            status: RequestStatus::Shipped,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn course(&self) -> &str {
        &self.course
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    pub(crate) fn set_status(&mut self, status: RequestStatus) {
        self.status = status;
    }
}

impl AppState {
    /// Validate an add/drop request and queue it for approval.
    ///
    /// Rules are checked in this order: open registration window, no pending
    /// request for the same course, then for ADD the course must be neither
    /// current nor completed and must fit under the credit cap, and for DROP
    /// the course must be current. Nothing in the student's enrollment changes
    /// until the request is decided.
    pub fn submit_registration(
        &mut self,
        student_id: &str,
        course_code: &str,
        kind: RequestKind,
    ) -> Result<RegistrationRequest> {
        if !self.policy.registration_open {
            return Err(RegistrarError::RegistrationClosed);
        }
        let course = self
            .catalog
            .get(course_code)
            .ok_or_else(|| RegistrarError::UnknownCourse(course_code.to_string()))?;
        let student = self.student(student_id)?;

        if self.has_pending(student_id, course_code) {
            warn!("duplicate registration request: {} -> {}", student_id, course_code);
            return Err(RegistrarError::DuplicateRegistration {
                student: student_id.to_string(),
                course: course_code.to_string(),
            });
        }

        let enrollment = &student.enrollment;
        match kind {
            RequestKind::Add => {
                if enrollment.is_current(course_code) || enrollment.has_completed(course_code) {
                    return Err(RegistrarError::AlreadyRegistered {
                        student: student_id.to_string(),
                        course: course_code.to_string(),
                    });
                }
                let current = enrollment.current_credits(&self.catalog);
                if current + course.credits() > self.policy.max_credits {
                    warn!(
                        "{} exceeds credit cap with {}: {} + {} > {}",
                        student_id,
                        course_code,
                        current,
                        course.credits(),
                        self.policy.max_credits
                    );
                    return Err(RegistrarError::CreditLimitExceeded {
                        current,
                        requested: course.credits(),
                        max: self.policy.max_credits,
                    });
                }
            }
            RequestKind::Drop => {
                if !enrollment.is_current(course_code) {
                    return Err(RegistrarError::NotRegistered {
                        student: student_id.to_string(),
                        course: course_code.to_string(),
                    });
                }
            }
        }

        let request = RegistrationRequest::new(self.next_request_id, student_id, course_code, kind);
        self.next_request_id += 1;
        info!(
            target: "audit",
            "{} submitted {:?} request #{} for {}",
            student_id,
            kind,
            request.id(),
            course_code
        );
        self.pending.push(request.clone());
        Ok(request)
    }

    /// 是否存在同一学生同一课程的待处理申请
    pub fn has_pending(&self, student_id: &str, course_code: &str) -> bool {
        self.pending
            .iter()
            .any(|r| r.sender() == student_id && r.course() == course_code)
    }

    pub fn pending_requests(&self) -> &[RegistrationRequest] {
        &self.pending
    }

    /// 已处理的申请, 按处理顺序
    pub fn decided_requests(&self) -> &[RegistrationRequest] {
        &self.history
    }

    /// Every request, pending or decided, currently in `status`.
    pub fn requests_with_status(&self, status: RequestStatus) -> Vec<&RegistrationRequest> {
        self.pending
            .iter()
            .chain(self.history.iter())
            .filter(|r| r.status() == status)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registrar::catalog::{Course, Faculty, Semester};
    use crate::registrar::person::StudentRole;
    use crate::registrar::registered_course::RegisteredCourse;

    fn setup() -> (AppState, String) {
        let mut state = AppState::new(2024, Semester::Fall);
        state.add_course(Course::new("C1", "Eighteen", 18, 2024, Semester::Fall));
        state.add_course(Course::new("C2", "Fifteen", 15, 2024, Semester::Fall));
        state.add_course(Course::new("C3", "Twelve", 12, 2024, Semester::Fall));
        let id = state.add_student("alice", StudentRole::new(Faculty::new("FIT"), 1));
        (state, id)
    }

    #[test]
    fn test_submit_queues_shipped_request() {
        let (mut state, s) = setup();
        let request = state.submit_registration(&s, "C1", RequestKind::Add).unwrap();
        assert_eq!(request.status(), RequestStatus::Shipped);
        assert_eq!(request.sender(), s);
        assert_eq!(state.pending_requests().len(), 1);
        // no ledger change before approval
        assert!(state.student(&s).unwrap().enrollment.current().is_empty());
    }

    #[test]
    fn test_duplicate_pending_request() {
        let (mut state, s) = setup();
        state.submit_registration(&s, "C1", RequestKind::Add).unwrap();
        let err = state.submit_registration(&s, "C1", RequestKind::Add).unwrap_err();
        assert!(matches!(err, RegistrarError::DuplicateRegistration { .. }));
        assert_eq!(state.pending_requests().len(), 1);
    }

    #[test]
    fn test_duplicate_check_precedes_credit_check() {
        let (mut state, s) = setup();
        state.set_max_credits(18);
        state.submit_registration(&s, "C1", RequestKind::Add).unwrap();
        state.set_max_credits(10);
        let err = state.submit_registration(&s, "C1", RequestKind::Add).unwrap_err();
        assert!(matches!(err, RegistrarError::DuplicateRegistration { .. }));
    }

    #[test]
    fn test_add_of_current_or_completed_course() {
        let (mut state, s) = setup();
        {
            let enrollment = &mut state.student_mut(&s).unwrap().enrollment;
            enrollment.add_current(RegisteredCourse::new("C2", None));
            enrollment.end_semester();
            enrollment.add_current(RegisteredCourse::new("C1", None));
        }
        for code in ["C1", "C2"] {
            let err = state.submit_registration(&s, code, RequestKind::Add).unwrap_err();
            assert!(matches!(err, RegistrarError::AlreadyRegistered { .. }));
        }
    }

    #[test]
    fn test_credit_limit_counts_current_courses() {
        let (mut state, s) = setup();
        state
            .student_mut(&s)
            .unwrap()
            .enrollment
            .add_current(RegisteredCourse::new("C1", None));

        let err = state.submit_registration(&s, "C2", RequestKind::Add).unwrap_err();
        assert_eq!(
            err,
            RegistrarError::CreditLimitExceeded {
                current: 18,
                requested: 15,
                max: 30
            }
        );
        // exactly at the cap is allowed
        assert!(state.submit_registration(&s, "C3", RequestKind::Add).is_ok());
    }

    #[test]
    fn test_drop_requires_current_course() {
        let (mut state, s) = setup();
        let err = state.submit_registration(&s, "C1", RequestKind::Drop).unwrap_err();
        assert!(matches!(err, RegistrarError::NotRegistered { .. }));

        state
            .student_mut(&s)
            .unwrap()
            .enrollment
            .add_current(RegisteredCourse::new("C1", None));
        let request = state.submit_registration(&s, "C1", RequestKind::Drop).unwrap();
        assert_eq!(request.kind(), RequestKind::Drop);
    }

    #[test]
    fn test_closed_registration_and_unknown_ids() {
        let (mut state, s) = setup();
        assert_eq!(
            state.submit_registration(&s, "NOPE", RequestKind::Add),
            Err(RegistrarError::UnknownCourse("NOPE".to_string()))
        );
        assert_eq!(
            state.submit_registration("ghost", "C1", RequestKind::Add),
            Err(RegistrarError::UnknownStudent("ghost".to_string()))
        );

        state.close_registration();
        assert_eq!(
            state.submit_registration(&s, "C1", RequestKind::Add),
            Err(RegistrarError::RegistrationClosed)
        );
        state.open_registration();
        assert!(state.submit_registration(&s, "C1", RequestKind::Add).is_ok());
    }

    #[test]
    fn test_parse_request_kind() {
        assert_eq!("add".parse::<RequestKind>(), Ok(RequestKind::Add));
        assert_eq!(" DROP ".parse::<RequestKind>(), Ok(RequestKind::Drop));
        assert_eq!(
            "swap".parse::<RequestKind>(),
            Err(RegistrarError::InvalidRequestKind("swap".to_string()))
        );
    }

    #[test]
    fn test_request_ids_are_unique() {
        let (mut state, s) = setup();
        let a = state.submit_registration(&s, "C1", RequestKind::Add).unwrap();
        let b = state.submit_registration(&s, "C3", RequestKind::Add).unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(state.requests_with_status(RequestStatus::Shipped).len(), 2);
    }
}
