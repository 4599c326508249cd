use log::info;
use serde::{Deserialize, Serialize};

use super::catalog::Faculty;
use super::enrollment::Enrollment;
use super::err::{RegistrarError, Result};
use super::AppState;

/// 担任导师所需的最低 h 指数
pub const SUPERVISOR_MIN_H_INDEX: u32 = 3;

/// 教职工类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmployeeKind {
    Teacher,
    Manager,
    Dean,
    Admin,
    TechSupport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRole {
    pub kind: EmployeeKind,
    pub salary: f64,
}

/// 研究生附加信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraduateInfo {
    pub supervisor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRole {
    pub faculty: Faculty,
    pub year_of_study: u32,
    pub enrollment: Enrollment,
    pub graduate: Option<GraduateInfo>,
}

impl StudentRole {
    pub fn new(faculty: Faculty, year_of_study: u32) -> Self {
        Self {
            faculty,
            year_of_study,
            enrollment: Enrollment::new(),
            graduate: None,
        }
    }

    pub fn graduate(faculty: Faculty, year_of_study: u32) -> Self {
        Self {
            graduate: Some(GraduateInfo::default()),
            ..Self::new(faculty, year_of_study)
        }
    }
}

/// 用户角色
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Role {
    Student(StudentRole),
    Employee(EmployeeRole),
}

/// 研究者资料, 学生与教职工都可以拥有
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchProfile {
    pub h_index: u32,
}

/// A user of the system together with what they are allowed to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    id: String,
    pub login: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub role: Role,
    pub research: Option<ResearchProfile>,
}

impl Person {
    pub(crate) fn new(id: String, login: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            login: login.into(),
            first_name: String::new(),
            last_name: String::new(),
            email: None,
            role,
            research: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Letter used in generated ids for this role.
    pub fn id_letter(role: &Role) -> char {
        match role {
            Role::Student(s) if s.graduate.is_some() => 'G',
            Role::Student(_) => 'S',
            Role::Employee(e) => match e.kind {
                EmployeeKind::Teacher => 'T',
                EmployeeKind::Manager => 'M',
                EmployeeKind::Dean => 'D',
                EmployeeKind::Admin => 'A',
                EmployeeKind::TechSupport => 'E',
            },
        }
    }

    pub fn as_student(&self) -> Option<&StudentRole> {
        match &self.role {
            Role::Student(s) => Some(s),
            Role::Employee(_) => None,
        }
    }

    pub fn as_student_mut(&mut self) -> Option<&mut StudentRole> {
        match &mut self.role {
            Role::Student(s) => Some(s),
            Role::Employee(_) => None,
        }
    }

    pub fn as_employee(&self) -> Option<&EmployeeRole> {
        match &self.role {
            Role::Employee(e) => Some(e),
            Role::Student(_) => None,
        }
    }

    pub fn display_name(&self) -> String {
        if self.first_name.is_empty() && self.last_name.is_empty() {
            return self.login.clone();
        }
        format!("{} {}", self.last_name, self.first_name)
            .trim()
            .to_string()
    }
}

impl AppState {
    /// Make `researcher_id` the supervisor of graduate `graduate_id`.
    ///
    /// Returns `Ok(false)` when the graduate already has a supervisor and
    /// `LowQualification` when the researcher's h-index is below
    /// [`SUPERVISOR_MIN_H_INDEX`].
    pub fn assign_supervisor(&mut self, researcher_id: &str, graduate_id: &str) -> Result<bool> {
        let researcher = self
            .people
            .get(researcher_id)
            .ok_or_else(|| RegistrarError::UnknownPerson(researcher_id.to_string()))?;
        let h_index = researcher
            .research
            .as_ref()
            .map(|r| r.h_index)
            .ok_or_else(|| RegistrarError::NotAResearcher(researcher_id.to_string()))?;

        let graduate = self
            .people
            .get_mut(graduate_id)
            .ok_or_else(|| RegistrarError::UnknownPerson(graduate_id.to_string()))?
            .as_student_mut()
            .and_then(|s| s.graduate.as_mut())
            .ok_or_else(|| RegistrarError::NotAGraduateStudent(graduate_id.to_string()))?;

        if graduate.supervisor.is_some() {
            return Ok(false);
        }
        if h_index < SUPERVISOR_MIN_H_INDEX {
            return Err(RegistrarError::LowQualification {
                h_index,
                required: SUPERVISOR_MIN_H_INDEX,
            });
        }
        graduate.supervisor = Some(researcher_id.to_string());
        info!(target: "audit", "{} became supervisor of {}", researcher_id, graduate_id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registrar::catalog::Semester;

    #[test]
    fn test_id_letter_by_role() {
        let student = Role::Student(StudentRole::new(Faculty::new("FIT"), 1));
        let graduate = Role::Student(StudentRole::graduate(Faculty::new("FIT"), 1));
        let dean = Role::Employee(EmployeeRole {
            kind: EmployeeKind::Dean,
            salary: 0.0,
        });
        assert_eq!(Person::id_letter(&student), 'S');
        assert_eq!(Person::id_letter(&graduate), 'G');
        assert_eq!(Person::id_letter(&dean), 'D');
    }

    #[test]
    fn test_role_accessors() {
        let mut p = Person::new(
            "24S0001".to_string(),
            "alice",
            Role::Student(StudentRole::new(Faculty::new("FIT"), 2)),
        );
        assert!(p.as_employee().is_none());
        assert_eq!(p.as_student().map(|s| s.year_of_study), Some(2));
        if let Some(s) = p.as_student_mut() {
            s.year_of_study = 3;
        }
        assert_eq!(p.as_student().map(|s| s.year_of_study), Some(3));
        assert_eq!(p.display_name(), "alice");

        p.first_name = "Alice".to_string();
        p.last_name = "Smith".to_string();
        assert_eq!(p.display_name(), "Smith Alice");
    }

    fn with_researcher(h_index: u32) -> (AppState, String, String) {
        let mut state = AppState::new(2024, Semester::Fall);
        let teacher = state.add_employee(
            "prof",
            EmployeeRole {
                kind: EmployeeKind::Teacher,
                salary: 1000.0,
            },
        );
        state.person_mut(&teacher).unwrap().research = Some(ResearchProfile { h_index });
        let graduate = state.add_student("grad", StudentRole::graduate(Faculty::new("FIT"), 1));
        (state, teacher, graduate)
    }

    #[test]
    fn test_assign_supervisor() {
        let (mut state, teacher, graduate) = with_researcher(3);
        assert_eq!(state.assign_supervisor(&teacher, &graduate), Ok(true));
        let info = state.student(&graduate).unwrap().graduate.clone().unwrap();
        assert_eq!(info.supervisor, Some(teacher.clone()));
        // already supervised
        assert_eq!(state.assign_supervisor(&teacher, &graduate), Ok(false));
    }

    #[test]
    fn test_low_h_index() {
        let (mut state, teacher, graduate) = with_researcher(2);
        assert_eq!(
            state.assign_supervisor(&teacher, &graduate),
            Err(RegistrarError::LowQualification { h_index: 2, required: 3 })
        );
        assert_eq!(state.student(&graduate).unwrap().graduate, Some(GraduateInfo::default()));
    }

    #[test]
    fn test_supervisor_needs_research_and_graduate() {
        let (mut state, teacher, graduate) = with_researcher(5);
        let undergrad = state.add_student("ug", StudentRole::new(Faculty::new("FIT"), 1));
        assert_eq!(
            state.assign_supervisor(&teacher, &undergrad),
            Err(RegistrarError::NotAGraduateStudent(undergrad.clone()))
        );
        assert_eq!(
            state.assign_supervisor(&undergrad, &graduate),
            Err(RegistrarError::NotAResearcher(undergrad.clone()))
        );
        assert_eq!(
            state.assign_supervisor("nobody", &graduate),
            Err(RegistrarError::UnknownPerson("nobody".to_string()))
        );
    }
}
