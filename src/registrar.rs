use std::collections::BTreeMap;
use std::fmt;

use log::{info, warn};

use catalog::{Catalog, Course, Lesson, Semester};
use config::{Calendar, Policy};
use err::{RegistrarError, Result};
use person::{EmployeeRole, Person, Role, StudentRole};
use registered_course::RegisteredCourse;
use registration::{RegistrationRequest, RequestId};

pub mod approval;
pub mod catalog;
pub mod config;
pub mod csv_processor;
pub mod enrollment;
pub mod err;
pub mod grading;
pub mod notify;
pub mod person;
pub mod registered_course;
pub mod registration;
pub mod schedule;
pub mod store;

/// 选课系统的全部状态, 所有修改都经由 `&mut AppState`
#[derive(Debug, Clone)]
pub struct AppState {
    pub(crate) catalog: Catalog,
    pub(crate) people: BTreeMap<String, Person>,
    pub(crate) pending: Vec<RegistrationRequest>,
    pub(crate) history: Vec<RegistrationRequest>,
    pub(crate) policy: Policy,
    pub(crate) calendar: Calendar,
    pub(crate) id_counter: u32,
    pub(crate) next_request_id: RequestId,
}

impl AppState {
    pub fn new(year: i32, semester: Semester) -> Self {
        Self {
            catalog: Catalog::new(),
            people: BTreeMap::new(),
            pending: Vec::new(),
            history: Vec::new(),
            policy: Policy::default(),
            calendar: Calendar::new(year, semester),
            id_counter: 0,
            next_request_id: 1,
        }
    }

    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn set_max_credits(&mut self, max_credits: u32) {
        self.policy.max_credits = max_credits;
    }

    pub fn open_registration(&mut self) {
        self.policy.registration_open = true;
        info!(target: "audit", "registration opened");
    }

    pub fn close_registration(&mut self) {
        self.policy.registration_open = false;
        info!(target: "audit", "registration closed");
    }

    pub fn open_scheduling(&mut self) {
        self.policy.scheduling_open = true;
    }

    pub fn close_scheduling(&mut self) {
        self.policy.scheduling_open = false;
    }

    // ---- catalog ----

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    /// 新增课程, 课程代码重复时返回 false
    pub fn add_course(&mut self, course: Course) -> bool {
        let code = course.code().to_string();
        let added = self.catalog.insert(course);
        if added {
            info!(target: "audit", "course {} added to the catalog", code);
        }
        added
    }

    /// Take a course out of the catalog. Refused with `CourseInUse` while any
    /// student registration or pending request still names it.
    pub fn remove_course(&mut self, code: &str) -> Result<Course> {
        if !self.catalog.contains(code) {
            return Err(RegistrarError::UnknownCourse(code.to_string()));
        }
        if self.is_course_referenced(code) {
            warn!("course {} is in use and cannot be removed", code);
            return Err(RegistrarError::CourseInUse(code.to_string()));
        }
        let removed = self
            .catalog
            .remove(code)
            .ok_or_else(|| RegistrarError::UnknownCourse(code.to_string()))?;
        info!(target: "audit", "course {} removed from the catalog", code);
        Ok(removed)
    }

    /// 是否有学生的选课记录或待处理申请引用该课程
    pub fn is_course_referenced(&self, code: &str) -> bool {
        let registered = self
            .people
            .values()
            .filter_map(Person::as_student)
            .flat_map(|s| s.enrollment.all())
            .any(|r| r.course() == code);
        registered || self.pending.iter().any(|r| r.course() == code)
    }

    pub fn add_lesson(&mut self, course_code: &str, lesson: Lesson) -> bool {
        self.catalog
            .get_mut(course_code)
            .map_or(false, |c| c.add_lesson(lesson))
    }

    pub fn remove_lesson(&mut self, course_code: &str, lesson: &Lesson) -> bool {
        self.catalog
            .get_mut(course_code)
            .map_or(false, |c| c.remove_lesson(lesson))
    }

    // ---- people ----

    /// Register a student and return the generated id.
    pub fn add_student(&mut self, login: &str, student: StudentRole) -> String {
        self.add_person(login, Role::Student(student))
    }

    pub fn add_employee(&mut self, login: &str, employee: EmployeeRole) -> String {
        self.add_person(login, Role::Employee(employee))
    }

    fn add_person(&mut self, login: &str, role: Role) -> String {
        let id = self.generate_id(Person::id_letter(&role));
        self.people.insert(id.clone(), Person::new(id.clone(), login, role));
        info!(target: "audit", "user {} created with id {}", login, id);
        id
    }

    /// `{yy}{letter}{counter}`, e.g. `24S0001`
    fn generate_id(&mut self, letter: char) -> String {
        let yy = self.calendar.year.rem_euclid(100);
        loop {
            self.id_counter += 1;
            let id = format!("{:02}{}{:04}", yy, letter, self.id_counter);
            if !self.people.contains_key(&id) {
                return id;
            }
        }
    }

    pub fn person(&self, id: &str) -> Option<&Person> {
        self.people.get(id)
    }

    pub fn person_mut(&mut self, id: &str) -> Option<&mut Person> {
        self.people.get_mut(id)
    }

    pub fn people(&self) -> impl Iterator<Item = &Person> {
        self.people.values()
    }

    pub fn student(&self, id: &str) -> Result<&StudentRole> {
        self.people
            .get(id)
            .and_then(Person::as_student)
            .ok_or_else(|| RegistrarError::UnknownStudent(id.to_string()))
    }

    pub fn student_mut(&mut self, id: &str) -> Result<&mut StudentRole> {
        self.people
            .get_mut(id)
            .and_then(Person::as_student_mut)
            .ok_or_else(|| RegistrarError::UnknownStudent(id.to_string()))
    }

    // ---- semester ----

    /// Close the running semester for every student and step the calendar.
    ///
    /// When a new academic year starts every student moves up a year of
    /// study and the id counter starts over.
    pub fn next_semester(&mut self) {
        for student in self.people.values_mut().filter_map(Person::as_student_mut) {
            student.enrollment.end_semester();
        }
        let new_year = self.calendar.advance();
        if new_year {
            for student in self.people.values_mut().filter_map(Person::as_student_mut) {
                student.year_of_study += 1;
            }
            self.id_counter = 0;
        }
        info!(
            target: "audit",
            "semester advanced to {} {}",
            self.calendar.semester,
            self.calendar.year
        );
    }

    /// 成绩单: 已完成与未完成的课程, 总学分与绩点
    pub fn transcript(&self, student_id: &str) -> Result<Transcript> {
        let student = self.student(student_id)?;
        let enrollment = &student.enrollment;
        let entries = enrollment
            .completed()
            .iter()
            .chain(enrollment.not_completed())
            .cloned()
            .map(|registered| TranscriptEntry {
                credits: self.catalog.credits_of(registered.course()),
                passed: !registered.is_retake(),
                registered,
            })
            .collect();
        Ok(Transcript {
            student: student_id.to_string(),
            entries,
            completed_credits: enrollment.completed_credits(&self.catalog),
            total_credits: enrollment.completed_credits(&self.catalog)
                + enrollment.not_completed_credits(&self.catalog),
            gpa: enrollment.gpa(&self.catalog),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptEntry {
    pub registered: RegisteredCourse,
    pub credits: u32,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub student: String,
    pub entries: Vec<TranscriptEntry>,
    pub completed_credits: u32,
    pub total_credits: u32,
    pub gpa: f64,
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "transcript of {}", self.student)?;
        for entry in &self.entries {
            writeln!(
                f,
                "  {:<10} {:>2} cr  {:>6.1}  {}",
                entry.registered.course(),
                entry.credits,
                entry.registered.composite(),
                if entry.passed { "passed" } else { "retake" }
            )?;
        }
        write!(
            f,
            "credits {}/{}  gpa {:.2}",
            self.completed_credits, self.total_credits, self.gpa
        )
    }
}
