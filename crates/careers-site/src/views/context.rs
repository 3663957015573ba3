use std::collections::BTreeMap;

use chrono::{Datelike, Local};
use serde::Serialize;

use crate::careers::{departments_of, Department, SubmissionMessage, Vacancy, VacancyDetail};
use crate::partners::{Partner, PartnerCategory};

pub const NO_MATCHING_ROLES: &str = "There are no roles matching your selection.";

pub fn current_year() -> i32 {
    Local::now().year()
}

/// Department side navigation shared by the careers pages.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Navigation {
    pub departments: Vec<Department>,
    pub vacancy_count: BTreeMap<String, usize>,
}

impl Navigation {
    pub fn from_vacancies(vacancies: &[Vacancy]) -> Self {
        let departments = departments_of(vacancies);
        let mut vacancy_count: BTreeMap<String, usize> = departments
            .iter()
            .map(|department| (department.slug.clone(), 0))
            .collect();
        for vacancy in vacancies {
            *vacancy_count.entry(vacancy.department_slug()).or_default() += 1;
        }
        Self {
            departments,
            vacancy_count,
        }
    }

    pub fn find(&self, slug: &str) -> Option<&Department> {
        self.departments
            .iter()
            .find(|department| department.slug == slug)
    }

    pub fn count(&self, slug: &str) -> usize {
        self.vacancy_count.get(slug).copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexContext {
    pub partner_groups: BTreeMap<PartnerCategory, Vec<Partner>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultsContext {
    pub core_skills: Vec<String>,
    pub vacancies: Vec<Vacancy>,
    pub departments: Vec<String>,
    pub message: String,
}

impl ResultsContext {
    pub fn new(core_skills: Vec<String>, vacancies: Vec<Vacancy>) -> Self {
        let mut departments: Vec<String> = Vec::new();
        for vacancy in &vacancies {
            if !departments.contains(&vacancy.department) {
                departments.push(vacancy.department.clone());
            }
        }
        let message = if vacancies.is_empty() {
            NO_MATCHING_ROLES.to_string()
        } else {
            String::new()
        };
        Self {
            core_skills,
            vacancies,
            departments,
            message,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DepartmentContext {
    pub navigation: Navigation,
    pub segment: String,
    pub department: Option<Department>,
    pub vacancies: Vec<Vacancy>,
    pub message: Option<SubmissionMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobContext {
    pub navigation: Navigation,
    pub job_id: u64,
    pub job: VacancyDetail,
    pub message: Option<SubmissionMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThankYouContext {
    pub messages: Vec<SubmissionMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PartnerListContext {
    pub title: String,
    pub path: String,
    pub partners: Vec<Partner>,
}
