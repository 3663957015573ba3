use std::collections::BTreeSet;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::domain::{normalize_department, Department, RawFeed, RawJob, Vacancy, VacancyDetail};
use crate::http::{HttpGateway, UpstreamError};

/// Department filter value that disables filtering.
pub const ALL_DEPARTMENTS: &str = "all";

/// Read side of the Greenhouse boards API.
#[derive(Clone)]
pub struct GreenhouseClient {
    gateway: Arc<dyn HttpGateway>,
    board_url: String,
}

impl std::fmt::Debug for GreenhouseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GreenhouseClient")
            .field("board_url", &self.board_url)
            .finish_non_exhaustive()
    }
}

impl GreenhouseClient {
    pub fn new(gateway: Arc<dyn HttpGateway>, board_url: impl Into<String>) -> Self {
        let board_url = board_url.into().trim_end_matches('/').to_string();
        Self {
            gateway,
            board_url,
        }
    }

    pub fn feed_url(&self) -> String {
        format!("{}?content=true", self.board_url)
    }

    pub fn job_url(&self, job_id: &str) -> String {
        format!("{}/{}", self.board_url, job_id)
    }

    async fn feed(&self) -> Result<Vec<Vacancy>, FeedError> {
        let url = self.feed_url();
        let payload = self.gateway.get_json(&url).await?;
        let feed: RawFeed = decode(&url, payload)?;
        debug!(jobs = feed.jobs.len(), "fetched job feed");
        feed.jobs.into_iter().map(RawJob::into_vacancy).collect()
    }

    /// Every vacancy whose department matches `department`, in feed order.
    /// `"all"` returns the whole feed.
    pub async fn list_vacancies(&self, department: &str) -> Result<Vec<Vacancy>, FeedError> {
        let wanted = normalize_department(department);
        let vacancies = self.feed().await?;
        if wanted == ALL_DEPARTMENTS {
            return Ok(vacancies);
        }

        Ok(vacancies
            .into_iter()
            .filter(|vacancy| normalize_department(&vacancy.department) == wanted)
            .collect())
    }

    /// Vacancies tagged with at least one of `skills`. Each job appears once.
    pub async fn list_vacancies_by_skills<S>(&self, skills: &[S]) -> Result<Vec<Vacancy>, FeedError>
    where
        S: AsRef<str>,
    {
        let vacancies = self.feed().await?;
        Ok(vacancies
            .into_iter()
            .filter(|vacancy| vacancy.has_any_skill(skills.iter().map(|skill| skill.as_ref())))
            .collect())
    }

    /// Distinct departments present in the feed, sorted by name.
    pub async fn list_departments(&self) -> Result<Vec<Department>, FeedError> {
        Ok(departments_of(&self.feed().await?))
    }

    pub async fn get_vacancy(&self, job_id: u64) -> Result<VacancyDetail, FeedError> {
        let url = self.job_url(&job_id.to_string());
        let payload = match self.gateway.get_json(&url).await {
            Ok(payload) => payload,
            Err(err) if err.is_not_found() => return Err(FeedError::NotFound { job_id }),
            Err(err) => return Err(err.into()),
        };
        let job: RawJob = decode(&url, payload)?;
        job.into_detail()
    }
}

/// Distinct departments of `vacancies`, sorted by name.
pub fn departments_of(vacancies: &[Vacancy]) -> Vec<Department> {
    vacancies
        .iter()
        .map(|vacancy| Department::new(vacancy.department.clone()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn decode<T: DeserializeOwned>(url: &str, payload: Value) -> Result<T, FeedError> {
    serde_json::from_value(payload).map_err(|err| FeedError::Schema {
        url: url.to_string(),
        message: err.to_string(),
    })
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("job {job_id} does not exist")]
    NotFound { job_id: u64 },
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("job feed at {url} has an unexpected shape: {message}")]
    Schema { url: String, message: String },
    #[error("job {job_id} is missing the '{field}' metadata entry")]
    MissingMetadata { job_id: u64, field: &'static str },
}

impl FeedError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FeedError::NotFound { .. })
    }
}
