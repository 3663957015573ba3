use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::config::GreenhouseConfig;
use crate::http::{HttpGateway, UpstreamError, UpstreamResponse};

/// A file posted through the application form.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: String,
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }

    fn encoded(&self) -> String {
        BASE64.encode(&self.content)
    }
}

impl fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFile")
            .field("filename", &self.filename)
            .field("bytes", &self.content.len())
            .finish()
    }
}

/// Raw application form as posted by the browser. Unknown fields are never
/// captured here, so they cannot reach the upstream payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub resume: Option<UploadedFile>,
    pub cover_letter: Option<UploadedFile>,
    pub job_ids: String,
    pub job_titles: String,
}

impl ApplicationForm {
    /// Validates the form into a submission; a resume is mandatory.
    pub fn into_submission(self) -> Result<ApplicationSubmission, SubmissionError> {
        let resume = self
            .resume
            .filter(|file| !file.filename.is_empty() || !file.content.is_empty())
            .ok_or(SubmissionError::MissingResume)?;

        Ok(ApplicationSubmission {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            location: self.location,
            resume,
            cover_letter: self
                .cover_letter
                .filter(|file| !file.filename.is_empty() || !file.content.is_empty()),
        })
    }

    /// Job ids and titles paired in form order.
    pub fn targets(&self) -> Vec<JobTarget> {
        job_targets(&self.job_ids, &self.job_titles)
    }
}

/// One applicant's validated submission; lives for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub resume: UploadedFile,
    pub cover_letter: Option<UploadedFile>,
}

/// A role selected on the batch application form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobTarget {
    pub id: String,
    pub title: String,
}

/// Pairs comma-separated ids and titles. A missing title falls back to the id.
pub fn job_targets(ids: &str, titles: &str) -> Vec<JobTarget> {
    let titles: Vec<&str> = titles.split(',').map(str::trim).collect();
    ids.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .enumerate()
        .map(|(index, id)| JobTarget {
            id: id.to_string(),
            title: titles
                .get(index)
                .filter(|title| !title.is_empty())
                .map_or_else(|| id.to_string(), |title| title.to_string()),
        })
        .collect()
}

/// Upstream verdict on a submission, passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionResult {
    pub status_code: u16,
    pub reason: String,
}

impl SubmissionResult {
    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

impl From<UpstreamResponse> for SubmissionResult {
    fn from(value: UpstreamResponse) -> Self {
        Self {
            status_code: value.status,
            reason: value.reason,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Positive,
    Negative,
}

impl MessageKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

/// Inline notification rendered after a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionMessage {
    pub kind: MessageKind,
    pub title: String,
    pub text: String,
}

const SUCCESS_TEXT: &str = "Your application has been successfully submitted. Thank you!";

impl SubmissionMessage {
    /// Message for a single submission: "Success" or "Error {code}".
    pub fn from_outcome(outcome: &Result<SubmissionResult, SubmissionError>) -> Self {
        match outcome {
            Ok(result) if result.is_success() => Self {
                kind: MessageKind::Positive,
                title: "Success".to_string(),
                text: SUCCESS_TEXT.to_string(),
            },
            Ok(result) => Self {
                kind: MessageKind::Negative,
                title: format!("Error {}", result.status_code),
                text: format!("{}. Please try again!", result.reason),
            },
            Err(err) => Self {
                kind: MessageKind::Negative,
                title: format!("Error {}", err.status_code()),
                text: format!("{err}. Please try again!"),
            },
        }
    }

    /// Message for one role of a batch submission, titled with the role.
    pub fn for_job(title: &str, outcome: &Result<SubmissionResult, SubmissionError>) -> Self {
        let single = Self::from_outcome(outcome);
        let text = match single.kind {
            MessageKind::Positive => single.text,
            MessageKind::Negative => format!("{}: {}", single.title, single.text),
        };
        Self {
            kind: single.kind,
            title: title.to_string(),
            text,
        }
    }

    pub fn is_positive(&self) -> bool {
        self.kind == MessageKind::Positive
    }
}

/// `Authorization` header value for the boards API: the key as username
/// with an empty password.
pub fn basic_authorization(api_key: &str) -> String {
    format!("Basic {}", BASE64.encode(format!("{api_key}:")))
}

/// Forwards applications to the Greenhouse boards API.
#[derive(Clone)]
pub struct SubmissionRelay {
    gateway: Arc<dyn HttpGateway>,
    board_url: String,
    authorization: String,
    default_job_id: String,
    forward_cover_letter: bool,
}

impl fmt::Debug for SubmissionRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmissionRelay")
            .field("board_url", &self.board_url)
            .field("default_job_id", &self.default_job_id)
            .field("forward_cover_letter", &self.forward_cover_letter)
            .finish_non_exhaustive()
    }
}

impl SubmissionRelay {
    pub fn new(gateway: Arc<dyn HttpGateway>, config: &GreenhouseConfig) -> Self {
        Self {
            gateway,
            board_url: config.board_url.trim_end_matches('/').to_string(),
            authorization: basic_authorization(&config.api_key),
            default_job_id: config.default_job_id.clone(),
            forward_cover_letter: config.forward_cover_letter,
        }
    }

    pub fn default_job_id(&self) -> &str {
        &self.default_job_id
    }

    /// JSON body sent upstream.
    pub fn payload(&self, submission: &ApplicationSubmission) -> Value {
        let mut body = Map::new();
        body.insert("first_name".into(), json!(submission.first_name));
        body.insert("last_name".into(), json!(submission.last_name));
        body.insert("email".into(), json!(submission.email));
        body.insert("phone".into(), json!(submission.phone));
        body.insert("location".into(), json!(submission.location));
        body.insert("resume_content".into(), json!(submission.resume.encoded()));
        body.insert(
            "resume_content_filename".into(),
            json!(submission.resume.filename),
        );

        if let Some(cover_letter) = submission
            .cover_letter
            .as_ref()
            .filter(|_| self.forward_cover_letter)
        {
            body.insert(
                "cover_letter_content".into(),
                json!(cover_letter.encoded()),
            );
            body.insert(
                "cover_letter_content_filename".into(),
                json!(cover_letter.filename),
            );
        }

        Value::Object(body)
    }

    /// Submits to `job_id`, or to the general-application job when `None`.
    pub async fn submit(
        &self,
        submission: &ApplicationSubmission,
        job_id: Option<&str>,
    ) -> Result<SubmissionResult, SubmissionError> {
        let job_id = job_id.unwrap_or(self.default_job_id.as_str());
        if job_id.is_empty() || !job_id.bytes().all(|b| b.is_ascii_digit()) {
            warn!(%job_id, "refusing to relay application for malformed job id");
            return Err(SubmissionError::InvalidJobId {
                job_id: job_id.to_string(),
            });
        }
        let url = format!("{}/{}", self.board_url, job_id);
        let body = self.payload(submission);

        let response = self
            .gateway
            .post_json(&url, &body, &self.authorization)
            .await
            .inspect_err(|err| warn!(%job_id, error = %err, "application relay failed"))?;

        info!(%job_id, status = response.status, "application relayed");
        Ok(response.into())
    }

    /// Submits to every target in order. A failing role does not stop the
    /// remaining ones; an empty target list submits a general application.
    pub async fn submit_batch(
        &self,
        submission: &ApplicationSubmission,
        targets: &[JobTarget],
    ) -> Vec<SubmissionMessage> {
        if targets.is_empty() {
            let outcome = self.submit(submission, None).await;
            return vec![SubmissionMessage::from_outcome(&outcome)];
        }

        let mut messages = Vec::with_capacity(targets.len());
        for target in targets {
            let outcome = self.submit(submission, Some(&target.id)).await;
            messages.push(SubmissionMessage::for_job(&target.title, &outcome));
        }
        messages
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("A resume is required")]
    MissingResume,
    #[error("{job_id:?} is not a job id")]
    InvalidJobId { job_id: String },
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl SubmissionError {
    /// Status shown to the applicant for failures that never got an upstream verdict.
    pub fn status_code(&self) -> u16 {
        match self {
            SubmissionError::MissingResume => 422,
            SubmissionError::InvalidJobId { .. } => 400,
            SubmissionError::Upstream(_) => 502,
        }
    }
}
