//! Greenhouse-backed careers pages: job feed, departments and the
//! application relay.

pub mod domain;
pub mod feed;
pub mod submission;

pub use domain::{normalize_department, Department, MetadataField, Vacancy, VacancyDetail};
pub use feed::{departments_of, FeedError, GreenhouseClient, ALL_DEPARTMENTS};
pub use submission::{
    basic_authorization, job_targets, ApplicationForm, ApplicationSubmission, JobTarget,
    MessageKind, SubmissionError, SubmissionMessage, SubmissionRelay, SubmissionResult,
    UploadedFile,
};
