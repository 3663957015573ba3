//! HTML routes of the careers and partners site.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tracing::{debug, info};

use crate::careers::{
    normalize_department, ApplicationForm, GreenhouseClient, SubmissionError, SubmissionMessage,
    SubmissionRelay, UploadedFile, Vacancy, ALL_DEPARTMENTS,
};
use crate::config::{GreenhouseConfig, PartnersConfig, DEFAULT_MAX_UPLOAD_BYTES};
use crate::error::AppError;
use crate::http::HttpGateway;
use crate::partners::{PartnerCategory, PartnersClient};
use crate::templates::TemplateFinder;
use crate::views::{
    convert_to_kebab, pages, DepartmentContext, IndexContext, JobContext, Navigation,
    PartnerListContext, ResultsContext, ThankYouContext,
};

/// Clients shared by every request, built once at startup.
#[derive(Debug, Clone)]
pub struct SiteState {
    pub greenhouse: GreenhouseClient,
    pub relay: SubmissionRelay,
    pub partners: PartnersClient,
    pub templates: TemplateFinder,
    pub upload_limit: usize,
}

impl SiteState {
    pub fn new(
        gateway: Arc<dyn HttpGateway>,
        greenhouse: &GreenhouseConfig,
        partners: &PartnersConfig,
        templates_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            greenhouse: GreenhouseClient::new(gateway.clone(), greenhouse.board_url.clone()),
            relay: SubmissionRelay::new(gateway.clone(), greenhouse),
            partners: PartnersClient::new(gateway, partners.api_url.clone()),
            templates: TemplateFinder::new(templates_dir),
            upload_limit: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Caps request bodies, application uploads included, at `bytes`.
    pub fn with_upload_limit(mut self, bytes: usize) -> Self {
        self.upload_limit = bytes;
        self
    }
}

type SharedState = State<Arc<SiteState>>;

pub fn site_router(state: Arc<SiteState>) -> Router {
    let upload_limit = state.upload_limit;
    Router::new()
        .route("/", get(index_handler))
        .route("/careers/results", get(results_handler))
        .route(
            "/careers/thank-you",
            get(templated_page_handler).post(thank_you_handler),
        )
        .route(
            "/careers/:segment",
            get(careers_page_handler).post(careers_apply_handler),
        )
        .route(
            "/careers/:segment/:job_title",
            get(job_with_title_handler).post(job_with_title_apply_handler),
        )
        .route("/partners/find-a-partner", get(find_a_partner_handler))
        .route("/partners/:category", get(partner_category_handler))
        .fallback(templated_page_handler)
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}

async fn index_handler(State(state): SharedState) -> Result<Html<String>, AppError> {
    let partner_groups = state.partners.list_partner_groups().await?;
    Ok(Html(pages::render_index(&IndexContext { partner_groups })))
}

async fn results_handler(
    State(state): SharedState,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Html<String>, AppError> {
    let core_skills: Vec<String> = params
        .get("coreSkills")
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|skill| !skill.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let vacancies = if core_skills.is_empty() {
        Vec::new()
    } else {
        state
            .greenhouse
            .list_vacancies_by_skills(core_skills.as_slice())
            .await?
    };
    debug!(skills = ?core_skills, matches = vacancies.len(), "skill search");

    Ok(Html(pages::render_results(&ResultsContext::new(
        core_skills,
        vacancies,
    ))))
}

/// What `/careers/{segment}` resolves to.
enum CareersPage {
    Job(u64),
    Department(DepartmentContext),
    Static(String),
}

async fn resolve_careers_page(state: &SiteState, segment: &str) -> Result<CareersPage, AppError> {
    if !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()) {
        return segment
            .parse()
            .map(CareersPage::Job)
            .map_err(|_| AppError::NotFound(format!("/careers/{segment}")));
    }

    let vacancies = state.greenhouse.list_vacancies(ALL_DEPARTMENTS).await?;
    let navigation = Navigation::from_vacancies(&vacancies);
    let wanted = normalize_department(segment);

    if wanted == ALL_DEPARTMENTS {
        return Ok(CareersPage::Department(DepartmentContext {
            navigation,
            segment: ALL_DEPARTMENTS.to_string(),
            department: None,
            vacancies,
            message: None,
        }));
    }

    let department = navigation
        .departments
        .iter()
        .find(|department| normalize_department(&department.slug) == wanted)
        .cloned();
    if let Some(department) = department {
        let vacancies: Vec<Vacancy> = vacancies
            .into_iter()
            .filter(|vacancy| normalize_department(&vacancy.department) == wanted)
            .collect();
        return Ok(CareersPage::Department(DepartmentContext {
            navigation,
            segment: department.slug.clone(),
            department: Some(department),
            vacancies,
            message: None,
        }));
    }

    let path = format!("/careers/{segment}");
    match state.templates.find(&path).await? {
        Some(body) => Ok(CareersPage::Static(pages::render_static_page(&path, &body))),
        None => Err(AppError::NotFound(path)),
    }
}

async fn job_context(
    state: &SiteState,
    job_id: u64,
    message: Option<SubmissionMessage>,
) -> Result<JobContext, AppError> {
    let job = state.greenhouse.get_vacancy(job_id).await?;
    let vacancies = state.greenhouse.list_vacancies(ALL_DEPARTMENTS).await?;
    Ok(JobContext {
        navigation: Navigation::from_vacancies(&vacancies),
        job_id,
        job,
        message,
    })
}

async fn careers_page_handler(
    State(state): SharedState,
    Path(segment): Path<String>,
) -> Result<Html<String>, AppError> {
    let html = match resolve_careers_page(&state, &segment).await? {
        CareersPage::Job(job_id) => {
            pages::render_job_detail(&job_context(&state, job_id, None).await?)
        }
        CareersPage::Department(context) => pages::render_department(&context),
        CareersPage::Static(html) => html,
    };
    Ok(Html(html))
}

async fn careers_apply_handler(
    State(state): SharedState,
    Path(segment): Path<String>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    match resolve_careers_page(&state, &segment).await? {
        CareersPage::Job(job_id) => apply_to_job(&state, job_id, multipart).await,
        CareersPage::Department(mut context) => {
            let form = read_application_form(multipart).await?;
            let (status, message) = submit_single(&state.relay, form, None).await;
            context.message = Some(message);
            Ok((status, Html(pages::render_department(&context))).into_response())
        }
        CareersPage::Static(_) => Err(AppError::NotFound(format!("/careers/{segment}"))),
    }
}

async fn job_with_title_handler(
    State(state): SharedState,
    Path((segment, job_title)): Path<(String, String)>,
    uri: Uri,
) -> Result<Html<String>, AppError> {
    let Ok(job_id) = segment.parse::<u64>() else {
        return templated_page_handler(State(state), uri).await;
    };
    debug!(job_id, %job_title, "job page");
    let context = job_context(&state, job_id, None).await?;
    Ok(Html(pages::render_job_detail(&context)))
}

async fn job_with_title_apply_handler(
    State(state): SharedState,
    Path((job_id, _job_title)): Path<(String, String)>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let job_id = parse_job_id(&job_id)?;
    apply_to_job(&state, job_id, multipart).await
}

fn parse_job_id(raw: &str) -> Result<u64, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("/careers/{raw}")))
}

async fn apply_to_job(
    state: &SiteState,
    job_id: u64,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut context = job_context(state, job_id, None).await?;
    let form = read_application_form(multipart).await?;
    let target = job_id.to_string();
    let (status, message) = submit_single(&state.relay, form, Some(&target)).await;
    context.message = Some(message);
    Ok((status, Html(pages::render_job_detail(&context))).into_response())
}

/// Relays one form; the page status is 422 only when the form itself is
/// invalid; upstream verdicts are shown inline on a 200 page.
async fn submit_single(
    relay: &SubmissionRelay,
    form: ApplicationForm,
    job_id: Option<&str>,
) -> (StatusCode, SubmissionMessage) {
    let outcome = match form.into_submission() {
        Ok(submission) => relay.submit(&submission, job_id).await,
        Err(err) => Err(err),
    };
    let status = match &outcome {
        Err(SubmissionError::MissingResume) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::OK,
    };
    (status, SubmissionMessage::from_outcome(&outcome))
}

async fn thank_you_handler(
    State(state): SharedState,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = read_application_form(multipart).await?;
    let targets = form.targets();

    let (status, messages) = match form.into_submission() {
        Ok(submission) => {
            let messages = state.relay.submit_batch(&submission, &targets).await;
            let accepted = messages.iter().filter(|message| message.is_positive()).count();
            info!(roles = messages.len(), accepted, "batch application relayed");
            (StatusCode::OK, messages)
        }
        Err(err) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            vec![SubmissionMessage::from_outcome(&Err(err))],
        ),
    };

    let html = pages::render_thank_you(&ThankYouContext { messages });
    Ok((status, Html(html)).into_response())
}

/// Collects the known application fields; anything else is discarded.
pub async fn read_application_form(mut multipart: Multipart) -> Result<ApplicationForm, AppError> {
    let mut form = ApplicationForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(convert_to_kebab).unwrap_or_default();
        match name.as_str() {
            "resume" | "cover-letter" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content = field.bytes().await?.to_vec();
                let file = Some(UploadedFile::new(filename, content));
                if name == "resume" {
                    form.resume = file;
                } else {
                    form.cover_letter = file;
                }
            }
            "first-name" => form.first_name = field.text().await?,
            "last-name" => form.last_name = field.text().await?,
            "email" => form.email = field.text().await?,
            "phone" => form.phone = field.text().await?,
            "location" => form.location = field.text().await?,
            "application-job-id-list" => form.job_ids = field.text().await?,
            "application-job-title-list" => form.job_titles = field.text().await?,
            _ => {}
        }
    }
    Ok(form)
}

async fn find_a_partner_handler(State(state): SharedState) -> Result<Html<String>, AppError> {
    let partners = state.partners.list_partners(true).await?;
    let context = PartnerListContext {
        title: pages::partner_list_title(None),
        path: "/partners/find-a-partner".to_string(),
        partners,
    };
    Ok(Html(pages::render_partner_list(&context)))
}

async fn partner_category_handler(
    State(state): SharedState,
    Path(segment): Path<String>,
) -> Result<Html<String>, AppError> {
    let category = PartnerCategory::from_segment(&segment)
        .ok_or_else(|| AppError::NotFound(format!("/partners/{segment}")))?;
    let partners = state.partners.list_partners_for_category(category).await?;
    let context = PartnerListContext {
        title: pages::partner_list_title(Some(category)),
        path: format!("/partners/{}", category.segment()),
        partners,
    };
    Ok(Html(pages::render_partner_list(&context)))
}

async fn templated_page_handler(
    State(state): SharedState,
    uri: Uri,
) -> Result<Html<String>, AppError> {
    let path = uri.path();
    match state.templates.find(path).await? {
        Some(body) => Ok(Html(pages::render_static_page(path, &body))),
        None => Err(AppError::NotFound(path.to_string())),
    }
}
