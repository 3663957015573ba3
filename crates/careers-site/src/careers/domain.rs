use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::feed::FeedError;
use crate::views::filters::{sanitize_html, slug, unescape_html};

/// Named metadata entries every Greenhouse job must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataField {
    Employment,
    Date,
    Department,
    Management,
    Office,
    CoreSkills,
}

impl MetadataField {
    pub const fn required() -> [Self; 5] {
        [
            Self::Employment,
            Self::Date,
            Self::Department,
            Self::Management,
            Self::Office,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Employment => "Employment",
            Self::Date => "Date",
            Self::Department => "Department",
            Self::Management => "Management",
            Self::Office => "Office",
            Self::CoreSkills => "Core Skills",
        }
    }

    fn matches(self, name: &str) -> bool {
        squash(name) == squash(self.label())
    }
}

fn squash(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Normalisation used to compare a department path segment with feed values.
/// Only ASCII letters and digits survive, lowercased, so a department name and
/// its slug always normalise to the same key.
pub fn normalize_department(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// A job as listed on the careers pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vacancy {
    pub title: String,
    pub url: String,
    pub location: String,
    pub id: u64,
    pub employment: String,
    pub date: String,
    pub department: String,
    pub management: String,
    pub office: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub core_skills: Option<Vec<String>>,
}

impl Vacancy {
    pub fn department_slug(&self) -> String {
        slug(&self.department)
    }

    /// True when any listed core skill equals any requested skill,
    /// ignoring case and surrounding whitespace.
    pub fn has_any_skill<'a, I>(&self, skills: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let Some(tags) = &self.core_skills else {
            return false;
        };
        skills.into_iter().any(|wanted| {
            let wanted = wanted.trim();
            !wanted.is_empty() && tags.iter().any(|tag| tag.eq_ignore_ascii_case(wanted))
        })
    }
}

/// Single job page content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VacancyDetail {
    pub title: String,
    pub content: String,
    pub location: String,
    pub department: String,
}

/// Grouping key for vacancies; equality and ordering follow the name.
#[derive(Debug, Clone, Serialize)]
pub struct Department {
    pub name: String,
    pub slug: String,
}

impl Department {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = slug(&name);
        Self { name, slug }
    }
}

impl PartialEq for Department {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Department {}

impl Hash for Department {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Department {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Department {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

// Wire shapes of the boards API.

#[derive(Debug, Deserialize)]
pub(crate) struct RawFeed {
    pub(crate) jobs: Vec<RawJob>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawJob {
    pub(crate) id: u64,
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) absolute_url: String,
    pub(crate) location: RawLocation,
    #[serde(default)]
    pub(crate) content: Option<String>,
    #[serde(default)]
    pub(crate) metadata: Option<Vec<RawMetadata>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawLocation {
    pub(crate) name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawMetadata {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) value: Value,
}

/// Metadata of one job, resolved by entry name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct JobMetadata {
    pub(crate) employment: String,
    pub(crate) date: String,
    pub(crate) department: String,
    pub(crate) management: String,
    pub(crate) office: String,
    pub(crate) core_skills: Option<Vec<String>>,
}

impl JobMetadata {
    pub(crate) fn resolve(job_id: u64, entries: &[RawMetadata]) -> Result<Self, FeedError> {
        let lookup = move |field: MetadataField| {
            entries.iter().find(|entry| field.matches(&entry.name))
        };
        let text = move |field: MetadataField| {
            lookup(field)
                .map(|entry| metadata_text(&entry.value))
                .ok_or(FeedError::MissingMetadata {
                    job_id,
                    field: field.label(),
                })
        };

        let [employment, date, department, management, office] =
            MetadataField::required().map(text);

        Ok(Self {
            employment: employment?,
            date: date?,
            department: department?,
            management: management?,
            office: office?,
            core_skills: lookup(MetadataField::CoreSkills)
                .and_then(|entry| metadata_tags(&entry.value)),
        })
    }
}

fn metadata_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(metadata_text)
            .filter(|item| !item.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

fn metadata_tags(value: &Value) -> Option<Vec<String>> {
    let tags: Vec<String> = match value {
        Value::Array(items) => items
            .iter()
            .map(|item| metadata_text(item).trim().to_string())
            .collect(),
        Value::String(text) => text.split(',').map(|tag| tag.trim().to_string()).collect(),
        _ => return None,
    };
    let tags: Vec<String> = tags.into_iter().filter(|tag| !tag.is_empty()).collect();
    (!tags.is_empty()).then_some(tags)
}

impl RawJob {
    pub(crate) fn into_vacancy(self) -> Result<Vacancy, FeedError> {
        let metadata = JobMetadata::resolve(self.id, self.metadata.as_deref().unwrap_or_default())?;
        Ok(Vacancy {
            title: self.title,
            url: self.absolute_url,
            location: self.location.name,
            id: self.id,
            employment: metadata.employment,
            date: metadata.date,
            department: metadata.department,
            management: metadata.management,
            office: metadata.office,
            core_skills: metadata.core_skills,
        })
    }

    pub(crate) fn into_detail(self) -> Result<VacancyDetail, FeedError> {
        let metadata = JobMetadata::resolve(self.id, self.metadata.as_deref().unwrap_or_default())?;
        Ok(VacancyDetail {
            title: self.title,
            content: sanitize_html(&unescape_html(self.content.as_deref().unwrap_or_default())),
            location: self.location.name,
            department: metadata.department,
        })
    }
}
