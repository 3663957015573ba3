//! Partner directory backed by the partners service.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::http::{HttpGateway, UpstreamError};

/// Partner record; only `name` is interpreted, the rest passes through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub name: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl Partner {
    pub fn text(&self, field: &str) -> Option<&str> {
        self.details.get(field).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartnerCategory {
    Desktop,
    PublicCloud,
    Gsi,
    IhvAndOem,
    ChannelAndReseller,
}

impl PartnerCategory {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Desktop,
            Self::PublicCloud,
            Self::Gsi,
            Self::IhvAndOem,
            Self::ChannelAndReseller,
        ]
    }

    /// Maps the `/partners/{segment}` path segment to a category.
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "desktop" => Some(Self::Desktop),
            "public-cloud" => Some(Self::PublicCloud),
            "gsi" => Some(Self::Gsi),
            "ihv-and-oem" | "ihv-oem" => Some(Self::IhvAndOem),
            "channel-and-reseller" => Some(Self::ChannelAndReseller),
            _ => None,
        }
    }

    pub const fn segment(self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::PublicCloud => "public-cloud",
            Self::Gsi => "gsi",
            Self::IhvAndOem => "ihv-and-oem",
            Self::ChannelAndReseller => "channel-and-reseller",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Desktop => "Desktop",
            Self::PublicCloud => "Public cloud",
            Self::Gsi => "Global system integrators",
            Self::IhvAndOem => "IHV and OEM",
            Self::ChannelAndReseller => "Channel and reseller",
        }
    }

    /// Query string selecting the category on the partners service.
    pub const fn query(self) -> &'static str {
        match self {
            Self::Desktop => "?programme__name=Desktop",
            Self::PublicCloud => "?programme__name=Public%20Cloud",
            Self::Gsi => "?programme__name=Global%20System%20Integrator",
            Self::IhvAndOem => "?programme__name=IHV%20and%20OEM",
            Self::ChannelAndReseller => "?programme__name=Channel%20and%20Reseller",
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PartnerPayload {
    List(Vec<Partner>),
    Wrapped { results: Vec<Partner> },
}

#[derive(Clone)]
pub struct PartnersClient {
    gateway: Arc<dyn HttpGateway>,
    api_url: String,
}

impl std::fmt::Debug for PartnersClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartnersClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl PartnersClient {
    pub fn new(gateway: Arc<dyn HttpGateway>, api_url: impl Into<String>) -> Self {
        Self {
            gateway,
            api_url: api_url.into(),
        }
    }

    async fn fetch(&self, query: &str) -> Result<Vec<Partner>, PartnerError> {
        let url = format!("{}{}", self.api_url, query);
        let payload = self.gateway.get_json(&url).await?;
        let partners = match serde_json::from_value(payload) {
            Ok(PartnerPayload::List(partners)) => partners,
            Ok(PartnerPayload::Wrapped { results }) => results,
            Err(err) => {
                return Err(PartnerError::Schema {
                    url,
                    message: err.to_string(),
                })
            }
        };
        debug!(%url, partners = partners.len(), "fetched partners");
        Ok(partners)
    }

    pub async fn list_partners(&self, sorted: bool) -> Result<Vec<Partner>, PartnerError> {
        let mut partners = self.fetch("").await?;
        if sorted {
            partners.sort_by(|a, b| a.name.cmp(&b.name));
        }
        Ok(partners)
    }

    pub async fn list_partners_for_category(
        &self,
        category: PartnerCategory,
    ) -> Result<Vec<Partner>, PartnerError> {
        self.fetch(category.query()).await
    }

    /// Partners of every category, for the landing page.
    pub async fn list_partner_groups(
        &self,
    ) -> Result<BTreeMap<PartnerCategory, Vec<Partner>>, PartnerError> {
        let mut groups = BTreeMap::new();
        for category in PartnerCategory::ordered() {
            groups.insert(category, self.list_partners_for_category(category).await?);
        }
        Ok(groups)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PartnerError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("partner listing at {url} has an unexpected shape: {message}")]
    Schema { url: String, message: String },
}
