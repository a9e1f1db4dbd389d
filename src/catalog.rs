//! Poster template catalog
//!
//! Templates are read-only records. The built-in [`InMemoryCatalog`] stands in
//! for the remote poster catalog; [`HttpCatalog`] reads the same shape from
//! the poster API.

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

/// Category name that matches every template
pub const ALL_CATEGORIES: &str = "All";

/// A predefined poster background a user customizes with personal details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PosterTemplate {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub download_count: u64,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub image_url: Option<String>,
}

impl PosterTemplate {
    pub fn new(id: &str, title: &str, category: &str, download_count: u64, image_url: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            category: category.to_string(),
            download_count,
            image_url: image_url.filter(|u| !u.trim().is_empty()).map(str::to_string),
        }
    }

    /// The template's image URL, if it has a photographic banner
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Source of poster templates
#[async_trait]
pub trait TemplateSource: Send + Sync {
    async fn templates(&self) -> Result<Vec<PosterTemplate>>;
}

/// Static template list created at startup and never mutated
#[derive(Debug, Clone)]
pub struct InMemoryCatalog {
    templates: Vec<PosterTemplate>,
}

impl InMemoryCatalog {
    pub fn new(templates: Vec<PosterTemplate>) -> Self {
        Self { templates }
    }

    /// Catalog shipped with the app
    pub fn builtin() -> Self {
        Self::new(vec![
            PosterTemplate::new(
                "akhilesh-poster",
                "Akhilesh Poster",
                "Leaders",
                1240,
                Some("https://assets.samajwaditechforce.org/posters/akhilesh.jpg"),
            ),
            PosterTemplate::new(
                "cycle-yatra",
                "Cycle Yatra",
                "Events",
                860,
                Some("https://assets.samajwaditechforce.org/posters/cycle-yatra.jpg"),
            ),
            PosterTemplate::new(
                "holi-greetings",
                "Holi Greetings",
                "Festivals",
                2315,
                Some("https://assets.samajwaditechforce.org/posters/holi.jpg"),
            ),
            PosterTemplate::new(
                "booth-sammelan",
                "Booth Sammelan",
                "Events",
                412,
                Some("https://assets.samajwaditechforce.org/posters/booth-sammelan.jpg"),
            ),
            PosterTemplate::new("jan-sampark", "Jan Sampark Abhiyan", "Campaign", 95, None),
        ])
    }

    pub fn all(&self) -> &[PosterTemplate] {
        &self.templates
    }

    pub fn find(&self, id: &str) -> Option<PosterTemplate> {
        self.templates.iter().find(|t| t.id == id).cloned()
    }

    /// Distinct categories in first-seen order, led by "All"
    pub fn categories(&self) -> Vec<String> {
        categories(&self.templates)
    }

    pub fn filter(&self, category: Option<&str>, query: &str) -> Vec<PosterTemplate> {
        filter_templates(&self.templates, category, query)
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[async_trait]
impl TemplateSource for InMemoryCatalog {
    async fn templates(&self) -> Result<Vec<PosterTemplate>> {
        Ok(self.templates.clone())
    }
}

pub fn categories(templates: &[PosterTemplate]) -> Vec<String> {
    let mut out = vec![ALL_CATEGORIES.to_string()];
    for t in templates {
        if !t.category.is_empty() && !out.iter().any(|c| c == &t.category) {
            out.push(t.category.clone());
        }
    }
    out
}

/// Category match ("All" or None matches everything) and case-insensitive title search
pub fn filter_templates(templates: &[PosterTemplate], category: Option<&str>, query: &str) -> Vec<PosterTemplate> {
    let needle = query.trim().to_lowercase();
    templates
        .iter()
        .filter(|t| match category {
            None => true,
            Some(c) if c == ALL_CATEGORIES => true,
            Some(c) => t.category == c,
        })
        .filter(|t| needle.is_empty() || t.title.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Template list served by the poster API (`GET {base}/posters`)
#[cfg(feature = "remote")]
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
}

#[cfg(feature = "remote")]
impl HttpCatalog {
    pub fn new(base_url: &str, config: &crate::StudioConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| crate::Error::InitializationError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[cfg(feature = "remote")]
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogResponse {
    Wrapped { posters: Vec<PosterTemplate> },
    Bare(Vec<PosterTemplate>),
}

#[cfg(feature = "remote")]
#[async_trait]
impl TemplateSource for HttpCatalog {
    async fn templates(&self) -> Result<Vec<PosterTemplate>> {
        let url = format!("{}/posters", self.base_url);
        let res = self.client.get(&url).send().await?;
        if !res.status().is_success() {
            return Err(crate::Error::NetworkError(format!("GET {} returned {}", url, res.status())));
        }
        let body = res.text().await?;
        let templates = match serde_json::from_str::<CatalogResponse>(&body)? {
            CatalogResponse::Wrapped { posters } => posters,
            CatalogResponse::Bare(list) => list,
        };
        log::debug!("catalog: fetched {} templates from {}", templates.len(), url);
        Ok(templates)
    }
}
