//! Catalog entities and their wire shapes

use serde::{Deserialize, Serialize};

use super::error::{CatalogError, CatalogResult};

/// Kind of title in the catalog.
///
/// Serialized as `movie` / `series` toward the engine; the catalog API spells
/// series as `tv`, which is also accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    #[serde(alias = "tv")]
    Series,
}

impl MediaType {
    /// Spelling used by the catalog API
    pub fn as_catalog_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Series => "tv",
        }
    }

    /// Parse either the domain or the catalog spelling
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "movie" => Some(MediaType::Movie),
            "series" | "tv" => Some(MediaType::Series),
            _ => None,
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaType::Movie => write!(f, "movie"),
            MediaType::Series => write!(f, "series"),
        }
    }
}

/// A normalized search hit.
///
/// Optional fields stay absent when the catalog did not provide them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    #[serde(rename = "id")]
    pub external_id: u64,
    pub media_type: MediaType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
}

/// What to ask the server for.
///
/// `seasons` only applies to series. `None` means "let the server decide",
/// which in practice requests every available season; it does not mean zero
/// seasons. The catalog API leaves this open and so does this client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRequestSpec {
    pub media_id: u64,
    pub media_type: MediaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasons: Option<Vec<u32>>,
}

impl MediaRequestSpec {
    /// Build a validated spec.
    ///
    /// An empty season list collapses to `None`; seasons on a movie are
    /// dropped.
    pub fn new(
        media_id: u64,
        media_type: MediaType,
        seasons: Option<Vec<u32>>,
    ) -> CatalogResult<Self> {
        if media_id == 0 {
            return Err(CatalogError::Validation(
                "mediaId must be a positive catalog identifier".to_string(),
            ));
        }

        let seasons = match (media_type, seasons) {
            (MediaType::Series, Some(s)) if !s.is_empty() => Some(s),
            (MediaType::Movie, Some(s)) if !s.is_empty() => {
                tracing::debug!("Dropping seasons {:?} on movie request {}", s, media_id);
                None
            }
            _ => None,
        };

        Ok(Self {
            media_id,
            media_type,
            seasons,
        })
    }
}

/// Paginated envelope returned by the search endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchEnvelope {
    #[allow(dead_code)]
    #[serde(default)]
    pub page: u32,
    #[allow(dead_code)]
    #[serde(default)]
    pub total_pages: u32,
    #[allow(dead_code)]
    #[serde(default)]
    pub total_results: u32,
    #[serde(default)]
    pub results: Vec<RawSearchEntry>,
}

/// One heterogeneous search entry: movies use `title`/`releaseDate`, series
/// use `name`/`firstAirDate`, people carry neither media type.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawSearchEntry {
    pub id: Option<u64>,
    pub media_type: Option<String>,
    pub title: Option<String>,
    pub name: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl RawSearchEntry {
    /// Map into a [`MediaItem`], or `None` for entries that are not titles
    pub fn into_media_item(self) -> Option<MediaItem> {
        let media_type = self.media_type.as_deref().and_then(MediaType::parse)?;
        let external_id = self.id?;
        let title = non_empty(self.title).or_else(|| non_empty(self.name))?;

        Some(MediaItem {
            external_id,
            media_type,
            title,
            release_date: non_empty(self.release_date).or_else(|| non_empty(self.first_air_date)),
            overview: non_empty(self.overview),
            poster_path: non_empty(self.poster_path),
        })
    }
}

/// Body of `POST /request`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RequestBody<'a> {
    pub media_id: u64,
    pub media_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seasons: Option<&'a [u32]>,
    #[serde(rename = "is4k")]
    pub is_4k: bool,
}

impl<'a> From<&'a MediaRequestSpec> for RequestBody<'a> {
    fn from(spec: &'a MediaRequestSpec) -> Self {
        Self {
            media_id: spec.media_id,
            media_type: spec.media_type.as_catalog_str(),
            seasons: spec.seasons.as_deref(),
            // 4K requests are never offered
            is_4k: false,
        }
    }
}

/// Error body the catalog returns on rejection
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}
