//! Tool registry
//!
//! The fixed set of tools declared to the reasoning engine, plus typed
//! decoding of the arguments the engine sends back.

use serde_json::{json, Map, Value};

use crate::agents::domain::ToolDefinition;
use crate::catalog::{CatalogError, CatalogResult, MediaRequestSpec, MediaType};

pub const SEARCH_MEDIA: &str = "search_media";
pub const REQUEST_MEDIA: &str = "request_media";

/// Static tool declarations handed to every engine round
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolRegistry;

impl ToolRegistry {
    pub fn new() -> Self {
        Self
    }

    /// Names of all declared tools, in declaration order
    pub fn names(&self) -> [&'static str; 2] {
        [SEARCH_MEDIA, REQUEST_MEDIA]
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.names().contains(&name)
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        vec![
            ToolDefinition::new(
                SEARCH_MEDIA,
                "Search for movies or TV shows in the media catalog to get their ID and details. \
                 Always search before requesting to ensure you have the correct ID.",
                json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "The title of the movie or TV show to search for."
                        }
                    },
                    "required": ["query"]
                }),
            ),
            ToolDefinition::new(
                REQUEST_MEDIA,
                "Request a movie or TV show on the media server. \
                 REQUIRES the exact mediaId found via search_media.",
                json!({
                    "type": "object",
                    "properties": {
                        "mediaId": {
                            "type": "number",
                            "description": "The catalog (TMDB) ID of the media, taken from a search_media result."
                        },
                        "mediaType": {
                            "type": "string",
                            "description": "Either \"movie\" or \"series\".",
                            "enum": ["movie", "series"],
                            "format": "enum"
                        },
                        "title": {
                            "type": "string",
                            "description": "The title of the media (for confirmation context)."
                        },
                        "seasons": {
                            "type": "array",
                            "description": "Season numbers to request (series only). Omitting it lets \
                                            the server decide, which usually means all available \
                                            seasons; ask the user if unsure.",
                            "items": { "type": "number" }
                        }
                    },
                    "required": ["mediaId", "mediaType", "title"]
                }),
            ),
        ]
    }
}

fn arguments_object(arguments: &Value) -> CatalogResult<&Map<String, Value>> {
    arguments
        .as_object()
        .ok_or_else(|| CatalogError::Validation("arguments must be an object".to_string()))
}

/// Engines often send integers as floats (`1396.0`); accept those when integral
fn as_whole_number(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
        Some(f as u64)
    } else {
        None
    }
}

/// Arguments of `search_media`
#[derive(Debug, Clone, PartialEq)]
pub struct SearchMediaArgs {
    pub query: String,
}

impl SearchMediaArgs {
    pub fn from_arguments(arguments: &Value) -> CatalogResult<Self> {
        let query = arguments_object(arguments)?
            .get("query")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| CatalogError::Validation("query is required".to_string()))?;

        Ok(Self {
            query: query.to_string(),
        })
    }
}

/// Arguments of `request_media`
#[derive(Debug, Clone, PartialEq)]
pub struct RequestMediaArgs {
    pub media_id: u64,
    pub media_type: MediaType,
    /// Only used to confirm back to the user, never for lookup
    pub title: String,
    pub seasons: Option<Vec<u32>>,
}

impl RequestMediaArgs {
    pub fn from_arguments(arguments: &Value) -> CatalogResult<Self> {
        let args = arguments_object(arguments)?;

        let media_id = args
            .get("mediaId")
            .and_then(as_whole_number)
            .filter(|id| *id > 0)
            .ok_or_else(|| {
                CatalogError::Validation(
                    "mediaId must be a positive number from a search_media result".to_string(),
                )
            })?;

        let media_type = args
            .get("mediaType")
            .and_then(Value::as_str)
            .and_then(MediaType::parse)
            .ok_or_else(|| {
                CatalogError::Validation("mediaType must be \"movie\" or \"series\"".to_string())
            })?;

        let title = args
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let seasons = match args.get("seasons") {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) => Some(
                items
                    .iter()
                    .map(|v| {
                        as_whole_number(v)
                            .and_then(|n| u32::try_from(n).ok())
                            .ok_or_else(|| {
                                CatalogError::Validation(format!(
                                    "invalid season number: {}",
                                    v
                                ))
                            })
                    })
                    .collect::<CatalogResult<Vec<u32>>>()?,
            ),
            Some(other) => {
                return Err(CatalogError::Validation(format!(
                    "seasons must be a list of numbers, got {}",
                    other
                )))
            }
        };

        Ok(Self {
            media_id,
            media_type,
            title,
            seasons,
        })
    }

    /// Validated spec for the catalog client
    pub fn into_spec(self) -> CatalogResult<MediaRequestSpec> {
        MediaRequestSpec::new(self.media_id, self.media_type, self.seasons)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_declares_both_tools() {
        let registry = ToolRegistry::new();
        let defs = registry.definitions();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].name, SEARCH_MEDIA);
        assert_eq!(defs[1].name, REQUEST_MEDIA);
        assert_eq!(defs[1].parameters["required"], json!(["mediaId", "mediaType", "title"]));
        assert!(registry.is_declared("search_media"));
        assert!(!registry.is_declared("delete_media"));
    }

    #[test]
    fn test_search_args() {
        let args = SearchMediaArgs::from_arguments(&json!({ "query": " Inception " })).unwrap();
        assert_eq!(args.query, "Inception");
        assert!(SearchMediaArgs::from_arguments(&json!({ "query": "" })).is_err());
        assert!(SearchMediaArgs::from_arguments(&json!("Inception")).is_err());
    }

    #[test]
    fn test_request_args_accept_float_numbers() {
        let args = RequestMediaArgs::from_arguments(&json!({
            "mediaId": 1396.0,
            "mediaType": "series",
            "title": "The Wire",
            "seasons": [1.0, 2]
        }))
        .unwrap();
        assert_eq!(args.media_id, 1396);
        assert_eq!(args.media_type, MediaType::Series);
        assert_eq!(args.seasons, Some(vec![1, 2]));

        let spec = args.into_spec().unwrap();
        assert_eq!(spec.seasons, Some(vec![1, 2]));
    }

    #[test]
    fn test_request_args_reject_missing_id() {
        let err = RequestMediaArgs::from_arguments(&json!({
            "mediaType": "movie",
            "title": "Inception"
        }))
        .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));

        assert!(RequestMediaArgs::from_arguments(&json!({
            "mediaId": 12.5,
            "mediaType": "movie",
            "title": "Inception"
        }))
        .is_err());
    }

    #[test]
    fn test_request_args_reject_bad_type_and_seasons() {
        assert!(RequestMediaArgs::from_arguments(&json!({
            "mediaId": 1,
            "mediaType": "person",
            "title": "X"
        }))
        .is_err());

        assert!(RequestMediaArgs::from_arguments(&json!({
            "mediaId": 1,
            "mediaType": "tv",
            "title": "X",
            "seasons": "all"
        }))
        .is_err());
    }
}
