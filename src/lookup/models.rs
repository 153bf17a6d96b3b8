//! Lookup result models and response shaping

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default number of visual matches kept by the projected response
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Provider document key holding the ordered match list
pub const VISUAL_MATCHES_KEY: &str = "visual_matches";

/// One visual match reduced to the fields callers receive
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl MatchResult {
    /// Build from one provider match element, ignoring every other field
    pub fn from_provider_match(element: &Value) -> Self {
        let field = |name: &str| element.get(name).and_then(Value::as_str).map(str::to_string);

        Self {
            title: field("title"),
            thumbnail: field("thumbnail"),
            link: field("link"),
            source: field("source"),
        }
    }
}

/// How the provider document is returned to the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseShape {
    /// Provider document passed through unchanged
    Full,
    /// Leading matches reduced to title, thumbnail, link and source
    #[default]
    Projected,
}

impl ResponseShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Projected => "projected",
        }
    }
}

/// Shaped result of one lookup
#[derive(Debug, Clone, PartialEq)]
pub enum IdentifyResult {
    Full(Value),
    Projected(Vec<MatchResult>),
}

impl IdentifyResult {
    /// Shape a provider document
    pub fn from_document(document: Value, shape: ResponseShape, max_results: usize) -> Self {
        match shape {
            ResponseShape::Full => Self::Full(document),
            ResponseShape::Projected => Self::Projected(project_matches(&document, max_results)),
        }
    }

    /// Number of visual matches represented by this result
    pub fn match_count(&self) -> usize {
        match self {
            Self::Full(document) => visual_matches(document).len(),
            Self::Projected(results) => results.len(),
        }
    }

    /// Matches in provider order, reduced to the permitted fields
    pub fn matches(&self) -> Vec<MatchResult> {
        match self {
            Self::Full(document) => project_matches(document, usize::MAX),
            Self::Projected(results) => results.clone(),
        }
    }
}

/// Wire form of a projected result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectedResponse {
    pub results: Vec<MatchResult>,
}

impl Serialize for IdentifyResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Full(document) => document.serialize(serializer),
            Self::Projected(results) => ProjectedResponse {
                results: results.clone(),
            }
            .serialize(serializer),
        }
    }
}

/// The provider's match list; missing or non-array means empty
pub fn visual_matches(document: &Value) -> &[Value] {
    document
        .get(VISUAL_MATCHES_KEY)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// First `limit` visual matches in provider order
pub fn project_matches(document: &Value, limit: usize) -> Vec<MatchResult> {
    visual_matches(document)
        .iter()
        .take(limit)
        .map(MatchResult::from_provider_match)
        .collect()
}
