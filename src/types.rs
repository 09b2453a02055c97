use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The persisted user credential.
///
/// Every field is optional because the stored document may be partially
/// populated: a fresh install has no credential at all, and a refresh
/// response usually carries no new refresh token. A credential without
/// `expires_at` is treated as expired.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Absolute expiry in Unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

/// Body of a token endpoint response, for every grant type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    /// Relative lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Cache validators captured from a show metadata response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpCacheHeaders {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

impl HttpCacheHeaders {
    pub fn is_empty(&self) -> bool {
        self.etag.is_none() && self.last_modified.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
}

/// Show metadata as returned by `GET /shows/{id}` and as persisted in the
/// cache document.
///
/// Fields the crate reads are typed; everything else the API sends is kept
/// verbatim in `extra` so the persisted entry mirrors the response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShowInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(rename = "_headers", default, skip_serializing_if = "HttpCacheHeaders::is_empty")]
    pub headers: HttpCacheHeaders,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ShowInfo {
    /// The cover image the host displays: the second listed image (the
    /// medium rendition), or the only one when there is just one.
    pub fn cover_image_url(&self) -> Option<&str> {
        self.images
            .get(1)
            .or_else(|| self.images.first())
            .map(|image| image.url.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: String,
}

/// One item of the `GET /shows/{id}/episodes` page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub release_date: String,
    #[serde(default)]
    pub release_date_precision: Option<String>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpisodePage {
    #[serde(default)]
    pub items: Vec<Episode>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// A normalized episode in the shape the host's episode factory expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeRecord {
    pub guid: String,
    pub title: String,
    pub description: String,
    pub link: String,
    pub url: String,
    /// Unix seconds of local midnight on the release day.
    pub published: i64,
    pub total_time: f64,
    pub file_size: i64,
    pub mime_type: &'static str,
}

/// The PKCE secrets of one authorization attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationSession {
    pub code_verifier: String,
    pub state: String,
}
