//! Catalog types and boundary normalization.

use melo_core::{Track, TrackId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::warn;

/// Default content provider address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

/// Default catalog language code.
pub const DEFAULT_LANG: &str = "ta";

/// Configuration for connecting to the content provider.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Provider base URL (e.g., "http://localhost:3001")
    pub base_url: String,

    /// Language used when a call does not name one
    pub default_lang: String,

    /// Total request timeout
    pub timeout: Duration,
}

impl CatalogConfig {
    /// Create a new config with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            default_lang: DEFAULT_LANG.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_default_lang(mut self, lang: impl Into<String>) -> Self {
        self.default_lang = lang.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Album card as listed by the home feed and search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumSummary {
    pub title: String,

    /// Full album page URL, passed back to `album_details`
    pub page_url: String,

    #[serde(default)]
    pub image_url: Option<String>,

    /// Free-form subtitle (year, director...)
    #[serde(default)]
    pub details: Option<String>,

    #[serde(default)]
    pub lang: Option<String>,
}

/// Latest albums per language, keyed by language name ("tamil", "hindi"...).
pub type HomeFeed = BTreeMap<String, Vec<AlbumSummary>>;

/// Album page with its normalized tracklist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumDetails {
    pub title: String,
    pub image: Option<String>,

    /// Navigation trail; the last element is the album's display name
    pub breadcrumbs: Vec<String>,

    /// Tracks in album order, each stamped with the album page and language
    pub tracks: Vec<Track>,

    pub lang: String,
}

impl AlbumDetails {
    /// Display name: last breadcrumb, falling back to the title
    pub fn display_name(&self) -> &str {
        self.breadcrumbs
            .last()
            .map_or(self.title.as_str(), String::as_str)
    }
}

/// Titled link on a language home page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub title: String,
    pub path: String,
}

/// Curated lists of a language home page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageHome {
    #[serde(default)]
    pub trending: Vec<Link>,
    #[serde(default)]
    pub top_directors: Vec<Link>,
}

// ===== Wire shapes =====

/// Album payload as sent by the provider; tracks are normalized separately.
#[derive(Debug, Deserialize)]
pub(crate) struct AlbumResponse {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub breadcrumbs: Vec<String>,
    #[serde(default)]
    pub tracks: Vec<Value>,
}

/// Loosely-typed track entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTrack {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    artists: Option<String>,
    #[serde(default)]
    album_name: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    audio_url: Option<String>,
}

fn normalize_id(id: &Value) -> Option<TrackId> {
    match id {
        Value::Number(n) => n
            .as_u64()
            .map(TrackId::from)
            .or_else(|| n.as_i64().map(|i| TrackId::new(i.to_string()))),
        Value::String(s) if !s.trim().is_empty() => Some(TrackId::new(s.trim())),
        _ => None,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Validate one provider entry into a `Track` bound to its album page.
///
/// Entries without a usable id, title or audio locator are dropped.
pub(crate) fn normalize_track(raw: Value, page_url: &str, lang: &str) -> Option<Track> {
    let raw: RawTrack = match serde_json::from_value(raw) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "Dropping unparseable track entry");
            return None;
        }
    };

    let Some(id) = normalize_id(&raw.id) else {
        warn!(id = %raw.id, "Dropping track entry without a usable id");
        return None;
    };

    let track = match Track::try_new(
        id,
        raw.title.unwrap_or_default(),
        raw.audio_url.unwrap_or_default(),
    ) {
        Ok(track) => track,
        Err(e) => {
            warn!(error = %e, "Dropping invalid track entry");
            return None;
        }
    };

    let mut track = track
        .with_artists(raw.artists.unwrap_or_default())
        .with_album(page_url, lang);
    track.album_name = non_empty(raw.album_name);
    track.image_url = non_empty(raw.image_url);
    Some(track)
}
