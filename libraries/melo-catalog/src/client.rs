//! Content provider client.

use crate::error::{CatalogError, Result};
use crate::types::{
    normalize_track, AlbumDetails, AlbumResponse, AlbumSummary, CatalogConfig, HomeFeed,
    LanguageHome,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Read-only client for the content provider.
///
/// Every public operation is lenient: network and parse failures are logged
/// and surface as `None` or an empty list, never as an error.
///
/// # Example
///
/// ```ignore
/// use melo_catalog::{CatalogClient, CatalogConfig};
///
/// let client = CatalogClient::new(CatalogConfig::new("http://localhost:3001"))?;
///
/// for album in client.search("anirudh", None).await {
///     println!("{} -> {}", album.title, album.page_url);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Client,
    base_url: String,
    default_lang: String,
}

impl CatalogClient {
    /// Create a new client with the given configuration.
    pub fn new(config: CatalogConfig) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(CatalogError::InvalidUrl("URL cannot be empty".into()));
        }

        let base_url = config.base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(CatalogError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("Melo/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            default_lang: config.default_lang,
        })
    }

    /// Normalized provider URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Language used when a call does not name one.
    pub fn default_lang(&self) -> &str {
        &self.default_lang
    }

    // ===== Lenient operations =====

    /// Latest albums per language.
    pub async fn home_feed(&self) -> Option<HomeFeed> {
        self.fetch_home_feed()
            .await
            .map_err(|e| warn!(error = %e, "Home feed unavailable"))
            .ok()
    }

    /// Albums matching `keyword`. An empty keyword yields nothing.
    pub async fn search(&self, keyword: &str, lang: Option<&str>) -> Vec<AlbumSummary> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Vec::new();
        }

        self.fetch_search(keyword, lang)
            .await
            .map_err(|e| warn!(keyword, error = %e, "Search failed"))
            .unwrap_or_default()
    }

    /// Album page with its tracks, each stamped with `page_url` and the language.
    pub async fn album_details(&self, page_url: &str, lang: Option<&str>) -> Option<AlbumDetails> {
        self.fetch_album_details(page_url, lang)
            .await
            .map_err(|e| warn!(page_url, error = %e, "Album details unavailable"))
            .ok()
    }

    /// Trending albums and top music directors of a language.
    pub async fn language_home(&self, lang: Option<&str>) -> Option<LanguageHome> {
        self.fetch_language_home(lang)
            .await
            .map_err(|e| warn!(error = %e, "Language home unavailable"))
            .ok()
    }

    // ===== Requests =====

    fn lang<'a>(&'a self, lang: Option<&'a str>) -> &'a str {
        lang.filter(|l| !l.is_empty()).unwrap_or(&self.default_lang)
    }

    async fn fetch_home_feed(&self) -> Result<HomeFeed> {
        let body = self.get_json("getHomeFeed", &[]).await?;

        let Value::Object(languages) = body else {
            return Err(CatalogError::ParseError(
                "home feed is not keyed by language".into(),
            ));
        };

        let feed: HomeFeed = languages
            .into_iter()
            .map(|(language, albums)| (language, summaries(albums)))
            .collect();

        info!(languages = feed.len(), "Fetched home feed");
        Ok(feed)
    }

    async fn fetch_search(&self, keyword: &str, lang: Option<&str>) -> Result<Vec<AlbumSummary>> {
        let lang = self.lang(lang);
        let body = self
            .get_json("search", &[("keyword", keyword), ("lang", lang)])
            .await?;

        let results = summaries(body);
        debug!(keyword, lang, count = results.len(), "Search results");
        Ok(results)
    }

    async fn fetch_album_details(&self, page_url: &str, lang: Option<&str>) -> Result<AlbumDetails> {
        let lang = self.lang(lang).to_string();
        let page = Url::parse(page_url)
            .map_err(|e| CatalogError::InvalidUrl(format!("{}: {}", page_url, e)))?;

        // The provider resolves the path against its own site
        let body = self
            .get_json("getAlbumDetails", &[("path", page.path()), ("lang", lang.as_str())])
            .await?;
        let album: AlbumResponse = parse(body, "album details")?;

        let total = album.tracks.len();
        let tracks: Vec<_> = album
            .tracks
            .into_iter()
            .filter_map(|raw| normalize_track(raw, page_url, &lang))
            .collect();

        if tracks.len() < total {
            warn!(page_url, dropped = total - tracks.len(), "Dropped malformed tracks");
        }
        debug!(page_url, tracks = tracks.len(), "Fetched album");

        Ok(AlbumDetails {
            title: album.title,
            image: album.image,
            breadcrumbs: album.breadcrumbs,
            tracks,
            lang,
        })
    }

    async fn fetch_language_home(&self, lang: Option<&str>) -> Result<LanguageHome> {
        let lang = self.lang(lang);
        let body = self.get_json("getLanguageHomePage", &[("lang", lang)]).await?;
        parse(body, "language home")
    }

    async fn get_json(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(url = %url, ?query, "Catalog request");

        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CatalogError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::ParseError(format!("{} response: {}", endpoint, e)))
    }
}

/// Decode an object payload. The provider answers failures with a bare `[]`.
fn parse<T: DeserializeOwned>(body: Value, what: &str) -> Result<T> {
    if !body.is_object() {
        return Err(CatalogError::ParseError(format!("{} unavailable", what)));
    }
    serde_json::from_value(body).map_err(|e| CatalogError::ParseError(format!("{}: {}", what, e)))
}

/// Album cards of a list payload, skipping malformed entries.
fn summaries(body: Value) -> Vec<AlbumSummary> {
    let Value::Array(entries) = body else {
        return Vec::new();
    };

    entries
        .into_iter()
        .filter_map(|entry| {
            serde_json::from_value(entry)
                .map_err(|e| debug!(error = %e, "Skipping malformed album entry"))
                .ok()
        })
        .collect()
}
