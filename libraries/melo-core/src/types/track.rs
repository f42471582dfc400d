/// Track domain type
use crate::error::{MeloError, Result};
use crate::types::{TrackId, TracklistRef};
use serde::{Deserialize, Serialize};

/// Playable track
///
/// Immutable once fetched. Copies live in the queue, the library caches and
/// the current tracklist at the same time; they are matched by `id`, never
/// by address.
///
/// Field names are camelCase on the wire so that snapshots written by other
/// clients of the same persistence provider stay readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Stable track identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist credit as shown by the provider
    #[serde(default)]
    pub artists: String,

    /// Album name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_name: Option<String>,

    /// Cover image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Direct playable locator
    pub audio_url: String,

    /// Album page this track was fetched from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_page_url: Option<String>,

    /// Catalog language code of the album page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl Track {
    /// Create a track with the mandatory fields only
    pub fn new(
        id: impl Into<TrackId>,
        title: impl Into<String>,
        audio_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artists: String::new(),
            album_name: None,
            image_url: None,
            audio_url: audio_url.into(),
            album_page_url: None,
            lang: None,
        }
    }

    /// Create a track from untrusted input
    ///
    /// Surrounding whitespace is trimmed; a blank id, title or audio locator
    /// is rejected.
    pub fn try_new(
        id: impl Into<TrackId>,
        title: impl Into<String>,
        audio_url: impl Into<String>,
    ) -> Result<Self> {
        let id = id.into();
        let title = title.into();
        let audio_url = audio_url.into();

        if id.as_str().trim().is_empty() {
            return Err(MeloError::invalid_track("missing id"));
        }
        if title.trim().is_empty() {
            return Err(MeloError::invalid_track(format!("track {} has no title", id)));
        }
        if audio_url.trim().is_empty() {
            return Err(MeloError::invalid_track(format!("track {} has no audio URL", id)));
        }

        Ok(Self::new(
            TrackId::new(id.as_str().trim()),
            title.trim(),
            audio_url.trim(),
        ))
    }

    /// Set the artist credit
    pub fn with_artists(mut self, artists: impl Into<String>) -> Self {
        self.artists = artists.into();
        self
    }

    /// Set the cover image
    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// Attach the album page the track belongs to
    pub fn with_album(mut self, page_url: impl Into<String>, lang: impl Into<String>) -> Self {
        self.album_page_url = Some(page_url.into());
        self.lang = Some(lang.into());
        self
    }

    /// Identity of the tracklist this track was fetched from, if both the
    /// album page and its language are known
    pub fn tracklist_ref(&self) -> Option<TracklistRef> {
        match (&self.album_page_url, &self.lang) {
            (Some(path), Some(lang)) => Some(TracklistRef::new(path.clone(), lang.clone())),
            _ => None,
        }
    }
}
