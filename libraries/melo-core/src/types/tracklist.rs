/// Tracklist context types
use crate::types::{Track, TrackId};
use serde::{Deserialize, Serialize};

/// Identity of an ordered tracklist (an album page in a catalog language)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TracklistRef {
    /// Album page locator
    pub path: String,

    /// Catalog language code
    pub lang: String,
}

impl TracklistRef {
    /// Create a tracklist identity
    pub fn new(path: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            lang: lang.into(),
        }
    }
}

/// Ordered list the current track belongs to
///
/// Used only to compute next/previous. Replaced wholesale whenever a track is
/// loaded with a new context.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TracklistContext {
    tracks: Vec<Track>,
    identity: Option<TracklistRef>,
}

impl TracklistContext {
    /// Create a context from an ordered list
    pub fn new(tracks: Vec<Track>, identity: Option<TracklistRef>) -> Self {
        Self { tracks, identity }
    }

    /// Single-element context carrying only `track`
    ///
    /// The identity is taken from the track's own album page, if any.
    pub fn single(track: Track) -> Self {
        let identity = track.tracklist_ref();
        Self {
            tracks: vec![track],
            identity,
        }
    }

    /// Context derived from the track's album page, if it has one
    pub fn derived_from(track: &Track) -> Option<Self> {
        track.tracklist_ref().map(|identity| Self {
            tracks: vec![track.clone()],
            identity: Some(identity),
        })
    }

    /// Tracks in order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Identifying metadata (album page + language)
    pub fn identity(&self) -> Option<&TracklistRef> {
        self.identity.as_ref()
    }

    /// Position of `id` in the list (linear, contexts are album-sized)
    pub fn position(&self, id: &TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| &t.id == id)
    }

    /// Track at `index`
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the list holds no tracks
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
