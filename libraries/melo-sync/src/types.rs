//! Remote collection names and the cached views built from them

use melo_core::{Track, TrackId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Per-user collection of id-keyed documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    Favorites,
    LibraryTracks,
    History,
}

impl Collection {
    /// Name of the collection in the persistence provider
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Favorites => "favorites",
            Self::LibraryTracks => "libraryTracks",
            Self::History => "history",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-user singleton document holding an ordered id list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderList {
    FavoritesOrder,
    LibraryOrder,
}

impl OrderList {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FavoritesOrder => "favoritesOrder",
            Self::LibraryOrder => "libraryOrder",
        }
    }
}

impl fmt::Display for OrderList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which set + ordering pair a `LibrarySync` mirrors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectionKind {
    Favorites,
    Library,
}

impl CollectionKind {
    pub fn collection(self) -> Collection {
        match self {
            Self::Favorites => Collection::Favorites,
            Self::Library => Collection::LibraryTracks,
        }
    }

    pub fn order_list(self) -> OrderList {
        match self {
            Self::Favorites => OrderList::FavoritesOrder,
            Self::Library => OrderList::LibraryOrder,
        }
    }
}

/// A stored document: id plus loosely-typed payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

/// Local cache of one favorites/library pair
///
/// Rebuilt wholesale from every snapshot; never patched. Members and order
/// are written separately and may disagree: an ordered id without a member is
/// skipped, a member without an ordered id is hidden.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibraryView {
    members: HashMap<TrackId, Track>,
    order: Vec<TrackId>,
}

impl LibraryView {
    pub fn new(members: HashMap<TrackId, Track>, order: Vec<TrackId>) -> Self {
        Self { members, order }
    }

    pub fn contains(&self, id: &TrackId) -> bool {
        self.members.contains_key(id)
    }

    pub fn get(&self, id: &TrackId) -> Option<&Track> {
        self.members.get(id)
    }

    /// Member count (not the length of the ordering list)
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Raw ordering list, possibly holding dangling ids
    pub fn order(&self) -> &[TrackId] {
        &self.order
    }

    /// Display order: the ordering list filtered to current members
    pub fn ordered_tracks(&self) -> Vec<Track> {
        self.order
            .iter()
            .filter_map(|id| self.members.get(id))
            .cloned()
            .collect()
    }
}

/// One play history entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub track: Track,
    pub last_heard_at: chrono::DateTime<chrono::Utc>,
}
