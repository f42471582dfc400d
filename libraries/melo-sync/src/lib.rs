//! Melo - Collection Synchronization
//!
//! Mirrors a user's favorites, saved library and play history from a remote
//! per-user store into local, read-only views.
//!
//! - Writes go straight to the [`PersistenceProvider`]; local views change only
//!   when the provider pushes a whole new snapshot
//! - Favorites and library each pair an unordered member set with a separately
//!   stored ordering list; display order is the list filtered to members
//! - History keeps one entry per track, refreshed on replay
//!
//! [`MemoryStore`] is an in-process provider used by the CLI and tests.

mod error;
mod history;
mod library;
mod memory;
mod snapshot;
mod store;
pub mod types;

// Public exports
pub use error::{Result, SyncError};
pub use history::HistoryRecorder;
pub use library::LibrarySync;
pub use memory::{MemoryScope, MemoryStore, StoreOp};
pub use store::{PersistenceConnector, PersistenceProvider, LAST_HEARD_AT};
pub use types::{Collection, CollectionKind, Document, HistoryEntry, LibraryView, OrderList};
