//! Melo Core
//!
//! Platform-agnostic core types, traits, and error handling for Melo.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `TrackId`, `UserId`, `TracklistContext`
//! - **Core Traits**: `PlayRecorder`
//! - **Validation**: `MeloError` for payloads that cannot become a `Track`
//!
//! # Example
//!
//! ```rust
//! use melo_core::types::{Track, TracklistContext};
//!
//! let track = Track::new(101u64, "Song", "https://cdn.example/101.mp3")
//!     .with_album("https://site.example/album", "ta");
//!
//! let context = TracklistContext::single(track.clone());
//! assert_eq!(context.position(&track.id), Some(0));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{MeloError, Result};
pub use traits::{NoopRecorder, PlayRecorder};
pub use types::{Track, TrackId, TracklistContext, TracklistRef, UserId};
