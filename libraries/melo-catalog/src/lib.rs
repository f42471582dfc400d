//! Melo Catalog Client
//!
//! HTTP client for the content provider that serves album listings, search
//! results and album tracklists as JSON.
//!
//! Provider payloads are loosely typed. They are validated here and
//! normalized into [`melo_core::Track`] before anything reaches playback;
//! malformed entries are dropped.
//!
//! # Example
//!
//! ```ignore
//! use melo_catalog::{CatalogClient, CatalogConfig};
//!
//! let client = CatalogClient::new(CatalogConfig::default())?;
//!
//! if let Some(album) = client.album_details("https://site.example/album/x.html", Some("ta")).await {
//!     println!("{} ({} tracks)", album.display_name(), album.tracks.len());
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::CatalogClient;
pub use error::{CatalogError, Result};
pub use types::{
    AlbumDetails, AlbumSummary, CatalogConfig, HomeFeed, LanguageHome, Link, DEFAULT_BASE_URL,
    DEFAULT_LANG,
};
