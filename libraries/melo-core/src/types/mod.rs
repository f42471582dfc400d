//! Domain types shared by every Melo crate

mod ids;
mod track;
mod tracklist;

pub use ids::{TrackId, UserId};
pub use track::Track;
pub use tracklist::{TracklistContext, TracklistRef};
