//! Positional navigation over the current tracklist

use melo_core::{Track, TrackId, TracklistContext};

/// Where a next/previous lookup landed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The neighbouring track
    Track(Track),

    /// The current track is at the edge of the list (last for `next`,
    /// first for `previous`)
    EndOfList,

    /// No context, or the current track is not part of it
    NotInContext,
}

/// Holds at most one tracklist context and answers next/previous
///
/// Lookups are pure: they never modify the held context.
#[derive(Debug, Clone, Default)]
pub struct TracklistNavigator {
    context: Option<TracklistContext>,
}

impl TracklistNavigator {
    pub fn new() -> Self {
        Self { context: None }
    }

    /// Replace the context wholesale (`None` clears it)
    pub fn replace(&mut self, context: Option<TracklistContext>) {
        self.context = context;
    }

    pub fn clear(&mut self) {
        self.context = None;
    }

    pub fn context(&self) -> Option<&TracklistContext> {
        self.context.as_ref()
    }

    /// Linear lookup by id
    pub fn index_of(&self, id: &TrackId) -> Option<usize> {
        self.context.as_ref().and_then(|c| c.position(id))
    }

    /// Track after `current_id`
    pub fn next(&self, current_id: &TrackId) -> Step {
        let Some(context) = &self.context else {
            return Step::NotInContext;
        };
        match context.position(current_id) {
            None => Step::NotInContext,
            Some(index) => match context.get(index + 1) {
                Some(track) => Step::Track(track.clone()),
                None => Step::EndOfList,
            },
        }
    }

    /// Track before `current_id`
    pub fn previous(&self, current_id: &TrackId) -> Step {
        let Some(context) = &self.context else {
            return Step::NotInContext;
        };
        match context.position(current_id) {
            None => Step::NotInContext,
            Some(0) => Step::EndOfList,
            Some(index) => context
                .get(index - 1)
                .cloned()
                .map_or(Step::NotInContext, Step::Track),
        }
    }
}
