//! One signed-in user's services

use crate::error::Result;
use melo_core::{PlayRecorder, UserId};
use melo_playback::{AudioDevice, PlaybackController};
use melo_sync::{CollectionKind, HistoryEntry, HistoryRecorder, LibrarySync, PersistenceConnector};
use std::sync::Arc;
use tracing::info;

/// Session tuning
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Size of the "recently heard" list
    pub history_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { history_limit: 10 }
    }
}

/// Collaborators shared by every session
#[derive(Clone)]
pub struct SessionServices {
    pub device: Arc<dyn AudioDevice>,
    pub store: Arc<dyn PersistenceConnector>,
}

/// Services built at sign-in and torn down at sign-out
pub struct UserSession {
    user: UserId,
    config: SessionConfig,
    controller: PlaybackController,
    favorites: LibrarySync,
    library: LibrarySync,
    history: Arc<HistoryRecorder>,
}

impl UserSession {
    /// Connect `user`'s persistence scope and start every service
    pub async fn open(user: UserId, services: &SessionServices, config: SessionConfig) -> Result<Self> {
        let provider = services.store.connect(&user);

        let history = Arc::new(HistoryRecorder::start(Arc::clone(&provider)).await?);
        let favorites = LibrarySync::start(CollectionKind::Favorites, Arc::clone(&provider)).await?;
        let library = LibrarySync::start(CollectionKind::Library, provider).await?;

        let recorder: Arc<dyn PlayRecorder> = history.clone();
        let controller = PlaybackController::new(Arc::clone(&services.device), recorder);

        info!(user = %user, "Session opened");

        Ok(Self {
            user,
            config,
            controller,
            favorites,
            library,
            history,
        })
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn favorites(&self) -> &LibrarySync {
        &self.favorites
    }

    pub fn library(&self) -> &LibrarySync {
        &self.library
    }

    pub fn history(&self) -> &HistoryRecorder {
        &self.history
    }

    /// Recently heard tracks, newest first, capped at the configured limit
    pub fn recent(&self) -> Vec<HistoryEntry> {
        self.history.recent(self.config.history_limit)
    }

    /// Release the audio resource and clear every cache
    ///
    /// Operations still in flight complete against the torn-down state and
    /// are ignored.
    pub async fn close(&self) {
        self.controller.teardown().await;
        self.favorites.close();
        self.library.close();
        self.history.close();
        info!(user = %self.user, "Session closed");
    }
}
