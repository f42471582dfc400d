use crate::error::Result;
use crate::session::{SessionConfig, SessionServices, UserSession};
use melo_core::UserId;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info};

/// Keeps at most one live `UserSession`, following the identity provider
pub struct SessionManager {
    services: SessionServices,
    config: SessionConfig,
    current: watch::Sender<Option<Arc<UserSession>>>,

    // Serializes sign-in / sign-out transitions
    transition: Mutex<()>,
}

impl SessionManager {
    pub fn new(services: SessionServices, config: SessionConfig) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            services,
            config,
            current,
            transition: Mutex::new(()),
        }
    }

    /// The live session, if any
    pub fn current(&self) -> Option<Arc<UserSession>> {
        self.current.borrow().clone()
    }

    /// Receiver notified on every sign-in and sign-out
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<UserSession>>> {
        self.current.subscribe()
    }

    /// Open a session for `user`, closing any session of another user first
    ///
    /// Signing in the user who is already signed in returns the live session.
    pub async fn sign_in(&self, user: UserId) -> Result<Arc<UserSession>> {
        let _transition = self.transition.lock().await;

        if let Some(session) = self.current() {
            if session.user() == &user {
                debug!(user = %user, "Already signed in");
                return Ok(session);
            }
            self.close_current().await;
        }

        let session = Arc::new(UserSession::open(user, &self.services, self.config.clone()).await?);
        self.current.send_replace(Some(Arc::clone(&session)));
        Ok(session)
    }

    /// Tear down the live session, if any
    pub async fn sign_out(&self) {
        let _transition = self.transition.lock().await;
        self.close_current().await;
    }

    async fn close_current(&self) {
        if let Some(session) = self.current.send_replace(None) {
            session.close().await;
        }
    }

    /// Follow `identity` until it closes
    ///
    /// `Some(user)` signs that user in; `None` tears the session down. A
    /// failed sign-in is logged and leaves the manager signed out. When the
    /// identity stream closes, the live session is torn down.
    pub async fn run(&self, mut identity: watch::Receiver<Option<UserId>>) {
        loop {
            let user = identity.borrow_and_update().clone();
            match user {
                Some(user) => {
                    if let Err(e) = self.sign_in(user.clone()).await {
                        error!(user = %user, error = %e, "Failed to open session");
                    }
                }
                None => self.sign_out().await,
            }

            if identity.changed().await.is_err() {
                break;
            }
        }

        info!("Identity stream closed");
        self.sign_out().await;
    }
}
