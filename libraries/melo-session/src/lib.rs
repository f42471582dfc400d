//! Melo - Session Lifecycle
//!
//! Every per-user service (playback, favorites, library, history) is an
//! explicit object created when an identity becomes available and torn down
//! completely when it goes away.
//!
//! ```text
//! identity: None ──▶ Some(a) ──▶ Some(b) ──▶ None
//! session:  -        open(a)     close(a)    close(b)
//!                                open(b)
//! ```

mod error;
mod manager;
mod session;

pub use error::{Result, SessionError};
pub use manager::SessionManager;
pub use session::{SessionConfig, SessionServices, UserSession};
