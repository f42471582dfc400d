//! Melo headless client
//!
//! Configuration and the simulated audio device used by the `melo` binary.

pub mod config;
pub mod device;
pub mod error;

pub use config::MeloConfig;
pub use device::SimulatedDevice;
pub use error::{CliError, Result};
