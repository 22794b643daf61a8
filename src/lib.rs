pub mod cli;
pub mod config;
pub mod error;
pub mod gcloud;
pub mod history;
pub mod inventory;
pub mod logging;
pub mod persist;
pub mod ui;

pub use error::{Error, Result};

/// Version of gssh
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
