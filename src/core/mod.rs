//! Core types shared across the codebase.

mod driver;
pub mod paths;
mod state;

pub use driver::BuildMode;
pub use paths::ProjectPaths;
pub use state::{register_session, setup_shutdown_handler};
