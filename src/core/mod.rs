//! Core domain models
//!
//! Step state, run context, configuration, directory layout and the output
//! classifier used for progress display.

pub mod classifier;
pub mod config;
pub mod context;
pub mod paths;
pub mod state;

pub use classifier::{classify, BuildStatusSnapshot, PhaseStatus, StaticPagesProgress};
pub use config::BuildConfig;
pub use context::*;
pub use paths::StagingPaths;
pub use state::*;
