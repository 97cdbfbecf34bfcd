//! Pipeline execution engine

pub mod engine;
pub mod progress;
pub mod stages;

pub use engine::{Packager, COMPLETED_MESSAGE};
pub use progress::OutputTracker;
pub use stages::Stage;
