//! Terminal output

mod progress;

pub use progress::{action_label, ProgressReporter};
