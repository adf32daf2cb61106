//! Domain types: bars, feature rows, signals.

pub mod bar;
pub mod feature;
pub mod fundamental;
pub mod signal;

pub use bar::{Bar, Source};
pub use feature::{FeatureRow, MODEL_FEATURES};
pub use fundamental::Fundamental;
pub use signal::{FallbackReason, Signal};
