//! System observers

mod logging;
mod recording;

pub use logging::TracingObserver;
pub use recording::{ObserverEntry, RecordingObserver};
