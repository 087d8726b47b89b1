#![forbid(unsafe_code)]

//! Core: SGR mouse decoding, escape disambiguation, event dispatch, and
//! swipe gestures.

pub mod decoder;
pub mod dispatch;
pub mod event;
pub mod gesture;
pub mod logging;
pub mod pipeline;
pub mod tracking;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, info, trace, warn};
