//! Batch rendering: the frame loop and its output sinks.

/// Timeline-driven render loop.
pub mod batch;
/// Frame sinks.
pub mod sink;
