//! Scene description inputs: video-layer lists, sparse scene-update sequences and playback timings.

/// Sparse per-frame scene file sequences.
pub mod sequencer;
/// Playback timeline JSON.
pub mod timings;
/// Video-layer list JSON.
pub mod video_layers;
