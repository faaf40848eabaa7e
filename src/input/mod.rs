//! Video inputs: numbered raw-YUV file sequences and the playback-window loader.

/// Numbered file-name patterns.
pub mod fileseq;
/// Raw YUV frame sequences on disk.
pub mod image_seq;
/// Playback-event driven input loader.
pub mod loader;
