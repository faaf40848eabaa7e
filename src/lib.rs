//! yuvcomp is a headless YUV 4:2:0 multi-layer video compositor.
//!
//! Each output frame is assembled from video inputs projected into rectangular layers (fill or
//! fit, optional rounded corners) plus a vector foreground overlay rendered from a display list:
//!
//! - Construct a [`YuvCompositor`] for the output size
//! - Push layer lists and foreground display lists when they change
//! - Call [`YuvCompositor::render_frame`] once per frame with the current input buffers
//!
//! [`BatchRenderer`] wires the compositor to a playback timeline ([`InputTimings`]), a sparse
//! scene sequence ([`SceneSequencer`]) and a [`FrameSink`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Planar YUV and alpha buffers.
pub mod buffer;
/// Frame composition.
pub mod compose;
/// 2D graphics backend for overlays and masks.
pub mod graphics;
/// Video input sequences and the playback loader.
pub mod input;
/// Planar pixel primitives: scaling and colour conversion.
pub mod pixel;
/// Batch render loop and sinks.
pub mod render;
/// Scene description formats.
pub mod scene;

pub use crate::foundation::core::{Canvas, FrameIndex, FrameRange, MAX_CANVAS_DIM};
pub use crate::foundation::error::{YuvcompError, YuvcompResult};

pub use crate::buffer::alpha::AlphaMask;
pub use crate::buffer::yuv::{
    AsYuv420View, Plane, PlaneMut, Yuv420Buf, Yuv420Layout, Yuv420View, Yuv420ViewMut,
};
pub use crate::compose::compositor::{CompositorOpts, YuvCompositor};
pub use crate::compose::mask_cache::{MaskCache, MaskCacheStats, MaskKey};
pub use crate::compose::thumbs::{Thumbnail, ThumbnailMode, ThumbnailOpts, ThumbnailPair};
pub use crate::graphics::{AlphaMode, CpuGraphics, GraphicsBackend};
pub use crate::input::image_seq::ImageSequence;
pub use crate::input::loader::{InputBufsById, VideoInputLoader};
pub use crate::render::batch::{BatchOpts, BatchRenderer, BatchStats, SceneSource, ScriptedScenes};
pub use crate::render::sink::{FrameSink, InMemorySink, SinkConfig, YuvFileSink};
pub use crate::scene::sequencer::{SceneSequencer, SceneUpdateAtFrame};
pub use crate::scene::timings::{InputTimings, PlaybackEvent};
pub use crate::scene::video_layers::{
    LayerFrame, ScaleMode, VideoLayerDescriptor, parse_video_layers,
};
