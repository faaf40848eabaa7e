//! Video-layer list JSON.
//!
//! ```json
//! [{"type": "video", "id": 1, "frame": {"x": 0, "y": 0, "w": 960, "h": 1080},
//!   "attrs": {"scaleMode": "fill", "cornerRadiusPx": 24, "zoomFactor": 1.5}}]
//! ```

use serde::Deserialize;

use crate::foundation::error::{YuvcompError, YuvcompResult};

/// Smallest accepted fill-mode zoom.
pub const MIN_ZOOM: f64 = 1.0;
/// Largest accepted fill-mode zoom.
pub const MAX_ZOOM: f64 = 4.0;

/// How a source is fitted into its destination frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScaleMode {
    /// Crop the source to cover the frame exactly, optionally zoomed into its centre.
    Fill {
        /// Zoom factor, clamped to `[MIN_ZOOM, MAX_ZOOM]`.
        zoom: f64,
    },
    /// Show the whole source, letterboxed or pillarboxed inside the frame.
    Fit,
}

impl ScaleMode {
    /// Fill mode with a sanitized zoom: non-finite or `< 1` becomes 1, above 4 becomes 4.
    pub fn fill(zoom: f64) -> Self {
        let zoom = if zoom.is_finite() && zoom >= MIN_ZOOM {
            zoom.min(MAX_ZOOM)
        } else {
            MIN_ZOOM
        };
        Self::Fill { zoom }
    }
}

impl Default for ScaleMode {
    fn default() -> Self {
        Self::fill(1.0)
    }
}

/// Destination rectangle in output pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayerFrame {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

/// One video layer of the composite.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoLayerDescriptor {
    /// Input slot id this layer shows.
    pub id: u32,
    /// Destination rectangle.
    pub frame: LayerFrame,
    /// Fill or fit behaviour.
    pub scale_mode: ScaleMode,
    /// Rounded-corner radius in output pixels; `0` draws square corners.
    pub corner_radius_px: f64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct LayerRepr {
    #[serde(rename = "type", default)]
    _kind: Option<String>,
    id: u32,
    frame: FrameRepr,
    #[serde(default)]
    attrs: AttrsRepr,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FrameRepr {
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    #[serde(default)]
    w: f64,
    #[serde(default)]
    h: f64,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct AttrsRepr {
    scale_mode: Option<ScaleModeRepr>,
    #[serde(alias = "cornerRadius_px")]
    corner_radius_px: Option<f64>,
    zoom_factor: Option<f64>,
}

#[derive(Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum ScaleModeRepr {
    Fill,
    Fit,
}

/// Parse a video-layer list, multiplying every frame value and corner radius by `layer_scale`.
pub fn parse_video_layers(json: &str, layer_scale: f64) -> YuvcompResult<Vec<VideoLayerDescriptor>> {
    if !layer_scale.is_finite() || layer_scale <= 0.0 {
        return Err(YuvcompError::validation(format!(
            "layer scale must be finite and > 0 (got {layer_scale})"
        )));
    }
    let layers: Vec<LayerRepr> = serde_json::from_str(json)
        .map_err(|e| YuvcompError::serde(format!("video layer list JSON: {e}")))?;

    layers
        .into_iter()
        .map(|l| {
            let f = l.frame;
            for (name, v) in [("x", f.x), ("y", f.y), ("w", f.w), ("h", f.h)] {
                if !v.is_finite() {
                    return Err(YuvcompError::validation(format!(
                        "layer {} frame.{name} is not finite",
                        l.id
                    )));
                }
            }
            let scale_mode = match l.attrs.scale_mode.unwrap_or(ScaleModeRepr::Fill) {
                ScaleModeRepr::Fill => ScaleMode::fill(l.attrs.zoom_factor.unwrap_or(1.0)),
                ScaleModeRepr::Fit => ScaleMode::Fit,
            };
            let radius = l.attrs.corner_radius_px.unwrap_or(0.0);
            Ok(VideoLayerDescriptor {
                id: l.id,
                frame: LayerFrame {
                    x: f.x * layer_scale,
                    y: f.y * layer_scale,
                    w: f.w * layer_scale,
                    h: f.h * layer_scale,
                },
                scale_mode,
                corner_radius_px: if radius.is_finite() {
                    radius.max(0.0) * layer_scale
                } else {
                    0.0
                },
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/scene/video_layers.rs"]
mod tests;
