//! Declarative 2D display lists.
//!
//! A display list is a JSON object `{width, height, commands}` where each command is an array
//! `[op]` or `[op, args]`. `args` is either a single value or an array of numbers, strings and
//! asset references (`{"type": .., "id": ..}`).

use serde::Deserialize;

use crate::foundation::error::{YuvcompError, YuvcompResult};
use crate::graphics::color::CssColor;

/// Reference to an image asset resolved by the graphics backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetRef {
    /// Asset namespace, e.g. `defaultAsset`.
    pub kind: String,
    /// Asset identifier within its namespace.
    pub id: String,
}

/// Stroke corner style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LineJoin {
    /// Sharp corners.
    #[default]
    Miter,
    /// Bevelled corners.
    Bevel,
    /// Rounded corners.
    Round,
}

/// One typed drawing command.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum DrawCommand {
    Save,
    Restore,
    Scale { x: f64, y: f64 },
    Rotate { radians: f64 },
    Translate { x: f64, y: f64 },
    FillStyle(String),
    StrokeStyle(String),
    LineWidth(f64),
    LineJoin(LineJoin),
    GlobalAlpha(f64),
    Font(String),
    Fill,
    Stroke,
    Clip,
    FillRect { x: f64, y: f64, w: f64, h: f64 },
    StrokeRect { x: f64, y: f64, w: f64, h: f64 },
    Rect { x: f64, y: f64, w: f64, h: f64 },
    RoundRect { x: f64, y: f64, w: f64, h: f64, radius: f64 },
    FillText { text: String, x: f64, y: f64 },
    StrokeText { text: String, x: f64, y: f64 },
    DrawImage { asset: AssetRef, x: f64, y: f64, w: f64, h: f64 },
    BeginPath,
    ClosePath,
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    QuadraticCurveTo { cpx: f64, cpy: f64, x: f64, y: f64 },
    ArcTo { x1: f64, y1: f64, x2: f64, y2: f64, radius: f64 },
    Ellipse {
        x: f64,
        y: f64,
        rx: f64,
        ry: f64,
        rotation: f64,
        start: f64,
        end: f64,
        ccw: bool,
    },
}

/// Parsed display list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplayList {
    /// Authoring width; zero means "draw unscaled".
    pub width: u32,
    /// Authoring height; zero means "draw unscaled".
    pub height: u32,
    /// Commands in execution order.
    pub commands: Vec<DrawCommand>,
    /// Commands dropped because their arguments did not match the op.
    pub invalid_commands: usize,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DisplayListRepr {
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    commands: Vec<CommandRepr>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CommandRepr {
    Bare((String,)),
    WithArgs((String, ArgsRepr)),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ArgsRepr {
    List(Vec<Arg>),
    One(Arg),
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum Arg {
    Num(f64),
    Bool(bool),
    Str(String),
    Asset(AssetRepr),
}

#[derive(Clone, Debug, Deserialize)]
struct AssetRepr {
    #[serde(rename = "type")]
    kind: String,
    id: AssetIdRepr,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum AssetIdRepr {
    Str(String),
    Num(f64),
}

impl DisplayList {
    /// Parse display-list JSON text.
    ///
    /// Unknown ops fail the parse. Known ops with malformed arguments are dropped and counted in
    /// [`DisplayList::invalid_commands`].
    pub fn parse(json: &str) -> YuvcompResult<Self> {
        let repr: DisplayListRepr = serde_json::from_str(json)
            .map_err(|e| YuvcompError::serde(format!("display list JSON: {e}")))?;

        let mut out = Self {
            width: repr.width,
            height: repr.height,
            commands: Vec::with_capacity(repr.commands.len()),
            invalid_commands: 0,
        };
        for cmd in repr.commands {
            let (op, args) = match cmd {
                CommandRepr::Bare((op,)) => (op, Vec::new()),
                CommandRepr::WithArgs((op, ArgsRepr::List(args))) => (op, args),
                CommandRepr::WithArgs((op, ArgsRepr::One(arg))) => (op, vec![arg]),
            };
            match build_command(&op, &args)? {
                Some(c) => out.commands.push(c),
                None => {
                    tracing::warn!(op = %op, args = ?args, "invalid arguments for display list op");
                    out.invalid_commands += 1;
                }
            }
        }
        Ok(out)
    }
}

fn nums<const N: usize>(args: &[Arg]) -> Option<[f64; N]> {
    if args.len() != N {
        return None;
    }
    let mut out = [0.0; N];
    for (o, a) in out.iter_mut().zip(args) {
        match a {
            Arg::Num(v) if v.is_finite() => *o = *v,
            _ => return None,
        }
    }
    Some(out)
}

fn single_str(args: &[Arg]) -> Option<String> {
    match args {
        [Arg::Str(s)] => Some(s.clone()),
        _ => None,
    }
}

fn text_at(args: &[Arg]) -> Option<(String, f64, f64)> {
    match args {
        [Arg::Str(s), Arg::Num(x), Arg::Num(y)] => Some((s.clone(), *x, *y)),
        _ => None,
    }
}

fn font_desc(args: &[Arg]) -> Option<String> {
    match args {
        [Arg::Str(s)] => Some(s.clone()),
        [Arg::Str(weight), Arg::Str(style), Arg::Num(size), Arg::Str(family)] => {
            Some(format!("{style} {weight} {size}px {family}"))
        }
        _ => None,
    }
}

fn asset_rect(args: &[Arg]) -> Option<DrawCommand> {
    let [Arg::Asset(asset), rest @ ..] = args else {
        return None;
    };
    let [x, y, w, h] = nums::<4>(rest)?;
    let id = match &asset.id {
        AssetIdRepr::Str(s) => s.clone(),
        AssetIdRepr::Num(n) => format!("{n}"),
    };
    if id.is_empty() {
        return None;
    }
    Some(DrawCommand::DrawImage {
        asset: AssetRef {
            kind: asset.kind.clone(),
            id,
        },
        x,
        y,
        w,
        h,
    })
}

fn ellipse(args: &[Arg]) -> Option<DrawCommand> {
    let (head, ccw) = match args {
        [head @ .., Arg::Bool(ccw)] if head.len() == 7 => (head, *ccw),
        _ if args.len() == 8 => {
            let [.., flag] = nums::<8>(args)?;
            (&args[..7], flag != 0.0)
        }
        _ => (args, false),
    };
    let [x, y, rx, ry, rotation, start, end] = nums::<7>(head)?;
    if rx < 0.0 || ry < 0.0 {
        return None;
    }
    Some(DrawCommand::Ellipse {
        x,
        y,
        rx,
        ry,
        rotation,
        start,
        end,
        ccw,
    })
}

fn build_command(op: &str, args: &[Arg]) -> YuvcompResult<Option<DrawCommand>> {
    use DrawCommand as C;

    let cmd = match op {
        "save" => Some(C::Save),
        "restore" => Some(C::Restore),
        "scale" => nums::<2>(args).map(|[x, y]| C::Scale { x, y }),
        "rotate" => nums::<1>(args).map(|[radians]| C::Rotate { radians }),
        "translate" => nums::<2>(args).map(|[x, y]| C::Translate { x, y }),
        "fillStyle" => single_str(args)
            .filter(|s| CssColor::parse(s).is_ok())
            .map(C::FillStyle),
        "strokeStyle" => single_str(args)
            .filter(|s| CssColor::parse(s).is_ok())
            .map(C::StrokeStyle),
        "lineWidth" => nums::<1>(args).map(|[w]| C::LineWidth(w)),
        "lineJoin" => single_str(args).map(|s| {
            C::LineJoin(match s.as_str() {
                "bevel" => LineJoin::Bevel,
                "round" => LineJoin::Round,
                _ => LineJoin::Miter,
            })
        }),
        "globalAlpha" => nums::<1>(args).map(|[a]| C::GlobalAlpha(a)),
        "font" => font_desc(args).map(C::Font),
        "fill" => Some(C::Fill),
        "stroke" => Some(C::Stroke),
        "clip" => Some(C::Clip),
        "fillRect" => nums::<4>(args).map(|[x, y, w, h]| C::FillRect { x, y, w, h }),
        "strokeRect" => nums::<4>(args).map(|[x, y, w, h]| C::StrokeRect { x, y, w, h }),
        "rect" => nums::<4>(args).map(|[x, y, w, h]| C::Rect { x, y, w, h }),
        "roundRect" => nums::<5>(args).map(|[x, y, w, h, radius]| C::RoundRect {
            x,
            y,
            w,
            h,
            radius,
        }),
        "fillText" => text_at(args).map(|(text, x, y)| C::FillText { text, x, y }),
        "strokeText" => text_at(args).map(|(text, x, y)| C::StrokeText { text, x, y }),
        "drawImage" => asset_rect(args),
        "beginPath" => Some(C::BeginPath),
        "closePath" => Some(C::ClosePath),
        "moveTo" => nums::<2>(args).map(|[x, y]| C::MoveTo { x, y }),
        "lineTo" => nums::<2>(args).map(|[x, y]| C::LineTo { x, y }),
        "quadraticCurveTo" => {
            nums::<4>(args).map(|[cpx, cpy, x, y]| C::QuadraticCurveTo { cpx, cpy, x, y })
        }
        "arcTo" => nums::<5>(args).map(|[x1, y1, x2, y2, radius]| C::ArcTo {
            x1,
            y1,
            x2,
            y2,
            radius,
        }),
        "ellipse" => ellipse(args),
        other => {
            return Err(YuvcompError::serde(format!(
                "unrecognized display list op \"{other}\""
            )));
        }
    };
    Ok(cmd)
}

#[cfg(test)]
#[path = "../../tests/unit/graphics/display_list.rs"]
mod tests;
