use crate::foundation::error::{YuvcompError, YuvcompResult};

/// Straight-alpha colour parsed from a CSS style string, components in `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CssColor {
    pub(crate) r: f64,
    pub(crate) g: f64,
    pub(crate) b: f64,
    pub(crate) a: f64,
}

impl CssColor {
    pub(crate) const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);

    pub(crate) const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(..)`, `rgba(..)` or a basic colour name.
    pub(crate) fn parse(s: &str) -> YuvcompResult<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        if let Some(body) = s.strip_prefix("rgba(").and_then(|b| b.strip_suffix(')')) {
            return parse_components(body, true);
        }
        if let Some(body) = s.strip_prefix("rgb(").and_then(|b| b.strip_suffix(')')) {
            return parse_components(body, false);
        }
        match s.to_ascii_lowercase().as_str() {
            "black" => Ok(Self::BLACK),
            "white" => Ok(Self::rgba(1.0, 1.0, 1.0, 1.0)),
            "red" => Ok(Self::rgba(1.0, 0.0, 0.0, 1.0)),
            "green" => Ok(Self::rgba(0.0, 128.0 / 255.0, 0.0, 1.0)),
            "blue" => Ok(Self::rgba(0.0, 0.0, 1.0, 1.0)),
            "transparent" => Ok(Self::rgba(0.0, 0.0, 0.0, 0.0)),
            _ => Err(YuvcompError::validation(format!(
                "unsupported colour \"{s}\""
            ))),
        }
    }

    /// Straight RGBA8 with `alpha_mul` folded into the alpha channel.
    pub(crate) fn to_rgba8(self, alpha_mul: f64) -> [u8; 4] {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        [
            to_u8(self.r),
            to_u8(self.g),
            to_u8(self.b),
            to_u8(self.a * alpha_mul),
        ]
    }
}

fn parse_hex(s: &str) -> YuvcompResult<CssColor> {
    fn hex_byte(pair: &str) -> YuvcompResult<u8> {
        u8::from_str_radix(pair, 16)
            .map_err(|_| YuvcompError::validation(format!("invalid hex byte \"{pair}\"")))
    }

    if !s.is_ascii() {
        return Err(YuvcompError::validation("hex colour must be ASCII"));
    }
    let (r, g, b, a) = match s.len() {
        3 => {
            let nib = |i: usize| hex_byte(&s[i..i + 1]).map(|v| v * 17);
            (nib(0)?, nib(1)?, nib(2)?, 255)
        }
        6 => (
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            255,
        ),
        8 => (
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            hex_byte(&s[6..8])?,
        ),
        _ => {
            return Err(YuvcompError::validation(
                "hex colour must be #RGB, #RRGGBB or #RRGGBBAA",
            ));
        }
    };

    Ok(CssColor::rgba(
        f64::from(r) / 255.0,
        f64::from(g) / 255.0,
        f64::from(b) / 255.0,
        f64::from(a) / 255.0,
    ))
}

fn parse_components(body: &str, with_alpha: bool) -> YuvcompResult<CssColor> {
    let parts = body
        .split(',')
        .map(|p| {
            p.trim()
                .parse::<f64>()
                .map_err(|_| YuvcompError::validation(format!("invalid colour component \"{p}\"")))
        })
        .collect::<YuvcompResult<Vec<_>>>()?;
    let expected = if with_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return Err(YuvcompError::validation(format!(
            "colour needs {expected} components, got {}",
            parts.len()
        )));
    }
    let a = if with_alpha { parts[3] } else { 1.0 };
    Ok(CssColor::rgba(
        parts[0] / 255.0,
        parts[1] / 255.0,
        parts[2] / 255.0,
        a,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/graphics/color.rs"]
mod tests;
