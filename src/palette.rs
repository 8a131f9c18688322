use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::graph::Lane;
use crate::{AppError, AppResult};

/// 24-bit color written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}

impl FromStr for Rgb {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AppError::Config(format!(
                "Expected a color like #42a5f5, got {s:?}"
            )));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|e| AppError::Config(e.to_string()))
        };
        Ok(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(rgb: Rgb) -> Self {
        rgb.to_string()
    }
}

impl Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Lane colors, picked by position modulo the palette length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            colors: vec![
                Rgb::new(0x42, 0xa5, 0xf5),
                Rgb::new(0xef, 0x53, 0x50),
                Rgb::new(0x78, 0x90, 0x9c),
                Rgb::new(0xff, 0x70, 0x43),
                Rgb::new(0x66, 0xbb, 0x6a),
                Rgb::new(0xec, 0x40, 0x7a),
            ],
        }
    }
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> AppResult<Self> {
        if colors.is_empty() {
            return Err(AppError::Config("The palette needs at least one color".into()));
        }
        Ok(Palette { colors })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn color_for(&self, lane: Lane) -> Rgb {
        self.colors[lane.color_index(self.colors.len())]
    }

    /// Truecolor foreground escape for the lane's color.
    pub fn ansi_for(&self, lane: Lane) -> String {
        let Rgb { r, g, b } = self.color_for(lane);
        format!("\x1b[38;2;{r};{g};{b}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DEFAULT_PALETTE_SIZE;

    #[test]
    fn default_palette_cycles_six_colors() {
        let palette = Palette::default();
        assert_eq!(palette.len(), DEFAULT_PALETTE_SIZE);
        assert_eq!(palette.color_for(Lane::new(0)).to_string(), "#42a5f5");
        assert_eq!(
            palette.color_for(Lane::new(7)),
            palette.color_for(Lane::new(1))
        );
    }

    #[test]
    fn parses_hex_with_or_without_hash() {
        assert_eq!("#ff7043".parse::<Rgb>().unwrap(), Rgb::new(0xff, 0x70, 0x43));
        assert_eq!("66BB6A".parse::<Rgb>().unwrap(), Rgb::new(0x66, 0xbb, 0x6a));
        assert!("#fff".parse::<Rgb>().is_err());
        assert!("#gggggg".parse::<Rgb>().is_err());
    }

    #[test]
    fn empty_palette_is_rejected() {
        assert!(matches!(Palette::new(Vec::new()), Err(AppError::Config(_))));
    }

    #[test]
    fn ansi_escape_uses_truecolor() {
        let palette = Palette::new(vec![Rgb::new(1, 2, 3)]).unwrap();
        assert_eq!(palette.ansi_for(Lane::new(4)), "\x1b[38;2;1;2;3m");
    }
}
