//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use crate::pieces::PALETTE_SIZE;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

const BLOCK_COLORS: usize = PALETTE_SIZE as usize - 1;

/// Board background plus one colour per block id (1..=7) and UI colours.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Block colours for ids 1..=7: red, green, blue, yellow, cyan, magenta, orange.
    pub blocks: [Color; BLOCK_COLORS],
    /// Board background (colour id 0).
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Secondary text (key hints on overlays).
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

/// Hex literal known to be valid at compile time.
fn hex(s: &str) -> Color {
    parse_hex(s).unwrap_or(Color::Reset)
}

impl Theme {
    /// The arcade palette: pure primaries on black.
    pub fn classic() -> Self {
        Self {
            blocks: [
                hex("#FF0000"), // red
                hex("#00FF00"), // green
                hex("#0000FF"), // blue
                hex("#FFFF00"), // yellow
                hex("#00FFFF"), // cyan
                hex("#FF00FF"), // magenta
                hex("#FFA500"), // orange
            ],
            bg: hex("#000000"),
            div_line: hex("#3F444F"),
            main_fg: hex("#FFFFFF"),
            title: hex("#E5C07B"),
            inactive_fg: hex("#5C6370"),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to the classic palette if path is None or the file is missing.
    /// `palette` selects colour variant: Normal (theme), HighContrast, or Colorblind.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        Ok(theme)
    }

    fn default_for_palette(palette: crate::Palette) -> Self {
        let mut t = Self::classic();
        t.apply_palette(palette);
        t
    }

    /// Override block colours for high-contrast or colorblind.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => {
                self.bg = hex("#000000");
                self.main_fg = hex("#FFFFFF");
                self.blocks = [
                    hex("#FF3030"),
                    hex("#30FF30"),
                    hex("#4080FF"),
                    hex("#FFFF30"),
                    hex("#30FFFF"),
                    hex("#FF30FF"),
                    hex("#FFB030"),
                ];
            }
            crate::Palette::Colorblind => {
                // Okabe-Ito: distinguishable without relying on red/green.
                self.blocks = [
                    hex("#D55E00"), // vermillion
                    hex("#009E73"), // bluish green
                    hex("#0072B2"), // blue
                    hex("#F0E442"), // yellow
                    hex("#56B4E9"), // sky blue
                    hex("#CC79A7"), // reddish purple
                    hex("#E69F00"), // orange
                ];
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            map.get(key)
                .and_then(|v| parse_hex(v.trim_matches('"').trim_matches('\'').trim()).ok())
        };
        let classic = Self::classic();
        let [red, green, blue, yellow, cyan, magenta, orange] = classic.blocks;
        Self {
            blocks: [
                get("cpu_end").or_else(|| get("temp_end")).unwrap_or(red),
                get("mem_box").or_else(|| get("cpu_start")).unwrap_or(green),
                get("cpu_box").unwrap_or(blue),
                get("title").or_else(|| get("cpu_mid")).unwrap_or(yellow),
                get("hi_fg").or_else(|| get("proc_misc")).unwrap_or(cyan),
                get("net_box").unwrap_or(magenta),
                get("temp_mid").unwrap_or(orange),
            ],
            bg: get("main_bg").or_else(|| get("meter_bg")).unwrap_or(classic.bg),
            div_line: get("div_line").unwrap_or(classic.div_line),
            main_fg: get("main_fg").unwrap_or(classic.main_fg),
            title: get("title").unwrap_or(classic.title),
            inactive_fg: get("inactive_fg").unwrap_or(classic.inactive_fg),
        }
    }

    /// Colour for a board colour id. `None` for the background and unknown ids.
    #[inline]
    pub fn block_color(&self, id: u8) -> Option<Color> {
        let idx = usize::from(id).checked_sub(1)?;
        self.blocks.get(idx).copied()
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(stripped) = line.strip_prefix("theme[") {
            if let Some(end) = stripped.find(']') {
                let key = stripped[..end].trim();
                let rest = stripped[end + 1..].trim();
                if let Some(eq) = rest.find('=') {
                    let value = rest[eq + 1..]
                        .trim()
                        .trim_matches('"')
                        .trim_matches('\'')
                        .to_string();
                    if !value.is_empty() {
                        map.insert(key.to_string(), value);
                    }
                }
            }
        }
    }
    map
}

fn hex_digits(s: &str, range: std::ops::Range<usize>) -> Result<u8, ThemeError> {
    u8::from_str_radix(&s[range], 16).map_err(|_| ThemeError::InvalidHex(s.to_string()))
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    if !s.is_ascii() {
        return Err(ThemeError::InvalidHex(s.to_string()));
    }
    let (r, g, b) = match s.len() {
        6 => (hex_digits(s, 0..2)?, hex_digits(s, 2..4)?, hex_digits(s, 4..6)?),
        3 => (
            hex_digits(s, 0..1)? * 17,
            hex_digits(s, 1..2)? * 17,
            hex_digits(s, 2..3)? * 17,
        ),
        _ => return Err(ThemeError::InvalidHex(s.to_string())),
    };
    Ok(Color::Rgb(r, g, b))
}
