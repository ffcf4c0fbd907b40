use ratatui::style::Color;

use crate::model::{ThemePreference, UiConfig};

/// Resolved light/dark appearance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Appearance {
    Light,
    Dark,
}

/// Resolve a stored preference. `system` follows the terminal background.
pub fn resolve(pref: ThemePreference, system_dark: bool) -> Appearance {
    match pref {
        ThemePreference::Light => Appearance::Light,
        ThemePreference::Dark => Appearance::Dark,
        ThemePreference::System if system_dark => Appearance::Dark,
        ThemePreference::System => Appearance::Light,
    }
}

/// Whether the terminal reports a dark background. Reads `COLORFGBG`
/// ("fg;bg"); unknown terminals are assumed dark.
pub fn terminal_is_dark() -> bool {
    std::env::var("COLORFGBG")
        .ok()
        .as_deref()
        .and_then(background_is_dark)
        .unwrap_or(true)
}

fn background_is_dark(colorfgbg: &str) -> Option<bool> {
    let bg: u8 = colorfgbg.rsplit(';').next()?.parse().ok()?;
    // 7 and 15 are the light greys/white of the 16-color palette
    Some(!matches!(bg, 7 | 15))
}

/// Parsed color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub appearance: Appearance,
    pub background: Color,
    pub surface: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub red: Color,
    pub green: Color,
    pub border: Color,
    pub selection_bg: Color,
    pub drop_target_bg: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Theme {
            appearance: Appearance::Dark,
            background: Color::Rgb(0x1C, 0x1C, 0x1E),
            surface: Color::Rgb(0x2C, 0x2C, 0x2E),
            text: Color::Rgb(0xD1, 0xD1, 0xD6),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::Rgb(0x0A, 0x84, 0xFF),
            dim: Color::Rgb(0x8E, 0x8E, 0x93),
            red: Color::Rgb(0xFF, 0x45, 0x3A),
            green: Color::Rgb(0x30, 0xD1, 0x58),
            border: Color::Rgb(0x3A, 0x3A, 0x3C),
            selection_bg: Color::Rgb(0x0A, 0x2A, 0x4A),
            drop_target_bg: Color::Rgb(0x1F, 0x3A, 0x24),
        }
    }

    pub fn light() -> Self {
        Theme {
            appearance: Appearance::Light,
            background: Color::Rgb(0xFF, 0xFF, 0xFF),
            surface: Color::Rgb(0xF2, 0xF2, 0xF7),
            text: Color::Rgb(0x3A, 0x3A, 0x3C),
            text_bright: Color::Rgb(0x00, 0x00, 0x00),
            highlight: Color::Rgb(0x00, 0x7A, 0xFF),
            dim: Color::Rgb(0x8E, 0x8E, 0x93),
            red: Color::Rgb(0xFF, 0x3B, 0x30),
            green: Color::Rgb(0x34, 0xC7, 0x59),
            border: Color::Rgb(0xD1, 0xD1, 0xD6),
            selection_bg: Color::Rgb(0xE5, 0xF1, 0xFF),
            drop_target_bg: Color::Rgb(0xE3, 0xF9, 0xE5),
        }
    }

    /// Theme for an appearance, with `[ui.colors]` overrides applied
    pub fn for_appearance(appearance: Appearance, ui: &UiConfig) -> Self {
        let mut theme = match appearance {
            Appearance::Dark => Theme::dark(),
            Appearance::Light => Theme::light(),
        };
        for (key, value) in &ui.colors {
            let Some(color) = parse_hex_color(value) else {
                tracing::warn!(slot = %key, value = %value, "ignoring invalid color");
                continue;
            };
            match key.as_str() {
                "background" => theme.background = color,
                "surface" => theme.surface = color,
                "text" => theme.text = color,
                "text_bright" => theme.text_bright = color,
                "highlight" => theme.highlight = color,
                "dim" => theme.dim = color,
                "red" => theme.red = color,
                "green" => theme.green = color,
                "border" => theme.border = color,
                "selection_bg" => theme.selection_bg = color,
                "drop_target_bg" => theme.drop_target_bg = color,
                _ => {}
            }
        }
        theme
    }

    /// Color for a project's hex color, falling back to dim text
    pub fn project_color(&self, hex: &str) -> Color {
        parse_hex_color(hex).unwrap_or(self.dim)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::dark()
    }
}

/// Parse a hex color string like "#FF4444" into an RGB Color
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}
