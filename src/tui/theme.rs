use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::index::LabelTone;

/// Built-in themes, in `T` cycling order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeName {
    #[default]
    Dark,
    Light,
    HighContrast,
}

impl ThemeName {
    pub const ALL: [ThemeName; 3] = [ThemeName::Dark, ThemeName::Light, ThemeName::HighContrast];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeName::Dark => "dark",
            ThemeName::Light => "light",
            ThemeName::HighContrast => "high-contrast",
        }
    }

    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "dark" => Ok(ThemeName::Dark),
            "light" => Ok(ThemeName::Light),
            "high-contrast" | "highcontrast" => Ok(ThemeName::HighContrast),
            other => Err(format!("Unknown theme: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Color,
    Mono,
}

/// How many colours the terminal can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TerminalCapability {
    NoColor,
    Basic16,
    Indexed256,
    TrueColor,
}

impl TerminalCapability {
    /// Detect from the process environment
    pub fn detect() -> Self {
        Self::from_env(
            std::env::var("NO_COLOR").ok().as_deref(),
            std::env::var("COLORTERM").ok().as_deref(),
            std::env::var("TERM").ok().as_deref(),
        )
    }

    pub fn from_env(no_color: Option<&str>, colorterm: Option<&str>, term: Option<&str>) -> Self {
        if no_color.is_some_and(|v| !v.is_empty()) {
            return TerminalCapability::NoColor;
        }
        if let Some(colorterm) = colorterm {
            let colorterm = colorterm.to_lowercase();
            if colorterm == "truecolor" || colorterm == "24bit" {
                return TerminalCapability::TrueColor;
            }
        }
        match term {
            None => TerminalCapability::Basic16,
            Some("dumb") => TerminalCapability::NoColor,
            Some(term) if term.contains("truecolor") || term.contains("direct") => {
                TerminalCapability::TrueColor
            }
            Some(term) if term.contains("256color") => TerminalCapability::Indexed256,
            Some(_) => TerminalCapability::Basic16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorValue {
    Rgb { r: u8, g: u8, b: u8 },
    /// One of the 16 ANSI colours; never downgraded further
    Named(Color),
}

const fn rgb(r: u8, g: u8, b: u8) -> ColorValue {
    ColorValue::Rgb { r, g, b }
}

impl ColorValue {
    /// Best colour this terminal can show, `None` when colour is off
    pub fn to_color(self, capability: TerminalCapability) -> Option<Color> {
        match (self, capability) {
            (_, TerminalCapability::NoColor) => None,
            (ColorValue::Named(color), _) => Some(color),
            (ColorValue::Rgb { r, g, b }, TerminalCapability::TrueColor) => {
                Some(Color::Rgb(r, g, b))
            }
            (ColorValue::Rgb { r, g, b }, TerminalCapability::Indexed256) => {
                Some(Color::Indexed(rgb_to_ansi256(r, g, b)))
            }
            (ColorValue::Rgb { r, g, b }, TerminalCapability::Basic16) => {
                Some(rgb_to_ansi16(r, g, b))
            }
        }
    }
}

/// Theme definition before it is fitted to a terminal
#[derive(Debug, Clone, Copy)]
struct ThemeColors {
    text: ColorValue,
    muted: ColorValue,
    folder: ColorValue,
    selected_fg: ColorValue,
    selected_bg: ColorValue,
    success: ColorValue,
    info: ColorValue,
    error: ColorValue,
    leader: ColorValue,
    scrollbar_track: ColorValue,
    scrollbar_thumb: ColorValue,
    status_fg: ColorValue,
    status_bg: ColorValue,
    border: ColorValue,
}

const DARK: ThemeColors = ThemeColors {
    text: rgb(220, 223, 228),
    muted: rgb(120, 126, 138),
    folder: rgb(97, 175, 239),
    selected_fg: rgb(255, 255, 255),
    selected_bg: rgb(44, 62, 92),
    success: rgb(152, 195, 121),
    info: rgb(229, 192, 123),
    error: rgb(224, 108, 117),
    leader: rgb(72, 78, 90),
    scrollbar_track: rgb(48, 52, 60),
    scrollbar_thumb: rgb(140, 146, 158),
    status_fg: rgb(200, 204, 212),
    status_bg: rgb(33, 37, 43),
    border: rgb(72, 78, 90),
};

const LIGHT: ThemeColors = ThemeColors {
    text: rgb(40, 42, 46),
    muted: rgb(120, 120, 120),
    folder: rgb(0, 92, 197),
    selected_fg: rgb(0, 0, 0),
    selected_bg: rgb(200, 220, 245),
    success: rgb(0, 128, 50),
    info: rgb(170, 100, 0),
    error: rgb(200, 0, 0),
    leader: rgb(190, 190, 190),
    scrollbar_track: rgb(225, 225, 225),
    scrollbar_thumb: rgb(140, 140, 140),
    status_fg: rgb(40, 42, 46),
    status_bg: rgb(235, 235, 235),
    border: rgb(200, 200, 200),
};

const HIGH_CONTRAST: ThemeColors = ThemeColors {
    text: ColorValue::Named(Color::White),
    muted: ColorValue::Named(Color::Gray),
    folder: ColorValue::Named(Color::LightCyan),
    selected_fg: ColorValue::Named(Color::Black),
    selected_bg: ColorValue::Named(Color::Yellow),
    success: ColorValue::Named(Color::LightGreen),
    info: ColorValue::Named(Color::LightYellow),
    error: ColorValue::Named(Color::LightRed),
    leader: ColorValue::Named(Color::Gray),
    scrollbar_track: ColorValue::Named(Color::DarkGray),
    scrollbar_thumb: ColorValue::Named(Color::White),
    status_fg: ColorValue::Named(Color::Black),
    status_bg: ColorValue::Named(Color::White),
    border: ColorValue::Named(Color::White),
};

impl ThemeName {
    fn colors(self) -> &'static ThemeColors {
        match self {
            ThemeName::Dark => &DARK,
            ThemeName::Light => &LIGHT,
            ThemeName::HighContrast => &HIGH_CONTRAST,
        }
    }
}

/// Concrete styles for one frame, fitted to the terminal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub theme: ThemeName,
    pub monochrome: bool,
    pub text: Style,
    pub muted: Style,
    pub folder: Style,
    pub selected: Style,
    pub success: Style,
    pub info: Style,
    pub error: Style,
    pub leader: Style,
    pub scrollbar_track: Style,
    pub scrollbar_thumb: Style,
    pub status_bar: Style,
    pub border: Style,
}

impl Palette {
    pub fn label(&self, tone: LabelTone) -> Style {
        match tone {
            LabelTone::Success => self.success,
            LabelTone::Info => self.info,
        }
    }
}

/// Pure theme resolution; called again whenever any input changes
pub fn resolve_theme(
    theme: ThemeName,
    color_mode: ColorMode,
    capability: TerminalCapability,
) -> Palette {
    if color_mode == ColorMode::Mono || capability == TerminalCapability::NoColor {
        return monochrome(theme);
    }

    let colors = theme.colors();
    let fg = |value: ColorValue| match value.to_color(capability) {
        Some(color) => Style::default().fg(color),
        None => Style::default(),
    };
    let on = |fg_value: ColorValue, bg_value: ColorValue| {
        let mut style = fg(fg_value);
        if let Some(bg) = bg_value.to_color(capability) {
            style = style.bg(bg);
        }
        style
    };

    Palette {
        theme,
        monochrome: false,
        text: fg(colors.text),
        muted: fg(colors.muted),
        folder: fg(colors.folder).add_modifier(Modifier::BOLD),
        selected: on(colors.selected_fg, colors.selected_bg).add_modifier(Modifier::BOLD),
        success: fg(colors.success),
        info: fg(colors.info),
        error: fg(colors.error).add_modifier(Modifier::BOLD),
        leader: fg(colors.leader),
        scrollbar_track: fg(colors.scrollbar_track),
        scrollbar_thumb: fg(colors.scrollbar_thumb),
        status_bar: on(colors.status_fg, colors.status_bg),
        border: fg(colors.border),
    }
}

/// No colours at all; emphasis comes from modifiers only
fn monochrome(theme: ThemeName) -> Palette {
    let plain = Style::default();
    Palette {
        theme,
        monochrome: true,
        text: plain,
        muted: plain.add_modifier(Modifier::DIM),
        folder: plain.add_modifier(Modifier::BOLD),
        selected: plain.add_modifier(Modifier::REVERSED | Modifier::BOLD),
        success: plain.add_modifier(Modifier::BOLD),
        info: plain.add_modifier(Modifier::BOLD),
        error: plain.add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        leader: plain.add_modifier(Modifier::DIM),
        scrollbar_track: plain.add_modifier(Modifier::DIM),
        scrollbar_thumb: plain,
        status_bar: plain.add_modifier(Modifier::REVERSED),
        border: plain,
    }
}

const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

fn nearest_level(value: u8) -> usize {
    CUBE_LEVELS
        .iter()
        .enumerate()
        .min_by_key(|(_, level)| (i32::from(**level) - i32::from(value)).abs())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn distance(a: (u8, u8, u8), b: (u8, u8, u8)) -> u32 {
    let d = |x: u8, y: u8| (i32::from(x) - i32::from(y)).unsigned_abs().pow(2);
    d(a.0, b.0) + d(a.1, b.1) + d(a.2, b.2)
}

/// Nearest entry of the xterm 256-colour cube or grey ramp
pub fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    let (ri, gi, bi) = (nearest_level(r), nearest_level(g), nearest_level(b));
    let cube = (CUBE_LEVELS[ri], CUBE_LEVELS[gi], CUBE_LEVELS[bi]);
    let cube_index = 16 + 36 * ri + 6 * gi + bi;

    let average = (u32::from(r) + u32::from(g) + u32::from(b)) / 3;
    let grey_step = (average.saturating_sub(3) / 10).min(23);
    let grey_value = (8 + grey_step * 10) as u8;
    let grey_index = 232 + grey_step as usize;

    let target = (r, g, b);
    if distance(target, (grey_value, grey_value, grey_value)) < distance(target, cube) {
        grey_index as u8
    } else {
        cube_index as u8
    }
}

const ANSI16: [(Color, (u8, u8, u8)); 16] = [
    (Color::Black, (0, 0, 0)),
    (Color::Red, (205, 0, 0)),
    (Color::Green, (0, 205, 0)),
    (Color::Yellow, (205, 205, 0)),
    (Color::Blue, (0, 0, 238)),
    (Color::Magenta, (205, 0, 205)),
    (Color::Cyan, (0, 205, 205)),
    (Color::Gray, (229, 229, 229)),
    (Color::DarkGray, (127, 127, 127)),
    (Color::LightRed, (255, 0, 0)),
    (Color::LightGreen, (0, 255, 0)),
    (Color::LightYellow, (255, 255, 0)),
    (Color::LightBlue, (92, 92, 255)),
    (Color::LightMagenta, (255, 0, 255)),
    (Color::LightCyan, (0, 255, 255)),
    (Color::White, (255, 255, 255)),
];

pub fn rgb_to_ansi16(r: u8, g: u8, b: u8) -> Color {
    ANSI16
        .iter()
        .min_by_key(|(_, value)| distance((r, g, b), *value))
        .map(|(color, _)| *color)
        .unwrap_or(Color::White)
}
