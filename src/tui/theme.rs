//! Color themes for the wizard.
//!
//! The active theme is picked by name from `ui.theme` in the config file.
//! Commit types may carry their own hex color, parsed with
//! [`parse_hex_color`].

use ratatui::style::Color;

use crate::core::{CommitType, StatusLevel};

/// Colors used by every view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: String,
    /// Borders of the focused pane, headings
    pub primary: Color,
    /// Commit type tags, key hints
    pub secondary: Color,
    /// Directories, selection markers
    pub accent: Color,
    pub text: Color,
    pub text_dim: Color,
    pub text_muted: Color,
    /// `Reset` keeps the terminal background
    pub background: Color,
    pub selected_bg: Color,
    pub border: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_theme()
    }
}

impl Theme {
    pub fn default_theme() -> Self {
        Self {
            name: "default".to_string(),
            primary: Color::Rgb(99, 102, 241),     // Indigo
            secondary: Color::Rgb(16, 185, 129),   // Emerald
            accent: Color::Rgb(251, 146, 60),      // Orange
            text: Color::White,
            text_dim: Color::Rgb(156, 163, 175),   // Gray-400
            text_muted: Color::Rgb(107, 114, 128), // Gray-500
            background: Color::Reset,
            selected_bg: Color::Rgb(55, 65, 81),   // Gray-700
            border: Color::Rgb(75, 85, 99),        // Gray-600
            success: Color::Rgb(34, 197, 94),
            warning: Color::Rgb(234, 179, 8),
            error: Color::Rgb(239, 68, 68),
        }
    }

    pub fn dracula() -> Self {
        Self {
            name: "dracula".to_string(),
            primary: Color::Rgb(189, 147, 249),
            secondary: Color::Rgb(80, 250, 123),
            accent: Color::Rgb(255, 121, 198),
            text: Color::Rgb(248, 248, 242),
            text_dim: Color::Rgb(189, 147, 249),
            text_muted: Color::Rgb(98, 114, 164),
            background: Color::Rgb(40, 42, 54),
            selected_bg: Color::Rgb(68, 71, 90),
            border: Color::Rgb(68, 71, 90),
            success: Color::Rgb(80, 250, 123),
            warning: Color::Rgb(255, 184, 108),
            error: Color::Rgb(255, 85, 85),
        }
    }

    pub fn nord() -> Self {
        Self {
            name: "nord".to_string(),
            primary: Color::Rgb(136, 192, 208),
            secondary: Color::Rgb(163, 190, 140),
            accent: Color::Rgb(208, 135, 112),
            text: Color::Rgb(236, 239, 244),
            text_dim: Color::Rgb(216, 222, 233),
            text_muted: Color::Rgb(76, 86, 106),
            background: Color::Rgb(46, 52, 64),
            selected_bg: Color::Rgb(59, 66, 82),
            border: Color::Rgb(67, 76, 94),
            success: Color::Rgb(163, 190, 140),
            warning: Color::Rgb(235, 203, 139),
            error: Color::Rgb(191, 97, 106),
        }
    }

    pub fn gruvbox_dark() -> Self {
        Self {
            name: "gruvbox-dark".to_string(),
            primary: Color::Rgb(131, 165, 152),
            secondary: Color::Rgb(184, 187, 38),
            accent: Color::Rgb(254, 128, 25),
            text: Color::Rgb(235, 219, 178),
            text_dim: Color::Rgb(168, 153, 132),
            text_muted: Color::Rgb(146, 131, 116),
            background: Color::Rgb(40, 40, 40),
            selected_bg: Color::Rgb(60, 56, 54),
            border: Color::Rgb(80, 73, 69),
            success: Color::Rgb(184, 187, 38),
            warning: Color::Rgb(250, 189, 47),
            error: Color::Rgb(251, 73, 52),
        }
    }

    /// Plain ANSI colors for terminals without truecolor.
    pub fn high_contrast() -> Self {
        Self {
            name: "high-contrast".to_string(),
            primary: Color::Cyan,
            secondary: Color::Green,
            accent: Color::Yellow,
            text: Color::White,
            text_dim: Color::LightCyan,
            text_muted: Color::Gray,
            background: Color::Black,
            selected_bg: Color::Blue,
            border: Color::White,
            success: Color::LightGreen,
            warning: Color::LightYellow,
            error: Color::LightRed,
        }
    }

    /// Look a theme up by name (case-insensitive).
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" => Some(Self::default_theme()),
            "dracula" => Some(Self::dracula()),
            "nord" => Some(Self::nord()),
            "gruvbox-dark" | "gruvbox_dark" | "gruvbox" => Some(Self::gruvbox_dark()),
            "high-contrast" | "high_contrast" => Some(Self::high_contrast()),
            _ => None,
        }
    }

    pub fn available_themes() -> Vec<&'static str> {
        vec!["default", "dracula", "nord", "gruvbox-dark", "high-contrast"]
    }

    /// Color of the status bar for a message level.
    pub fn level_color(&self, level: StatusLevel) -> Color {
        match level {
            StatusLevel::Info => self.text_dim,
            StatusLevel::Success => self.success,
            StatusLevel::Warning => self.warning,
            StatusLevel::Error | StatusLevel::Fatal => self.error,
        }
    }

    /// The commit type's own color when it has a valid one.
    pub fn tag_color(&self, commit_type: &CommitType) -> Color {
        commit_type.color.as_deref().and_then(parse_hex_color).unwrap_or(self.secondary)
    }

    /// Color of a staged-status marker in the scope browser.
    pub fn git_status_color(&self, code: &str) -> Color {
        match code {
            "A" => self.success,
            "D" => self.error,
            "R" | "C" => self.accent,
            _ => self.warning,
        }
    }
}

/// Parse `#RRGGBB` or `RRGGBB`.
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_by_name() {
        assert_eq!(Theme::by_name("DRACULA").map(|t| t.name), Some("dracula".to_string()));
        assert!(Theme::by_name("gruvbox").is_some());
        assert!(Theme::by_name("unknown-theme").is_none());
    }

    #[test]
    fn test_all_builtin_themes_resolve() {
        for name in Theme::available_themes() {
            let theme = Theme::by_name(name).unwrap_or_else(|| panic!("theme {name} should exist"));
            assert_eq!(theme.name, name);
        }
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FF0000"), Some(Color::Rgb(255, 0, 0)));
        assert_eq!(parse_hex_color("282a36"), Some(Color::Rgb(40, 42, 54)));
        assert_eq!(parse_hex_color("#FFF"), None);
        assert_eq!(parse_hex_color("zzzzzz"), None);
    }

    #[test]
    fn test_tag_color_falls_back_to_secondary() {
        let theme = Theme::default();
        let mut fix = CommitType::new("FIX", "bug fix");
        assert_eq!(theme.tag_color(&fix), theme.secondary);

        fix.color = Some("#00ff00".to_string());
        assert_eq!(theme.tag_color(&fix), Color::Rgb(0, 255, 0));

        fix.color = Some("green".to_string());
        assert_eq!(theme.tag_color(&fix), theme.secondary);
    }

    #[test]
    fn test_level_colors() {
        let theme = Theme::nord();
        assert_eq!(theme.level_color(StatusLevel::Error), theme.error);
        assert_eq!(theme.level_color(StatusLevel::Fatal), theme.error);
        assert_eq!(theme.level_color(StatusLevel::Success), theme.success);
    }
}
