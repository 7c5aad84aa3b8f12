// Light/dark theme selection and color palette.
// The chosen mode is persisted in preferences; auto follows the terminal.

use ratatui::style::Color;

use crate::error::Result;
use crate::storage::Preferences;

/// Preferences key holding the theme mode.
pub const THEME_KEY: &str = "theme.mode";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    Auto,
}

impl ThemeMode {
    /// Parse a stored value. Unknown or missing values mean `Auto`.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("light") => ThemeMode::Light,
            Some("dark") => ThemeMode::Dark,
            _ => ThemeMode::Auto,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::Auto => "auto",
        }
    }
}

/// Theme actually in effect after resolving `Auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveTheme {
    Light,
    Dark,
}

pub fn stored_mode(prefs: &Preferences) -> ThemeMode {
    ThemeMode::parse(prefs.get(THEME_KEY))
}

pub fn active_theme(mode: ThemeMode, system_dark: bool) -> ActiveTheme {
    match mode {
        ThemeMode::Light => ActiveTheme::Light,
        ThemeMode::Dark => ActiveTheme::Dark,
        ThemeMode::Auto if system_dark => ActiveTheme::Dark,
        ThemeMode::Auto => ActiveTheme::Light,
    }
}

/// Terminal background preference from `COLORFGBG`; dark when unknown.
pub fn system_prefers_dark() -> bool {
    dark_from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref())
}

fn dark_from_colorfgbg(value: Option<&str>) -> bool {
    let background = value
        .and_then(|v| v.rsplit(';').next())
        .and_then(|bg| bg.trim().parse::<u8>().ok());

    !matches!(background, Some(7) | Some(15))
}

pub fn set_mode(prefs: &mut Preferences, mode: ThemeMode) -> Result<()> {
    prefs.set(THEME_KEY, mode.as_str())
}

/// Switch to the explicit opposite of the theme currently in effect.
pub fn toggle(prefs: &mut Preferences, system_dark: bool) -> Result<ThemeMode> {
    let next = match active_theme(stored_mode(prefs), system_dark) {
        ActiveTheme::Light => ThemeMode::Dark,
        ActiveTheme::Dark => ThemeMode::Light,
    };
    set_mode(prefs, next)?;
    tracing::debug!(mode = next.as_str(), "theme changed");
    Ok(next)
}

/// Colors used by the UI for one active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub border: Color,
    pub selection: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
}

impl Palette {
    pub fn for_theme(theme: ActiveTheme) -> Self {
        match theme {
            ActiveTheme::Dark => Self {
                text: Color::White,
                muted: Color::DarkGray,
                accent: Color::Cyan,
                border: Color::DarkGray,
                selection: Color::Rgb(40, 44, 52),
                success: Color::Green,
                warning: Color::Yellow,
                error: Color::Red,
                info: Color::Blue,
            },
            ActiveTheme::Light => Self {
                text: Color::Black,
                muted: Color::Gray,
                accent: Color::Rgb(32, 128, 240),
                border: Color::Gray,
                selection: Color::Rgb(220, 230, 245),
                success: Color::Rgb(24, 160, 88),
                warning: Color::Rgb(240, 160, 32),
                error: Color::Rgb(208, 48, 80),
                info: Color::Rgb(32, 128, 240),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mode_parse_and_resolution() {
        assert_eq!(ThemeMode::parse(Some("dark")), ThemeMode::Dark);
        assert_eq!(ThemeMode::parse(Some("sepia")), ThemeMode::Auto);
        assert_eq!(ThemeMode::parse(None), ThemeMode::Auto);

        assert_eq!(active_theme(ThemeMode::Auto, true), ActiveTheme::Dark);
        assert_eq!(active_theme(ThemeMode::Auto, false), ActiveTheme::Light);
        assert_eq!(active_theme(ThemeMode::Light, true), ActiveTheme::Light);
    }

    #[test]
    fn test_colorfgbg_detection() {
        assert!(dark_from_colorfgbg(Some("15;0")));
        assert!(!dark_from_colorfgbg(Some("0;15")));
        assert!(!dark_from_colorfgbg(Some("0;default;7")));
        assert!(dark_from_colorfgbg(None));
    }

    #[test]
    fn test_toggle_flips_active_theme() {
        let temp_dir = TempDir::new().unwrap();
        let mut prefs = Preferences::open(temp_dir.path().join("preferences.json")).unwrap();

        // auto on a dark terminal becomes explicit light
        assert_eq!(toggle(&mut prefs, true).unwrap(), ThemeMode::Light);
        assert_eq!(prefs.get(THEME_KEY), Some("light"));
        assert_eq!(toggle(&mut prefs, true).unwrap(), ThemeMode::Dark);

        set_mode(&mut prefs, ThemeMode::Auto).unwrap();
        assert_eq!(stored_mode(&prefs), ThemeMode::Auto);
    }
}
