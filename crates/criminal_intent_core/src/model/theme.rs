//! Static color theme palette.
//!
//! # Invariants
//! - The palette is fixed at seven entries and not user-extensible.
//! - Light membership is a fixed subset of names, independent of the color
//!   value.

use std::fmt::{Display, Formatter};

/// Theme adopted when nothing valid is stored.
pub const DEFAULT_THEME: ThemeName = ThemeName::Purple;

/// Contrast style for the platform status bar drawn over a theme color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBarStyle {
    Light,
    Dark,
    Auto,
}

impl StatusBarStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Auto => "auto",
        }
    }
}

/// Display attributes looked up from a theme name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeObject {
    /// `#RRGGBB` hex color.
    pub color: &'static str,
    pub status_bar: StatusBarStyle,
}

/// One of the fixed palette entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeName {
    Blue,
    Purple,
    Green,
    Yellow,
    Black,
    White,
    Red,
}

impl ThemeName {
    /// All themes in palette order.
    pub const ALL: [ThemeName; 7] = [
        Self::Blue,
        Self::Purple,
        Self::Green,
        Self::Yellow,
        Self::Black,
        Self::White,
        Self::Red,
    ];

    /// Resolves a stored or user-supplied name. Matching is exact.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|theme| theme.as_str() == value)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Purple => "purple",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Black => "black",
            Self::White => "white",
            Self::Red => "red",
        }
    }

    pub fn object(self) -> ThemeObject {
        let (color, status_bar) = match self {
            Self::Blue => ("#0000FF", StatusBarStyle::Light),
            Self::Purple => ("#800080", StatusBarStyle::Light),
            Self::Green => ("#00FF00", StatusBarStyle::Dark),
            Self::Yellow => ("#FFFF00", StatusBarStyle::Dark),
            Self::Black => ("#000000", StatusBarStyle::Light),
            Self::White => ("#FFFFFF", StatusBarStyle::Dark),
            Self::Red => ("#FF0000", StatusBarStyle::Light),
        };
        ThemeObject { color, status_bar }
    }

    /// Whether foreground content should use dark-on-light colors.
    pub fn is_light(self) -> bool {
        matches!(self, Self::White | Self::Green | Self::Red)
    }
}

impl Display for ThemeName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived view of the selected theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeSnapshot {
    pub name: ThemeName,
    pub color: &'static str,
    pub status_bar: StatusBarStyle,
    pub is_light: bool,
}

impl From<ThemeName> for ThemeSnapshot {
    fn from(name: ThemeName) -> Self {
        let object = name.object();
        Self {
            name,
            color: object.color,
            status_bar: object.status_bar,
            is_light: name.is_light(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{StatusBarStyle, ThemeName, ThemeSnapshot, DEFAULT_THEME};

    #[test]
    fn parse_accepts_exact_palette_keys_only() {
        assert_eq!(ThemeName::parse("green"), Some(ThemeName::Green));
        assert_eq!(ThemeName::parse("Green"), None);
        assert_eq!(ThemeName::parse(" green"), None);
        assert_eq!(ThemeName::parse("not-a-real-theme"), None);
    }

    #[test]
    fn every_name_round_trips_through_parse() {
        for theme in ThemeName::ALL {
            assert_eq!(ThemeName::parse(theme.as_str()), Some(theme));
        }
    }

    #[test]
    fn green_snapshot_matches_table() {
        let snapshot = ThemeSnapshot::from(ThemeName::Green);
        assert_eq!(snapshot.color, "#00FF00");
        assert_eq!(snapshot.status_bar, StatusBarStyle::Dark);
        assert!(snapshot.is_light);
    }

    #[test]
    fn light_subset_ignores_color_luminance() {
        assert!(ThemeName::Red.is_light());
        assert!(!ThemeName::Yellow.is_light());
        assert!(!DEFAULT_THEME.is_light());
    }
}
