use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Visual skin of the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Modern,
    Retro,
}

impl Theme {
    pub const ALL: [Theme; 2] = [Theme::Modern, Theme::Retro];

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Modern => "modern",
            Theme::Retro => "retro",
        }
    }

    pub fn opposite(self) -> Theme {
        match self {
            Theme::Modern => Theme::Retro,
            Theme::Retro => Theme::Modern,
        }
    }

    /// Class placed on the root element so stylesheets can react without
    /// waiting for any script.
    pub fn marker_class(self) -> &'static str {
        match self {
            Theme::Modern => "theme-modern",
            Theme::Retro => "theme-retro",
        }
    }

    /// Label for the toggle control, describing what a click would do.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Theme::Modern => "Switch to Retro theme",
            Theme::Retro => "Switch to Modern theme",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "modern" => Ok(Theme::Modern),
            "retro" => Ok(Theme::Retro),
            other => Err(Error::UnknownTheme(other.to_owned())),
        }
    }
}

/// Straight-alpha colour, rendered in CSS `rgba()` syntax.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);
    pub const CYAN: Rgba = Rgba::opaque(0, 255, 255);
    pub const MAGENTA: Rgba = Rgba::opaque(255, 0, 255);
    pub const GREEN: Rgba = Rgba::opaque(0, 255, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self { a: a.clamp(0.0, 1.0), ..self }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_only_known_names() {
        assert_eq!("retro".parse::<Theme>().unwrap(), Theme::Retro);
        assert_eq!("modern".parse::<Theme>().unwrap(), Theme::Modern);
        assert!(matches!(
            "Retro".parse::<Theme>(),
            Err(Error::UnknownTheme(name)) if name == "Retro"
        ));
        assert!("".parse::<Theme>().is_err());
    }

    #[test]
    fn opposite_is_an_involution() {
        for theme in Theme::ALL {
            assert_ne!(theme.opposite(), theme);
            assert_eq!(theme.opposite().opposite(), theme);
        }
    }

    #[test]
    fn rgba_renders_css() {
        assert_eq!(Rgba::new(10, 25, 47, 0.0).to_string(), "rgba(10, 25, 47, 0)");
        assert_eq!(Rgba::WHITE.with_alpha(0.35).to_string(), "rgba(255, 255, 255, 0.35)");
        assert_eq!(Rgba::WHITE.with_alpha(1.7).a, 1.0);
    }
}
