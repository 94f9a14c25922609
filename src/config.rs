//! Tunables for every subsystem.
//!
//! Defaults reproduce the live site. A page may override any subset through
//! a JSON block (see `wasm::load_config`); absent fields keep their default.

use std::time::Duration;

use serde::Deserialize;

use crate::error::Result;
use crate::theme::Rgba;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `localStorage` key holding `"modern"` or `"retro"`.
    pub theme_key: String,
    /// `localStorage` key holding the retro hit counter.
    pub hits_key: String,
    pub transition_ms: u32,
    pub glow: GlowConfig,
    pub stars: StarConfig,
    pub hits: HitConfig,
    pub shortcut: Shortcut,
    /// Maximum `tracing` level forwarded to the console.
    pub log_level: String,
    /// Run the WebGL ember grid under the modern theme.
    pub ember_grid: bool,
    /// Fixed seed for the star field. Random per page load when absent.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme_key: "portfolio-theme".to_owned(),
            hits_key: "retro-hits".to_owned(),
            transition_ms: 800,
            glow: GlowConfig::default(),
            stars: StarConfig::default(),
            hits: HitConfig::default(),
            shortcut: Shortcut::default(),
            log_level: "info".to_owned(),
            ember_grid: false,
            seed: None,
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn transition(&self) -> Duration {
        Duration::from_millis(u64::from(self.transition_ms))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GlowConfig {
    pub radius: f64,
    pub intensity: f64,
}

impl Default for GlowConfig {
    fn default() -> Self {
        Self {
            radius: 550.0,
            intensity: 0.35,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StarConfig {
    pub count: usize,
    /// Translucent wash painted every frame instead of clearing.
    pub trail: Rgba,
    pub glow_blur: f64,
    /// Per-frame chance of spawning a shooting star.
    pub shooting_chance: f64,
    /// Life lost by a shooting star each frame.
    pub shooting_decay: f64,
}

impl Default for StarConfig {
    fn default() -> Self {
        Self {
            count: 100,
            trail: Rgba::new(0, 0, 51, 0.15),
            glow_blur: 8.0,
            shooting_chance: 0.003,
            shooting_decay: 0.02,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HitConfig {
    pub seed: u64,
    pub width: usize,
    pub initial_delay_ms: u32,
    pub stagger_ms: u32,
}

impl Default for HitConfig {
    fn default() -> Self {
        Self {
            seed: 1337,
            width: 6,
            initial_delay_ms: 500,
            stagger_ms: 100,
        }
    }
}

/// Keyboard combination that toggles the theme.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Shortcut {
    pub key: String,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Default for Shortcut {
    fn default() -> Self {
        Self {
            key: "t".to_owned(),
            ctrl: true,
            alt: false,
            shift: false,
            meta: false,
        }
    }
}

/// Modifier state of a key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Shortcut {
    /// True when `key` is pressed with at least the modifiers this
    /// shortcut asks for. Extra modifiers do not prevent a match.
    pub fn matches(&self, key: &str, mods: Modifiers) -> bool {
        key == self.key
            && (mods.ctrl || !self.ctrl)
            && (mods.alt || !self.alt)
            && (mods.shift || !self.shift)
            && (mods.meta || !self.meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            Config::from_json(r#"{ "transition_ms": 300, "stars": { "count": 12 } }"#).unwrap();
        assert_eq!(config.transition(), Duration::from_millis(300));
        assert_eq!(config.stars.count, 12);
        assert_eq!(config.stars.shooting_chance, 0.003);
        assert_eq!(config.theme_key, "portfolio-theme");
        assert_eq!(config.hits.seed, 1337);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            Config::from_json("{ nope"),
            Err(crate::error::Error::Config(_))
        ));
    }

    #[test]
    fn ctrl_t_toggles() {
        let shortcut = Shortcut::default();
        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::default()
        };
        assert!(shortcut.matches("t", ctrl));
        assert!(!shortcut.matches("t", Modifiers::default()));
        assert!(!shortcut.matches("r", ctrl));
    }

    #[test]
    fn extra_modifiers_still_match() {
        let shortcut = Shortcut::default();
        let ctrl_alt = Modifiers {
            ctrl: true,
            alt: true,
            ..Modifiers::default()
        };
        assert!(shortcut.matches("t", ctrl_alt));
        assert!(!shortcut.matches(
            "t",
            Modifiers {
                ctrl: false,
                ..ctrl_alt
            }
        ));
    }
}
