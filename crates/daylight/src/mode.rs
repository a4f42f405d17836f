//! Preference and color mode values.
//!
//! Two closely related enums live here:
//!
//! - [`Preference`]: what the user asked for (`light`, `dark` or `auto`). This is
//!   the only value that gets persisted.
//! - [`ColorMode`]: what is actually shown. It is derived from the preference,
//!   falling back to the system signal when the preference is `auto`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The color mode actually applied to a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Light,
    Dark,
}

impl ColorMode {
    /// Maps the system "prefers dark" flag to a color mode.
    pub fn from_prefers_dark(prefers_dark: bool) -> Self {
        if prefers_dark {
            ColorMode::Dark
        } else {
            ColorMode::Light
        }
    }

    /// Returns the other mode.
    pub fn opposite(self) -> Self {
        match self {
            ColorMode::Light => ColorMode::Dark,
            ColorMode::Dark => ColorMode::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == ColorMode::Dark
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColorMode::Light => "light",
            ColorMode::Dark => "dark",
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ColorMode> for Preference {
    fn from(mode: ColorMode) -> Self {
        match mode {
            ColorMode::Light => Preference::Light,
            ColorMode::Dark => Preference::Dark,
        }
    }
}

/// A user's theme choice.
///
/// `Auto` defers to the system signal and is also what an empty store means.
///
/// # Example
///
/// ```rust
/// use daylight::Preference;
///
/// assert_eq!(Preference::from_stored(Some("dark")), Preference::Dark);
/// // Anything unexpected in storage reads as auto
/// assert_eq!(Preference::from_stored(Some("DARK")), Preference::Auto);
/// assert_eq!(Preference::from_stored(None), Preference::Auto);
///
/// // User input is parsed strictly
/// assert!("sepia".parse::<Preference>().is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preference {
    Light,
    Dark,
    #[default]
    Auto,
}

impl Preference {
    /// All modes, in the order toggle controls usually present them.
    pub const ALL: [Preference; 3] = [Preference::Light, Preference::Dark, Preference::Auto];

    /// Reads a persisted value permissively.
    ///
    /// Only the exact strings `light` and `dark` are explicit choices; a missing
    /// value or anything else is `Auto`.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("light") => Preference::Light,
            Some("dark") => Preference::Dark,
            _ => Preference::Auto,
        }
    }

    /// Returns the explicit color mode, or `None` for `Auto`.
    pub fn explicit(self) -> Option<ColorMode> {
        match self {
            Preference::Light => Some(ColorMode::Light),
            Preference::Dark => Some(ColorMode::Dark),
            Preference::Auto => None,
        }
    }

    /// Resolves to a color mode, consulting `prefers_dark` only for `Auto`.
    pub fn resolve(self, prefers_dark: impl FnOnce() -> bool) -> ColorMode {
        self.explicit()
            .unwrap_or_else(|| ColorMode::from_prefers_dark(prefers_dark()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Preference::Light => "light",
            Preference::Dark => "dark",
            Preference::Auto => "auto",
        }
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a user-supplied mode is not `light`, `dark` or `auto`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme mode '{0}' (expected light, dark or auto)")]
pub struct ParsePreferenceError(pub String);

impl FromStr for Preference {
    type Err = ParsePreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Preference::Light),
            "dark" => Ok(Preference::Dark),
            "auto" | "system" => Ok(Preference::Auto),
            _ => Err(ParsePreferenceError(s.to_string())),
        }
    }
}
