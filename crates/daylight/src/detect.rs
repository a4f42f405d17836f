//! Operating system color mode detection.
//!
//! Detection goes through a process-wide detector function so tests and hosts
//! without a desktop session can force a mode:
//!
//! ```rust
//! use daylight::{detect_color_mode, set_theme_detector, ColorMode};
//!
//! set_theme_detector(|| ColorMode::Dark);
//! assert_eq!(detect_color_mode(), ColorMode::Dark);
//! # daylight::reset_theme_detector();
//! ```

use dark_light::{detect as detect_os_theme, Mode as OsThemeMode};
use once_cell::sync::Lazy;
use std::sync::Mutex;

use crate::mode::ColorMode;

type ThemeDetector = fn() -> ColorMode;

static THEME_DETECTOR: Lazy<Mutex<ThemeDetector>> = Lazy::new(|| Mutex::new(os_theme_detector));

/// Overrides the detector used to determine whether the system prefers a light or dark theme.
pub fn set_theme_detector(detector: ThemeDetector) {
    let mut guard = THEME_DETECTOR
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = detector;
}

/// Restores the OS-backed detector.
pub fn reset_theme_detector() {
    set_theme_detector(os_theme_detector);
}

/// Queries the configured detector for the current system color mode.
pub fn detect_color_mode() -> ColorMode {
    let detector = *THEME_DETECTOR
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    detector()
}

fn os_theme_detector() -> ColorMode {
    match detect_os_theme() {
        OsThemeMode::Dark => ColorMode::Dark,
        OsThemeMode::Light => ColorMode::Light,
    }
}
