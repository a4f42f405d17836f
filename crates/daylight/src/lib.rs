//! # Daylight - Light/Dark Theme Preference Controller
//!
//! `daylight` decides whether a surface should be light or dark, shows it, and
//! keeps it that way as the user and the operating system change their minds.
//!
//! ## Core Concepts
//!
//! - [`Preference`]: the user's choice, `light`, `dark` or `auto`. The only
//!   persisted value.
//! - [`ColorMode`]: the theme actually shown, always `light` or `dark`.
//! - [`ThemeController`]: resolves, applies and persists, and follows system
//!   changes while the preference is `auto`.
//!
//! The controller talks to the outside world through three traits, so it can
//! run against a real platform or entirely in memory:
//!
//! | Trait | Provided implementations |
//! |-------|--------------------------|
//! | [`PreferenceStore`] | [`MemoryStore`], [`FileStore`] |
//! | [`SystemSignal`] | [`ManualSignal`], [`DetectedSignal`] |
//! | [`Surface`] | [`Page`] |
//!
//! ## Quick Start
//!
//! ```rust
//! use daylight::{ColorMode, ManualSignal, MemoryStore, Page, Preference, Surface, ThemeController};
//!
//! let mut controller = ThemeController::new(
//!     MemoryStore::new(),
//!     Page::with_controls(["light", "dark", "auto"]),
//!     ManualSignal::new(false),
//! );
//! controller.init();
//!
//! controller.toggle().unwrap();
//! assert_eq!(controller.preference(), Preference::Dark);
//! assert_eq!(controller.current_theme(), ColorMode::Dark);
//! assert!(controller.surface().has_class("dark-theme"));
//! ```
//!
//! ## System Detection
//!
//! [`DetectedSignal`] reads the OS color scheme through [`detect_color_mode`].
//! Override detection for tests or headless hosts with [`set_theme_detector`].

mod config;
mod controller;
mod detect;
mod error;
mod mode;
mod signal;
mod store;
mod surface;

pub use config::{ConfigError, ControllerConfig, DEFAULT_MARKER_CLASS, DEFAULT_STORAGE_KEY};
pub use controller::ThemeController;
pub use detect::{detect_color_mode, reset_theme_detector, set_theme_detector};
pub use error::ThemeError;
pub use mode::{ColorMode, ParsePreferenceError, Preference};
pub use signal::{DetectedSignal, Listener, ManualSignal, Subscription, SystemSignal};
pub use store::{FileStore, MemoryStore, PreferenceStore, StoreError};
pub use surface::{Page, Surface, ToggleControl};
