//! The presentation side: a root class marker and toggle controls.

use std::collections::BTreeSet;

/// A control that selects a theme mode, such as a "dark" button.
///
/// Controls hold no state of their own. `active` and `pressed` are written by
/// the controller every time the preference changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleControl {
    mode: String,
    active: bool,
    pressed: bool,
}

impl ToggleControl {
    /// Creates an inactive control tagged with `mode`.
    ///
    /// The tag is compared verbatim, so a control tagged with something other
    /// than `light`, `dark` or `auto` is never activated.
    pub fn new(mode: impl Into<String>) -> Self {
        Self {
            mode: mode.into(),
            active: false,
            pressed: false,
        }
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Mirrors `aria-pressed`.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        self.pressed = active;
    }
}

/// Where the theme is shown.
pub trait Surface {
    /// Adds or removes a class on the root element.
    fn set_class(&mut self, class: &str, present: bool);

    fn has_class(&self, class: &str) -> bool;

    /// All toggle controls currently on the surface, possibly none.
    fn controls_mut(&mut self) -> &mut [ToggleControl];
}

/// An in-memory document: a set of root classes plus toggle controls.
///
/// # Example
///
/// ```rust
/// use daylight::{Page, Surface};
///
/// let mut page = Page::with_controls(["light", "dark", "auto"]);
/// page.set_class("dark-theme", true);
/// assert!(page.has_class("dark-theme"));
/// assert_eq!(page.controls().len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    classes: BTreeSet<String>,
    controls: Vec<ToggleControl>,
}

impl Page {
    /// Creates a page with no classes and no controls.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a page with one control per mode tag, in order.
    pub fn with_controls<I, S>(modes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: BTreeSet::new(),
            controls: modes.into_iter().map(ToggleControl::new).collect(),
        }
    }

    pub fn add_control(&mut self, control: ToggleControl) {
        self.controls.push(control);
    }

    pub fn controls(&self) -> &[ToggleControl] {
        &self.controls
    }

    /// Returns the first control tagged with `mode`.
    pub fn control(&self, mode: &str) -> Option<&ToggleControl> {
        self.controls.iter().find(|c| c.mode == mode)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }
}

impl Surface for Page {
    fn set_class(&mut self, class: &str, present: bool) {
        if present {
            self.classes.insert(class.to_string());
        } else {
            self.classes.remove(class);
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    fn controls_mut(&mut self) -> &mut [ToggleControl] {
        &mut self.controls
    }
}
