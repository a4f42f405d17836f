//! The theme controller.
//!
//! [`ThemeController`] ties the three ports together:
//!
//! - a [`PreferenceStore`] holding the user's choice,
//! - a [`Surface`] that shows the theme and its toggle controls,
//! - a [`SystemSignal`] reporting the platform's preference.
//!
//! ## Precedence
//!
//! An explicit `light` or `dark` preference always wins. With `auto` (or no
//! stored value, or a value the controller does not recognize) the system
//! signal decides. System changes are only applied while the preference is
//! `auto`; they never overwrite an explicit choice.
//!
//! ## Example
//!
//! ```rust
//! use daylight::{ColorMode, ManualSignal, MemoryStore, Page, Preference, ThemeController};
//!
//! let signal = ManualSignal::new(true);
//! let mut controller = ThemeController::new(
//!     MemoryStore::new(),
//!     Page::with_controls(["light", "dark", "auto"]),
//!     signal.clone(),
//! );
//!
//! // Nothing stored: follow the system
//! assert_eq!(controller.init(), ColorMode::Dark);
//! assert!(controller.surface().control("auto").unwrap().is_active());
//!
//! // An explicit choice sticks through system changes
//! controller.set_preference(Preference::Light).unwrap();
//! signal.emit(true);
//! assert_eq!(controller.current_theme(), ColorMode::Light);
//! ```

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use tracing::{debug, trace};

use crate::config::ControllerConfig;
use crate::error::ThemeError;
use crate::mode::{ColorMode, Preference};
use crate::signal::{SystemSignal, Subscription};
use crate::store::{PreferenceStore, StoreError};
use crate::surface::Surface;

/// State shared between the controller and its system signal listener.
struct Shared<S, P> {
    store: S,
    surface: P,
    config: ControllerConfig,
}

impl<S: PreferenceStore, P: Surface> Shared<S, P> {
    fn preference(&self) -> Preference {
        Preference::from_stored(self.store.get(&self.config.storage_key).as_deref())
    }

    fn persist(&mut self, mode: Preference) -> Result<(), StoreError> {
        self.store.set(&self.config.storage_key, mode.as_str())
    }

    fn apply(&mut self, theme: ColorMode) {
        trace!(%theme, class = %self.config.marker_class, "applying theme");
        self.surface
            .set_class(&self.config.marker_class, theme.is_dark());
    }

    fn sync_controls(&mut self, active: Preference) {
        let active = active.as_str();
        for control in self.surface.controls_mut() {
            let is_active = control.mode() == active;
            control.set_active(is_active);
        }
    }
}

/// Keeps a surface's theme in line with the stored preference and the system.
pub struct ThemeController<S, P, O> {
    subscription: Option<Subscription>,
    shared: Rc<RefCell<Shared<S, P>>>,
    signal: O,
}

impl<S, P, O> ThemeController<S, P, O>
where
    S: PreferenceStore + 'static,
    P: Surface + 'static,
    O: SystemSignal,
{
    /// Creates a controller with the default configuration.
    ///
    /// Nothing is applied until [`init`](Self::init) or a preference change.
    pub fn new(store: S, surface: P, signal: O) -> Self {
        Self::with_config(store, surface, signal, ControllerConfig::default())
    }

    pub fn with_config(store: S, surface: P, signal: O, config: ControllerConfig) -> Self {
        Self {
            subscription: None,
            shared: Rc::new(RefCell::new(Shared {
                store,
                surface,
                config,
            })),
            signal,
        }
    }

    /// Applies the initial theme, syncs controls and starts watching the system.
    ///
    /// Controls are synced against the stored mode, so `auto` is highlighted
    /// when nothing has been chosen yet. Watching is skipped when
    /// [`ControllerConfig::watch_system`] is off.
    pub fn init(&mut self) -> ColorMode {
        let theme = self.resolve_preference();
        let preference = self.preference();
        let watch = {
            let mut shared = self.shared.borrow_mut();
            shared.apply(theme);
            shared.sync_controls(preference);
            shared.config.watch_system
        };
        if watch {
            self.watch_system_preference();
        }
        debug!(%preference, %theme, watch, "theme controller initialized");
        theme
    }

    /// The stored preference, `auto` when nothing (or nothing valid) is stored.
    pub fn preference(&self) -> Preference {
        self.shared.borrow().preference()
    }

    /// Resolves the theme that should be showing right now.
    ///
    /// `light` and `dark` preferences are returned as-is; anything else is
    /// answered by the system signal.
    pub fn resolve_preference(&self) -> ColorMode {
        self.preference().resolve(|| self.signal.prefers_dark())
    }

    /// The effective theme. Same as [`resolve_preference`](Self::resolve_preference).
    pub fn current_theme(&self) -> ColorMode {
        self.resolve_preference()
    }

    /// Shows `theme` on the surface. Applying the same theme twice changes nothing.
    pub fn apply(&mut self, theme: ColorMode) {
        self.shared.borrow_mut().apply(theme);
    }

    /// Stores `mode`, applies the resulting theme and syncs controls.
    ///
    /// Returns the theme that was applied.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::Store`] if the preference cannot be saved. The
    /// surface is left untouched in that case, so what is shown never
    /// disagrees with what is stored.
    pub fn set_preference(&mut self, mode: Preference) -> Result<ColorMode, ThemeError> {
        let theme = mode.resolve(|| self.signal.prefers_dark());
        let mut shared = self.shared.borrow_mut();
        shared.persist(mode)?;
        shared.apply(theme);
        shared.sync_controls(mode);
        debug!(%mode, %theme, "theme preference set");
        Ok(theme)
    }

    /// Switches to the opposite of the current theme.
    ///
    /// The result is always an explicit preference: toggling out of `auto`
    /// stops following the system. Returns the new theme.
    ///
    /// # Errors
    ///
    /// Same as [`set_preference`](Self::set_preference).
    pub fn toggle(&mut self) -> Result<ColorMode, ThemeError> {
        let next = self.resolve_preference().opposite();
        self.set_preference(next.into())
    }

    /// Marks the controls tagged `active` as active and pressed, all others not.
    pub fn sync_controls(&mut self, active: Preference) {
        self.shared.borrow_mut().sync_controls(active);
    }

    /// Starts following system color mode changes.
    ///
    /// Each change is applied only while the stored preference is `auto`.
    /// Calling this again replaces the previous subscription.
    pub fn watch_system_preference(&mut self) {
        // Drop first so the old listener never sees another event
        self.subscription = None;

        let shared = Rc::downgrade(&self.shared);
        let listener = move |prefers_dark: bool| {
            let Some(state) = shared.upgrade() else {
                return;
            };
            let mut state = state.borrow_mut();
            let preference = state.preference();
            if preference != Preference::Auto {
                trace!(%preference, prefers_dark, "ignoring system change, explicit preference set");
                return;
            }
            let theme = ColorMode::from_prefers_dark(prefers_dark);
            debug!(%theme, "system color mode changed");
            state.apply(theme);
        };
        self.subscription = Some(self.signal.subscribe(Box::new(listener)));
    }

    /// Stops following system changes.
    pub fn unwatch(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }
    }

    pub fn is_watching(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn config(&self) -> Ref<'_, ControllerConfig> {
        Ref::map(self.shared.borrow(), |shared| &shared.config)
    }

    pub fn store(&self) -> Ref<'_, S> {
        Ref::map(self.shared.borrow(), |shared| &shared.store)
    }

    pub fn surface(&self) -> Ref<'_, P> {
        Ref::map(self.shared.borrow(), |shared| &shared.surface)
    }

    pub fn signal(&self) -> &O {
        &self.signal
    }
}
