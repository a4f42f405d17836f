//! The system "prefers dark" signal.
//!
//! [`SystemSignal`] is the capability the controller needs from the platform:
//! a way to ask for the current value and a way to be told when it changes.
//! Subscribing hands back a [`Subscription`]; dropping it removes the listener.
//!
//! Two implementations are provided:
//!
//! - [`ManualSignal`]: the value is set by the caller. Used in tests and by
//!   hosts that receive change events from their own platform layer.
//! - [`DetectedSignal`]: backed by OS detection (see [`crate::detect_color_mode`]).
//!   It has no background thread; the host calls [`DetectedSignal::poll`] from
//!   its event loop.
//!
//! Everything here is single-threaded. Listeners are invoked in subscription
//! order. A listener may subscribe or unsubscribe (including dropping its own
//! subscription) while being notified; listeners added during a notification
//! first hear the next one. Listeners must not emit on the signal that is
//! notifying them.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::detect::detect_color_mode;

/// Callback invoked with the new "prefers dark" value.
pub type Listener = Box<dyn FnMut(bool)>;

/// A readable, observable "system prefers dark" flag.
pub trait SystemSignal {
    /// Returns whether the system currently prefers a dark theme.
    fn prefers_dark(&self) -> bool;

    /// Registers `listener` for change notifications.
    ///
    /// The listener stays registered until the returned [`Subscription`] is
    /// dropped or cancelled.
    fn subscribe(&self, listener: Listener) -> Subscription;
}

/// Handle to a registered listener. Dropping it unsubscribes.
#[must_use = "dropping a Subscription immediately unsubscribes the listener"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wraps an unsubscribe action.
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Unsubscribes now.
    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Listener registry shared by the signal implementations.
///
/// While notifying, the registered listeners are moved out of `entries` so
/// callbacks can add or remove subscriptions. Removals of listeners that are
/// out for notification are queued in `removed` and applied afterwards.
#[derive(Default)]
struct Listeners {
    entries: RefCell<Vec<(u64, Listener)>>,
    next_id: Cell<u64>,
    notifying: Cell<bool>,
    in_flight: Cell<usize>,
    removed: RefCell<Vec<u64>>,
}

impl Listeners {
    fn add(self: &Rc<Self>, listener: Listener) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.entries.borrow_mut().push((id, listener));
        trace!(id, "signal listener added");

        let registry: Weak<Listeners> = Rc::downgrade(self);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.remove(id);
            }
        })
    }

    fn remove(&self, id: u64) {
        let dropped = {
            let mut entries = self.entries.borrow_mut();
            let index = entries.iter().position(|(entry, _)| *entry == id);
            index.map(|index| entries.remove(index))
        };
        if dropped.is_none() && self.notifying.get() {
            self.removed.borrow_mut().push(id);
        }
        trace!(id, "signal listener removed");
    }

    fn notify(&self, prefers_dark: bool) {
        let mut running = std::mem::take(&mut *self.entries.borrow_mut());
        trace!(prefers_dark, listeners = running.len(), "notifying signal listeners");

        self.notifying.set(true);
        self.in_flight.set(running.len());
        for (id, listener) in running.iter_mut() {
            if self.removed.borrow().contains(id) {
                continue;
            }
            listener(prefers_dark);
        }
        self.notifying.set(false);
        self.in_flight.set(0);

        let removed = std::mem::take(&mut *self.removed.borrow_mut());
        let (kept, dropped): (Vec<_>, Vec<_>) = running
            .into_iter()
            .partition(|(id, _)| !removed.contains(id));
        {
            let mut entries = self.entries.borrow_mut();
            let added = std::mem::replace(&mut *entries, kept);
            entries.extend(added);
        }
        // Dropping a listener can release subscriptions it owns
        drop(dropped);
    }

    fn len(&self) -> usize {
        self.entries.borrow().len() + self.in_flight.get() - self.removed.borrow().len()
    }
}

#[derive(Default)]
struct ManualState {
    prefers_dark: Cell<bool>,
    listeners: Rc<Listeners>,
}

/// A signal whose value is driven by the caller.
///
/// Clones share state, so a test can keep one handle and give another to the
/// controller.
///
/// # Example
///
/// ```rust
/// use daylight::{ManualSignal, SystemSignal};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let signal = ManualSignal::new(false);
/// let seen = Rc::new(Cell::new(false));
/// let sink = Rc::clone(&seen);
/// let _subscription = signal.subscribe(Box::new(move |dark| sink.set(dark)));
///
/// signal.emit(true);
/// assert!(seen.get());
/// assert!(signal.prefers_dark());
/// ```
#[derive(Clone, Default)]
pub struct ManualSignal {
    state: Rc<ManualState>,
}

impl ManualSignal {
    pub fn new(prefers_dark: bool) -> Self {
        let signal = Self::default();
        signal.state.prefers_dark.set(prefers_dark);
        signal
    }

    /// Changes the value without notifying listeners.
    pub fn set(&self, prefers_dark: bool) {
        self.state.prefers_dark.set(prefers_dark);
    }

    /// Changes the value and notifies every listener.
    ///
    /// Listeners are notified even when the value did not change, matching
    /// platforms that deliver redundant change events.
    pub fn emit(&self, prefers_dark: bool) {
        self.state.prefers_dark.set(prefers_dark);
        self.state.listeners.notify(prefers_dark);
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        self.state.listeners.len()
    }
}

impl SystemSignal for ManualSignal {
    fn prefers_dark(&self) -> bool {
        self.state.prefers_dark.get()
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        self.state.listeners.add(listener)
    }
}

impl fmt::Debug for ManualSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualSignal")
            .field("prefers_dark", &self.state.prefers_dark.get())
            .field("listeners", &self.state.listeners.len())
            .finish()
    }
}

/// A signal backed by operating system detection.
///
/// Reads always query the detector. Change notifications are produced by
/// [`poll`](DetectedSignal::poll), which compares against the last value it
/// observed.
pub struct DetectedSignal {
    last: Cell<bool>,
    listeners: Rc<Listeners>,
}

impl DetectedSignal {
    pub fn new() -> Self {
        Self {
            last: Cell::new(detect_color_mode().is_dark()),
            listeners: Rc::default(),
        }
    }

    /// Re-detects the system mode and notifies listeners if it changed.
    ///
    /// Returns `true` when a change was observed.
    pub fn poll(&self) -> bool {
        let prefers_dark = detect_color_mode().is_dark();
        if prefers_dark == self.last.replace(prefers_dark) {
            return false;
        }
        trace!(prefers_dark, "system color mode changed");
        self.listeners.notify(prefers_dark);
        true
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for DetectedSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemSignal for DetectedSignal {
    fn prefers_dark(&self) -> bool {
        detect_color_mode().is_dark()
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        self.listeners.add(listener)
    }
}

impl fmt::Debug for DetectedSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectedSignal")
            .field("last", &self.last.get())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{reset_theme_detector, set_theme_detector};
    use crate::mode::ColorMode;
    use serial_test::serial;

    fn recorder() -> (Rc<RefCell<Vec<bool>>>, Listener) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        (events, Box::new(move |dark| sink.borrow_mut().push(dark)))
    }

    #[test]
    fn test_manual_signal_set_is_silent() {
        let signal = ManualSignal::new(false);
        let (events, listener) = recorder();
        let _sub = signal.subscribe(listener);

        signal.set(true);
        assert!(signal.prefers_dark());
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_manual_signal_emit_notifies_in_order() {
        let signal = ManualSignal::new(false);
        let (events, listener) = recorder();
        let _sub = signal.subscribe(listener);

        signal.emit(true);
        signal.emit(false);
        signal.emit(false);
        assert_eq!(*events.borrow(), vec![true, false, false]);
    }

    #[test]
    fn test_drop_subscription_unsubscribes() {
        let signal = ManualSignal::new(false);
        let (events, listener) = recorder();
        let sub = signal.subscribe(listener);
        assert_eq!(signal.listener_count(), 1);

        drop(sub);
        assert_eq!(signal.listener_count(), 0);
        signal.emit(true);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_cancel_only_removes_own_listener() {
        let signal = ManualSignal::new(false);
        let (first, first_listener) = recorder();
        let (second, second_listener) = recorder();
        let first_sub = signal.subscribe(first_listener);
        let _second_sub = signal.subscribe(second_listener);

        first_sub.cancel();
        signal.emit(true);
        assert!(first.borrow().is_empty());
        assert_eq!(*second.borrow(), vec![true]);
    }

    #[test]
    fn test_listener_drops_own_subscription_during_emit() {
        let signal = ManualSignal::new(false);
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::default();
        let calls = Rc::new(Cell::new(0));
        let (own, counter) = (Rc::clone(&slot), Rc::clone(&calls));
        let sub = signal.subscribe(Box::new(move |_| {
            counter.set(counter.get() + 1);
            own.borrow_mut().take();
        }));
        *slot.borrow_mut() = Some(sub);

        signal.emit(true);
        assert_eq!(signal.listener_count(), 0);
        signal.emit(false);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_listener_cancels_later_listener_during_emit() {
        let signal = ManualSignal::new(false);
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::default();
        let counts = Rc::new(RefCell::new(Vec::new()));

        let (other, seen) = (Rc::clone(&slot), Rc::clone(&counts));
        let handle = signal.clone();
        let _first = signal.subscribe(Box::new(move |_| {
            seen.borrow_mut().push(handle.listener_count());
            other.borrow_mut().take();
        }));
        let (events, second) = recorder();
        *slot.borrow_mut() = Some(signal.subscribe(second));

        signal.emit(true);
        assert!(events.borrow().is_empty());
        assert_eq!(*counts.borrow(), vec![2]);
        assert_eq!(signal.listener_count(), 1);
    }

    #[test]
    fn test_listener_subscribes_during_emit() {
        let signal = ManualSignal::new(false);
        let late: Rc<RefCell<Vec<Subscription>>> = Rc::default();
        let (events, listener) = recorder();
        let listener = RefCell::new(Some(listener));

        let (registry, store) = (signal.clone(), Rc::clone(&late));
        let _first = signal.subscribe(Box::new(move |_| {
            if let Some(listener) = listener.borrow_mut().take() {
                store.borrow_mut().push(registry.subscribe(listener));
            }
        }));

        signal.emit(true);
        assert!(events.borrow().is_empty());
        signal.emit(false);
        assert_eq!(*events.borrow(), vec![false]);
        assert_eq!(signal.listener_count(), 2);
    }

    #[test]
    fn test_subscription_outliving_signal() {
        let (_, listener) = recorder();
        let sub = {
            let signal = ManualSignal::new(false);
            signal.subscribe(listener)
        };
        // Registry is gone; dropping must not panic
        drop(sub);
    }

    #[test]
    #[serial]
    fn test_detected_signal_poll_reports_changes_once() {
        set_theme_detector(|| ColorMode::Light);
        let signal = DetectedSignal::new();
        let (events, listener) = recorder();
        let _sub = signal.subscribe(listener);

        assert!(!signal.poll());

        set_theme_detector(|| ColorMode::Dark);
        assert!(signal.prefers_dark());
        assert!(signal.poll());
        assert!(!signal.poll());

        set_theme_detector(|| ColorMode::Light);
        assert!(signal.poll());

        assert_eq!(*events.borrow(), vec![true, false]);
        reset_theme_detector();
    }
}
