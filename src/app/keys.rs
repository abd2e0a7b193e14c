// src/app/keys.rs
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use eframe::egui as eg;
use tracing::trace;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    CloseDetails,
    FocusSearch,
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, eg::Key, KeyAction)>,
}

/// Window-wide key listeners. Each registration lives exactly as long as
/// the `KeyGuard` it returns, so a view that owns its guard cannot leak a
/// listener past its own lifetime.
#[derive(Clone, Default)]
pub struct KeyRegistry {
    inner: Rc<RefCell<Listeners>>,
}

#[must_use = "the listener is removed as soon as the guard is dropped"]
pub struct KeyGuard {
    id: u64,
    registry: Weak<RefCell<Listeners>>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, key: eg::Key, action: KeyAction) -> KeyGuard {
        let mut l = self.inner.borrow_mut();
        let id = l.next_id;
        l.next_id += 1;
        l.entries.push((id, key, action));
        trace!(?key, ?action, id, "key listener added");
        KeyGuard {
            id,
            registry: Rc::downgrade(&self.inner),
        }
    }

    /// Actions bound to `key`, one per live listener, in registration order.
    pub fn dispatch(&self, key: eg::Key) -> Vec<KeyAction> {
        self.inner
            .borrow()
            .entries
            .iter()
            .filter(|(_, k, _)| *k == key)
            .map(|(_, _, a)| *a)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        if let Some(inner) = self.registry.upgrade() {
            inner.borrow_mut().entries.retain(|(id, _, _)| *id != self.id);
            trace!(id = self.id, "key listener removed");
        }
    }
}

/// Fresh key-down presses this frame (auto-repeat ignored).
pub fn pressed_keys(ctx: &eg::Context) -> Vec<eg::Key> {
    ctx.input(|i| {
        i.events
            .iter()
            .filter_map(|e| match e {
                eg::Event::Key {
                    key,
                    pressed: true,
                    repeat: false,
                    ..
                } => Some(*key),
                _ => None,
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_fires_once_per_press() {
        let keys = KeyRegistry::new();
        let _guard = keys.register(eg::Key::Escape, KeyAction::CloseDetails);
        assert_eq!(keys.dispatch(eg::Key::Escape), vec![KeyAction::CloseDetails]);
        assert!(keys.dispatch(eg::Key::Enter).is_empty());
    }

    #[test]
    fn dropping_guard_detaches_listener() {
        let keys = KeyRegistry::new();
        let first = keys.register(eg::Key::Escape, KeyAction::CloseDetails);
        drop(first);
        assert!(keys.is_empty());

        // a second, unrelated view gets exactly its own listener
        let _second = keys.register(eg::Key::Escape, KeyAction::CloseDetails);
        assert_eq!(keys.dispatch(eg::Key::Escape).len(), 1);
    }

    #[test]
    fn guard_outliving_registry_is_harmless() {
        let keys = KeyRegistry::new();
        let guard = keys.register(eg::Key::Enter, KeyAction::FocusSearch);
        drop(keys);
        drop(guard);
    }
}
