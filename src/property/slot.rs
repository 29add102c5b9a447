//! Backing stores a property value can live in.
//!
//! The notifier never cares where a value is kept: a plain field reached
//! through `&mut`, a field on another object reached through an
//! [`Accessor`], or a lock-guarded [`PropertyCell`] shared across threads.

use std::fmt;

use parking_lot::RwLock;

use super::Accessor;

/// A mutable location holding a property value.
pub trait Slot<T> {
    /// Assign `value` if it differs from the current value.
    ///
    /// Returns the previous value on change, `None` when equal (the slot is
    /// left untouched).
    fn replace_if_changed(&mut self, value: T) -> Option<T>;
}

impl<T: PartialEq> Slot<T> for &mut T {
    fn replace_if_changed(&mut self, value: T) -> Option<T> {
        if **self == value {
            return None;
        }
        Some(std::mem::replace(*self, value))
    }
}

impl<T: PartialEq> Slot<T> for &Accessor<T> {
    fn replace_if_changed(&mut self, value: T) -> Option<T> {
        let old = self.get();
        if old == value {
            return None;
        }
        self.set(value);
        Some(old)
    }
}

impl<T: PartialEq> Slot<T> for &PropertyCell<T> {
    fn replace_if_changed(&mut self, value: T) -> Option<T> {
        let mut guard = self.value.write();
        if *guard == value {
            return None;
        }
        Some(std::mem::replace(&mut *guard, value))
    }
}

// ============================================================================
// PropertyCell
// ============================================================================

/// Lock-guarded property storage for hosts mutated through `&self`.
///
/// Compare and assign happen under a single write lock, so two threads
/// racing to set the same value produce exactly one change.
#[derive(Default)]
pub struct PropertyCell<T> {
    value: RwLock<T>,
}

impl<T> PropertyCell<T> {
    pub fn new(value: T) -> Self {
        Self { value: RwLock::new(value) }
    }

    /// Run `f` against the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.read())
    }

    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

impl<T: Clone> PropertyCell<T> {
    pub fn get(&self) -> T {
        self.value.read().clone()
    }
}

impl<T: fmt::Debug> fmt::Debug for PropertyCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropertyCell").field(&*self.value.read()).finish()
    }
}
