//! PropertyNotifier: compare, assign, notify.

use std::fmt;
use std::sync::Arc;

use super::Slot;
use crate::{Error, Result};

type ChangedFn = Arc<dyn Fn(&str) + Send + Sync>;

/// Sets property values and reports confirmed changes by name.
///
/// Setting a value equal to the current one is a no-op: no callback, no
/// notification.
#[derive(Clone)]
pub struct PropertyNotifier {
    changed: ChangedFn,
}

impl PropertyNotifier {
    pub fn new(changed: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self { changed: Arc::new(changed) }
    }

    pub fn from_callback<F>(changed: Option<F>) -> Result<Self>
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        changed
            .map(Self::new)
            .ok_or(Error::InvalidArgument("changed"))
    }

    /// Assign `value` to `slot`; on change, notify with `name`.
    pub fn set_property<T, S: Slot<T>>(&self, mut slot: S, value: T, name: &str) -> bool {
        if slot.replace_if_changed(value).is_none() {
            return false;
        }
        self.raise_property_changed(name);
        true
    }

    /// Like [`set_property`](Self::set_property), calling `on_changed(old, new)`
    /// between the assignment and the notification.
    pub fn set_property_with<T, S, F>(
        &self,
        mut slot: S,
        value: T,
        name: &str,
        on_changed: F,
    ) -> bool
    where
        T: Clone,
        S: Slot<T>,
        F: FnOnce(&T, &T),
    {
        let new = value.clone();
        let Some(old) = slot.replace_if_changed(value) else {
            return false;
        };
        on_changed(&old, &new);
        self.raise_property_changed(name);
        true
    }

    pub fn raise_property_changed(&self, name: &str) {
        (self.changed)(name)
    }
}

impl fmt::Debug for PropertyNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyNotifier").finish_non_exhaustive()
    }
}
