//! # Validation
//!
//! Error bookkeeping for hosts whose properties can be invalid, plus a
//! rule-table validator that fills it.
//!
//! | Type | Role |
//! |------|------|
//! | [`ValidationErrors`] | per-instance `property -> messages` store, `errors_changed` |
//! | [`Validatable`] | host trait exposing its `ValidationErrors` |
//! | [`ObjectValidator`] | validates a whole host or one property |
//! | [`RuleValidator`] | predicate table implementation of `ObjectValidator` |

pub mod validator;

use std::fmt;

use hashbrown::HashMap;
use parking_lot::Mutex;

use crate::event::{EventChannel, ListenerId};

pub use validator::RuleValidator;

// ============================================================================
// Traits
// ============================================================================

/// A host that carries validation errors.
pub trait Validatable: Send + Sync {
    fn validation_errors(&self) -> &ValidationErrors;

    fn is_valid(&self) -> bool {
        self.validation_errors().is_valid()
    }
}

pub trait ObjectValidator<H: Validatable>: Send + Sync {
    /// Replace every error on `host` with the result of a full validation.
    fn validate(&self, host: &H);

    /// Replace the errors of one property.
    fn validate_property(&self, host: &H, property: &str);
}

// ============================================================================
// ValidationErrors
// ============================================================================

/// Property error store. `errors_changed` is raised with the property name,
/// or `""` when everything was cleared, always after the lock is released.
#[derive(Default)]
pub struct ValidationErrors {
    by_property: Mutex<HashMap<String, Vec<String>>>,
    errors_changed: EventChannel<str>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&self, property: &str, error: impl Into<String>) {
        self.by_property
            .lock()
            .entry(property.to_owned())
            .or_default()
            .push(error.into());
        self.errors_changed.raise(property);
    }

    pub fn add_errors<I, E>(&self, property: &str, errors: I)
    where
        I: IntoIterator<Item = E>,
        E: Into<String>,
    {
        self.by_property
            .lock()
            .entry(property.to_owned())
            .or_default()
            .extend(errors.into_iter().map(Into::into));
        self.errors_changed.raise(property);
    }

    /// Returns whether anything was cleared. Raises only in that case.
    pub fn clear_errors(&self, property: &str) -> bool {
        let cleared = {
            let mut map = self.by_property.lock();
            match map.get_mut(property) {
                Some(errors) if !errors.is_empty() => {
                    errors.clear();
                    true
                }
                _ => false,
            }
        };
        if cleared {
            self.errors_changed.raise(property);
        }
        cleared
    }

    pub fn clear_all_errors(&self) -> bool {
        let cleared = {
            let mut map = self.by_property.lock();
            let any = map.values().any(|errors| !errors.is_empty());
            if any {
                map.clear();
            }
            any
        };
        if cleared {
            self.errors_changed.raise("");
        }
        cleared
    }

    /// Copy of the messages recorded for `property`.
    pub fn errors(&self, property: &str) -> Vec<String> {
        self.by_property.lock().get(property).cloned().unwrap_or_default()
    }

    /// Every message, grouped by property, sorted by property name.
    pub fn all_errors(&self) -> Vec<(String, Vec<String>)> {
        let mut all: Vec<_> = self
            .by_property
            .lock()
            .iter()
            .filter(|(_, errors)| !errors.is_empty())
            .map(|(name, errors)| (name.clone(), errors.clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    pub fn has_errors(&self) -> bool {
        self.by_property.lock().values().any(|errors| !errors.is_empty())
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn subscribe_errors_changed(
        &self,
        handler: impl Fn(&str) + Send + Sync + 'static,
    ) -> ListenerId {
        self.errors_changed.subscribe(handler)
    }

    pub fn unsubscribe_errors_changed(&self, id: ListenerId) -> bool {
        self.errors_changed.unsubscribe(id)
    }
}

impl fmt::Debug for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationErrors")
            .field("errors", &self.all_errors())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
