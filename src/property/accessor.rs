//! Accessor: a getter/setter pair over a value slot owned elsewhere.

use std::fmt;

use crate::{Error, Result};

type Getter<T> = Box<dyn Fn() -> T + Send + Sync>;
type Setter<T> = Box<dyn Fn(T) + Send + Sync>;

/// Paired get/set indirection over an externally-owned value.
///
/// No caching and no validation: `get()` and `set()` call straight through,
/// so the notifier can treat a field on another object exactly like a local
/// backing field.
pub struct Accessor<T> {
    getter: Getter<T>,
    setter: Setter<T>,
}

impl<T> Accessor<T> {
    pub fn new<G, S>(getter: G, setter: S) -> Self
    where
        G: Fn() -> T + Send + Sync + 'static,
        S: Fn(T) + Send + Sync + 'static,
    {
        Self {
            getter: Box::new(getter),
            setter: Box::new(setter),
        }
    }

    /// Build an accessor from optional halves, failing when either is absent.
    pub fn from_parts<G, S>(getter: Option<G>, setter: Option<S>) -> Result<Self>
    where
        G: Fn() -> T + Send + Sync + 'static,
        S: Fn(T) + Send + Sync + 'static,
    {
        let getter = getter.ok_or(Error::InvalidArgument("getter"))?;
        let setter = setter.ok_or(Error::InvalidArgument("setter"))?;
        Ok(Self::new(getter, setter))
    }

    pub fn get(&self) -> T {
        (self.getter)()
    }

    pub fn set(&self, value: T) {
        (self.setter)(value)
    }
}

impl<T> fmt::Debug for Accessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor").finish_non_exhaustive()
    }
}
