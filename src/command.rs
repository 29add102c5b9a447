//! Commands: an executable action paired with an availability predicate.
//!
//! [`RelayCommand`] also implements [`ReactOnDependencyChanged`], so a command
//! exposed as a property can be declared dependent on the state it reads and
//! have its can-execute-changed event raised automatically.

use std::fmt;

use crate::event::{EventChannel, ListenerId};
use crate::observable::ReactOnDependencyChanged;
use crate::{Error, Result};

/// An action that can be invoked with a parameter of type `P`.
pub trait Command<P: ?Sized = ()>: Send + Sync {
    fn can_execute(&self, parameter: &P) -> bool;

    fn execute(&self, parameter: &P);

    fn subscribe_can_execute_changed(
        &self,
        handler: impl Fn(&()) + Send + Sync + 'static,
    ) -> ListenerId
    where
        Self: Sized;
}

/// A command whose availability can be re-evaluated on demand.
pub trait RaiseCanExecuteChanged {
    fn raise_can_execute_changed(&self);
}

type Action<P> = Box<dyn Fn(&P) + Send + Sync>;
type Predicate<P> = Box<dyn Fn(&P) -> bool + Send + Sync>;

/// Command built from closures.
pub struct RelayCommand<P: ?Sized = ()> {
    execute: Action<P>,
    can_execute: Option<Predicate<P>>,
    can_execute_changed: EventChannel<()>,
}

impl<P: ?Sized> RelayCommand<P> {
    /// Always executable.
    pub fn new(execute: impl Fn(&P) + Send + Sync + 'static) -> Self {
        Self {
            execute: Box::new(execute),
            can_execute: None,
            can_execute_changed: EventChannel::new(),
        }
    }

    pub fn with_predicate(
        execute: impl Fn(&P) + Send + Sync + 'static,
        can_execute: impl Fn(&P) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            execute: Box::new(execute),
            can_execute: Some(Box::new(can_execute)),
            can_execute_changed: EventChannel::new(),
        }
    }

    /// Fails with `InvalidArgument("execute")` when no action is given. A
    /// missing predicate means the command is always executable.
    pub fn from_parts<E, C>(execute: Option<E>, can_execute: Option<C>) -> Result<Self>
    where
        E: Fn(&P) + Send + Sync + 'static,
        C: Fn(&P) -> bool + Send + Sync + 'static,
    {
        let execute = execute.ok_or(Error::InvalidArgument("execute"))?;
        Ok(Self {
            execute: Box::new(execute),
            can_execute: can_execute.map(|c| Box::new(c) as Predicate<P>),
            can_execute_changed: EventChannel::new(),
        })
    }

    pub fn unsubscribe_can_execute_changed(&self, id: ListenerId) -> bool {
        self.can_execute_changed.unsubscribe(id)
    }
}

impl<P: ?Sized> Command<P> for RelayCommand<P> {
    fn can_execute(&self, parameter: &P) -> bool {
        self.can_execute.as_ref().is_none_or(|predicate| predicate(parameter))
    }

    /// Runs the action without consulting the predicate.
    fn execute(&self, parameter: &P) {
        (self.execute)(parameter);
    }

    fn subscribe_can_execute_changed(
        &self,
        handler: impl Fn(&()) + Send + Sync + 'static,
    ) -> ListenerId
    where
        Self: Sized,
    {
        self.can_execute_changed.subscribe(handler)
    }
}

impl<P: ?Sized> RaiseCanExecuteChanged for RelayCommand<P> {
    fn raise_can_execute_changed(&self) {
        self.can_execute_changed.raise(&());
    }
}

impl<P: ?Sized> ReactOnDependencyChanged for RelayCommand<P> {
    fn on_dependency_changed(&self) {
        self.raise_can_execute_changed();
    }
}

impl<P: ?Sized> fmt::Debug for RelayCommand<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayCommand")
            .field("has_predicate", &self.can_execute.is_some())
            .field("can_execute_changed", &self.can_execute_changed)
            .finish_non_exhaustive()
    }
}
