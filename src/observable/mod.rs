//! # Observable objects and change propagation
//!
//! A host type embeds an [`ObservableObject`] and implements [`Observable`].
//! Every confirmed property change then runs one propagation pass:
//!
//! 1. raise `property_changed` for the property itself;
//! 2. compute the full transitive set of dependents, once;
//! 3. for each dependent in discovery order: if a reactor probe is
//!    registered and yields a value, call `on_dependency_changed`, then
//!    raise `property_changed` for the dependent.
//!
//! Dependents are never re-expanded as freshly changed properties, so
//! cycles cannot loop and every dependent is raised exactly once per pass.
//!
//! ```rust,ignore
//! struct Order {
//!     core: ObservableObject<Order>,
//!     quantity: u32,
//! }
//!
//! impl Observable for Order {
//!     fn core(&self) -> &ObservableObject<Self> { &self.core }
//!
//!     fn declare(d: &mut Declarations<Self>) {
//!         d.property("Total").depends_on("Quantity");
//!     }
//! }
//!
//! impl Order {
//!     fn set_quantity(&mut self, q: u32) {
//!         self.set(|o| &mut o.quantity, q, "Quantity"); // raises Quantity, Total
//!     }
//! }
//! ```

pub mod react;

use std::fmt;

use hashbrown::HashMap;
use parking_lot::RwLock;

use crate::config::Config;
use crate::dependency::{Declarations, DependencyMap, DependencySink, PropertyMapBuilder};
use crate::event::{EventChannel, ListenerId};
use crate::property::Slot;

pub use react::{ReactOnDependencyChanged, ReactorProbe};

// ============================================================================
// Observable trait
// ============================================================================

/// A host object with tracked properties.
///
/// Property names are always passed explicitly.
pub trait Observable: Send + Sync + Sized + 'static {
    /// The embedded change-tracking state.
    fn core(&self) -> &ObservableObject<Self>;

    /// Static dependency table for this type, evaluated once per process.
    fn declare(_declarations: &mut Declarations<Self>) {}

    /// Set a field reached through `&mut self`.
    ///
    /// Returns whether the value changed (and notifications were raised).
    fn set<T, F>(&mut self, field: F, value: T, name: &str) -> bool
    where
        T: PartialEq,
        F: FnOnce(&mut Self) -> &mut T,
    {
        let mut slot = field(&mut *self);
        if slot.replace_if_changed(value).is_none() {
            return false;
        }
        self.raise_property_changed(name);
        true
    }

    /// Like [`set`](Self::set), calling `on_changed(old, new)` before any
    /// notification is raised.
    fn set_with<T, F, C>(&mut self, field: F, value: T, name: &str, on_changed: C) -> bool
    where
        T: PartialEq + Clone,
        F: FnOnce(&mut Self) -> &mut T,
        C: FnOnce(&T, &T),
    {
        let new = value.clone();
        let mut slot = field(&mut *self);
        let Some(old) = slot.replace_if_changed(value) else {
            return false;
        };
        on_changed(&old, &new);
        self.raise_property_changed(name);
        true
    }

    /// Set a value held in a [`PropertyCell`](crate::PropertyCell) or reached
    /// through an [`Accessor`](crate::Accessor).
    fn set_slot<T, S: Slot<T>>(&self, mut slot: S, value: T, name: &str) -> bool {
        if slot.replace_if_changed(value).is_none() {
            return false;
        }
        self.raise_property_changed(name);
        true
    }

    fn set_slot_with<T, S, C>(&self, mut slot: S, value: T, name: &str, on_changed: C) -> bool
    where
        T: Clone,
        S: Slot<T>,
        C: FnOnce(&T, &T),
    {
        let new = value.clone();
        let Some(old) = slot.replace_if_changed(value) else {
            return false;
        };
        on_changed(&old, &new);
        self.raise_property_changed(name);
        true
    }

    /// Raise `name` and every transitive dependent of it.
    fn raise_property_changed(&self, name: &str) {
        self.core().propagate(self, name);
    }

    /// Fluent runtime registration for this instance.
    fn property(&self, name: &str) -> PropertyMapBuilder<&ObservableObject<Self>> {
        self.core().property(name)
    }

    fn dependents_of(&self, name: &str) -> Vec<String> {
        self.core().dependencies().all_dependents(name)
    }

    fn subscribe_property_changed(
        &self,
        handler: impl Fn(&str) + Send + Sync + 'static,
    ) -> ListenerId {
        self.core().property_changed().subscribe(handler)
    }

    fn unsubscribe_property_changed(&self, id: ListenerId) -> bool {
        self.core().property_changed().unsubscribe(id)
    }
}

// ============================================================================
// ObservableObject
// ============================================================================

/// Per-instance change-tracking state: dependency graph, reactor probes and
/// the `property_changed` channel.
pub struct ObservableObject<H> {
    dependencies: DependencyMap,
    reactors: RwLock<HashMap<String, ReactorProbe<H>>>,
    property_changed: EventChannel<str>,
}

impl<H: Observable> ObservableObject<H> {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Build the state for one `H` instance, copying in the type's static
    /// declarations. Nothing is raised.
    pub fn with_config(config: Config) -> Self {
        let core = Self {
            dependencies: DependencyMap::with_strategy(config.lookup),
            reactors: RwLock::new(HashMap::new()),
            property_changed: EventChannel::new(),
        };
        Declarations::<H>::for_type().apply_to(&core);
        core
    }
}

impl<H: Observable> Default for ObservableObject<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> ObservableObject<H> {
    pub fn dependencies(&self) -> &DependencyMap {
        &self.dependencies
    }

    pub fn property_changed(&self) -> &EventChannel<str> {
        &self.property_changed
    }

    pub fn property(&self, name: &str) -> PropertyMapBuilder<&Self> {
        PropertyMapBuilder::new(self, name)
    }

    pub fn reactor(&self, property: &str) -> Option<ReactorProbe<H>> {
        self.reactors.read().get(property).copied()
    }

    /// Run one propagation pass for a confirmed change of `name` on `host`.
    pub fn propagate(&self, host: &H, name: &str) {
        self.property_changed.raise(name);

        let dependents = self.dependencies.all_dependents(name);
        if dependents.is_empty() {
            return;
        }
        tracing::trace!(property = name, dependents = dependents.len(), "propagating change");

        for dependent in &dependents {
            if let Some(probe) = self.reactor(dependent) {
                if let Some(value) = probe(host) {
                    tracing::trace!(property = dependent.as_str(), "dependency reaction");
                    value.on_dependency_changed();
                }
            }
            self.property_changed.raise(dependent);
        }
    }
}

impl<H> DependencySink for &ObservableObject<H> {
    type Host = H;

    fn add_dependency(&mut self, dependent: &str, dependency: &str) {
        self.dependencies.add_dependency(dependent, dependency);
    }

    fn add_reactor(&mut self, property: &str, probe: ReactorProbe<H>) {
        self.reactors.write().insert(property.to_owned(), probe);
    }
}

impl<H> fmt::Debug for ObservableObject<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableObject")
            .field("dependencies", &self.dependencies)
            .field("reactors", &self.reactors.read().len())
            .field("property_changed", &self.property_changed)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
