//! Type-level dependency declarations.
//!
//! A host type lists its static "depends on" edges once, in
//! [`Observable::declare`]. The resulting table is cached per type for the
//! life of the process and copied into each new instance's
//! [`DependencyMap`] without raising any notifications.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::{Arc, LazyLock};

use hashbrown::HashMap;
use parking_lot::RwLock;

use super::{DependencyMap, DependencySink, PropertyMapBuilder};
use crate::observable::{Observable, ReactorProbe};

type Cache = RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>;

static CACHE: LazyLock<Cache> = LazyLock::new(|| RwLock::new(HashMap::new()));

/// Static dependency table for host type `H`.
pub struct Declarations<H> {
    edges: Vec<(String, String)>,
    reactors: Vec<(String, ReactorProbe<H>)>,
}

impl<H> Declarations<H> {
    pub fn new() -> Self {
        Self {
            edges: Vec::new(),
            reactors: Vec::new(),
        }
    }

    /// Start declaring dependencies for `name`.
    pub fn property(&mut self, name: &str) -> PropertyMapBuilder<&mut Self> {
        PropertyMapBuilder::new(self, name)
    }

    /// Declared `(dependent, dependency)` edges, in declaration order.
    pub fn edges(&self) -> &[(String, String)] {
        &self.edges
    }

    pub fn reactors(&self) -> impl Iterator<Item = (&str, ReactorProbe<H>)> {
        self.reactors.iter().map(|(name, probe)| (name.as_str(), *probe))
    }

    /// Feed every declaration into `sink`.
    pub fn apply_to<S: DependencySink<Host = H>>(&self, mut sink: S) {
        for (dependent, dependency) in &self.edges {
            sink.add_dependency(dependent, dependency);
        }
        for (property, probe) in &self.reactors {
            sink.add_reactor(property, *probe);
        }
    }
}

impl<H: Observable> Declarations<H> {
    /// The cached declarations of `H`, built on first use.
    pub fn for_type() -> Arc<Self> {
        let key = TypeId::of::<H>();
        if let Some(cached) = CACHE.read().get(&key).cloned() {
            if let Ok(decl) = cached.downcast::<Self>() {
                return decl;
            }
        }

        // Built outside the lock: `declare` may touch other host types.
        let mut decl = Self::new();
        H::declare(&mut decl);
        tracing::debug!(
            host = std::any::type_name::<H>(),
            edges = decl.edges.len(),
            reactors = decl.reactors.len(),
            "declarations cached"
        );
        let decl = Arc::new(decl);

        let mut cache = CACHE.write();
        let existing = cache.get(&key).cloned();
        match existing.map(|c| c.downcast::<Self>()) {
            Some(Ok(existing)) => existing,
            _ => {
                cache.insert(key, decl.clone());
                decl
            }
        }
    }
}

impl<H> Default for Declarations<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for Declarations<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Declarations")
            .field("edges", &self.edges)
            .field("reactors", &self.reactors.iter().map(|(n, _)| n).collect::<Vec<_>>())
            .finish()
    }
}

impl<H> DependencySink for &mut Declarations<H> {
    type Host = H;

    fn add_dependency(&mut self, dependent: &str, dependency: &str) {
        let edge = (dependent.to_owned(), dependency.to_owned());
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
        }
    }

    fn add_reactor(&mut self, property: &str, probe: ReactorProbe<H>) {
        self.reactors.push((property.to_owned(), probe));
    }
}

impl DependencyMap {
    /// A fresh map holding only the static declarations of `H`.
    pub fn for_type<H: Observable>() -> Self {
        let map = Self::new();
        for (dependent, dependency) in Declarations::<H>::for_type().edges() {
            map.add_dependency(dependent, dependency);
        }
        map
    }
}
