//! # Property dependency graph
//!
//! Canonical edges read "P depends on X" (P → {X, ...}), which is what both
//! population styles produce: static [`Declarations`] and the fluent
//! [`PropertyMapBuilder`]. Change propagation needs the opposite direction,
//! "who depends on X", transitively. That query is a breadth-first closure
//! over the reverse relation:
//!
//! ```text
//! seen = {X}; queue = [X]
//! while let Some(p) = queue.pop_front():
//!     for d in direct_dependents(p):
//!         if seen.insert(d): out.push(d); queue.push_back(d)
//! ```
//!
//! `seen` only grows and is bounded by the property count, so arbitrary
//! cycles terminate; seeding it with `X` keeps `X` out of its own result.
//!
//! ## Lookup strategies
//!
//! | Strategy | Direct-dependent lookup | Insertion cost |
//! |----------|-------------------------|----------------|
//! | `Indexed` (default) | reverse index, O(deg) | two list pushes |
//! | `Scan` | scan every entry, O(V+E) | one list push |
//!
//! Both strategies return the same sets. Order is breadth-first discovery
//! order and is stable for a given map, but may differ between strategies.

pub mod builder;
pub mod declarations;

use std::collections::VecDeque;

use hashbrown::{HashMap, HashSet};
use parking_lot::RwLock;
use smallvec::SmallVec;

use crate::config::LookupStrategy;

pub use builder::{DependencySink, PropertyMapBuilder};
pub use declarations::Declarations;

type NameList = SmallVec<[String; 4]>;

// ============================================================================
// DependencyMap
// ============================================================================

/// Per-instance, thread-safe "depends on" graph keyed by property name.
///
/// Every operation takes the single instance lock; closures are computed
/// under one read guard, so a concurrent edge insertion is either fully
/// visible to a query or not at all.
#[derive(Debug, Default)]
pub struct DependencyMap {
    strategy: LookupStrategy,
    graph: RwLock<Graph>,
}

#[derive(Debug, Default)]
struct Graph {
    /// dependent → its dependencies, in insertion order
    depends_on: HashMap<String, NameList>,
    /// dependency → its dependents (maintained for `Indexed` only)
    dependents: HashMap<String, NameList>,
    /// keys of `depends_on` in first-insertion order (drives `Scan`)
    order: Vec<String>,
    edge_count: usize,
}

impl DependencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(strategy: LookupStrategy) -> Self {
        Self {
            strategy,
            graph: RwLock::new(Graph::default()),
        }
    }

    pub fn strategy(&self) -> LookupStrategy {
        self.strategy
    }

    /// Record that `dependent` depends on `dependency`.
    ///
    /// Idempotent: returns `false` when the edge already existed. A property
    /// declared to depend on itself is ignored.
    pub fn add_dependency(&self, dependent: &str, dependency: &str) -> bool {
        if dependent == dependency {
            tracing::warn!(property = dependent, "ignoring self-dependency");
            return false;
        }

        let mut graph = self.graph.write();
        let inserted = graph.insert(dependent, dependency, self.strategy);
        if inserted {
            tracing::debug!(dependent, dependency, "dependency edge added");
        }
        inserted
    }

    pub fn contains(&self, dependent: &str, dependency: &str) -> bool {
        self.graph
            .read()
            .depends_on
            .get(dependent)
            .is_some_and(|deps| deps.iter().any(|d| d == dependency))
    }

    /// Properties that depend on `name` through exactly one edge.
    pub fn direct_dependents(&self, name: &str) -> Vec<String> {
        let graph = self.graph.read();
        graph
            .direct_dependents(name, self.strategy)
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    /// Every property that depends on `name`, directly or transitively.
    ///
    /// Excludes `name` itself, contains no duplicates, and is empty (never
    /// an error) for unknown names.
    pub fn all_dependents(&self, name: &str) -> Vec<String> {
        let graph = self.graph.read();
        closure(name, |p| graph.direct_dependents(p, self.strategy))
    }

    /// Properties `name` depends on through exactly one edge.
    pub fn direct_dependencies(&self, name: &str) -> Vec<String> {
        let graph = self.graph.read();
        graph
            .direct_dependencies(name)
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    /// Every property `name` depends on, directly or transitively.
    pub fn all_dependencies(&self, name: &str) -> Vec<String> {
        let graph = self.graph.read();
        closure(name, |p| graph.direct_dependencies(p))
    }

    /// Every property that appears in an edge, in first-seen order.
    pub fn properties(&self) -> Vec<String> {
        let graph = self.graph.read();
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for dependent in &graph.order {
            if seen.insert(dependent.as_str()) {
                out.push(dependent.clone());
            }
            for dependency in &graph.depends_on[dependent] {
                if seen.insert(dependency.as_str()) {
                    out.push(dependency.clone());
                }
            }
        }
        out
    }

    /// All edges as `(dependent, dependency)` pairs, in insertion order per dependent.
    pub fn edges(&self) -> Vec<(String, String)> {
        let graph = self.graph.read();
        graph
            .order
            .iter()
            .flat_map(|p| graph.depends_on[p].iter().map(move |d| (p.clone(), d.clone())))
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.read().edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.edge_count() == 0
    }
}

impl Graph {
    fn insert(&mut self, dependent: &str, dependency: &str, strategy: LookupStrategy) -> bool {
        match self.depends_on.get_mut(dependent) {
            Some(deps) if deps.iter().any(|d| d == dependency) => return false,
            Some(deps) => deps.push(dependency.to_owned()),
            None => {
                let mut deps = NameList::new();
                deps.push(dependency.to_owned());
                self.depends_on.insert(dependent.to_owned(), deps);
                self.order.push(dependent.to_owned());
            }
        }

        if strategy == LookupStrategy::Indexed {
            self.dependents
                .entry(dependency.to_owned())
                .or_default()
                .push(dependent.to_owned());
        }

        self.edge_count += 1;
        true
    }

    fn direct_dependents<'a>(
        &'a self,
        name: &str,
        strategy: LookupStrategy,
    ) -> SmallVec<[&'a str; 8]> {
        match strategy {
            LookupStrategy::Indexed => self
                .dependents
                .get(name)
                .map(|ds| ds.iter().map(String::as_str).collect())
                .unwrap_or_default(),
            LookupStrategy::Scan => self
                .order
                .iter()
                .filter(|p| self.depends_on[p.as_str()].iter().any(|d| d == name))
                .map(String::as_str)
                .collect(),
        }
    }

    fn direct_dependencies<'a>(&'a self, name: &str) -> SmallVec<[&'a str; 8]> {
        self.depends_on
            .get(name)
            .map(|ds| ds.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// Breadth-first closure of `start` under `step`, excluding `start`.
fn closure<'a, F>(start: &str, step: F) -> Vec<String>
where
    F: Fn(&str) -> SmallVec<[&'a str; 8]>,
{
    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(start.to_owned());

    let mut out = Vec::new();
    let mut queue: VecDeque<String> = VecDeque::new();
    queue.push_back(start.to_owned());

    while let Some(current) = queue.pop_front() {
        for next in step(current.as_str()) {
            if seen.insert(next.to_owned()) {
                out.push(next.to_owned());
                queue.push_back(next.to_owned());
            }
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(strategy: LookupStrategy) -> DependencyMap {
        let map = DependencyMap::with_strategy(strategy);
        map.add_dependency("Direct", "Base");
        map.add_dependency("IndirectOne", "Direct");
        map.add_dependency("IndirectTwo", "IndirectOne");
        map
    }

    #[test]
    fn test_add_is_idempotent() {
        let map = DependencyMap::new();
        assert!(map.add_dependency("B", "A"));
        assert!(!map.add_dependency("B", "A"));
        assert_eq!(map.edge_count(), 1);
        assert!(map.contains("B", "A"));
        assert!(!map.contains("A", "B"));
    }

    #[test]
    fn test_self_dependency_ignored() {
        let map = DependencyMap::new();
        assert!(!map.add_dependency("Self", "Self"));
        assert!(map.direct_dependents("Self").is_empty());
        assert!(map.all_dependents("Self").is_empty());
        assert!(map.is_empty());
    }

    #[test]
    fn test_chain_in_both_strategies() {
        for strategy in [LookupStrategy::Indexed, LookupStrategy::Scan] {
            let map = chain(strategy);
            assert_eq!(map.direct_dependents("Base"), vec!["Direct"]);
            assert_eq!(map.all_dependents("Base"), vec!["Direct", "IndirectOne", "IndirectTwo"]);
            assert_eq!(map.direct_dependencies("IndirectTwo"), vec!["IndirectOne"]);
            assert_eq!(map.all_dependencies("IndirectTwo"), vec!["IndirectOne", "Direct", "Base"]);
        }
    }

    #[test]
    fn test_diamond_visits_once() {
        let map = DependencyMap::new();
        map.add_dependency("A", "C");
        map.add_dependency("B", "C");
        map.add_dependency("D", "A");
        map.add_dependency("D", "B");

        assert_eq!(map.all_dependents("C"), vec!["A", "B", "D"]);
    }

    #[test]
    fn test_unknown_name_is_empty() {
        let map = chain(LookupStrategy::Indexed);
        assert!(map.all_dependents("Nope").is_empty());
        assert!(map.all_dependencies("Nope").is_empty());
    }

    #[test]
    fn test_properties_and_edges() {
        let map = chain(LookupStrategy::Indexed);
        assert_eq!(map.properties(), vec!["Direct", "Base", "IndirectOne", "IndirectTwo"]);
        assert_eq!(map.edges().len(), 3);
        assert_eq!(map.edges()[0], ("Direct".to_string(), "Base".to_string()));
    }
}
