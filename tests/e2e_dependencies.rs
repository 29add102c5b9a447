//! End-to-end tests for the dependency graph.
//!
//! Covers declarative and fluent population, direct and transitive
//! dependents, cycles, diamonds and self-dependencies, under both lookup
//! strategies.

use mvvm_rs::{Config, Declarations, DependencyMap, LookupStrategy, Observable, ObservableObject};
use pretty_assertions::assert_eq;

// ============================================================================
// Helper: a host with a chain, a self-dependency and a three-way cycle.
// ============================================================================

#[derive(Default)]
struct Graphs {
    core: ObservableObject<Graphs>,
}

impl Observable for Graphs {
    fn core(&self) -> &ObservableObject<Self> {
        &self.core
    }

    fn declare(d: &mut Declarations<Self>) {
        d.property("Direct").depends_on("Base");
        d.property("IndirectOne").depends_on("Direct");
        d.property("IndirectTwo").depends_on("IndirectOne");
        d.property("Selfish").depends_on("Selfish").depends_on("Base");

        d.property("CircularA")
            .depends_on("CircularB")
            .depends_on("CircularC")
            .depends_on("MultiCircularBase");
        d.property("CircularB")
            .depends_on("CircularA")
            .depends_on("CircularC")
            .depends_on("MultiCircularBase");
        d.property("CircularC")
            .depends_on("CircularA")
            .depends_on("CircularB")
            .depends_on("MultiCircularBase");
    }
}

fn sorted(mut names: Vec<String>) -> Vec<String> {
    names.sort();
    names
}

fn both_strategies() -> [Graphs; 2] {
    [
        Graphs {
            core: ObservableObject::with_config(Config { lookup: LookupStrategy::Indexed }),
        },
        Graphs {
            core: ObservableObject::with_config(Config { lookup: LookupStrategy::Scan }),
        },
    ]
}

// ============================================================================
// 1. Direct dependents: one hop only, never the property itself
// ============================================================================

#[test]
fn test_direct_dependents_only() {
    for host in both_strategies() {
        let deps = host.core().dependencies();
        assert_eq!(sorted(deps.direct_dependents("Base")), vec!["Direct", "Selfish"]);
        assert_eq!(deps.direct_dependents("Direct"), vec!["IndirectOne"]);
        assert!(!deps.direct_dependents("Selfish").contains(&"Selfish".to_string()));
    }
}

// ============================================================================
// 2. Transitive closure over a chain
// ============================================================================

#[test]
fn test_chain_closure() {
    for host in both_strategies() {
        let all = host.dependents_of("Direct");
        assert_eq!(all, vec!["IndirectOne", "IndirectTwo"]);

        let from_base = sorted(host.dependents_of("Base"));
        assert_eq!(from_base, vec!["Direct", "IndirectOne", "IndirectTwo", "Selfish"]);
    }
}

// ============================================================================
// 3. Cycles terminate and are deduplicated
// ============================================================================

#[test]
fn test_multi_circular() {
    for host in both_strategies() {
        assert_eq!(
            sorted(host.dependents_of("MultiCircularBase")),
            vec!["CircularA", "CircularB", "CircularC"]
        );
        assert_eq!(sorted(host.dependents_of("CircularA")), vec!["CircularB", "CircularC"]);
    }
}

// ============================================================================
// 4. Diamonds visit the sink once
// ============================================================================

#[test]
fn test_diamond_appears_once() {
    for strategy in [LookupStrategy::Indexed, LookupStrategy::Scan] {
        let map = DependencyMap::with_strategy(strategy);
        map.add_dependency("A", "C");
        map.add_dependency("B", "C");
        map.add_dependency("D", "A");
        map.add_dependency("D", "B");

        let all = map.all_dependents("C");
        assert_eq!(all.iter().filter(|p| *p == "D").count(), 1);
        assert_eq!(all.len(), 3);
        assert_eq!(map.all_dependencies("D"), vec!["A", "B", "C"]);
    }
}

// ============================================================================
// 5. Unknown names are not errors
// ============================================================================

#[test]
fn test_unknown_property_is_empty() {
    let host = Graphs::default();
    assert!(host.dependents_of("Nope").is_empty());
    assert!(host.dependents_of("IndirectTwo").is_empty());
    assert!(DependencyMap::new().all_dependents("").is_empty());
}

// ============================================================================
// 6. Declarations are cached per type and copied per instance
// ============================================================================

#[test]
fn test_declarations_cached_per_type() {
    let first = Declarations::<Graphs>::for_type();
    let second = Declarations::<Graphs>::for_type();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(first.edges().len(), 14);

    let map = DependencyMap::for_type::<Graphs>();
    // The self edge is declared but never stored.
    assert_eq!(map.edge_count(), 13);
}

#[test]
fn test_fluent_edges_stay_per_instance() {
    let one = Graphs::default();
    let two = Graphs::default();

    one.property("Extra").depends_on("IndirectTwo");
    assert_eq!(one.dependents_of("IndirectTwo"), vec!["Extra"]);
    assert!(two.dependents_of("IndirectTwo").is_empty());
}

#[test]
fn test_fluent_is_idempotent() {
    let host = Graphs::default();
    let before = host.core().dependencies().edge_count();
    host.property("Direct").depends_on("Base").depends_on("Base");
    assert_eq!(host.core().dependencies().edge_count(), before);
}
