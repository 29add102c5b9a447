//! End-to-end tests for concurrent use of one observable instance.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use mvvm_rs::{Declarations, Observable, ObservableObject, PropertyCell};
use pretty_assertions::assert_eq;

#[derive(Default)]
struct Counter {
    core: ObservableObject<Counter>,
    value: PropertyCell<u64>,
}

impl Observable for Counter {
    fn core(&self) -> &ObservableObject<Self> {
        &self.core
    }

    fn declare(d: &mut Declarations<Self>) {
        d.property("Doubled").depends_on("Value");
        d.property("Label").depends_on("Doubled");
    }
}

fn count_notifications(counter: &Counter) -> Arc<[AtomicUsize; 3]> {
    let counts: Arc<[AtomicUsize; 3]> = Arc::new(Default::default());
    let sink = counts.clone();
    counter.subscribe_property_changed(move |name| {
        let slot = match name {
            "Value" => 0,
            "Doubled" => 1,
            "Label" => 2,
            _ => return,
        };
        sink[slot].fetch_add(1, Ordering::SeqCst);
    });
    counts
}

// ============================================================================
// 1. Every confirmed change propagates fully, whatever the interleaving
// ============================================================================

#[test]
fn test_parallel_setters_each_propagate() {
    let counter = Arc::new(Counter::default());
    let counts = count_notifications(&counter);

    let handles: Vec<_> = (0..8_u64)
        .map(|t| {
            let counter = counter.clone();
            thread::spawn(move || {
                let mut changed = 0_usize;
                for i in 0..250 {
                    if counter.set_slot(&counter.value, t * 1000 + i + 1, "Value") {
                        changed += 1;
                    }
                }
                changed
            })
        })
        .collect();
    let changed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

    assert_eq!(changed, 2000);
    assert_eq!(counts[0].load(Ordering::SeqCst), changed);
    assert_eq!(counts[1].load(Ordering::SeqCst), changed);
    assert_eq!(counts[2].load(Ordering::SeqCst), changed);
}

// ============================================================================
// 2. Racing identical values produce exactly one change
// ============================================================================

#[test]
fn test_racing_same_value_changes_once() {
    let counter = Arc::new(Counter::default());
    let counts = count_notifications(&counter);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let counter = counter.clone();
            thread::spawn(move || counter.set_slot(&counter.value, 42, "Value"))
        })
        .collect();
    let winners = handles.into_iter().map(|h| h.join().unwrap()).filter(|w| *w).count();

    assert_eq!(winners, 1);
    assert_eq!(counts[2].load(Ordering::SeqCst), 1);
}

// ============================================================================
// 3. Fluent registration while changes are propagating
// ============================================================================

#[test]
fn test_fluent_registration_during_propagation() {
    let counter = Arc::new(Counter::default());

    let writer = {
        let counter = counter.clone();
        thread::spawn(move || {
            for i in 1..=500 {
                counter.set_slot(&counter.value, i, "Value");
            }
        })
    };
    let registrar = {
        let counter = counter.clone();
        thread::spawn(move || {
            for i in 0..100 {
                counter.property(&format!("Extra{i}")).depends_on("Label");
            }
        })
    };
    writer.join().unwrap();
    registrar.join().unwrap();

    let all = counter.dependents_of("Value");
    assert_eq!(all.len(), 102);
    assert_eq!(&all[..2], &["Doubled".to_string(), "Label".to_string()]);
}

// ============================================================================
// 4. Handlers may re-enter the host
// ============================================================================

#[test]
fn test_handler_can_set_another_property() {
    let counter = Arc::new(Counter::default());
    let other = Arc::new(PropertyCell::new(0_u64));
    let weak = Arc::downgrade(&counter);
    let target = other.clone();
    counter.subscribe_property_changed(move |name| {
        if name == "Label" {
            if let Some(counter) = weak.upgrade() {
                let next = counter.value.get() * 2;
                counter.set_slot(&*target, next, "Mirror");
            }
        }
    });

    counter.set_slot(&counter.value, 21, "Value");
    assert_eq!(other.get(), 42);
}
