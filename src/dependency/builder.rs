//! Fluent dependency registration.
//!
//! ```rust,ignore
//! host.property("FullName")
//!     .depends_on("FirstName")
//!     .depends_on("LastName");
//! ```

use crate::observable::ReactorProbe;

/// Destination for edges and reactor probes produced by a [`PropertyMapBuilder`].
///
/// Implemented by type-level [`Declarations`](super::Declarations) and by a
/// live [`ObservableObject`](crate::ObservableObject), so both population
/// styles share one builder.
pub trait DependencySink {
    type Host;

    fn add_dependency(&mut self, dependent: &str, dependency: &str);

    fn add_reactor(&mut self, property: &str, probe: ReactorProbe<Self::Host>);
}

/// Chainable builder scoped to one property. Every call is additive and
/// idempotent.
pub struct PropertyMapBuilder<S: DependencySink> {
    sink: S,
    property: String,
}

impl<S: DependencySink> PropertyMapBuilder<S> {
    pub fn new(sink: S, property: impl Into<String>) -> Self {
        Self {
            sink,
            property: property.into(),
        }
    }

    /// The property this builder registers edges for.
    pub fn name(&self) -> &str {
        &self.property
    }

    /// Record that this property depends on `dependency`.
    pub fn depends_on(mut self, dependency: &str) -> Self {
        self.sink.add_dependency(&self.property, dependency);
        self
    }

    /// Register how to reach this property's value when one of its
    /// dependencies changes.
    pub fn reacts_with(mut self, probe: ReactorProbe<S::Host>) -> Self {
        self.sink.add_reactor(&self.property, probe);
        self
    }
}
