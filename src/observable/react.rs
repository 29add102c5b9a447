//! Reactive-callback capability for dependent property values.

/// Implemented by a property *value* that wants to hear when a property its
/// host property depends on has changed (e.g. a command re-evaluating
/// whether it can execute).
pub trait ReactOnDependencyChanged: Send + Sync {
    fn on_dependency_changed(&self);
}

/// Typed accessor from a host to a property's current value, if that value
/// reacts to dependency changes.
pub type ReactorProbe<H> = fn(&H) -> Option<&dyn ReactOnDependencyChanged>;
