//! # Property storage and change notification
//!
//! Where a property value lives ([`Slot`]: a field, an [`Accessor`], a
//! [`PropertyCell`]) and how a confirmed change is reported
//! ([`PropertyNotifier`]).

pub mod accessor;
pub mod notifier;
pub mod slot;

pub use accessor::Accessor;
pub use notifier::PropertyNotifier;
pub use slot::{PropertyCell, Slot};
