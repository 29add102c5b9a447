//! # mvvm-rs: Observable objects with declared property dependencies
//!
//! The core of an MVVM framework: hosts raise a "property changed" event,
//! and every property that depends on the changed one (directly or through
//! a chain) is raised too, once, in a stable order.
//!
//! ## Design Principles
//!
//! 1. **Explicit names**: properties are identified by string name, always
//!    passed by the caller
//! 2. **Compare before notify**: a setter that stores an equal value is a no-op
//! 3. **One closure per change**: dependents are computed once per pass and
//!    never re-expanded, so cycles terminate
//! 4. **Declare once, copy per instance**: static declarations are evaluated
//!    once per type; runtime registrations only touch one instance
//!
//! ## Quick Start
//!
//! ```rust
//! use mvvm_rs::{Declarations, Observable, ObservableObject};
//!
//! #[derive(Default)]
//! struct Person {
//!     core: ObservableObject<Person>,
//!     first: String,
//! }
//!
//! impl Observable for Person {
//!     fn core(&self) -> &ObservableObject<Self> {
//!         &self.core
//!     }
//!
//!     fn declare(d: &mut Declarations<Self>) {
//!         d.property("FullName").depends_on("FirstName");
//!     }
//! }
//!
//! let mut person = Person::default();
//! person.subscribe_property_changed(|name| println!("changed: {name}"));
//! person.set(|p| &mut p.first, "Ada".to_string(), "FirstName"); // FirstName, FullName
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | (default) | Synchronous core, validation, messenger, commands |
//! | `async` | `spawn_blocking` wrappers for validation and message delivery |

// ============================================================================
// Modules
// ============================================================================

pub mod command;
pub mod config;
pub mod dependency;
pub mod event;
pub mod listener;
pub mod messaging;
pub mod observable;
pub mod property;
pub mod validation;
pub mod viewmodel;
pub mod wrapper;

// ============================================================================
// Re-exports: Core
// ============================================================================

pub use dependency::{Declarations, DependencyMap, DependencySink, PropertyMapBuilder};
pub use event::{EventChannel, ListenerId};
pub use observable::{Observable, ObservableObject, ReactOnDependencyChanged, ReactorProbe};
pub use property::{Accessor, PropertyCell, PropertyNotifier, Slot};

// ============================================================================
// Re-exports: Configuration
// ============================================================================

pub use config::{Config, LookupStrategy};

// ============================================================================
// Re-exports: Framework pieces
// ============================================================================

pub use command::{Command, RaiseCanExecuteChanged, RelayCommand};
pub use listener::PropertyListener;
pub use messaging::{BasicMessage, ContentMessage, Message, Messenger, Sender, SubscriptionId};
pub use validation::{ObjectValidator, RuleValidator, Validatable, ValidationErrors};
pub use viewmodel::{SelectionViewModel, ViewModelBase};
pub use wrapper::StringWrapper;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required argument was absent. Carries the argument name.
    #[error("Invalid argument: {0} is required")]
    InvalidArgument(&'static str),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Already initialized: {0}")]
    AlreadyInitialized(&'static str),

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;
