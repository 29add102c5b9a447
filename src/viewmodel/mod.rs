//! # View models
//!
//! Ready-made observable hosts:
//!
//! | Type | Properties |
//! |------|------------|
//! | [`ViewModelBase`] | `Messenger`, `Model` |
//! | [`SelectionViewModel`] | `IsSelected`, `Item`, `SelectCommand`, `DeselectCommand` |

pub mod selection;

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::messaging::Messenger;
use crate::observable::{Observable, ObservableObject};
use crate::property::PropertyCell;

pub use selection::SelectionViewModel;

type Hook<T> = Box<dyn Fn(&T, &T) + Send + Sync>;

/// Observable host owning a model and the messenger it talks through.
///
/// Hooks run with `(old, new)` before `property_changed` is raised, and
/// never during construction.
pub struct ViewModelBase<M> {
    core: ObservableObject<Self>,
    messenger: RwLock<Arc<Messenger>>,
    model: PropertyCell<M>,
    on_messenger_changed: Option<Hook<Arc<Messenger>>>,
    on_model_changed: Option<Hook<M>>,
}

impl<M> ViewModelBase<M>
where
    M: PartialEq + Clone + Send + Sync + 'static,
{
    pub fn new(messenger: Arc<Messenger>, model: M) -> Self {
        Self {
            core: ObservableObject::new(),
            messenger: RwLock::new(messenger),
            model: PropertyCell::new(model),
            on_messenger_changed: None,
            on_model_changed: None,
        }
    }

    /// Use the global messenger if one is installed, a private one otherwise.
    pub fn with_model(model: M) -> Self {
        let messenger = Messenger::global().unwrap_or_else(|| Arc::new(Messenger::new()));
        Self::new(messenger, model)
    }

    pub fn on_messenger_changed(
        mut self,
        hook: impl Fn(&Arc<Messenger>, &Arc<Messenger>) + Send + Sync + 'static,
    ) -> Self {
        self.on_messenger_changed = Some(Box::new(hook));
        self
    }

    pub fn on_model_changed(mut self, hook: impl Fn(&M, &M) + Send + Sync + 'static) -> Self {
        self.on_model_changed = Some(Box::new(hook));
        self
    }

    pub fn messenger(&self) -> Arc<Messenger> {
        Arc::clone(&self.messenger.read())
    }

    /// Messengers compare by identity.
    pub fn set_messenger(&self, messenger: Arc<Messenger>) -> bool {
        let old = {
            let mut current = self.messenger.write();
            if Arc::ptr_eq(&current, &messenger) {
                return false;
            }
            std::mem::replace(&mut *current, Arc::clone(&messenger))
        };
        if let Some(hook) = &self.on_messenger_changed {
            hook(&old, &messenger);
        }
        self.raise_property_changed("Messenger");
        true
    }

    pub fn model(&self) -> M {
        self.model.get()
    }

    pub fn set_model(&self, model: M) -> bool {
        self.set_slot_with(&self.model, model, "Model", |old, new| {
            if let Some(hook) = &self.on_model_changed {
                hook(old, new);
            }
        })
    }
}

impl<M> Observable for ViewModelBase<M>
where
    M: PartialEq + Clone + Send + Sync + 'static,
{
    fn core(&self) -> &ObservableObject<Self> {
        &self.core
    }
}

impl<M: fmt::Debug> fmt::Debug for ViewModelBase<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewModelBase")
            .field("model", &self.model)
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}
