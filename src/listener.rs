//! Per-property listeners on top of a host's `property_changed` channel.

use std::fmt;
use std::sync::{Arc, Weak};

use hashbrown::HashMap;
use parking_lot::RwLock;
use smallvec::SmallVec;

use crate::event::ListenerId;
use crate::observable::Observable;

type Action<H> = Arc<dyn Fn(&H) + Send + Sync>;

/// Routes change notifications of one host to actions keyed by property name.
///
/// The host is held weakly. Dropping the listener detaches it from the host.
pub struct PropertyListener<H: Observable> {
    host: Weak<H>,
    subscription: ListenerId,
    actions: RwLock<HashMap<String, Vec<Action<H>>>>,
}

impl<H: Observable> PropertyListener<H> {
    pub fn attach(host: &Arc<H>) -> Arc<Self> {
        Arc::new_cyclic(|me: &Weak<Self>| {
            let me = me.clone();
            let target = Arc::downgrade(host);
            let subscription = host.subscribe_property_changed(move |name| {
                if let (Some(listener), Some(host)) = (me.upgrade(), target.upgrade()) {
                    listener.dispatch(&host, name);
                }
            });
            Self {
                host: Arc::downgrade(host),
                subscription,
                actions: RwLock::new(HashMap::new()),
            }
        })
    }

    /// Run `action` with the host whenever `property` changes. Returns `self`
    /// for chaining.
    pub fn add_listener(
        &self,
        property: &str,
        action: impl Fn(&H) + Send + Sync + 'static,
    ) -> &Self {
        self.actions
            .write()
            .entry(property.to_owned())
            .or_default()
            .push(Arc::new(action));
        self
    }

    /// Drop every action registered for `property`.
    pub fn remove_listeners(&self, property: &str) -> bool {
        self.actions.write().remove(property).is_some()
    }

    pub fn listener_count(&self, property: &str) -> usize {
        self.actions.read().get(property).map_or(0, Vec::len)
    }

    fn dispatch(&self, host: &H, property: &str) {
        let snapshot: SmallVec<[Action<H>; 4]> = match self.actions.read().get(property) {
            Some(actions) => actions.iter().cloned().collect(),
            None => return,
        };
        for action in snapshot {
            action(host);
        }
    }
}

impl<H: Observable> Drop for PropertyListener<H> {
    fn drop(&mut self) {
        if let Some(host) = self.host.upgrade() {
            host.unsubscribe_property_changed(self.subscription);
        }
    }
}

impl<H: Observable> fmt::Debug for PropertyListener<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyListener")
            .field("subscription", &self.subscription)
            .field("properties", &self.actions.read().keys().collect::<Vec<_>>())
            .finish()
    }
}
