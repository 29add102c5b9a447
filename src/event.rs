//! Multicast, synchronous notification channel.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Handle returned by [`EventChannel::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListenerId(pub u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

type Handler<A> = Arc<dyn Fn(&A) + Send + Sync>;

/// Ordered list of handlers invoked synchronously on [`raise`](Self::raise).
///
/// Handlers are snapshotted before invocation, so a handler may subscribe,
/// unsubscribe, or raise again without deadlocking. Changes made during a
/// raise take effect from the next one.
pub struct EventChannel<A: ?Sized> {
    handlers: RwLock<Vec<(ListenerId, Handler<A>)>>,
    next_id: AtomicU64,
}

impl<A: ?Sized> EventChannel<A> {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn subscribe(&self, handler: impl Fn(&A) + Send + Sync + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.write().push((id, Arc::new(handler)));
        id
    }

    /// Returns whether a handler was removed.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|(hid, _)| *hid != id);
        handlers.len() != before
    }

    /// Invoke every handler, in registration order, with `arg`.
    pub fn raise(&self, arg: &A) {
        let snapshot: SmallVec<[Handler<A>; 4]> =
            self.handlers.read().iter().map(|(_, h)| Arc::clone(h)).collect();
        for handler in snapshot {
            handler(arg);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }

    pub fn clear(&self) {
        self.handlers.write().clear();
    }
}

impl<A: ?Sized> Default for EventChannel<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized> fmt::Debug for EventChannel<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel").field("handlers", &self.len()).finish()
    }
}
