//! # Messenger
//!
//! Decoupled publish/subscribe between objects that hold no reference to
//! each other.
//!
//! - Subscriptions are keyed by message type and hold their recipient
//!   weakly; a dropped recipient stops receiving and is pruned on the next
//!   subscribe, unsubscribe or send.
//! - `send` is synchronous. Handlers run after the subscription lock is
//!   released and may subscribe or send themselves.
//! - One process-wide messenger can be installed with
//!   [`Messenger::install_global`].

pub mod message;

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use hashbrown::HashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{Error, Result};

pub use message::{BasicMessage, ContentMessage, Message, Sender};

/// Handle returned by [`Messenger::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub:{}", self.0)
    }
}

type Recipient = Arc<dyn Any + Send + Sync>;
type Delivery = Arc<dyn Fn(&(dyn Any + Send + Sync), &dyn Message) + Send + Sync>;

struct Subscription {
    id: SubscriptionId,
    recipient: Weak<dyn Any + Send + Sync>,
    derived: bool,
    deliver: Delivery,
}

impl Subscription {
    fn is_alive(&self) -> bool {
        self.recipient.strong_count() > 0
    }
}

static GLOBAL: OnceLock<Arc<Messenger>> = OnceLock::new();

pub struct Messenger {
    by_type: RwLock<HashMap<TypeId, Vec<Subscription>>>,
    next_id: AtomicU64,
}

impl Messenger {
    pub fn new() -> Self {
        Self {
            by_type: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    // ========================================================================
    // Process-wide default
    // ========================================================================

    /// Install the process-wide messenger. Only the first call succeeds.
    pub fn install_global(messenger: Arc<Messenger>) -> Result<()> {
        GLOBAL
            .set(messenger)
            .map_err(|_| Error::AlreadyInitialized("messenger"))
    }

    pub fn global() -> Option<Arc<Messenger>> {
        GLOBAL.get().cloned()
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    /// Deliver every `M` sent from now on to `handler`, for as long as
    /// `recipient` is alive.
    ///
    /// Fails with `InvalidArgument("recipient")` if the recipient is already
    /// gone.
    pub fn subscribe<M, R>(
        &self,
        recipient: &Weak<R>,
        handler: impl Fn(&R, &M) + Send + Sync + 'static,
    ) -> Result<SubscriptionId>
    where
        M: Message,
        R: Any + Send + Sync,
    {
        self.register(recipient, false, handler)
    }

    /// Like [`subscribe`](Self::subscribe), also receiving messages that wrap
    /// an `M` somewhere in their [`base`](Message::base) chain. The handler
    /// then sees the wrapped `M`.
    pub fn subscribe_derived<M, R>(
        &self,
        recipient: &Weak<R>,
        handler: impl Fn(&R, &M) + Send + Sync + 'static,
    ) -> Result<SubscriptionId>
    where
        M: Message,
        R: Any + Send + Sync,
    {
        self.register(recipient, true, handler)
    }

    fn register<M, R>(
        &self,
        recipient: &Weak<R>,
        derived: bool,
        handler: impl Fn(&R, &M) + Send + Sync + 'static,
    ) -> Result<SubscriptionId>
    where
        M: Message,
        R: Any + Send + Sync,
    {
        if recipient.strong_count() == 0 {
            return Err(Error::InvalidArgument("recipient"));
        }
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let deliver: Delivery = Arc::new(
            move |recipient: &(dyn Any + Send + Sync), message: &dyn Message| {
                let message: &dyn Any = message;
                let recipient = recipient.downcast_ref::<R>();
                if let (Some(recipient), Some(message)) = (recipient, message.downcast_ref::<M>()) {
                    handler(recipient, message);
                }
            },
        );
        let recipient: Weak<dyn Any + Send + Sync> = recipient.clone();

        self.by_type
            .write()
            .entry(TypeId::of::<M>())
            .or_default()
            .push(Subscription {
                id,
                recipient,
                derived,
                deliver,
            });
        tracing::debug!(
            id = id.0,
            message = std::any::type_name::<M>(),
            derived,
            "messenger subscription added"
        );
        self.prune();
        Ok(id)
    }

    /// Remove every `M` subscription of `recipient`. Returns how many were
    /// removed; an unknown recipient is not an error.
    pub fn unsubscribe<M, R>(&self, recipient: &Weak<R>) -> usize
    where
        M: Message,
        R: Any + Send + Sync,
    {
        let removed = {
            let mut by_type = self.by_type.write();
            match by_type.get_mut(&TypeId::of::<M>()) {
                Some(subs) => {
                    let before = subs.len();
                    subs.retain(|s| !std::ptr::addr_eq(s.recipient.as_ptr(), recipient.as_ptr()));
                    before - subs.len()
                }
                None => 0,
            }
        };
        tracing::debug!(message = std::any::type_name::<M>(), removed, "messenger unsubscribe");
        self.prune();
        removed
    }

    pub fn unsubscribe_id(&self, id: SubscriptionId) -> bool {
        let removed = {
            let mut by_type = self.by_type.write();
            let mut removed = false;
            for subs in by_type.values_mut() {
                let before = subs.len();
                subs.retain(|s| s.id != id);
                removed |= subs.len() != before;
            }
            removed
        };
        self.prune();
        removed
    }

    /// Number of live subscriptions across all message types.
    pub fn subscription_count(&self) -> usize {
        self.by_type
            .read()
            .values()
            .flat_map(|subs| subs.iter())
            .filter(|s| s.is_alive())
            .count()
    }

    // ========================================================================
    // Delivery
    // ========================================================================

    /// Deliver `message` to every live, compatible subscription.
    pub fn send<M: Message>(&self, message: &M) {
        let mut chain: SmallVec<[&dyn Message; 4]> = SmallVec::new();
        let mut current: Option<&dyn Message> = Some(message);
        while let Some(m) = current {
            chain.push(m);
            current = m.base();
        }

        let mut targets: SmallVec<[(Recipient, Delivery, &dyn Message); 8]> = SmallVec::new();
        {
            let by_type = self.by_type.read();
            for (depth, &level) in chain.iter().enumerate() {
                let level_any: &dyn Any = level;
                let Some(subs) = by_type.get(&level_any.type_id()) else {
                    continue;
                };
                for sub in subs.iter().filter(|s| depth == 0 || s.derived) {
                    if let Some(recipient) = sub.recipient.upgrade() {
                        targets.push((recipient, Arc::clone(&sub.deliver), level));
                    }
                }
            }
        }

        tracing::trace!(
            message = std::any::type_name::<M>(),
            recipients = targets.len(),
            "delivering message"
        );
        for (recipient, deliver, level) in &targets {
            deliver(&**recipient, *level);
        }
        drop(targets);
        self.prune();
    }

    /// Hand [`send`](Self::send) off to the blocking pool.
    #[cfg(feature = "async")]
    pub fn send_async<M: Message>(self: &Arc<Self>, message: M) -> tokio::task::JoinHandle<()> {
        let messenger = Arc::clone(self);
        tokio::task::spawn_blocking(move || messenger.send(&message))
    }

    fn prune(&self) {
        let mut by_type = self.by_type.write();
        by_type.values_mut().for_each(|subs| subs.retain(Subscription::is_alive));
        by_type.retain(|_, subs| !subs.is_empty());
    }
}

impl Default for Messenger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Messenger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Messenger")
            .field("subscriptions", &self.subscription_count())
            .finish()
    }
}
