//! Message types carried by the [`Messenger`](super::Messenger).

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Opaque reference to whoever sent a message.
pub type Sender = Arc<dyn Any + Send + Sync>;

/// A message that can be delivered by a messenger.
///
/// A message type may wrap a more general one and expose it through
/// [`base`](Message::base). Subscribers registered for derived delivery of
/// `M` receive any message whose base chain contains an `M`.
pub trait Message: Any + Send + Sync {
    fn sender(&self) -> Option<&Sender>;

    fn base(&self) -> Option<&dyn Message> {
        None
    }
}

/// A message that carries only its sender.
#[derive(Clone, Default)]
pub struct BasicMessage {
    sender: Option<Sender>,
}

impl BasicMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sender(sender: Sender) -> Self {
        Self { sender: Some(sender) }
    }
}

impl Message for BasicMessage {
    fn sender(&self) -> Option<&Sender> {
        self.sender.as_ref()
    }
}

impl fmt::Debug for BasicMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicMessage")
            .field("has_sender", &self.sender.is_some())
            .finish()
    }
}

/// A [`BasicMessage`] with a typed payload.
#[derive(Clone)]
pub struct ContentMessage<C> {
    base: BasicMessage,
    content: C,
}

impl<C: Send + Sync + 'static> ContentMessage<C> {
    pub fn new(content: C) -> Self {
        Self {
            base: BasicMessage::new(),
            content,
        }
    }

    pub fn from_sender(sender: Sender, content: C) -> Self {
        Self {
            base: BasicMessage::from_sender(sender),
            content,
        }
    }

    pub fn content(&self) -> &C {
        &self.content
    }

    pub fn into_content(self) -> C {
        self.content
    }
}

impl<C: Send + Sync + 'static> Message for ContentMessage<C> {
    fn sender(&self) -> Option<&Sender> {
        self.base.sender()
    }

    fn base(&self) -> Option<&dyn Message> {
        Some(&self.base)
    }
}

impl<C: fmt::Debug> fmt::Debug for ContentMessage<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentMessage")
            .field("base", &self.base)
            .field("content", &self.content)
            .finish()
    }
}
