//! Kind-keyed event dispatcher with replay for late subscribers.
//!
//! The dispatcher routes each published event to every handler that
//! subscribed to the event's kind. Events published while a kind has no
//! subscriber are not lost: they wait in a per-kind queue, and the first
//! handler to subscribe to that kind gets them replayed in arrival order
//! before it sees anything new.
//!
//! That covers the usual startup race, where the server's first frames
//! arrive before the UI has wired up its handlers.
//!
//! ```text
//! publish(A1) ──→ no subscriber for A ──→ queue[A] = [A1]
//! publish(A2) ──→ no subscriber for A ──→ queue[A] = [A1, A2]
//! subscribe(A, h) ──→ h(A1), h(A2), queue[A] = []
//! publish(A3) ──→ h(A3)
//! ```
//!
//! Each queue holds at most [`DEFAULT_BACKLOG`] events (see
//! [`Dispatcher::with_backlog`]). A kind nobody ever subscribes to, such
//! as the per-keystroke `WordBombInput`, would otherwise grow for the
//! whole session; once a queue is full the oldest event is dropped.
//!
//! One dispatcher belongs to one session. There is no global registry;
//! [`dispose`](Dispatcher::dispose) drops every handler and queued event.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use wordrush_protocol::{MessageKind, ServerMessage};

/// Events kept per kind while nobody is subscribed to it.
pub const DEFAULT_BACKLOG: usize = 1024;

/// An event that can be routed by kind.
pub trait Keyed {
    /// The routing key.
    type Kind: Copy + Ord + fmt::Debug;

    /// Returns this event's routing key.
    fn kind(&self) -> Self::Kind;
}

impl Keyed for ServerMessage {
    type Kind = MessageKind;

    fn kind(&self) -> MessageKind {
        ServerMessage::kind(self)
    }
}

/// Handle returned by [`Dispatcher::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// A subscriber callback.
pub type Handler<E> = Box<dyn FnMut(&E) + Send>;

/// Routes events to subscribers by kind, queueing events nobody is
/// listening for yet.
pub struct Dispatcher<E: Keyed> {
    next_id: u64,
    subscribers: BTreeMap<E::Kind, Vec<(SubscriptionId, Handler<E>)>>,
    pending: BTreeMap<E::Kind, VecDeque<E>>,
    backlog: usize,
    dropped: BTreeMap<E::Kind, u64>,
    disposed: bool,
}

impl<E: Keyed> Default for Dispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Keyed> fmt::Debug for Dispatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("subscribers", &self.subscriber_count())
            .field("pending", &self.pending_count())
            .field("backlog", &self.backlog)
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl<E: Keyed> Dispatcher<E> {
    /// Creates an empty dispatcher that queues up to [`DEFAULT_BACKLOG`]
    /// events per kind.
    pub fn new() -> Self {
        Self::with_backlog(DEFAULT_BACKLOG)
    }

    /// Creates an empty dispatcher that queues up to `backlog` events per
    /// kind (at least one).
    pub fn with_backlog(backlog: usize) -> Self {
        Self {
            next_id: 1,
            subscribers: BTreeMap::new(),
            pending: BTreeMap::new(),
            backlog: backlog.max(1),
            dropped: BTreeMap::new(),
            disposed: false,
        }
    }

    /// Registers `handler` for events of `kind`.
    ///
    /// Any events of this kind published while nobody was subscribed are
    /// delivered to `handler` right away, oldest first, and the queue is
    /// cleared. After a [`dispose`](Self::dispose) the handler is dropped
    /// and never called.
    pub fn subscribe(&mut self, kind: E::Kind, mut handler: Handler<E>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;

        if self.disposed {
            tracing::warn!(?kind, "subscribe on a disposed dispatcher ignored");
            return id;
        }

        if let Some(queued) = self.pending.remove(&kind) {
            let dropped = self.dropped.remove(&kind).unwrap_or(0);
            tracing::debug!(?kind, replayed = queued.len(), dropped, "replaying queued events");
            for event in &queued {
                handler(event);
            }
        }

        self.subscribers.entry(kind).or_default().push((id, handler));
        id
    }

    /// Removes a subscription. Returns `false` if it wasn't registered.
    ///
    /// Once the last subscriber of a kind is gone, new events of that
    /// kind start queueing again.
    pub fn unsubscribe(&mut self, kind: E::Kind, id: SubscriptionId) -> bool {
        let Some(handlers) = self.subscribers.get_mut(&kind) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(sub, _)| *sub != id);
        let removed = handlers.len() != before;
        if handlers.is_empty() {
            self.subscribers.remove(&kind);
        }
        removed
    }

    /// Delivers `event` to every subscriber of its kind, or queues it if
    /// there are none. A full queue drops its oldest event.
    pub fn publish(&mut self, event: E) {
        if self.disposed {
            return;
        }

        let kind = event.kind();
        match self.subscribers.get_mut(&kind) {
            Some(handlers) if !handlers.is_empty() => {
                for (_, handler) in handlers.iter_mut() {
                    handler(&event);
                }
            }
            _ => {
                let queue = self.pending.entry(kind).or_default();
                if queue.len() >= self.backlog {
                    queue.pop_front();
                    let dropped = self.dropped.entry(kind).or_default();
                    *dropped += 1;
                    if *dropped == 1 {
                        tracing::warn!(
                            ?kind,
                            backlog = self.backlog,
                            "no subscriber and backlog full, dropping oldest queued events"
                        );
                    }
                }
                queue.push_back(event);
            }
        }
    }

    /// Drops every subscriber and every queued event. Later calls to
    /// `publish` and `subscribe` do nothing.
    pub fn dispose(&mut self) {
        self.subscribers.clear();
        self.pending.clear();
        self.dropped.clear();
        self.disposed = true;
    }

    /// Whether [`dispose`](Self::dispose) has been called.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Total number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.values().map(Vec::len).sum()
    }

    /// The most events queued per kind.
    pub fn backlog(&self) -> usize {
        self.backlog
    }

    /// Total number of events waiting for a subscriber.
    pub fn pending_count(&self) -> usize {
        self.pending.values().map(VecDeque::len).sum()
    }
}
