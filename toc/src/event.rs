//! # Event
//!
//! This module contains the observer registry shared by the toc, the
//! keyed list helper and the rich reps. An [`Emitter`] owns a list of
//! handlers; emitting an event is a synchronous fan-out call, in
//! registration order, that completes before `emit` returns.

use std::{error, fmt, rc::Rc};

use tracing::{debug, trace};

/// The result returned by event handlers.
///
/// A failing handler does not prevent the remaining ones from
/// receiving the event.
pub type HandlerResult = Result<(), Box<dyn error::Error>>;

/// The event handler alias.
pub type EventHandler<E> = Rc<dyn Fn(E) -> HandlerResult>;

/// Identifier returned by [`Emitter::subscribe`], used to unsubscribe.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub struct ListenerId(usize);

/// The event emitter.
///
/// Cloning an emitter snapshots its handlers: the clone delivers to
/// the same handlers but further (un)subscriptions do not propagate.
/// This is what allows emitting without holding a borrow on the
/// structure owning the emitter.
pub struct Emitter<E> {
    next_id: usize,
    handlers: Vec<(ListenerId, EventHandler<E>)>,
}

impl<E> Default for Emitter<E> {
    fn default() -> Self {
        Self {
            next_id: 0,
            handlers: Vec::new(),
        }
    }
}

impl<E> Clone for Emitter<E> {
    fn clone(&self) -> Self {
        Self {
            next_id: self.next_id,
            handlers: self.handlers.clone(),
        }
    }
}

impl<E> fmt::Debug for Emitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.handlers.len())
            .finish()
    }
}

impl<E> Emitter<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the given handler, returning its listener id.
    pub fn subscribe(&mut self, handler: impl Fn(E) -> HandlerResult + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Rc::new(handler)));
        id
    }

    /// Unregister the handler matching the given listener id.
    ///
    /// Returns `false` if no such listener was registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let len = self.handlers.len();
        self.handlers.retain(|(listener_id, _)| *listener_id != id);
        self.handlers.len() != len
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<E: Clone + fmt::Debug> Emitter<E> {
    /// Deliver the given event to every registered handler.
    pub fn emit(&self, event: E) {
        for (id, handler) in &self.handlers {
            if let Err(err) = handler(event.clone()) {
                debug!("cannot deliver event {event:?} to listener {id:?}: {err}");
                trace!("{err:?}");
            }
        }
    }
}
