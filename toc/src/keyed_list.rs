//! # Keyed list
//!
//! Module dedicated to the reconciliation of a parent's owned
//! children (like the attachments of a message) against a fresh
//! snapshot of their wire reps.
//!
//! Children are materialized as rich reps shared behind a
//! [`Shared`] pointer. Consumers may keep long-lived references to
//! them, so a rich rep whose id survives a snapshot is updated in
//! place and reused instead of being rebuilt.

use std::{cell::RefCell, collections::HashMap, fmt, hash::Hash, rc::Rc};

use tracing::debug;

use crate::event::Emitter;

/// Alias for a shared, identity-preserving rich rep.
pub type Shared<R> = Rc<RefCell<R>>;

/// The event emitted on a rich rep itself.
pub enum RichRepEvent<R> {
    /// The rich rep has been updated in place from a new wire rep.
    Update(Shared<R>),

    /// The rich rep is no longer part of its parent's list.
    Remove(Shared<R>),
}

impl<R> Clone for RichRepEvent<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Update(rep) => Self::Update(rep.clone()),
            Self::Remove(rep) => Self::Remove(rep.clone()),
        }
    }
}

impl<R> fmt::Debug for RichRepEvent<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Update(rep) => write!(f, "Update({:p})", Rc::as_ptr(rep)),
            Self::Remove(rep) => write!(f, "Remove({:p})", Rc::as_ptr(rep)),
        }
    }
}

/// A long-lived object wrapping the latest wire rep of a child.
pub trait RichRep: Sized {
    type WireRep;

    /// Return the wire rep currently wrapped.
    fn wire_rep(&self) -> &Self::WireRep;

    /// Replace the internal state with the given wire rep.
    fn update(&mut self, wire_rep: Self::WireRep);

    /// Return the emitter of the rich rep's own events.
    fn emitter(&self) -> &Emitter<RichRepEvent<Self>>;
}

/// A parent able to broadcast owner-level events about its children.
pub trait EventOwner {
    type Event;

    fn emit(&self, event: Self::Event);
}

/// The keyed list helper options.
///
/// Owner-level events are optional: a `None` transition does not emit
/// anything on the owner.
pub struct KeyedList<'a, O, R, C, I>
where
    O: EventOwner,
    R: RichRep,
{
    /// Fresh snapshot of the children, in their new order.
    pub wire_reps: Vec<R::WireRep>,

    /// Rich reps materialized by the previous reconciliation.
    pub existing_rich_reps: &'a [Shared<R>],

    /// Factory building a rich rep for a newly seen id.
    pub constructor: C,

    /// The parent owning the children.
    pub owner: &'a O,

    /// Extract the identity of a wire rep.
    pub id_key: I,

    pub add_event: Option<fn(Shared<R>) -> O::Event>,
    pub update_event: Option<fn(Shared<R>) -> O::Event>,
    pub remove_event: Option<fn(Shared<R>) -> O::Event>,
}

impl<'a, O, R, C, I> KeyedList<'a, O, R, C, I>
where
    O: EventOwner,
    R: RichRep,
    C: Fn(&O, R::WireRep) -> R,
{
    /// Reconcile the wire reps against the existing rich reps.
    ///
    /// Returns a freshly built list following the order of the wire
    /// reps. Rich reps matching an incoming id are updated in place
    /// and reused, unmatched ids get a new rich rep, and rich reps
    /// left over are announced as removed.
    pub fn reconcile<K>(self) -> Vec<Shared<R>>
    where
        K: Eq + Hash,
        I: Fn(&R::WireRep) -> K,
    {
        let Self {
            wire_reps,
            existing_rich_reps,
            constructor,
            owner,
            id_key,
            add_event,
            update_event,
            remove_event,
        } = self;

        // Rich reps not matched yet. Whatever remains once every wire
        // rep has been processed has been removed.
        let mut pending: HashMap<K, Shared<R>> = HashMap::new();
        for rich_rep in existing_rich_reps {
            let id = id_key(rich_rep.borrow().wire_rep());
            pending.insert(id, rich_rep.clone());
        }

        let (mut added, mut updated, mut removed) = (0, 0, 0);
        let mut updated_list = Vec::with_capacity(wire_reps.len());

        for wire_rep in wire_reps {
            let id = id_key(&wire_rep);
            let rich_rep = match pending.remove(&id) {
                Some(rich_rep) => {
                    rich_rep.borrow_mut().update(wire_rep);
                    emit_on_rich_rep(&rich_rep, RichRepEvent::Update(rich_rep.clone()));
                    if let Some(update_event) = update_event {
                        owner.emit(update_event(rich_rep.clone()));
                    }
                    updated += 1;
                    rich_rep
                }
                None => {
                    let rich_rep = Rc::new(RefCell::new(constructor(owner, wire_rep)));
                    if let Some(add_event) = add_event {
                        owner.emit(add_event(rich_rep.clone()));
                    }
                    added += 1;
                    rich_rep
                }
            };

            updated_list.push(rich_rep);
        }

        // Walking the existing list instead of the map keeps removals
        // in their previous order.
        for rich_rep in existing_rich_reps {
            let id = id_key(rich_rep.borrow().wire_rep());
            let is_pending = pending
                .get(&id)
                .is_some_and(|candidate| Rc::ptr_eq(candidate, rich_rep));

            if is_pending {
                pending.remove(&id);
                emit_on_rich_rep(rich_rep, RichRepEvent::Remove(rich_rep.clone()));
                if let Some(remove_event) = remove_event {
                    owner.emit(remove_event(rich_rep.clone()));
                }
                removed += 1;
            }
        }

        debug!("reconciled keyed list: {added} added, {updated} updated, {removed} removed");

        updated_list
    }
}

// The emitter is cloned out so that handlers are free to borrow the
// rich rep, mutably included.
fn emit_on_rich_rep<R: RichRep>(rich_rep: &Shared<R>, event: RichRepEvent<R>) {
    let emitter = rich_rep.borrow().emitter().clone();
    emitter.emit(event);
}
