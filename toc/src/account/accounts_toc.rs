//! # Accounts TOC
//!
//! The accounts table of contents lists every account definition
//! known to the system, loaded or not, ordered by name. It emits an
//! [`AccountsTocEvent`] for every change, carrying the index of the
//! affected row so that a front-end list can be updated without being
//! fully re-rendered.
//!
//! The toc does not listen to the storage by itself: the account
//! manager tells it about accounts once they are ready to be
//! announced. This single-writer discipline is enforced by a
//! capability split: the manager owns the only [`AccountsTocWriter`],
//! everybody else gets a cloneable, read-only [`AccountsToc`].

use std::{cell::RefCell, cmp::Ordering, collections::HashMap, rc::Rc};

use tracing::{debug, warn};

use crate::{
    event::{Emitter, HandlerResult, ListenerId},
    util::{bsearch_for_insert, locale_cmp},
    Error, Result,
};

use super::{AccountDef, AccountId, AccountWireRep};

/// Alias for an account definition shared between the account
/// manager and the toc.
///
/// The toc tracks definitions by identity: the manager mutates the
/// very object it handed over, then calls
/// [`AccountsTocWriter::account_modified`].
pub type SharedAccountDef = Rc<RefCell<AccountDef>>;

/// Alias for the account definitions comparator.
pub type AccountDefComparator = fn(&AccountDef, &AccountDef) -> Ordering;

/// Order accounts by name.
pub fn account_def_comparator(a: &AccountDef, b: &AccountDef) -> Ordering {
    locale_cmp(&a.name, &b.name)
}

/// The accounts toc event.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AccountsTocEvent {
    /// The account has been inserted at the given index.
    Add(AccountWireRep, usize),

    /// The account at the given index changed.
    Change(AccountWireRep, usize),

    /// The account with the given id has been removed from the given
    /// index.
    Remove(AccountId, usize),
}

impl AccountsTocEvent {
    /// Apply the event to a mirrored list of wire reps.
    ///
    /// A list built from [`AccountsToc::get_all_items`] and then kept
    /// up to date with this function stays equal to the toc items. An
    /// index out of the mirror bounds means the mirror missed events:
    /// it fails and leaves the mirror untouched.
    pub fn apply_to(&self, items: &mut Vec<AccountWireRep>) -> Result<()> {
        let len = items.len();

        match self {
            Self::Add(wire_rep, index) if *index <= len => {
                items.insert(*index, wire_rep.clone());
            }
            Self::Change(wire_rep, index) if *index < len => {
                items[*index] = wire_rep.clone();
            }
            Self::Remove(_, index) if *index < len => {
                items.remove(*index);
            }
            Self::Add(_, index) | Self::Change(_, index) | Self::Remove(_, index) => {
                return Err(Error::MirroredListOutOfSyncError(*index, len));
            }
        }

        Ok(())
    }
}

#[derive(Debug)]
struct State {
    account_defs: Vec<SharedAccountDef>,
    account_defs_by_id: HashMap<AccountId, SharedAccountDef>,
    comparator: AccountDefComparator,
    emitter: Emitter<AccountsTocEvent>,
}

impl State {
    fn position(&self, def: &SharedAccountDef) -> Option<usize> {
        self.account_defs
            .iter()
            .position(|candidate| Rc::ptr_eq(candidate, def))
    }
}

/// The read-only accounts toc.
///
/// Cloning it gives another handle to the same toc.
#[derive(Clone, Debug)]
pub struct AccountsToc(Rc<RefCell<State>>);

impl AccountsToc {
    /// Acquire a handle on the toc.
    ///
    /// The toc lives as long as the process, so there is nothing to
    /// wait for and nothing to reference-count.
    pub fn acquire(&self) -> Self {
        self.clone()
    }

    /// Release a handle previously acquired.
    pub fn release(&self) {
        // nothing to do
    }

    pub fn is_known_account(&self, id: &str) -> bool {
        self.0.borrow().account_defs_by_id.contains_key(id)
    }

    /// Return the wire reps of all the accounts, in toc order.
    pub fn get_all_items(&self) -> Vec<AccountWireRep> {
        self.0
            .borrow()
            .account_defs
            .iter()
            .map(|def| def.borrow().to_wire_rep())
            .collect()
    }

    /// Return the wire rep of the account with the highest default
    /// priority. On ties, the first one in toc order wins.
    pub fn default_account(&self) -> Option<AccountWireRep> {
        let state = self.0.borrow();
        let mut best: Option<&SharedAccountDef> = None;

        for def in &state.account_defs {
            let is_better = match best {
                None => true,
                Some(best) => def.borrow().default_priority() > best.borrow().default_priority(),
            };
            if is_better {
                best = Some(def);
            }
        }

        best.map(|def| def.borrow().to_wire_rep())
    }

    pub fn len(&self) -> usize {
        self.0.borrow().account_defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().account_defs.is_empty()
    }

    /// Register a handler receiving every toc event, in order.
    ///
    /// Handlers are called synchronously, before the mutation that
    /// triggered them returns. They may read the toc.
    pub fn subscribe(
        &self,
        handler: impl Fn(AccountsTocEvent) -> HandlerResult + 'static,
    ) -> ListenerId {
        self.0.borrow_mut().emitter.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.0.borrow_mut().emitter.unsubscribe(id)
    }

    fn state(&self) -> &RefCell<State> {
        &self.0
    }

    // The emitter is snapshotted so that no borrow is held while
    // handlers run.
    fn emit(&self, event: AccountsTocEvent) {
        let emitter = self.state().borrow().emitter.clone();
        emitter.emit(event);
    }
}

/// The accounts toc mutation handle.
///
/// Only the account manager should own it. It cannot be cloned.
#[derive(Debug)]
pub struct AccountsTocWriter(AccountsToc);

impl Default for AccountsTocWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountsTocWriter {
    /// Create a new, empty toc ordering accounts by name.
    pub fn new() -> Self {
        Self::with_comparator(account_def_comparator)
    }

    /// Create a new, empty toc ordering accounts with the given
    /// comparator.
    pub fn with_comparator(comparator: AccountDefComparator) -> Self {
        let state = State {
            account_defs: Vec::new(),
            account_defs_by_id: HashMap::new(),
            comparator,
            emitter: Emitter::new(),
        };

        Self(AccountsToc(Rc::new(RefCell::new(state))))
    }

    /// Return a read-only handle on the toc.
    pub fn toc(&self) -> AccountsToc {
        self.0.clone()
    }

    /// Start tracking the given account definition.
    ///
    /// The id must not be already tracked. A duplicate is only
    /// reported in the logs: it leaves the id index and the ordered
    /// list out of sync. Returns the wire rep emitted with the `Add`
    /// event.
    pub fn add_account(&mut self, def: SharedAccountDef) -> AccountWireRep {
        let (wire_rep, index) = {
            let mut state = self.0.state().borrow_mut();
            let comparator = state.comparator;
            let index = bsearch_for_insert(&state.account_defs, &def, |a, b| {
                comparator(&a.borrow(), &b.borrow())
            });

            let account = def.borrow();
            let id = account.id().clone();

            if state.account_defs_by_id.contains_key(&id) {
                warn!("account {id} is already tracked, the toc is now inconsistent");
            }

            debug!("adding account {id} at index {index}");
            let wire_rep = account.to_wire_rep();
            drop(account);

            state.account_defs.insert(index, def.clone());
            state.account_defs_by_id.insert(id, def);

            (wire_rep, index)
        };

        self.0.emit(AccountsTocEvent::Add(wire_rep.clone(), index));
        wire_rep
    }

    /// Announce that the given account definition has been mutated
    /// in place.
    ///
    /// The definition must be the very object previously passed to
    /// [`AccountsTocWriter::add_account`]. The account keeps its
    /// position, even if its name changed.
    pub fn account_modified(&mut self, def: &SharedAccountDef) -> Result<()> {
        let index = self.0.state().borrow().position(def);
        let account = def.borrow();

        let Some(index) = index else {
            return Err(Error::UntrackedAccountError(account.id().clone()));
        };

        debug!("account {} modified at index {index}", account.id());
        let wire_rep = account.to_wire_rep();
        drop(account);

        self.0.emit(AccountsTocEvent::Change(wire_rep, index));
        Ok(())
    }

    /// Stop tracking the account matching the given id.
    pub fn remove_account_by_id(&mut self, id: &str) -> Result<()> {
        let index = {
            let mut state = self.0.state().borrow_mut();

            let index = state
                .account_defs_by_id
                .get(id)
                .and_then(|def| state.position(def))
                .ok_or_else(|| Error::UnknownAccountError(id.to_owned()))?;

            debug!("removing account {id} from index {index}");
            state.account_defs_by_id.remove(id);
            state.account_defs.remove(index);

            index
        };

        self.0.emit(AccountsTocEvent::Remove(id.to_owned(), index));
        Ok(())
    }
}
