//! Rust library to keep front-end lists in sync with an authoritative
//! store.
//!
//! The library exposes two mechanisms:
//!
//! - The [`AccountsToc`](crate::account::AccountsToc), an ordered,
//!   id-indexed registry of account definitions. Its single writer,
//!   the account manager, adds, modifies and removes accounts through
//!   an [`AccountsTocWriter`](crate::account::AccountsTocWriter);
//!   everybody else reads it and subscribes to its add, change and
//!   remove events, which carry the index of the affected row.
//!
//! - The [`KeyedList`](crate::keyed_list::KeyedList) helper, which
//!   reconciles the children owned by a parent (like the attachments
//!   of a [`MailMessage`](crate::message::MailMessage)) against a fresh
//!   snapshot, reusing the rich reps of surviving ids and emitting
//!   fine-grained add, update and remove events.
//!
//! Everything runs synchronously on a single thread: every mutation
//! delivers its events, in order, before returning.

pub mod account;
mod error;
pub mod event;
pub mod keyed_list;
pub mod message;
pub mod util;

#[doc(inline)]
pub use self::error::{Error, Result};
