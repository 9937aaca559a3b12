//! Module dedicated to accounts.
//!
//! This module contains the account definition assembled by the
//! account manager, its censored wire rep and the toc listing all
//! known accounts.

pub mod accounts_toc;
pub mod def;
pub mod wire;

#[doc(inline)]
pub use self::{
    accounts_toc::{AccountsToc, AccountsTocEvent, AccountsTocWriter, SharedAccountDef},
    def::{
        make_account_def, AccountDef, AccountDefParts, AccountPrefs, AccountType,
        ActiveSyncConnInfo, ConnInfo, ConnInfoFields, Credentials, Crypto, EngineFields, Identity,
        Infra, OAuth2Credentials, Password, ServerType, TypeFields,
    },
    wire::{AccountWireRep, CredentialsWireRep, ServerWireRep},
};

/// Alias for the account identifier.
pub type AccountId = String;
