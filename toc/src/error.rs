use std::result;
use thiserror::Error;

use crate::account::AccountId;

/// The global `Result` alias of the library.
pub type Result<T> = result::Result<T, Error>;

/// The global `Error` enum of the library.
///
/// Every variant denotes a broken precondition on the caller side. The
/// failing call leaves the state untouched and emits nothing.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum Error {
    #[error("cannot find modified account {0}: definition is not tracked by the toc")]
    UntrackedAccountError(AccountId),
    #[error("cannot remove account {0}: account is unknown")]
    UnknownAccountError(AccountId),
    #[error("cannot apply toc event at index {0}: mirrored list has {1} items")]
    MirroredListOutOfSyncError(usize, usize),
}
