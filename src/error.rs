//! Error taxonomy.
//!
//! Parse problems are events, not failures: the parser reports them through
//! [`EventHandler::error`](crate::EventHandler::error) and keeps going. The
//! only fatal condition is buffer-allocation failure, which is returned as a
//! [`FatalError`] and leaves the parser trapped in its end state.

use std::collections::TryReserveError;
use thiserror::Error;

/// Recoverable parse problems reported through the error event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The grammar does not allow the current byte in the current state.
    SyntaxError,
    /// Reserved. Unknown tag names are conveyed through [`Tag::Unknown`]
    /// (see [`crate::Tag`]) rather than through the error event.
    UnknownTag,
    /// A character reference did not decode to a codepoint; its raw bytes
    /// are kept in the surrounding token.
    UnknownEntity,
}

/// Unrecoverable failure. After returning one of these the parser stays in a
/// permanent trap state; feeding more input is a no-op.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error("token buffer allocation of {requested} bytes failed")]
    OutOfMemory { requested: usize },
}

impl FatalError {
    pub(crate) fn from_reserve(requested: usize, _err: TryReserveError) -> Self {
        FatalError::OutOfMemory { requested }
    }
}
