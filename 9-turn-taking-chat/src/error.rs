use std::io;

use thiserror::Error;

/// Problems with the bytes of a single chat message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// A received buffer carried no `>` separating sender from body.
    #[error("malformed message: no sender separator in {len} bytes")]
    MalformedMessage { len: usize },

    #[error("message of {len} bytes exceeds the {max} byte limit")]
    MessageTooLarge { len: usize, max: usize },

    #[error("invalid sender name '{name}': {reason}")]
    InvalidSender { name: String, reason: &'static str },
}

/// Everything that can end a chat before, or instead of, a clean sentinel exchange.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("could not resolve {target}: {cause}")]
    Resolution { target: String, cause: String },

    #[error("failed to connect to server")]
    Connection,

    #[error("local i/o failed: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T, E = ChatError> = std::result::Result<T, E>;
