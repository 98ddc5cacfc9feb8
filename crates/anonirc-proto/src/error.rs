//! Error types for the IRC protocol library.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Line was not valid UTF-8.
    #[error("invalid utf-8 in message: {0}")]
    InvalidUtf8(String),

    /// Line exceeded the configured maximum length.
    #[error("message too long: {actual} bytes (limit {limit})")]
    MessageTooLong {
        /// Bytes received for the line, terminator included.
        actual: usize,
        /// Configured limit.
        limit: usize,
    },

    /// NUL, or a bare CR/LF inside an outgoing message.
    #[error("illegal control character: {0:?}")]
    IllegalControlChar(char),

    /// The line was received intact but is not a valid message.
    #[error("invalid message {string:?}: {cause}")]
    InvalidMessage {
        /// The offending line, terminator stripped.
        string: String,
        /// Why it was rejected.
        cause: MessageParseError,
    },
}

impl ProtocolError {
    /// The underlying parse failure, if this is one.
    pub fn parse_cause(&self) -> Option<&MessageParseError> {
        match self {
            Self::InvalidMessage { cause, .. } => Some(cause),
            _ => None,
        }
    }
}

/// Reasons a line can fail to parse into a [`crate::Message`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageParseError {
    /// Nothing but whitespace.
    #[error("empty message")]
    EmptyMessage,

    /// Command token missing or not `1*letter / 3digit`.
    #[error("invalid command")]
    InvalidCommand,

    /// Garbage after the parameters.
    #[error("unexpected trailing data")]
    TrailingData,

    /// A known command arrived with fewer parameters than it requires.
    #[error("{cmd} needs {needed} parameters, got {got}")]
    NotEnoughArguments {
        /// Uppercased command name.
        cmd: String,
        /// Minimum parameter count.
        needed: usize,
        /// Parameters actually present.
        got: usize,
    },
}
