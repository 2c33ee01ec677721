//! Error types for the protocol library.

use thiserror::Error;

/// Convenience alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error while reading or writing a line.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A line that is not valid UTF-8.
    #[error("invalid utf-8 in line: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// A line exceeded the read accumulator.
    #[error("line too long: {actual} bytes (limit: {limit})")]
    LineTooLong {
        /// Observed length in bytes.
        actual: usize,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// A line that does not parse as an IRC message.
    #[error("invalid message {string:?}: {cause}")]
    InvalidMessage {
        /// The offending line, CRLF stripped.
        string: String,
        /// What went wrong.
        cause: MessageParseError,
    },
}

/// Reasons a single line can fail to parse.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum MessageParseError {
    /// The line was empty (or whitespace only).
    #[error("empty message")]
    EmptyMessage,

    /// Syntactically malformed at the given byte offset.
    #[error("syntax error at byte {position}")]
    Syntax {
        /// Byte offset into the line where parsing stopped.
        position: usize,
    },
}
