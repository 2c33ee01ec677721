//! # muxbnc-proto
//!
//! IRC wire-protocol support for the muxbnc bouncer: parsing and encoding of
//! RFC 1459 messages (optional `:prefix`, textual or three-digit numeric
//! command, up to fifteen parameters with an optional trailing parameter).
//!
//! The crate deliberately models plain RFC 1459 only, with no IRCv3 message
//! tags or capability state. Unknown opcodes and numerics outside the named
//! [`Response`] set are preserved verbatim in [`Command::Raw`] so that every
//! parsed message can be re-serialized without loss.
//!
//! ## Parsing and construction
//!
//! ```rust
//! use muxbnc_proto::{Command, Message};
//!
//! let msg: Message = ":nick!user@host PRIVMSG #channel :Hello!".parse().unwrap();
//! assert!(matches!(msg.command, Command::PRIVMSG(_, _)));
//!
//! let join = Message::join("#channel");
//! assert_eq!(join.to_line(), "JOIN #channel\r\n");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod casemap;
pub mod chan;
pub mod command;
pub mod error;
pub mod irc;
pub mod line;
pub mod message;
mod parser;
pub mod prefix;
pub mod response;

pub use casemap::{irc_eq, irc_to_lower};
pub use chan::ChannelExt;
pub use command::Command;
pub use error::ProtocolError;
pub use irc::IrcCodec;
pub use line::LineCodec;
pub use message::Message;
pub use prefix::Prefix;
pub use response::Response;

/// Maximum length of a serialized IRC line in bytes, CRLF included.
pub const MAX_LINE_LEN: usize = 512;

/// Size of the line read accumulator in bytes.
///
/// Incoming lines longer than this are rejected by the decoder.
pub const READ_BUFFER_LEN: usize = 1024;
