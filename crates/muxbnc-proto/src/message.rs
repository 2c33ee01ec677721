//! The owned IRC message type.

use std::fmt;
use std::str::FromStr;

use crate::command::Command;
use crate::error::{MessageParseError, ProtocolError};
use crate::parser::ParsedLine;
use crate::prefix::Prefix;
use crate::MAX_LINE_LEN;

/// A complete parsed IRC message: optional origin prefix plus a command with
/// its parameters.
///
/// Messages are immutable in transit: they are built by the parser or by the
/// constructor helpers, fanned out, and dropped.
///
/// ```rust
/// use muxbnc_proto::Message;
///
/// let msg: Message = ":nick!user@host PRIVMSG #chan :Hello!".parse().unwrap();
/// assert_eq!(msg.source_nickname(), Some("nick"));
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Message {
    /// Message origin, when present.
    pub prefix: Option<Prefix>,
    /// The command and its parameters.
    pub command: Command,
}

impl Message {
    /// Attach a prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = Some(prefix);
        self
    }

    /// The nickname from the prefix, if this message has a user prefix.
    pub fn source_nickname(&self) -> Option<&str> {
        self.prefix.as_ref().and_then(Prefix::nick)
    }

    /// Serialize to the wire form: one CRLF-terminated line, truncated to
    /// [`MAX_LINE_LEN`] bytes. Truncation never splits the CRLF.
    pub fn to_line(&self) -> String {
        let mut line = self.to_string();
        if line.len() > MAX_LINE_LEN {
            let mut cut = MAX_LINE_LEN - 2;
            while cut > 0 && !line.is_char_boundary(cut) {
                cut -= 1;
            }
            line.truncate(cut);
            line.push_str("\r\n");
        }
        line
    }

    /// Create a PASS message.
    #[must_use]
    pub fn pass(password: impl Into<String>) -> Self {
        Command::PASS(password.into()).into()
    }

    /// Create a NICK message.
    #[must_use]
    pub fn nick(nickname: impl Into<String>) -> Self {
        Command::NICK(nickname.into()).into()
    }

    /// Create a USER registration message.
    #[must_use]
    pub fn user(
        username: impl Into<String>,
        hostname: impl Into<String>,
        servername: impl Into<String>,
        realname: impl Into<String>,
    ) -> Self {
        Command::USER(
            username.into(),
            hostname.into(),
            servername.into(),
            realname.into(),
        )
        .into()
    }

    /// Create a JOIN message for a channel.
    #[must_use]
    pub fn join(channel: impl Into<String>) -> Self {
        Command::JOIN(channel.into(), None).into()
    }

    /// Create a PART message for a channel.
    #[must_use]
    pub fn part(channel: impl Into<String>) -> Self {
        Command::PART(channel.into(), None).into()
    }

    /// Create a PRIVMSG.
    #[must_use]
    pub fn privmsg(target: impl Into<String>, text: impl Into<String>) -> Self {
        Command::PRIVMSG(target.into(), text.into()).into()
    }

    /// Create a PONG echoing the PING parameters.
    #[must_use]
    pub fn pong(server: impl Into<String>, token: Option<String>) -> Self {
        Command::PONG(server.into(), token).into()
    }

    /// Create a MODE query for a target.
    #[must_use]
    pub fn mode_query(target: impl Into<String>) -> Self {
        Command::MODE(target.into(), Vec::new()).into()
    }

    /// Create a TOPIC query for a channel.
    #[must_use]
    pub fn topic_query(channel: impl Into<String>) -> Self {
        Command::TOPIC(channel.into(), None).into()
    }

    /// Create a NAMES query for a channel.
    #[must_use]
    pub fn names(channel: impl Into<String>) -> Self {
        Command::NAMES(Some(channel.into())).into()
    }

    /// Create an MOTD request.
    #[must_use]
    pub fn motd() -> Self {
        Command::MOTD(None).into()
    }

    /// Create an ERROR message.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Command::ERROR(text.into()).into()
    }
}

impl From<Command> for Message {
    fn from(command: Command) -> Message {
        Message {
            prefix: None,
            command,
        }
    }
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Message, Self::Err> {
        let stripped = s.trim_end_matches(['\r', '\n']);
        if stripped.trim().is_empty() {
            return Err(ProtocolError::InvalidMessage {
                string: s.to_owned(),
                cause: MessageParseError::EmptyMessage,
            });
        }

        let parsed =
            ParsedLine::parse(stripped).map_err(|cause| ProtocolError::InvalidMessage {
                string: stripped.to_owned(),
                cause,
            })?;

        Ok(Message {
            prefix: parsed.prefix.map(Prefix::new_from_str),
            command: Command::from_parts(
                parsed.command,
                parsed.params.iter().map(|p| p.to_string()).collect(),
            ),
        })
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref prefix) = self.prefix {
            write!(f, ":{} ", prefix)?;
        }
        write!(f, "{}\r\n", self.command)
    }
}
