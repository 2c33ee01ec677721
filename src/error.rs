//! Error types for the daemon.

use muxbnc_proto::{Command, Message, Prefix, Response};
use thiserror::Error;

/// Errors a command handler can report for one message.
///
/// These never cross the dispatch boundary: the dispatcher converts them to
/// the numeric reply an ordinary IRC client renders and the session carries
/// on (or, for an authentication failure, is marked for disposal).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandlerError {
    #[error("not enough parameters")]
    NeedMoreParams,

    #[error("password mismatch")]
    PasswordMismatch,

    #[error("not on channel {0}")]
    NotOnChannel(String),
}

impl HandlerError {
    /// The IRC numeric reply for this error.
    ///
    /// `host` is the upstream-learned host used as the reply prefix when
    /// known, `nick` the canonical nick, `cmd` the offending command token.
    pub fn to_irc_reply(&self, host: Option<&str>, nick: &str, cmd: &str) -> Message {
        let command = match self {
            HandlerError::NeedMoreParams => Command::Response(
                Response::ERR_NEEDMOREPARAMS,
                vec![
                    nick.to_string(),
                    cmd.to_string(),
                    "Not enough parameters".to_string(),
                ],
            ),
            HandlerError::PasswordMismatch => Command::Response(
                Response::ERR_PASSWDMISMATCH,
                vec!["*".to_string(), "Incorrect password".to_string()],
            ),
            HandlerError::NotOnChannel(channel) => Command::Response(
                Response::ERR_NOTONCHANNEL,
                vec![
                    nick.to_string(),
                    channel.clone(),
                    "You're not on that channel".to_string(),
                ],
            ),
        };

        Message {
            prefix: host.map(|h| Prefix::ServerName(h.to_string())),
            command,
        }
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;

/// Conditions that end the process (exit status 1) after an `ERROR`
/// broadcast to every attached client.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error("upstream connection lost: {0}")]
    UpstreamClosed(String),

    #[error("upstream write failed")]
    UpstreamWrite,

    #[error("event sources exhausted")]
    EventsClosed,
}
