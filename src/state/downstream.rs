//! Per-client session state.

use muxbnc_proto::Message;
use tokio::sync::mpsc;

/// Stable identifier for a downstream client.
pub type ClientId = u64;

/// Two-level MOTD coordination state, kept per client and once for the
/// upstream session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotdState {
    /// No MOTD interest.
    #[default]
    Idle,
    /// An MOTD has been requested and not yet started.
    Want,
    /// An MOTD is streaming.
    Reading,
}

/// One attached downstream client.
///
/// The writer half of its socket sits behind a bounded queue; a refused send
/// (queue full or writer gone) sets the sticky `failed` flag and the engine
/// disposes of the session on its next sweep. The flag never clears.
#[derive(Debug)]
pub struct DownstreamSession {
    /// Stable id, assigned at accept time.
    pub id: ClientId,
    tx: mpsc::Sender<Message>,
    /// Sticky failure flag.
    pub failed: bool,
    /// Whether the listen password has been supplied (or none is required).
    pub authenticated: bool,
    /// Whether the initial NICK exchange has happened.
    pub sent_nick: bool,
    /// MOTD replay state for this client.
    pub motd_state: MotdState,
    /// Last PASS value the client sent.
    pub pass: Option<String>,
}

impl DownstreamSession {
    /// Create a session for a freshly accepted client.
    pub fn new(id: ClientId, tx: mpsc::Sender<Message>, authenticated: bool) -> Self {
        Self {
            id,
            tx,
            failed: false,
            authenticated,
            sent_nick: false,
            motd_state: MotdState::Idle,
            pass: None,
        }
    }

    /// Queue a message for this client.
    pub fn send(&mut self, msg: Message) {
        if self.failed {
            return;
        }
        if self.tx.try_send(msg).is_err() {
            self.failed = true;
        }
    }
}
