//! The upstream session: the bouncer's one identity on the network.

use muxbnc_proto::{Command, Message, Prefix, irc_eq};
use tokio::sync::mpsc;
use tracing::debug;

use super::{Channel, ChannelMap, ChannelState, ClientId, DownstreamSession, MotdState};

/// Eight random lowercase letters: the fallback identity when no nick is
/// configured, or when the server reports a collision before any client is
/// attached to choose a better one.
pub fn random_nick() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..8).map(|_| rng.gen_range(b'a'..=b'z') as char).collect()
}

/// State for the single upstream connection.
///
/// Owns the channel registry and the downstream list outright; every
/// mutation happens on the engine task.
pub struct UpstreamSession {
    tx: mpsc::Sender<Message>,
    /// Sticky failure flag; once set, the engine takes the fatal path.
    pub failed: bool,
    /// The nickname the server knows us by.
    pub nick: String,
    /// Our username, once learned from a self-originated prefix.
    pub user: Option<String>,
    /// Our host, once learned from a self-originated prefix.
    pub host: Option<String>,
    /// Captured welcome burst (001-005), replayed to registering clients.
    pub welcome: Vec<Message>,
    /// Server-side MOTD coordination state.
    pub motd_state: MotdState,
    /// Channels we are in (or joining).
    pub channels: ChannelMap,
    /// Attached downstream clients.
    pub clients: Vec<DownstreamSession>,
}

impl UpstreamSession {
    /// Create the session around the upstream writer queue.
    pub fn new(tx: mpsc::Sender<Message>, nick: String) -> Self {
        Self {
            tx,
            failed: false,
            nick,
            user: None,
            host: None,
            welcome: Vec::new(),
            motd_state: MotdState::Idle,
            channels: ChannelMap::default(),
            clients: Vec::new(),
        }
    }

    /// Queue a message to the server. A refused send sets the sticky flag;
    /// the engine treats that as fatal on its next sweep.
    pub fn send(&mut self, msg: Message) {
        if self.failed {
            return;
        }
        if self.tx.try_send(msg).is_err() {
            self.failed = true;
        }
    }

    /// Find a client by id.
    pub fn client(&self, id: ClientId) -> Option<&DownstreamSession> {
        self.clients.iter().find(|c| c.id == id)
    }

    /// Find a client by id, mutably.
    pub fn client_mut(&mut self, id: ClientId) -> Option<&mut DownstreamSession> {
        self.clients.iter_mut().find(|c| c.id == id)
    }

    /// `nick!user@host` with whatever identity parts are known so far.
    pub fn canonical_prefix(&self) -> Prefix {
        Prefix::Nickname(
            self.nick.clone(),
            self.user.clone().unwrap_or_default(),
            self.host.clone().unwrap_or_default(),
        )
    }

    /// Queue a message to one client.
    pub fn send_to_client(&mut self, id: ClientId, msg: Message) {
        if let Some(client) = self.client_mut(id) {
            client.send(msg);
        }
    }

    /// Fan a message to every attached client. Per-recipient failures only
    /// set that client's sticky flag; the iteration always completes.
    pub fn send_all_clients(&mut self, msg: &Message) {
        for client in &mut self.clients {
            client.send(msg.clone());
        }
    }

    /// Fan a message to every member of a channel. Unknown channels are a
    /// no-op.
    pub fn send_channel(&mut self, name: &str, msg: &Message) {
        self.send_channel_inner(name, None, msg);
    }

    /// Fan a message to every member of a channel except one client.
    pub fn send_channel_except(&mut self, name: &str, except: ClientId, msg: &Message) {
        self.send_channel_inner(name, Some(except), msg);
    }

    fn send_channel_inner(&mut self, name: &str, except: Option<ClientId>, msg: &Message) {
        let members: Vec<ClientId> = match self.channels.get(name) {
            Some(chan) => chan.members().to_vec(),
            None => return,
        };
        for id in members {
            if Some(id) == except {
                continue;
            }
            self.send_to_client(id, msg.clone());
        }
    }

    /// A downstream asked to join a channel.
    ///
    /// The first request for an unknown channel creates it in JOINING state
    /// and emits exactly one upstream JOIN; later requests just add the
    /// client. If we are already in the channel, the client gets its JOIN
    /// echo immediately and a TOPIC/NAMES refresh is requested on its
    /// behalf.
    pub fn client_join_channel(&mut self, id: ClientId, name: &str) {
        let mut request_upstream = false;
        let mut already_joined = false;

        match self.channels.get_mut(name) {
            Some(chan) => {
                chan.add_member(id);
                already_joined = chan.state == ChannelState::Joined;
            }
            None => {
                let mut chan = Channel::new(name);
                chan.add_member(id);
                self.channels.insert(chan);
                request_upstream = true;
            }
        }

        if request_upstream {
            debug!(channel = name, "requesting upstream join");
            self.send(Message::join(name));
        }

        if already_joined {
            let echo = Message::join(name).with_prefix(self.canonical_prefix());
            self.send_to_client(id, echo);
            self.send(Message::topic_query(name));
            self.send(Message::names(name));
        }
    }

    /// The upstream confirmed our JOIN: mark the channel JOINED and tell
    /// every member. `original` is the server's own JOIN message when we
    /// have it; otherwise one is synthesized with our canonical prefix.
    pub fn joined_channel(&mut self, name: &str, original: Option<&Message>) {
        if self.channels.get(name).is_none() {
            self.channels.insert(Channel::new(name));
        }

        let mut members = Vec::new();
        if let Some(chan) = self.channels.get_mut(name) {
            chan.state = ChannelState::Joined;
            members = chan.members().to_vec();
        }

        let echo = match original {
            Some(msg) => msg.clone(),
            None => Message::join(name).with_prefix(self.canonical_prefix()),
        };
        for id in members {
            self.send_to_client(id, echo.clone());
        }
    }

    /// A downstream asked to part a channel. Returns false when the client
    /// was not in it. The upstream PART goes out as soon as the last member
    /// leaves; the channel entry itself lives until the upstream confirms.
    pub fn client_part_channel(&mut self, id: ClientId, name: &str) -> bool {
        let mut now_empty = false;
        match self.channels.get_mut(name) {
            Some(chan) if chan.is_member(id) => {
                chan.remove_member(id);
                now_empty = chan.is_empty();
            }
            _ => return false,
        }

        if now_empty {
            self.send(Message::part(name));
        }

        let echo = Message::part(name).with_prefix(self.canonical_prefix());
        self.send_to_client(id, echo);
        true
    }

    /// Purge a disconnected client from every channel, emitting upstream
    /// PARTs for channels it was the sole member of.
    pub fn remove_client_everywhere(&mut self, id: ClientId) {
        let mut to_part = Vec::new();
        for chan in self.channels.iter_mut() {
            if chan.is_member(id) {
                chan.remove_member(id);
                if chan.is_empty() {
                    to_part.push(chan.name.clone());
                }
            }
        }
        for name in to_part {
            self.send(Message::part(name));
        }
    }

    /// Capture our user/host from a self-originated message prefix.
    pub fn learn_identity(&mut self, msg: &Message) {
        if self.user.is_some() && self.host.is_some() {
            return;
        }
        let Some(Prefix::Nickname(nick, user, host)) = &msg.prefix else {
            return;
        };
        if !irc_eq(nick, &self.nick) {
            return;
        }
        if self.user.is_none() && !user.is_empty() {
            self.user = Some(user.clone());
        }
        if self.host.is_none() && !host.is_empty() {
            self.host = Some(host.clone());
        }
    }

    /// Adopt a new canonical nick, rewriting the cached welcome burst so
    /// late joiners see the right name.
    pub fn set_nick(&mut self, new_nick: String) {
        for msg in &mut self.welcome {
            if let Command::Response(_, params) = &mut msg.command {
                if let Some(first) = params.first_mut() {
                    *first = new_nick.clone();
                }
            }
        }
        self.nick = new_nick;
    }
}
