//! The engine: one task that owns all mutable state.
//!
//! Socket tasks parse and forward; everything they produce funnels through a
//! single [`Event`] channel into this actor, so every mutation of the
//! upstream session, the channel registry, and the client list is serialized.
//! Per-message fan-out completes before the next event is drained, which
//! gives the ordering guarantees clients rely on.

use std::sync::Arc;

use muxbnc_proto::Message;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{FatalError, HandlerError};
use crate::handlers::{ClientRegistry, ServerRegistry};
use crate::state::{ClientId, DownstreamSession, MotdState, UpstreamSession};

/// Everything the engine reacts to.
#[derive(Debug)]
pub enum Event {
    /// Parsed message from the upstream server.
    Upstream(Message),
    /// The upstream connection is gone, with a human-readable reason.
    UpstreamClosed(String),
    /// A downstream client connected; messages to it go through the sender.
    ClientConnected(ClientId, mpsc::Sender<Message>),
    /// Parsed message from a downstream client.
    ClientMessage(ClientId, Message),
    /// A downstream client's socket is gone.
    ClientClosed(ClientId),
}

/// The multiplexing engine.
pub struct Engine {
    /// The upstream session, owning channels and clients.
    pub session: UpstreamSession,
    /// Daemon configuration.
    pub config: Arc<Config>,
    client_handlers: Arc<ClientRegistry>,
    server_handlers: Arc<ServerRegistry>,
}

impl Engine {
    /// Create the engine around the upstream writer queue.
    pub fn new(config: Arc<Config>, upstream_tx: mpsc::Sender<Message>, nick: String) -> Engine {
        Engine {
            session: UpstreamSession::new(upstream_tx, nick),
            config,
            client_handlers: Arc::new(ClientRegistry::new()),
            server_handlers: Arc::new(ServerRegistry::new()),
        }
    }

    /// Drive the engine until a fatal condition, then broadcast an ERROR to
    /// every attached client and return the condition.
    pub async fn run(mut self, mut events: mpsc::Receiver<Event>) -> FatalError {
        let fatal = loop {
            let Some(event) = events.recv().await else {
                break FatalError::EventsClosed;
            };
            if let Some(fatal) = self.step(event).await {
                break fatal;
            }
            if self.session.failed {
                break FatalError::UpstreamWrite;
            }
        };

        error!(error = %fatal, "fatal upstream failure");
        let notice = Message::error(format!("muxbncd: {fatal}"));
        self.session.send_all_clients(&notice);
        fatal
    }

    /// One engine iteration: dispatch, then sweep failed clients, then
    /// settle MOTD demand.
    async fn step(&mut self, event: Event) -> Option<FatalError> {
        let fatal = self.dispatch(event).await;
        self.sweep();
        self.solicit_motd();
        fatal
    }

    async fn dispatch(&mut self, event: Event) -> Option<FatalError> {
        match event {
            Event::Upstream(msg) => {
                self.handle_upstream_message(msg).await;
                None
            }
            Event::UpstreamClosed(reason) => Some(FatalError::UpstreamClosed(reason)),
            Event::ClientConnected(id, tx) => {
                let authenticated = self.config.listen.password.is_none();
                self.session
                    .clients
                    .push(DownstreamSession::new(id, tx, authenticated));
                info!(client = id, "client attached");
                None
            }
            Event::ClientMessage(id, msg) => {
                self.handle_client_message(id, msg).await;
                None
            }
            Event::ClientClosed(id) => {
                if let Some(client) = self.session.client_mut(id) {
                    client.failed = true;
                }
                None
            }
        }
    }

    async fn handle_upstream_message(&mut self, msg: Message) {
        self.session.learn_identity(&msg);

        let token = msg.command.token().to_ascii_uppercase();
        debug!(command = %token, "upstream message");

        let handlers = Arc::clone(&self.server_handlers);
        match handlers.get(&token) {
            Some(handler) => {
                if let Err(err) = handler.handle(self, &msg).await {
                    debug!(command = %token, error = %err, "upstream handler error");
                }
            }
            // Anything we have no opinion about is relayed to every client.
            None => self.session.send_all_clients(&msg),
        }
    }

    async fn handle_client_message(&mut self, id: ClientId, msg: Message) {
        let token = msg.command.token().to_ascii_uppercase();
        debug!(client = id, command = %token, "client message");

        let Some(client) = self.session.client(id) else {
            return;
        };

        // Until the listen password has been supplied, PASS is the only
        // command a client may send. Validation happens here, on the first
        // command after it.
        if !client.authenticated && token != "PASS" {
            let supplied = client.pass.clone();
            if supplied.is_some() && supplied == self.config.listen.password {
                if let Some(client) = self.session.client_mut(id) {
                    client.authenticated = true;
                }
            } else {
                warn!(client = id, "rejecting client: bad or missing password");
                self.reject(id, HandlerError::PasswordMismatch, &token);
                return;
            }
        }

        let handlers = Arc::clone(&self.client_handlers);
        let result = match handlers.get(&token) {
            Some(handler) => handler.handle(self, id, &msg).await,
            None => {
                // Un-handled commands belong to the upstream conversation.
                self.session.send(msg);
                Ok(())
            }
        };

        if let Err(err) = result {
            self.reject(id, err, &token);
        }
    }

    /// Send the numeric for a handler error; an authentication failure also
    /// marks the client for disposal.
    fn reject(&mut self, id: ClientId, err: HandlerError, token: &str) {
        let disconnect = matches!(err, HandlerError::PasswordMismatch);
        let reply = err.to_irc_reply(self.session.host.as_deref(), &self.session.nick, token);
        self.session.send_to_client(id, reply);
        if disconnect {
            if let Some(client) = self.session.client_mut(id) {
                client.failed = true;
            }
        }
    }

    /// Dispose of every client whose sticky failure flag is set.
    fn sweep(&mut self) {
        loop {
            let Some(pos) = self.session.clients.iter().position(|c| c.failed) else {
                break;
            };
            let client = self.session.clients.remove(pos);
            info!(client = client.id, "client detached");
            self.session.remove_client_everywhere(client.id);
        }
    }

    /// Centralized MOTD demand: when the upstream is idle and some client
    /// wants an MOTD, exactly one request goes out.
    fn solicit_motd(&mut self) {
        if self.session.motd_state != MotdState::Idle {
            return;
        }
        let mut want = false;
        for client in &self.session.clients {
            match client.motd_state {
                MotdState::Want => want = true,
                MotdState::Reading => {
                    debug!(client = client.id, "client reading MOTD while upstream idle");
                }
                MotdState::Idle => {}
            }
        }
        if want {
            self.session.send(Message::motd());
            self.session.motd_state = MotdState::Want;
        }
    }
}
