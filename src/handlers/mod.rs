//! Command dispatch.
//!
//! Two registries, one per direction: commands arriving from downstream
//! clients and messages arriving from the upstream server. Both are maps
//! from command token to handler object; the engine supplies the default for
//! misses (forward upstream, respectively fan to all clients).

mod client;
mod server;

use std::collections::HashMap;

use async_trait::async_trait;
use muxbnc_proto::Message;

use crate::engine::Engine;
use crate::error::HandlerResult;
use crate::state::ClientId;

use client::{
    CapIgnoreHandler, JoinHandler, NickHandler, PartHandler, PassHandler, PrivmsgHandler,
    QuitHandler, UserHandler,
};
use server::{
    NickChangeHandler, NickInUseHandler, PingHandler, ServerCapHandler, ServerJoinHandler,
    ServerMotdHandler, ServerPartHandler, ServerTopicHandler, TopicNumericHandler,
    WelcomeHandler,
};

/// Handler for one command from a downstream client.
#[async_trait]
pub trait ClientHandler: Send + Sync {
    /// Process `msg` from `client`. Mutations go through the engine's
    /// session; errors become numeric replies in the dispatcher.
    async fn handle(&self, engine: &mut Engine, client: ClientId, msg: &Message) -> HandlerResult;
}

/// Handler for one message from the upstream server.
#[async_trait]
pub trait ServerHandler: Send + Sync {
    /// Process `msg` from the server.
    async fn handle(&self, engine: &mut Engine, msg: &Message) -> HandlerResult;
}

/// Registry of downstream command handlers.
pub struct ClientRegistry {
    handlers: HashMap<&'static str, Box<dyn ClientHandler>>,
}

impl ClientRegistry {
    /// Create a registry with all handlers registered.
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Box<dyn ClientHandler>> = HashMap::new();

        handlers.insert("PASS", Box::new(PassHandler));
        handlers.insert("NICK", Box::new(NickHandler));
        handlers.insert("USER", Box::new(UserHandler));
        handlers.insert("JOIN", Box::new(JoinHandler));
        handlers.insert("PART", Box::new(PartHandler));
        handlers.insert("PRIVMSG", Box::new(PrivmsgHandler));
        handlers.insert("QUIT", Box::new(QuitHandler));
        handlers.insert("CAP", Box::new(CapIgnoreHandler));

        Self { handlers }
    }

    /// Look up a handler by command token.
    pub fn get(&self, token: &str) -> Option<&dyn ClientHandler> {
        self.handlers.get(token).map(|h| h.as_ref())
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry of upstream message handlers.
pub struct ServerRegistry {
    handlers: HashMap<&'static str, Box<dyn ServerHandler>>,
}

impl ServerRegistry {
    /// Create a registry with all handlers registered.
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Box<dyn ServerHandler>> = HashMap::new();

        handlers.insert("PING", Box::new(PingHandler));
        handlers.insert("JOIN", Box::new(ServerJoinHandler));
        handlers.insert("PART", Box::new(ServerPartHandler));
        handlers.insert("NICK", Box::new(NickChangeHandler));
        handlers.insert("TOPIC", Box::new(ServerTopicHandler));
        // The server's CAP chatter is ours to swallow, never the clients'.
        handlers.insert("CAP", Box::new(ServerCapHandler));

        // Welcome burst: captured and fanned.
        handlers.insert("001", Box::new(WelcomeHandler));
        handlers.insert("002", Box::new(WelcomeHandler));
        handlers.insert("003", Box::new(WelcomeHandler));
        handlers.insert("004", Box::new(WelcomeHandler));
        handlers.insert("005", Box::new(WelcomeHandler));

        handlers.insert("332", Box::new(TopicNumericHandler));

        // MOTD numerics share the gated forwarding handler.
        handlers.insert("375", Box::new(ServerMotdHandler));
        handlers.insert("372", Box::new(ServerMotdHandler));
        handlers.insert("376", Box::new(ServerMotdHandler));

        handlers.insert("433", Box::new(NickInUseHandler));

        Self { handlers }
    }

    /// Look up a handler by command token.
    pub fn get(&self, token: &str) -> Option<&dyn ServerHandler> {
        self.handlers.get(token).map(|h| h.as_ref())
    }
}

impl Default for ServerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
