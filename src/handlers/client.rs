//! Handlers for commands from downstream clients.

use async_trait::async_trait;
use muxbnc_proto::{ChannelExt, Command, Message, Prefix};
use tracing::info;

use super::ClientHandler;
use crate::engine::Engine;
use crate::error::{HandlerError, HandlerResult};
use crate::state::{ChannelState, ClientId, MotdState};

/// PASS: capture the password, last value wins. Validation happens on the
/// next non-PASS command.
pub struct PassHandler;

#[async_trait]
impl ClientHandler for PassHandler {
    async fn handle(&self, engine: &mut Engine, client: ClientId, msg: &Message) -> HandlerResult {
        let Command::PASS(password) = &msg.command else {
            return Err(HandlerError::NeedMoreParams);
        };
        if let Some(session) = engine.session.client_mut(client) {
            session.pass = Some(password.clone());
        }
        Ok(())
    }
}

/// NICK: the first one is answered with a rewrite to the canonical nick so
/// the client's idea of itself matches the shared identity; later ones are
/// genuine renames and go upstream untouched.
pub struct NickHandler;

#[async_trait]
impl ClientHandler for NickHandler {
    async fn handle(&self, engine: &mut Engine, client: ClientId, msg: &Message) -> HandlerResult {
        let Command::NICK(requested) = &msg.command else {
            return Err(HandlerError::NeedMoreParams);
        };

        let Some(session) = engine.session.client(client) else {
            return Ok(());
        };

        if session.sent_nick {
            engine.session.send(msg.clone());
            return Ok(());
        }

        if let Some(session) = engine.session.client_mut(client) {
            session.sent_nick = true;
        }

        // Tell the client what its nick actually is.
        let rewrite = Message::nick(engine.session.nick.clone())
            .with_prefix(Prefix::Nickname(requested.clone(), String::new(), String::new()));
        engine.session.send_to_client(client, rewrite);

        // The first client to ever attach names the shared identity.
        if engine.session.clients.len() == 1 {
            engine.session.send(Message::nick(requested.clone()));
        }

        Ok(())
    }
}

/// USER: replay the welcome burst and current channels, ask the server for
/// our modes, and register MOTD demand.
pub struct UserHandler;

#[async_trait]
impl ClientHandler for UserHandler {
    async fn handle(&self, engine: &mut Engine, client: ClientId, msg: &Message) -> HandlerResult {
        let Command::USER(..) = &msg.command else {
            return Err(HandlerError::NeedMoreParams);
        };

        info!(client, "client registered");

        let welcome = engine.session.welcome.clone();
        for cached in welcome {
            engine.session.send_to_client(client, cached);
        }

        let nick = engine.session.nick.clone();
        engine.session.send(Message::mode_query(nick));

        if let Some(session) = engine.session.client_mut(client) {
            session.motd_state = MotdState::Want;
        }

        // Catch the client up on every channel we are already in. It enters
        // their member sets so channel traffic reaches it from now on.
        let joined: Vec<String> = engine
            .session
            .channels
            .iter()
            .filter(|c| c.state == ChannelState::Joined)
            .map(|c| c.name.clone())
            .collect();
        for name in joined {
            if let Some(chan) = engine.session.channels.get_mut(&name) {
                chan.add_member(client);
            }
            let echo = Message::join(name).with_prefix(engine.session.canonical_prefix());
            engine.session.send_to_client(client, echo);
        }

        Ok(())
    }
}

/// JOIN: delegate to the channel registry. Comma-separated lists are
/// accepted; only the first target is honored.
pub struct JoinHandler;

#[async_trait]
impl ClientHandler for JoinHandler {
    async fn handle(&self, engine: &mut Engine, client: ClientId, msg: &Message) -> HandlerResult {
        let Command::JOIN(channels, _keys) = &msg.command else {
            return Err(HandlerError::NeedMoreParams);
        };
        let name = channels.split(',').next().unwrap_or(channels).to_string();
        engine.session.client_join_channel(client, &name);
        Ok(())
    }
}

/// PART: as JOIN, on the part path.
pub struct PartHandler;

#[async_trait]
impl ClientHandler for PartHandler {
    async fn handle(&self, engine: &mut Engine, client: ClientId, msg: &Message) -> HandlerResult {
        let Command::PART(channels, _reason) = &msg.command else {
            return Err(HandlerError::NeedMoreParams);
        };
        let name = channels.split(',').next().unwrap_or(channels).to_string();
        if !engine.session.client_part_channel(client, &name) {
            return Err(HandlerError::NotOnChannel(name));
        }
        Ok(())
    }
}

/// PRIVMSG: channel messages are mirrored to the other local members under
/// our canonical prefix; everything is forwarded upstream.
pub struct PrivmsgHandler;

#[async_trait]
impl ClientHandler for PrivmsgHandler {
    async fn handle(&self, engine: &mut Engine, client: ClientId, msg: &Message) -> HandlerResult {
        let Command::PRIVMSG(target, text) = &msg.command else {
            return Err(HandlerError::NeedMoreParams);
        };

        if target.is_channel_name() {
            let mirror = Message::privmsg(target.clone(), text.clone())
                .with_prefix(engine.session.canonical_prefix());
            engine.session.send_channel_except(target, client, &mirror);
        }

        engine.session.send(msg.clone());
        Ok(())
    }
}

/// QUIT: flag the session; the engine sweep does the rest.
pub struct QuitHandler;

#[async_trait]
impl ClientHandler for QuitHandler {
    async fn handle(&self, engine: &mut Engine, client: ClientId, msg: &Message) -> HandlerResult {
        let reason = match &msg.command {
            Command::QUIT(Some(text)) => text.as_str(),
            _ => "",
        };
        info!(client, reason, "client quit");
        if let Some(session) = engine.session.client_mut(client) {
            session.failed = true;
        }
        Ok(())
    }
}

/// CAP from a client: we speak plain RFC 1459; ignore it.
pub struct CapIgnoreHandler;

#[async_trait]
impl ClientHandler for CapIgnoreHandler {
    async fn handle(
        &self,
        _engine: &mut Engine,
        _client: ClientId,
        _msg: &Message,
    ) -> HandlerResult {
        Ok(())
    }
}
