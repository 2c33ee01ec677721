//! Handlers for messages from the upstream server.

use async_trait::async_trait;
use muxbnc_proto::{Command, Message, Response, irc_eq};
use tracing::info;

use super::ServerHandler;
use crate::engine::Engine;
use crate::error::HandlerResult;
use crate::state::{MotdState, random_nick};

/// PING: answer with a PONG carrying identical parameters. Clients never
/// see the exchange.
pub struct PingHandler;

#[async_trait]
impl ServerHandler for PingHandler {
    async fn handle(&self, engine: &mut Engine, msg: &Message) -> HandlerResult {
        let Command::PING(server, token) = &msg.command else {
            return Ok(());
        };
        engine
            .session
            .send(Message::pong(server.clone(), token.clone()));
        Ok(())
    }
}

/// JOIN: our own confirms a pending join; anyone else's goes to the members
/// of that channel.
pub struct ServerJoinHandler;

#[async_trait]
impl ServerHandler for ServerJoinHandler {
    async fn handle(&self, engine: &mut Engine, msg: &Message) -> HandlerResult {
        let Command::JOIN(channel, _) = &msg.command else {
            return Ok(());
        };
        let name = channel.clone();

        match msg.source_nickname() {
            Some(nick) if irc_eq(nick, &engine.session.nick) => {
                info!(channel = %name, "joined channel");
                engine.session.joined_channel(&name, Some(msg));
            }
            _ => engine.session.send_channel(&name, msg),
        }
        Ok(())
    }
}

/// PART: our own deletes the channel entry; anyone else's goes to the
/// members.
pub struct ServerPartHandler;

#[async_trait]
impl ServerHandler for ServerPartHandler {
    async fn handle(&self, engine: &mut Engine, msg: &Message) -> HandlerResult {
        let Command::PART(channel, _) = &msg.command else {
            return Ok(());
        };

        match msg.source_nickname() {
            Some(nick) if irc_eq(nick, &engine.session.nick) => {
                info!(channel = %channel, "parted channel");
                engine.session.channels.remove(channel);
            }
            _ => engine.session.send_channel(channel, msg),
        }
        Ok(())
    }
}

/// NICK: everyone hears about renames; our own also updates the canonical
/// nick and the cached welcome burst.
pub struct NickChangeHandler;

#[async_trait]
impl ServerHandler for NickChangeHandler {
    async fn handle(&self, engine: &mut Engine, msg: &Message) -> HandlerResult {
        let Command::NICK(new_nick) = &msg.command else {
            return Ok(());
        };

        engine.session.send_all_clients(msg);

        if msg
            .source_nickname()
            .is_some_and(|nick| irc_eq(nick, &engine.session.nick))
        {
            info!(nick = %new_nick, "canonical nick changed");
            engine.session.set_nick(new_nick.clone());
        }
        Ok(())
    }
}

/// TOPIC: record the topic and tell the channel's members.
pub struct ServerTopicHandler;

#[async_trait]
impl ServerHandler for ServerTopicHandler {
    async fn handle(&self, engine: &mut Engine, msg: &Message) -> HandlerResult {
        let Command::TOPIC(channel, topic) = &msg.command else {
            return Ok(());
        };
        let name = channel.clone();

        if let Some(chan) = engine.session.channels.get_mut(&name) {
            chan.topic = topic.clone();
        }
        engine.session.send_channel(&name, msg);
        Ok(())
    }
}

/// RPL_TOPIC (332): like TOPIC, but with our nick as an extra leading
/// parameter to skip over.
pub struct TopicNumericHandler;

#[async_trait]
impl ServerHandler for TopicNumericHandler {
    async fn handle(&self, engine: &mut Engine, msg: &Message) -> HandlerResult {
        let Command::Response(Response::RPL_TOPIC, params) = &msg.command else {
            return Ok(());
        };
        let [_nick, channel, topic] = params.as_slice() else {
            return Ok(());
        };
        let name = channel.clone();

        if let Some(chan) = engine.session.channels.get_mut(&name) {
            chan.topic = Some(topic.clone());
        }
        engine.session.send_channel(&name, msg);
        Ok(())
    }
}

/// 001-005: append to the welcome burst for later replay and fan to every
/// attached client.
pub struct WelcomeHandler;

#[async_trait]
impl ServerHandler for WelcomeHandler {
    async fn handle(&self, engine: &mut Engine, msg: &Message) -> HandlerResult {
        engine.session.welcome.push(msg.clone());
        engine.session.send_all_clients(msg);
        Ok(())
    }
}

/// MOTD numerics (375/372/376): gated forwarding.
///
/// A line is delivered to a client iff the server had no MOTD outstanding
/// (unsolicited), or both sides are in WANT, or the client is already
/// READING. Delivery advances WANT to READING, and the end-of-MOTD line
/// settles READING back to IDLE; the server's own state advances the same
/// way after the clients.
pub struct ServerMotdHandler;

#[async_trait]
impl ServerHandler for ServerMotdHandler {
    async fn handle(&self, engine: &mut Engine, msg: &Message) -> HandlerResult {
        let is_end = matches!(
            msg.command,
            Command::Response(Response::RPL_ENDOFMOTD, _)
        );
        let server_state = engine.session.motd_state;

        for client in &mut engine.session.clients {
            let deliver = server_state == MotdState::Idle
                || (server_state == MotdState::Want && client.motd_state == MotdState::Want)
                || client.motd_state == MotdState::Reading;
            if !deliver {
                continue;
            }
            client.send(msg.clone());
            if client.motd_state == MotdState::Want {
                client.motd_state = MotdState::Reading;
            }
            if is_end && client.motd_state == MotdState::Reading {
                client.motd_state = MotdState::Idle;
            }
        }

        let state = &mut engine.session.motd_state;
        if *state == MotdState::Want {
            *state = MotdState::Reading;
        }
        if is_end && *state == MotdState::Reading {
            *state = MotdState::Idle;
        }
        Ok(())
    }
}

/// ERR_NICKNAMEINUSE (433): with clients attached the user gets to pick;
/// alone, we retry with a fresh random nick.
pub struct NickInUseHandler;

#[async_trait]
impl ServerHandler for NickInUseHandler {
    async fn handle(&self, engine: &mut Engine, msg: &Message) -> HandlerResult {
        if engine.session.clients.is_empty() {
            let nick = random_nick();
            info!(nick = %nick, "nickname in use, retrying with a generated one");
            engine.session.send(Message::nick(nick.clone()));
            engine.session.set_nick(nick);
        } else {
            engine.session.send_all_clients(msg);
        }
        Ok(())
    }
}

/// CAP from the server: negotiation chatter no client asked for; drop it.
pub struct ServerCapHandler;

#[async_trait]
impl ServerHandler for ServerCapHandler {
    async fn handle(&self, _engine: &mut Engine, _msg: &Message) -> HandlerResult {
        Ok(())
    }
}
