//! Gateway - TCP listener that accepts downstream clients.
//!
//! Each accepted client gets a reader task (socket lines into engine events)
//! and a writer task (engine queue onto the socket). Both report the client
//! closed when their side dies; the engine's sweep does the bookkeeping.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use muxbnc_proto::{IrcCodec, Message, ProtocolError};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

use crate::engine::Event;
use crate::state::ClientId;

/// Accepts downstream connections and wires each one to the engine.
pub struct Gateway {
    listener: TcpListener,
    events: mpsc::Sender<Event>,
}

impl Gateway {
    /// Bind the gateway to the given address.
    pub async fn bind(addr: SocketAddr, events: mpsc::Sender<Event>) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "listening for clients");
        Ok(Self { listener, events })
    }

    /// Accept connections forever.
    pub async fn run(self) {
        let mut next_id: ClientId = 1;
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let id = next_id;
                    next_id += 1;
                    debug!(client = id, %addr, "connection accepted");
                    spawn_client(id, stream, self.events.clone());
                }
                Err(e) => {
                    // Keep calm and keep accepting.
                    warn!(error = %e, "accept failed");
                }
            }
        }
    }
}

fn spawn_client(id: ClientId, stream: TcpStream, events: mpsc::Sender<Event>) {
    let framed = Framed::new(stream, IrcCodec::new());
    let (mut sink, mut source) = framed.split();
    let (tx, mut rx) = mpsc::channel::<Message>(64);

    // Writer: drain the engine's queue onto the socket. When the engine
    // drops the queue (session disposed), close our half so the client sees
    // the disconnect.
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = sink.send(msg).await {
                debug!(client = id, error = %e, "client write failed");
                break;
            }
        }
        let _ = sink.close().await;
    });

    // Reader: announce the client first so its messages always follow the
    // attach event, then feed parsed lines to the engine.
    tokio::spawn(async move {
        if events.send(Event::ClientConnected(id, tx)).await.is_err() {
            return;
        }
        while let Some(item) = source.next().await {
            match item {
                Ok(msg) => {
                    if events.send(Event::ClientMessage(id, msg)).await.is_err() {
                        return;
                    }
                }
                Err(ProtocolError::InvalidMessage { string, cause }) => {
                    // Malformed lines are dropped; the session continues.
                    warn!(client = id, line = %string, error = %cause, "dropping unparseable line");
                }
                Err(e) => {
                    debug!(client = id, error = %e, "client read failed");
                    break;
                }
            }
        }
        let _ = events.send(Event::ClientClosed(id)).await;
    });
}
