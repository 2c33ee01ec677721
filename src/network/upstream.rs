//! The upstream connection: connect, register, and pump messages.

use futures_util::{SinkExt, StreamExt};
use muxbnc_proto::{IrcCodec, Message, ProtocolError};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use tracing::{info, warn};

use crate::config::Config;
use crate::engine::Event;

/// Connect to the configured server and send the registration burst:
/// optional `PASS`, then `NICK`, then `USER <username> localhost <server>
/// :<realname>`.
pub async fn connect(config: &Config, nick: &str) -> std::io::Result<Framed<TcpStream, IrcCodec>> {
    let stream =
        TcpStream::connect((config.upstream.server.as_str(), config.upstream.port)).await?;
    info!(
        server = %config.upstream.server,
        port = config.upstream.port,
        "connected to upstream"
    );

    let mut framed = Framed::new(stream, IrcCodec::new());

    if let Some(password) = &config.upstream.password {
        framed
            .send(Message::pass(password.clone()))
            .await
            .map_err(into_io)?;
    }
    framed
        .send(Message::nick(nick.to_string()))
        .await
        .map_err(into_io)?;
    framed
        .send(Message::user(
            config.upstream.username.clone(),
            "localhost",
            config.upstream.server.clone(),
            config.upstream.realname.clone(),
        ))
        .await
        .map_err(into_io)?;

    Ok(framed)
}

fn into_io(err: ProtocolError) -> std::io::Error {
    match err {
        ProtocolError::Io(e) => e,
        other => std::io::Error::other(other.to_string()),
    }
}

/// Spawn the upstream reader and writer tasks. Returns the writer queue the
/// engine sends through. Loss of either direction surfaces as
/// [`Event::UpstreamClosed`], the engine's fatal path.
pub fn spawn(
    framed: Framed<TcpStream, IrcCodec>,
    events: mpsc::Sender<Event>,
) -> mpsc::Sender<Message> {
    let (mut sink, mut source) = framed.split();
    let (tx, mut rx) = mpsc::channel::<Message>(512);

    let writer_events = events.clone();
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = sink.send(msg).await {
                let _ = writer_events
                    .send(Event::UpstreamClosed(format!("write failed: {e}")))
                    .await;
                return;
            }
        }
        let _ = sink.close().await;
    });

    tokio::spawn(async move {
        loop {
            match source.next().await {
                Some(Ok(msg)) => {
                    if events.send(Event::Upstream(msg)).await.is_err() {
                        return;
                    }
                }
                Some(Err(ProtocolError::InvalidMessage { string, cause })) => {
                    // Malformed lines never end the session.
                    warn!(line = %string, error = %cause, "dropping unparseable upstream line");
                }
                Some(Err(e)) => {
                    let _ = events
                        .send(Event::UpstreamClosed(format!("read failed: {e}")))
                        .await;
                    return;
                }
                None => {
                    let _ = events
                        .send(Event::UpstreamClosed(
                            "connection closed by server".to_string(),
                        ))
                        .await;
                    return;
                }
            }
        }
    });

    tx
}
