//! A scripted stand-in for the real IRC server.

#![allow(dead_code)]

use std::time::Duration;

use anyhow::{Context, bail};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::time::timeout;

const IO_TIMEOUT: Duration = Duration::from_secs(5);

/// Listens on an ephemeral port for the bouncer's upstream connection.
pub struct FakeUpstream {
    listener: TcpListener,
}

impl FakeUpstream {
    /// Bind to an ephemeral local port.
    pub async fn bind() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        Ok(Self { listener })
    }

    /// The port the bouncer should connect to.
    pub fn port(&self) -> u16 {
        self.listener.local_addr().expect("local addr").port()
    }

    /// Wait for the bouncer to connect.
    pub async fn accept(&self) -> anyhow::Result<UpstreamConn> {
        let (stream, _) = timeout(IO_TIMEOUT, self.listener.accept())
            .await
            .context("bouncer did not connect upstream")??;
        let (read, write) = stream.into_split();
        Ok(UpstreamConn {
            reader: BufReader::new(read),
            writer: write,
        })
    }
}

/// The accepted upstream-side connection.
pub struct UpstreamConn {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl UpstreamConn {
    /// Read one line, CRLF stripped.
    pub async fn recv_line(&mut self) -> anyhow::Result<String> {
        let mut line = String::new();
        let n = timeout(IO_TIMEOUT, self.reader.read_line(&mut line))
            .await
            .context("timed out waiting for an upstream line")??;
        if n == 0 {
            bail!("bouncer closed the upstream connection");
        }
        Ok(line.trim_end().to_string())
    }

    /// Read lines until one contains `needle`, returning it.
    pub async fn recv_containing(&mut self, needle: &str) -> anyhow::Result<String> {
        loop {
            let line = self.recv_line().await?;
            if line.contains(needle) {
                return Ok(line);
            }
        }
    }

    /// Collect every line that arrives within `window`.
    pub async fn recv_lines_for(&mut self, window: Duration) -> Vec<String> {
        let mut lines = Vec::new();
        let deadline = tokio::time::Instant::now() + window;
        loop {
            let mut line = String::new();
            match timeout_at(deadline, self.reader.read_line(&mut line)).await {
                Some(Ok(n)) if n > 0 => lines.push(line.trim_end().to_string()),
                _ => return lines,
            }
        }
    }

    /// Send one line; CRLF is appended.
    pub async fn send_line(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer
            .write_all(format!("{line}\r\n").as_bytes())
            .await?;
        Ok(())
    }

    /// Drive the bouncer's registration: read until its USER arrives, then
    /// deliver the welcome burst for `nick`.
    pub async fn complete_registration(&mut self, nick: &str) -> anyhow::Result<()> {
        loop {
            let line = self.recv_line().await?;
            if line.starts_with("USER ") {
                break;
            }
        }
        self.send_line(&format!(":irc.test 001 {nick} :Welcome to TestNet, {nick}"))
            .await?;
        self.send_line(&format!(
            ":irc.test 002 {nick} :Your host is irc.test, running muxtest-1.0"
        ))
        .await?;
        self.send_line(&format!(":irc.test 003 {nick} :This server was created today"))
            .await?;
        self.send_line(&format!(":irc.test 004 {nick} irc.test muxtest-1.0 iwo ntk"))
            .await?;
        self.send_line(&format!(":irc.test 005 {nick} CASEMAPPING=rfc1459 :are supported"))
            .await?;
        Ok(())
    }
}

async fn timeout_at<F: std::future::Future>(
    deadline: tokio::time::Instant,
    future: F,
) -> Option<F::Output> {
    tokio::time::timeout_at(deadline, future).await.ok()
}
