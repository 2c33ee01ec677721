//! Line-level IRC test clients.

#![allow(dead_code)]

use std::time::Duration;

use anyhow::{Context, bail};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;

const IO_TIMEOUT: Duration = Duration::from_secs(5);

/// A downstream client attached to the bouncer.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    /// Connect to the bouncer's listen port.
    pub async fn connect(port: u16) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(("127.0.0.1", port)).await?;
        let (read, write) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read),
            writer: write,
        })
    }

    /// Send one line; CRLF is appended.
    pub async fn send_line(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer
            .write_all(format!("{line}\r\n").as_bytes())
            .await?;
        Ok(())
    }

    /// Read one line, CRLF stripped. Errors on timeout or disconnect.
    pub async fn recv_line(&mut self) -> anyhow::Result<String> {
        let mut line = String::new();
        let n = timeout(IO_TIMEOUT, self.reader.read_line(&mut line))
            .await
            .context("timed out waiting for a line from the bouncer")??;
        if n == 0 {
            bail!("bouncer closed the connection");
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

    /// Expect the connection to be closed by the bouncer.
    pub async fn expect_disconnect(&mut self) -> anyhow::Result<()> {
        loop {
            let mut line = String::new();
            let n = timeout(IO_TIMEOUT, self.reader.read_line(&mut line))
                .await
                .context("timed out waiting for the bouncer to disconnect us")??;
            if n == 0 {
                return Ok(());
            }
        }
    }

    /// Assert nothing arrives within `window`.
    pub async fn expect_silence(&mut self, window: Duration) -> anyhow::Result<()> {
        let mut line = String::new();
        match timeout(window, self.reader.read_line(&mut line)).await {
            Err(_) => Ok(()),
            Ok(Ok(0)) => bail!("bouncer closed the connection during silence window"),
            Ok(Ok(_)) => bail!("expected silence, got {:?}", line.trim_end()),
            Ok(Err(e)) => Err(e.into()),
        }
    }

    /// Register with NICK + USER.
    pub async fn register(&mut self, nick: &str) -> anyhow::Result<()> {
        self.send_line(&format!("NICK {nick}")).await?;
        self.send_line(&format!("USER {nick} 0 * :{nick}")).await?;
        Ok(())
    }
}
