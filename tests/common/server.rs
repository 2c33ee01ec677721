//! Spawns and manages muxbncd instances for integration testing.

#![allow(dead_code)]

use std::process::{Child, Command};
use std::time::Duration;

use anyhow::bail;
use tokio::net::TcpStream;
use tokio::time::sleep;

/// A muxbncd instance under test.
pub struct TestServer {
    child: Child,
    port: u16,
    _data_dir: tempfile::TempDir,
}

impl TestServer {
    /// Spawn a bouncer listening on `listen_port` that connects upstream to
    /// `127.0.0.1:upstream_port`. The canonical nick is pinned to
    /// `muxbncabc` for deterministic assertions.
    pub async fn spawn(
        listen_port: u16,
        upstream_port: u16,
        listen_password: Option<&str>,
    ) -> anyhow::Result<Self> {
        let data_dir = tempfile::tempdir()?;
        let config_path = data_dir.path().join("config.toml");

        let mut config = format!(
            r#"
[upstream]
server = "127.0.0.1"
port = {upstream_port}
username = "muxbnc"
realname = "muxbnc test"
nick = "muxbncabc"

[listen]
port = {listen_port}
"#
        );
        if let Some(password) = listen_password {
            config.push_str(&format!("password = \"{password}\"\n"));
        }
        std::fs::write(&config_path, config)?;

        let child = Command::new(env!("CARGO_BIN_EXE_muxbncd"))
            .arg(&config_path)
            .spawn()?;

        Ok(Self {
            child,
            port: listen_port,
            _data_dir: data_dir,
        })
    }

    /// The local listen port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Poll until the listen port accepts connections.
    pub async fn wait_until_ready(&self) -> anyhow::Result<()> {
        for _ in 0..50 {
            if TcpStream::connect(("127.0.0.1", self.port)).await.is_ok() {
                // The probe connection is dropped on return; the bouncer
                // treats it as a client that attached and left.
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }
        bail!("muxbncd did not start listening on port {}", self.port)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
