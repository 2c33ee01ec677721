//! Integration test infrastructure.
//!
//! Spawns muxbncd binaries against a scripted fake upstream server, plus
//! line-level IRC test clients.

pub mod client;
pub mod server;
pub mod upstream;

#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use server::TestServer;
#[allow(unused_imports)]
pub use upstream::FakeUpstream;
