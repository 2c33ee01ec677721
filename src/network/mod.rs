//! Socket plumbing: the client gateway and the upstream connection.

mod gateway;
pub mod upstream;

pub use gateway::Gateway;
