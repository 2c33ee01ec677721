//! Session and channel state.
//!
//! All of this is owned by the engine task; nothing here is shared across
//! threads.

mod channel;
mod downstream;
mod upstream;

pub use channel::{Channel, ChannelMap, ChannelState};
pub use downstream::{ClientId, DownstreamSession, MotdState};
pub use upstream::{UpstreamSession, random_nick};
