//! Message-level codec for tokio.
//!
//! Wraps [`LineCodec`] and converts between wire lines and [`Message`].

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{ProtocolError, Result};
use crate::line::LineCodec;
use crate::message::Message;

/// Tokio codec for IRC messages.
pub struct IrcCodec {
    inner: LineCodec,
}

impl IrcCodec {
    /// Create a codec with the default line limit.
    pub fn new() -> Self {
        Self {
            inner: LineCodec::new(),
        }
    }
}

impl Default for IrcCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for IrcCodec {
    type Item = Message;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>> {
        // Runs of bare CR/LF between messages are legal and skipped here so
        // the dispatch layer only ever sees real messages.
        while let Some(line) = self.inner.decode(src)? {
            if line.trim_end_matches(['\r', '\n']).trim().is_empty() {
                continue;
            }
            return line.parse::<Message>().map(Some);
        }
        Ok(None)
    }
}

impl Encoder<Message> for IrcCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> Result<()> {
        self.inner.encode(msg.to_line(), dst)
    }
}
