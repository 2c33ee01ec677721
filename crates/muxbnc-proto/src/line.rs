//! Newline-framed line codec.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{ProtocolError, Result};
use crate::READ_BUFFER_LEN;

/// Framing codec for newline-terminated lines.
///
/// Decoded lines keep their terminator. A complete line longer than the
/// limit is consumed and reported as [`ProtocolError::LineTooLong`], so the
/// caller may skip it and keep reading; a partial line that has already
/// overrun the limit is unrecoverable.
pub struct LineCodec {
    /// Index of the next byte to check for a newline.
    next_index: usize,
    /// Maximum accepted line length in bytes.
    max_len: usize,
}

impl LineCodec {
    /// Create a codec with the default line limit ([`READ_BUFFER_LEN`]).
    pub fn new() -> Self {
        Self {
            next_index: 0,
            max_len: READ_BUFFER_LEN,
        }
    }

    /// Create a codec with a custom line limit.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        if let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') {
            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if line.len() > self.max_len {
                return Err(ProtocolError::LineTooLong {
                    actual: line.len(),
                    limit: self.max_len,
                });
            }

            Ok(Some(String::from_utf8(line.to_vec())?))
        } else {
            self.next_index = src.len();

            if src.len() > self.max_len {
                return Err(ProtocolError::LineTooLong {
                    actual: src.len(),
                    limit: self.max_len,
                });
            }

            Ok(None)
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<()> {
        dst.put_slice(line.as_bytes());
        Ok(())
    }
}
