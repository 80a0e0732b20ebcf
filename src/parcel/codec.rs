//! Tokio codec for the modem record stream.
//!
//! Records travel over the socket with a 4-byte big-endian length prefix:
//!
//! | Field  | Offset | Size | Description                    |
//! |--------|--------|------|--------------------------------|
//! | length | 0      | 4    | Record size in bytes (≤ 8 KiB) |
//! | record | 4      | var  | Envelope and parcel body       |

#![expect(clippy::big_endian_bytes, reason = "modem protocol uses big-endian")]

use std::io;

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use super::{MAX_RECORD_LEN, RECORD_PREFIX_LEN};

/// Length-prefixed record codec.
#[derive(Debug, Clone, Copy)]
pub struct RecordCodec {
    max_record: usize,
}

impl Default for RecordCodec {
    fn default() -> Self { Self::new() }
}

impl RecordCodec {
    /// Create a codec with the default record limit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_record: MAX_RECORD_LEN,
        }
    }

    /// Override the maximum accepted record size.
    #[must_use]
    pub const fn with_max_record(mut self, max_record: usize) -> Self {
        self.max_record = max_record;
        self
    }

    fn too_large(len: usize) -> io::Error {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("record of {len} bytes exceeds limit"),
        )
    }
}

impl Decoder for RecordCodec {
    type Error = io::Error;
    type Item = Vec<u8>;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(prefix) = src.get(..RECORD_PREFIX_LEN) else {
            return Ok(None);
        };
        let prefix: [u8; RECORD_PREFIX_LEN] = prefix
            .try_into()
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "short length prefix"))?;
        let raw = u32::from_be_bytes(prefix);
        let len = usize::try_from(raw).map_err(|_| Self::too_large(usize::MAX))?;
        if len > self.max_record {
            return Err(Self::too_large(len));
        }
        let frame_len = RECORD_PREFIX_LEN + len;
        if src.len() < frame_len {
            src.reserve(frame_len - src.len());
            return Ok(None);
        }
        src.advance(RECORD_PREFIX_LEN);
        Ok(Some(src.split_to(len).to_vec()))
    }
}

impl Encoder<Vec<u8>> for RecordCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Vec<u8>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if item.len() > self.max_record {
            return Err(Self::too_large(item.len()));
        }
        let len = u32::try_from(item.len()).map_err(|_| Self::too_large(item.len()))?;
        dst.reserve(RECORD_PREFIX_LEN + item.len());
        dst.put_u32(len);
        dst.extend_from_slice(&item);
        Ok(())
    }
}
