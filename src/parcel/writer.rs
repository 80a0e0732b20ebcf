//! Builder for outbound modem parcels.

#![expect(clippy::big_endian_bytes, reason = "modem protocol uses big-endian")]

use super::{NULL_LENGTH, errors::ParcelError};

/// Append-only parcel encoder mirroring [`ParcelReader`](super::ParcelReader).
#[derive(Debug, Default, Clone)]
pub struct ParcelWriter {
    buf: Vec<u8>,
}

impl ParcelWriter {
    /// Create an empty parcel.
    #[must_use]
    pub const fn new() -> Self { Self { buf: Vec::new() } }

    /// Append a big-endian `int32`.
    pub fn write_i32(&mut self, value: i32) { self.buf.extend_from_slice(&value.to_be_bytes()); }

    /// Append a flag as `int32` (`1` or `0`).
    pub fn write_bool(&mut self, value: bool) { self.write_i32(i32::from(value)); }

    fn write_len(&mut self, len: usize) -> Result<(), ParcelError> {
        let len = i32::try_from(len).map_err(|_| ParcelError::RecordTooLarge)?;
        self.write_i32(len);
        Ok(())
    }

    /// Append a length-prefixed UTF-8 string; `None` writes the null marker.
    ///
    /// Strings longer than `i32::MAX` bytes cannot be represented and are
    /// written as null.
    pub fn write_string(&mut self, value: Option<&str>) {
        let Some(text) = value else {
            self.write_i32(NULL_LENGTH);
            return;
        };
        if self.write_len(text.len()).is_ok() {
            self.buf.extend_from_slice(text.as_bytes());
        } else {
            self.write_i32(NULL_LENGTH);
        }
    }

    /// Append a length-prefixed byte array.
    ///
    /// # Errors
    /// Returns [`ParcelError::RecordTooLarge`] if `data` exceeds `i32::MAX` bytes.
    pub fn try_write_byte_array(&mut self, data: &[u8]) -> Result<(), ParcelError> {
        self.write_len(data.len())?;
        self.buf.extend_from_slice(data);
        Ok(())
    }

    /// Append a length-prefixed byte array, writing null if it is too large.
    pub fn write_byte_array(&mut self, data: &[u8]) {
        if self.try_write_byte_array(data).is_err() {
            self.write_i32(NULL_LENGTH);
        }
    }

    /// Number of bytes written so far.
    #[must_use]
    pub const fn len(&self) -> usize { self.buf.len() }

    /// Returns `true` if nothing has been written.
    #[must_use]
    pub const fn is_empty(&self) -> bool { self.buf.is_empty() }

    /// Consume the writer and return the encoded parcel.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> { self.buf }
}
