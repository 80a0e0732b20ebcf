//! Cursor over the fixed-layout fields of a modem parcel.
//!
//! Every read either consumes exactly the bytes of one field or fails with
//! [`ParcelError::MalformedFrame`] without advancing the cursor.

#![expect(clippy::big_endian_bytes, reason = "modem protocol uses big-endian")]

use super::{NULL_LENGTH, errors::ParcelError};

/// Sequential reader over an encoded parcel.
#[derive(Debug, Clone)]
pub struct ParcelReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ParcelReader<'a> {
    /// Create a reader positioned at the start of `buf`.
    #[must_use]
    pub const fn new(buf: &'a [u8]) -> Self { Self { buf, pos: 0 } }

    /// Number of unread bytes.
    #[must_use]
    pub const fn remaining(&self) -> usize { self.buf.len() - self.pos }

    /// Returns `true` once every byte has been consumed.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool { self.remaining() == 0 }

    /// Return the unread tail without consuming it.
    #[must_use]
    pub fn rest(&self) -> &'a [u8] { self.buf.get(self.pos..).unwrap_or_default() }

    fn take(&mut self, needed: usize) -> Result<&'a [u8], ParcelError> {
        let remaining = self.remaining();
        let end = self
            .pos
            .checked_add(needed)
            .ok_or(ParcelError::RecordTooLarge)?;
        let bytes = self
            .buf
            .get(self.pos..end)
            .ok_or(ParcelError::MalformedFrame { needed, remaining })?;
        self.pos = end;
        Ok(bytes)
    }

    /// Read a big-endian `int32` field.
    ///
    /// # Errors
    /// Returns [`ParcelError::MalformedFrame`] if fewer than four bytes remain.
    pub fn read_i32(&mut self) -> Result<i32, ParcelError> {
        let bytes = self.take(4)?;
        let arr: [u8; 4] = bytes.try_into().map_err(|_| ParcelError::MalformedFrame {
            needed: 4,
            remaining: bytes.len(),
        })?;
        Ok(i32::from_be_bytes(arr))
    }

    /// Read an `int32` field interpreted as a flag (non-zero is `true`).
    ///
    /// # Errors
    /// Returns [`ParcelError::MalformedFrame`] if fewer than four bytes remain.
    pub fn read_bool(&mut self) -> Result<bool, ParcelError> { Ok(self.read_i32()? != 0) }

    /// Read a length prefix, mapping the null marker to `None`.
    fn read_len(&mut self) -> Result<Option<usize>, ParcelError> {
        match self.read_i32()? {
            NULL_LENGTH => Ok(None),
            len => usize::try_from(len)
                .map(Some)
                .map_err(|_| ParcelError::InvalidLength(len)),
        }
    }

    /// Read a length-prefixed UTF-8 string. A null string yields `None`.
    ///
    /// # Errors
    /// Returns an error on a short read, a negative length, or invalid UTF-8.
    pub fn read_string(&mut self) -> Result<Option<String>, ParcelError> {
        let Some(len) = self.read_len()? else {
            return Ok(None);
        };
        let bytes = self.take(len)?;
        let text = std::str::from_utf8(bytes).map_err(|_| ParcelError::InvalidUtf8)?;
        Ok(Some(text.to_owned()))
    }

    /// Read a length-prefixed string, treating null as empty.
    ///
    /// # Errors
    /// Returns an error on a short read, a negative length, or invalid UTF-8.
    pub fn read_string_or_empty(&mut self) -> Result<String, ParcelError> {
        Ok(self.read_string()?.unwrap_or_default())
    }

    /// Read a length-prefixed byte array. A null array yields an empty vector.
    ///
    /// # Errors
    /// Returns an error on a short read or a negative length.
    pub fn read_byte_array(&mut self) -> Result<Vec<u8>, ParcelError> {
        match self.read_len()? {
            Some(len) => Ok(self.take(len)?.to_vec()),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::parcel::ParcelWriter;

    #[rstest]
    fn reads_fields_in_order() {
        let mut writer = ParcelWriter::new();
        writer.write_i32(-7);
        writer.write_bool(true);
        writer.write_string(Some("555"));
        writer.write_byte_array(&[1, 2, 3]);
        let bytes = writer.into_bytes();

        let mut reader = ParcelReader::new(&bytes);

        assert_eq!(reader.read_i32(), Ok(-7));
        assert_eq!(reader.read_bool(), Ok(true));
        assert_eq!(reader.read_string(), Ok(Some("555".to_owned())));
        assert_eq!(reader.read_byte_array(), Ok(vec![1, 2, 3]));
        assert!(reader.is_exhausted());
    }

    #[rstest]
    fn null_string_reads_as_none() {
        let mut writer = ParcelWriter::new();
        writer.write_string(None);
        let bytes = writer.into_bytes();

        let mut reader = ParcelReader::new(&bytes);

        assert_eq!(reader.read_string(), Ok(None));
    }

    #[rstest]
    #[case(&[0, 0, 0])]
    #[case(&[])]
    fn short_int_is_malformed(#[case] bytes: &[u8]) {
        let mut reader = ParcelReader::new(bytes);

        let err = reader.read_i32().expect_err("short read");

        assert!(matches!(err, ParcelError::MalformedFrame { needed: 4, .. }));
        assert_eq!(reader.remaining(), bytes.len());
    }

    #[rstest]
    fn truncated_string_body_is_malformed() {
        let bytes = [0, 0, 0, 5, b'a', b'b'];
        let mut reader = ParcelReader::new(&bytes);

        let err = reader.read_string().expect_err("truncated body");

        assert_eq!(
            err,
            ParcelError::MalformedFrame {
                needed: 5,
                remaining: 2
            }
        );
    }

    #[rstest]
    fn negative_length_is_rejected() {
        let bytes = (-2i32).to_be_bytes();
        let mut reader = ParcelReader::new(&bytes);

        assert_eq!(reader.read_byte_array(), Err(ParcelError::InvalidLength(-2)));
    }

    #[rstest]
    fn invalid_utf8_is_rejected() {
        let bytes = [0, 0, 0, 2, 0xff, 0xfe];
        let mut reader = ParcelReader::new(&bytes);

        assert_eq!(reader.read_string(), Err(ParcelError::InvalidUtf8));
    }
}
