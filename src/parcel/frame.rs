//! Record envelopes exchanged with the modem.
//!
//! Inbound records are either solicited responses (correlated by serial) or
//! unsolicited notifications. Outbound records carry a request kind and the
//! serial the response will echo back.

use super::{ParcelReader, ParcelWriter, errors::ParcelError};
use crate::{
    request_kind::{RequestKind, UnsolicitedKind},
    serial::Serial,
};

/// Envelope tag for solicited responses.
pub const RESPONSE_SOLICITED: i32 = 0;
/// Envelope tag for unsolicited notifications.
pub const RESPONSE_UNSOLICITED: i32 = 1;

/// Inbound record parsed from the modem stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseFrame {
    /// Reply to an earlier request.
    Solicited {
        /// Serial of the request being answered.
        serial: Serial,
        /// Modem error code; zero means success.
        error: i32,
        /// Encoded response body.
        body: Vec<u8>,
    },
    /// Notification raised by the modem on its own.
    Unsolicited {
        /// Notification kind.
        kind: UnsolicitedKind,
        /// Encoded notification body.
        body: Vec<u8>,
    },
}

impl ResponseFrame {
    /// Parse an inbound record.
    ///
    /// # Errors
    /// Returns an error if the envelope is truncated or carries an unknown
    /// response type.
    pub fn parse(record: &[u8]) -> Result<Self, ParcelError> {
        let mut reader = ParcelReader::new(record);
        match reader.read_i32()? {
            RESPONSE_SOLICITED => {
                let serial = Serial::new(reader.read_i32()?);
                let error = reader.read_i32()?;
                Ok(Self::Solicited {
                    serial,
                    error,
                    body: reader.rest().to_vec(),
                })
            }
            RESPONSE_UNSOLICITED => {
                let kind = UnsolicitedKind::from(reader.read_i32()?);
                Ok(Self::Unsolicited {
                    kind,
                    body: reader.rest().to_vec(),
                })
            }
            other => Err(ParcelError::UnknownResponseType(other)),
        }
    }

    /// Serial of a solicited record, read without parsing the rest.
    ///
    /// Lets a caller attribute a record that [`parse`](Self::parse) rejects
    /// to the request it answers. Returns `None` for unsolicited records or
    /// when the serial itself is missing.
    #[must_use]
    pub fn solicited_serial(record: &[u8]) -> Option<Serial> {
        let mut reader = ParcelReader::new(record);
        match reader.read_i32() {
            Ok(RESPONSE_SOLICITED) => reader.read_i32().ok().map(Serial::new),
            _ => None,
        }
    }

    /// Serialise the record, as the modem would emit it.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ParcelWriter::new();
        let body = match self {
            Self::Solicited {
                serial,
                error,
                body,
            } => {
                writer.write_i32(RESPONSE_SOLICITED);
                writer.write_i32(serial.as_i32());
                writer.write_i32(*error);
                body
            }
            Self::Unsolicited { kind, body } => {
                writer.write_i32(RESPONSE_UNSOLICITED);
                writer.write_i32((*kind).into());
                body
            }
        };
        let mut bytes = writer.into_bytes();
        bytes.extend_from_slice(body);
        bytes
    }
}

/// Outbound request record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFrame {
    /// Command being issued.
    pub kind: RequestKind,
    /// Serial the response will carry.
    pub serial: Serial,
    /// Encoded request parameters.
    pub body: Vec<u8>,
}

impl RequestFrame {
    /// Serialise the request into a transport record.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ParcelWriter::new();
        writer.write_i32(self.kind.into());
        writer.write_i32(self.serial.as_i32());
        let mut bytes = writer.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }

    /// Parse an outbound record, as the modem side would.
    ///
    /// # Errors
    /// Returns [`ParcelError::MalformedFrame`] if the header is truncated.
    pub fn parse(record: &[u8]) -> Result<Self, ParcelError> {
        let mut reader = ParcelReader::new(record);
        let kind = RequestKind::from(reader.read_i32()?);
        let serial = Serial::new(reader.read_i32()?);
        Ok(Self {
            kind,
            serial,
            body: reader.rest().to_vec(),
        })
    }
}
