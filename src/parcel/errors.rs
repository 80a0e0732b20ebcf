//! Error types for modem parcel decoding and record framing.

use thiserror::Error;

/// Errors that can occur when reading or writing modem parcels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParcelError {
    /// The parcel ended before every mandatory field was consumed.
    #[error("malformed frame: needed {needed} bytes but only {remaining} remain")]
    MalformedFrame {
        /// Bytes required by the field being read.
        needed: usize,
        /// Bytes left in the parcel.
        remaining: usize,
    },
    /// A length prefix was negative (other than the null marker).
    #[error("invalid length prefix {0}")]
    InvalidLength(i32),
    /// A string field did not contain valid UTF-8.
    #[error("string field is not valid UTF-8")]
    InvalidUtf8,
    /// An ordinal field carried a value outside its enumeration.
    #[error("invalid {field} ordinal {value}")]
    InvalidOrdinal {
        /// Name of the offending field.
        field: &'static str,
        /// Raw value read from the wire.
        value: i32,
    },
    /// A parameter block declared an unexpected number of entries.
    #[error("expected {expected} parameters, found {found}")]
    ParamCount {
        /// Number of parameters the request format requires.
        expected: i32,
        /// Number declared on the wire.
        found: i32,
    },
    /// The record envelope carried an unknown response type.
    #[error("unknown response type {0}")]
    UnknownResponseType(i32),
    /// A record or field exceeds the size the wire format can carry.
    #[error("record too large")]
    RecordTooLarge,
}
