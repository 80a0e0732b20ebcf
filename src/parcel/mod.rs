//! Binary parcel primitives for the modem protocol.
//!
//! A parcel is a flat sequence of fixed-width `int32` fields, length-prefixed
//! strings, and length-prefixed byte arrays. Records wrapping a parcel are
//! exchanged over a length-delimited stream handled by [`RecordCodec`].

pub mod codec;
pub mod errors;
pub mod frame;
pub mod reader;
pub mod writer;

pub use codec::RecordCodec;
pub use errors::ParcelError;
pub use frame::{RequestFrame, ResponseFrame};
pub use reader::ParcelReader;
pub use writer::ParcelWriter;

/// Length prefix value marking a null string or array.
pub const NULL_LENGTH: i32 = -1;
/// Size of the big-endian length prefix in front of each stream record.
pub const RECORD_PREFIX_LEN: usize = 4;
/// Largest record accepted from or written to the modem stream.
pub const MAX_RECORD_LEN: usize = 8 * 1024; // 8 KiB
