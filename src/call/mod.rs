//! Voice call records reported by the modem's current-call enumeration.
//!
//! A [`CallEntry`] is produced fresh for every call-list response and is never
//! mutated once it reaches the caller.

use crate::parcel::ParcelError;

/// Type-of-address value for international numbers sent without a prefix.
pub const TOA_INTERNATIONAL: i32 = 145;

/// Call state as enumerated by the modem (CLCC ordering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallState {
    /// Connected and in progress.
    Active,
    /// On hold.
    Held,
    /// Outgoing, not yet ringing at the far end.
    Dialing,
    /// Outgoing, ringing at the far end.
    Alerting,
    /// Incoming and ringing.
    Incoming,
    /// Incoming while another call is active.
    Waiting,
}

impl TryFrom<i32> for CallState {
    type Error = ParcelError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Active),
            1 => Ok(Self::Held),
            2 => Ok(Self::Dialing),
            3 => Ok(Self::Alerting),
            4 => Ok(Self::Incoming),
            5 => Ok(Self::Waiting),
            _ => Err(ParcelError::InvalidOrdinal {
                field: "call state",
                value,
            }),
        }
    }
}

/// Caller-ID disclosure policy for a number (CLIP ordering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Presentation {
    /// Number may be shown.
    Allowed,
    /// Number withheld by the remote party.
    Restricted,
    /// Number not available.
    Unknown,
    /// Call from a payphone.
    Payphone,
}

impl TryFrom<i32> for Presentation {
    type Error = ParcelError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Allowed),
            1 => Ok(Self::Restricted),
            2 => Ok(Self::Unknown),
            3 => Ok(Self::Payphone),
            _ => Err(ParcelError::InvalidOrdinal {
                field: "number presentation",
                value,
            }),
        }
    }
}

/// User-to-user signalling payload attached to a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UusInfo {
    /// UUS type.
    pub uus_type: i32,
    /// Data coding scheme of `data`.
    pub dcs: i32,
    /// Raw payload bytes.
    pub data: Vec<u8>,
}

/// One entry of a current-call list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallEntry {
    /// Connection index (1-based on the modem side).
    pub index: i32,
    /// Call state.
    pub state: CallState,
    /// Type-of-address of `number`.
    pub toa: i32,
    /// Whether the call is part of a conference.
    pub is_multiparty: bool,
    /// Whether the call is mobile terminated (incoming).
    pub is_mobile_terminated: bool,
    /// Alternate line service identifier.
    pub line_id: i32,
    /// Whether this is a voice call.
    pub is_voice: bool,
    /// Whether voice privacy is active for the call.
    pub is_voice_privacy: bool,
    /// Remote party number, normalised for international TOA.
    pub number: String,
    /// Presentation policy for `number`.
    pub number_presentation: Presentation,
    /// Remote party name.
    pub name: String,
    /// Presentation policy for `name`, as reported.
    pub name_presentation: i32,
    /// Optional user-to-user signalling payload.
    pub uus: Option<UusInfo>,
}

/// Prepend `+` to numbers whose type-of-address marks them international.
///
/// # Examples
///
/// ```
/// use rilbridge::call::{TOA_INTERNATIONAL, number_from_toa};
///
/// assert_eq!(number_from_toa("15551234", TOA_INTERNATIONAL), "+15551234");
/// assert_eq!(number_from_toa("+15551234", TOA_INTERNATIONAL), "+15551234");
/// assert_eq!(number_from_toa("5551234", 129), "5551234");
/// ```
#[must_use]
pub fn number_from_toa(number: &str, toa: i32) -> String {
    if toa == TOA_INTERNATIONAL && !number.is_empty() && !number.starts_with('+') {
        format!("+{number}")
    } else {
        number.to_owned()
    }
}
