//! Supplementary service notifications.
//!
//! Decoded notifications pass through the active
//! [`QuirkProfile`](crate::quirks::QuirkProfile) before delivery, so vendor
//! code tables are corrected in place.

use crate::parcel::ParcelError;

/// Mobile-terminated code: the incoming call was forwarded.
pub const MT_CODE_FORWARDED_CALL: i32 = 0;
/// Mobile-terminated code: an additional incoming call was forwarded.
pub const MT_CODE_ADDITIONAL_CALL_FORWARDED: i32 = 10;

/// Direction a notification refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationType {
    /// Refers to an outgoing call (`+CSSI`).
    MobileOriginated,
    /// Refers to an incoming call (`+CSSU`).
    MobileTerminated,
}

impl TryFrom<i32> for NotificationType {
    type Error = ParcelError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::MobileOriginated),
            1 => Ok(Self::MobileTerminated),
            _ => Err(ParcelError::InvalidOrdinal {
                field: "notification type",
                value,
            }),
        }
    }
}

impl From<NotificationType> for i32 {
    fn from(t: NotificationType) -> Self {
        match t {
            NotificationType::MobileOriginated => 0,
            NotificationType::MobileTerminated => 1,
        }
    }
}

/// A supplementary service notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuppServiceNotification {
    /// Direction of the call the notification concerns.
    pub notification_type: NotificationType,
    /// Vendor-defined code ordinal, interpreted per `notification_type`.
    pub code: i32,
    /// Closed user group index.
    pub index: i32,
    /// Type-of-address of `number`.
    pub toa: i32,
    /// Related number, if any.
    pub number: Option<String>,
}
