//! Vendor quirk profiles applied to decoded modem records.
//!
//! The decoder and session stay vendor-neutral; everything a particular modem
//! gets wrong is expressed through a [`QuirkProfile`]. A profile supplies a
//! notification-code remap table, a per-direction presentation policy, and
//! switches for the session-level workarounds (idle deactivation
//! short-circuit and stale setup-data-call reaping).

use std::{fmt, str::FromStr, sync::Arc};

use crate::notification::{
    MT_CODE_ADDITIONAL_CALL_FORWARDED,
    MT_CODE_FORWARDED_CALL,
    NotificationType,
    SuppServiceNotification,
};

/// Presentation ordinal meaning "allowed".
pub const PRESENTATION_ALLOWED: i32 = 0;

/// One entry of a notification-code remap table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeRemap {
    /// Direction the remap applies to.
    pub notification_type: NotificationType,
    /// Code emitted by the modem.
    pub from: i32,
    /// Code delivered to callers.
    pub to: i32,
}

/// Per-vendor correction capability.
///
/// Every method has a neutral default, so a profile only overrides what its
/// modem actually gets wrong.
pub trait QuirkProfile: Send + Sync + fmt::Debug {
    /// Short name used in configuration and logs.
    fn name(&self) -> &'static str;

    /// Notification codes to rewrite before delivery.
    fn notification_remaps(&self) -> &[CodeRemap] { &[] }

    /// Presentation ordinal to translate for a call in the given direction.
    ///
    /// Receives the raw ordinal reported by the modem.
    fn presentation_ordinal(&self, _is_mobile_terminated: bool, raw: i32) -> i32 { raw }

    /// Whether teardown requests are answered locally when no data call is up.
    fn short_circuits_idle_deactivation(&self) -> bool { false }

    /// Whether a setup-data-call request still pending at wake-lock timeout is
    /// failed with radio-not-available.
    fn reaps_stale_setup_data_call(&self) -> bool { false }

    /// Apply the remap table to `notification` in place.
    ///
    /// Returns `true` if the code was rewritten.
    fn correct_notification(&self, notification: &mut SuppServiceNotification) -> bool {
        let remap = self.notification_remaps().iter().find(|remap| {
            remap.notification_type == notification.notification_type
                && remap.from == notification.code
        });
        match remap {
            Some(remap) => {
                notification.code = remap.to;
                true
            }
            None => false,
        }
    }
}

/// Profile for modems that need no corrections.
#[derive(Debug, Default, Clone, Copy)]
pub struct StockProfile;

impl QuirkProfile for StockProfile {
    fn name(&self) -> &'static str { "stock" }
}

/// Motorola Wrigley 3G baseband.
///
/// - Sends MT code 10 (additional call forwarded) where it means code 0
///   (call forwarded), and never sends 10 legitimately.
/// - Labels outgoing numbers as restricted or unknown.
/// - Errors or stalls when asked to tear down a data call it does not have.
/// - Can leave setup-data-call requests unanswered indefinitely.
#[derive(Debug, Default, Clone, Copy)]
pub struct MotoWrigley3g;

const WRIGLEY_REMAPS: &[CodeRemap] = &[CodeRemap {
    notification_type: NotificationType::MobileTerminated,
    from: MT_CODE_ADDITIONAL_CALL_FORWARDED,
    to: MT_CODE_FORWARDED_CALL,
}];

impl QuirkProfile for MotoWrigley3g {
    fn name(&self) -> &'static str { "moto-wrigley3g" }

    fn notification_remaps(&self) -> &[CodeRemap] { WRIGLEY_REMAPS }

    fn presentation_ordinal(&self, is_mobile_terminated: bool, raw: i32) -> i32 {
        if is_mobile_terminated {
            raw
        } else {
            PRESENTATION_ALLOWED
        }
    }

    fn short_circuits_idle_deactivation(&self) -> bool { true }

    fn reaps_stale_setup_data_call(&self) -> bool { true }
}

/// Selector for the built-in profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    /// [`StockProfile`].
    Stock,
    /// [`MotoWrigley3g`].
    MotoWrigley3g,
}

impl ProfileKind {
    /// Instantiate the selected profile.
    #[must_use]
    pub fn build(self) -> Arc<dyn QuirkProfile> {
        match self {
            Self::Stock => Arc::new(StockProfile),
            Self::MotoWrigley3g => Arc::new(MotoWrigley3g),
        }
    }
}

/// Error returned when a profile name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown quirk profile '{0}'")]
pub struct UnknownProfile(pub String);

impl FromStr for ProfileKind {
    type Err = UnknownProfile;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stock" => Ok(Self::Stock),
            "moto-wrigley3g" | "wrigley3g" => Ok(Self::MotoWrigley3g),
            _ => Err(UnknownProfile(s.to_owned())),
        }
    }
}
