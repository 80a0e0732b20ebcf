//! Request correlation and vendor quirk correction for radio modems.
//!
//! `rilbridge` sits between a host and a modem speaking a serialized
//! request/response protocol. It tracks outstanding requests by serial,
//! decodes binary response parcels, applies per-vendor corrections through a
//! [`quirks::QuirkProfile`], tracks active data connections, and fails
//! requests that never receive an answer within the wake-lock window.
//!
//! [`session::Session`] ties these together; [`server`] runs one against a
//! live modem socket.

pub mod call;
pub mod data_call;
pub mod decoder;
pub mod lifecycle;
pub mod notification;
pub mod outcome;
pub mod parcel;
pub mod quirks;
pub mod reaper;
pub mod registry;
pub mod request_kind;
pub mod serial;
pub mod server;
pub mod session;
pub mod transport;

#[cfg(any(test, feature = "test-support"))]
pub mod test_helpers;
