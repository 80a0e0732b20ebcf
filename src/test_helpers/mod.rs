//! Shared test utilities for decoder, session, and integration tests.
//!
//! These helpers build modem-side records the way a baseband would emit them
//! and capture what the session writes back, so unit and integration suites
//! reuse the same encoding logic.

pub mod tracing;

use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    data_call::DataCall,
    parcel::{ParcelWriter, RequestFrame, ResponseFrame},
    request_kind::UnsolicitedKind,
    serial::Serial,
    transport::{ModemTransport, TransportError},
};

/// Wire-level fields of one call-list entry.
#[derive(Debug, Clone)]
pub struct CallFields {
    /// Raw CLCC state ordinal.
    pub state: i32,
    /// Call index.
    pub index: i32,
    /// Type-of-address.
    pub toa: i32,
    /// Conference flag.
    pub multiparty: bool,
    /// Incoming flag.
    pub mobile_terminated: bool,
    /// Line identifier.
    pub line_id: i32,
    /// Raw voice-capability ordinal.
    pub voice: i32,
    /// Voice privacy flag.
    pub voice_privacy: bool,
    /// Number string; `None` encodes null.
    pub number: Option<String>,
    /// Raw CLIP presentation ordinal.
    pub presentation: i32,
    /// Name string; `None` encodes null.
    pub name: Option<String>,
    /// Raw name presentation.
    pub name_presentation: i32,
    /// UUS `(type, dcs, data)` triple.
    pub uus: Option<(i32, i32, Vec<u8>)>,
}

impl CallFields {
    /// An active outgoing voice call with the given index.
    #[must_use]
    pub fn new(index: i32) -> Self {
        Self {
            state: 0,
            index,
            toa: 129,
            multiparty: false,
            mobile_terminated: false,
            line_id: 0,
            voice: 1,
            voice_privacy: false,
            number: Some("5551234".to_owned()),
            presentation: 0,
            name: None,
            name_presentation: 0,
            uus: None,
        }
    }

    fn encode(&self, writer: &mut ParcelWriter) {
        writer.write_i32(self.state);
        writer.write_i32(self.index);
        writer.write_i32(self.toa);
        writer.write_bool(self.multiparty);
        writer.write_bool(self.mobile_terminated);
        writer.write_i32(self.line_id);
        writer.write_i32(self.voice);
        writer.write_bool(self.voice_privacy);
        writer.write_string(self.number.as_deref());
        writer.write_i32(self.presentation);
        writer.write_string(self.name.as_deref());
        writer.write_i32(self.name_presentation);
        match &self.uus {
            Some((uus_type, dcs, data)) => {
                writer.write_i32(1);
                writer.write_i32(*uus_type);
                writer.write_i32(*dcs);
                writer.write_byte_array(data);
            }
            None => writer.write_i32(0),
        }
    }
}

/// Encode a call-list response body.
#[must_use]
pub fn call_list_body(calls: &[CallFields]) -> Vec<u8> {
    let mut writer = ParcelWriter::new();
    writer.write_i32(i32::try_from(calls.len()).unwrap_or(i32::MAX));
    for call in calls {
        call.encode(&mut writer);
    }
    writer.into_bytes()
}

/// Encode a data-call list body in the extended (version 6) layout.
#[must_use]
pub fn data_call_list_body(calls: &[DataCall]) -> Vec<u8> {
    let mut writer = ParcelWriter::new();
    writer.write_i32(6);
    writer.write_i32(i32::try_from(calls.len()).unwrap_or(i32::MAX));
    for call in calls {
        writer.write_i32(call.status);
        writer.write_i32(call.suggested_retry_time);
        writer.write_i32(call.cid);
        writer.write_i32(call.active);
        writer.write_string(Some(&call.pdp_type));
        writer.write_string(Some(&call.ifname));
        writer.write_string(Some(&call.addresses.join(" ")));
        writer.write_string(Some(&call.dnses.join(" ")));
        writer.write_string(Some(&call.gateways.join(" ")));
    }
    writer.into_bytes()
}

/// A connected data call with the given connection id.
#[must_use]
pub fn data_call(cid: i32) -> DataCall {
    DataCall {
        status: 0,
        suggested_retry_time: -1,
        cid,
        active: 2,
        pdp_type: "IP".to_owned(),
        ifname: format!("rmnet{cid}"),
        addresses: vec!["10.0.0.2".to_owned()],
        dnses: vec!["8.8.8.8".to_owned(), "8.8.4.4".to_owned()],
        gateways: vec!["10.0.0.1".to_owned()],
    }
}

/// Encode a supplementary service notification body.
#[must_use]
pub fn supp_service_body(notification_type: i32, code: i32) -> Vec<u8> {
    let mut writer = ParcelWriter::new();
    writer.write_i32(notification_type);
    writer.write_i32(code);
    writer.write_i32(0);
    writer.write_i32(145);
    writer.write_string(Some("15551234"));
    writer.into_bytes()
}

/// Build a solicited response record.
#[must_use]
pub fn solicited(serial: Serial, error: i32, body: Vec<u8>) -> Vec<u8> {
    ResponseFrame::Solicited {
        serial,
        error,
        body,
    }
    .to_bytes()
}

/// Build an unsolicited notification record.
#[must_use]
pub fn unsolicited(kind: UnsolicitedKind, body: Vec<u8>) -> Vec<u8> {
    ResponseFrame::Unsolicited { kind, body }.to_bytes()
}

/// Transport double that records every outbound record.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    frames: Arc<Mutex<Vec<Vec<u8>>>>,
    failure: Option<TransportError>,
}

impl RecordingTransport {
    /// Create a transport that accepts every record.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Create a transport that rejects every record with `error`.
    #[must_use]
    pub fn failing(error: TransportError) -> Self {
        Self {
            frames: Arc::default(),
            failure: Some(error),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Vec<u8>>> {
        match self.frames.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Number of records sent so far.
    #[must_use]
    pub fn sent_count(&self) -> usize { self.lock().len() }

    /// Yield to other tasks until `count` records have been sent.
    ///
    /// Returns `false` if the count is not reached within a bounded number of
    /// yields.
    pub async fn wait_for_sent(&self, count: usize) -> bool {
        for _ in 0..10_000 {
            if self.sent_count() >= count {
                return true;
            }
            tokio::task::yield_now().await;
        }
        false
    }

    /// Parse every record sent so far as a request frame.
    #[must_use]
    pub fn sent_requests(&self) -> Vec<RequestFrame> {
        self.lock()
            .iter()
            .filter_map(|record| RequestFrame::parse(record).ok())
            .collect()
    }
}

impl ModemTransport for RecordingTransport {
    fn send_record(&mut self, record: Vec<u8>) -> Result<(), TransportError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        self.lock().push(record);
        Ok(())
    }
}
