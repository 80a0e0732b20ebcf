//! Decoders for modem response bodies.
//!
//! Decoding is pure: each function consumes a parcel body and returns typed
//! records or a [`ParcelError`]. Vendor corrections that must happen before an
//! ordinal is translated (presentation) are delegated to the supplied
//! [`QuirkProfile`]; corrections on finished records (notification codes) are
//! left to the caller.

use tracing::trace;

use crate::{
    call::{CallEntry, CallState, Presentation, UusInfo, number_from_toa},
    data_call::DataCall,
    notification::{NotificationType, SuppServiceNotification},
    parcel::{ParcelError, ParcelReader},
    quirks::QuirkProfile,
};

/// First data-call list version carrying status and interface fields.
pub const DATA_CALL_VERSION_EXTENDED: i32 = 5;

fn read_count(reader: &mut ParcelReader<'_>) -> Result<usize, ParcelError> {
    let raw = reader.read_i32()?;
    usize::try_from(raw).map_err(|_| ParcelError::InvalidLength(raw))
}

/// Decode a current-call list.
///
/// `observer` sees every entry once, in wire order, before the list is sorted
/// by call index.
///
/// # Errors
/// Returns an error if the body is truncated or carries an invalid ordinal.
pub fn decode_call_list<F>(
    body: &[u8],
    profile: &dyn QuirkProfile,
    mut observer: F,
) -> Result<Vec<CallEntry>, ParcelError>
where
    F: FnMut(&CallEntry),
{
    let mut reader = ParcelReader::new(body);
    let count = read_count(&mut reader)?;
    let mut calls = Vec::new();
    for _ in 0..count {
        let call = decode_call_entry(&mut reader, profile)?;
        observer(&call);
        calls.push(call);
    }
    calls.sort_by_key(|call| call.index);
    Ok(calls)
}

fn decode_call_entry(
    reader: &mut ParcelReader<'_>,
    profile: &dyn QuirkProfile,
) -> Result<CallEntry, ParcelError> {
    let state = CallState::try_from(reader.read_i32()?)?;
    let index = reader.read_i32()?;
    let toa = reader.read_i32()?;
    let is_multiparty = reader.read_bool()?;
    let is_mobile_terminated = reader.read_bool()?;
    let line_id = reader.read_i32()?;
    let is_voice = reader.read_i32()? != 0;
    let is_voice_privacy = reader.read_bool()?;
    let raw_number = reader.read_string_or_empty()?;
    let raw_presentation = reader.read_i32()?;
    let number_presentation = Presentation::try_from(
        profile.presentation_ordinal(is_mobile_terminated, raw_presentation),
    )?;
    let name = reader.read_string_or_empty()?;
    let name_presentation = reader.read_i32()?;
    let uus = decode_uus(reader)?;
    Ok(CallEntry {
        index,
        state,
        toa,
        is_multiparty,
        is_mobile_terminated,
        line_id,
        is_voice,
        is_voice_privacy,
        number: number_from_toa(&raw_number, toa),
        number_presentation,
        name,
        name_presentation,
        uus,
    })
}

fn decode_uus(reader: &mut ParcelReader<'_>) -> Result<Option<UusInfo>, ParcelError> {
    if reader.read_i32()? != 1 {
        trace!("incoming UUS not present");
        return Ok(None);
    }
    let uus = UusInfo {
        uus_type: reader.read_i32()?,
        dcs: reader.read_i32()?,
        data: reader.read_byte_array()?,
    };
    trace!(
        uus_type = uus.uus_type,
        dcs = uus.dcs,
        len = uus.data.len(),
        data = %String::from_utf8_lossy(&uus.data),
        "incoming UUS"
    );
    Ok(Some(uus))
}

/// Decode a data-call list body into its records.
///
/// # Errors
/// Returns an error if the body is truncated.
pub fn decode_data_call_list(body: &[u8]) -> Result<Vec<DataCall>, ParcelError> {
    let mut reader = ParcelReader::new(body);
    let version = reader.read_i32()?;
    let count = read_count(&mut reader)?;
    let mut calls = Vec::new();
    for _ in 0..count {
        let call = if version < DATA_CALL_VERSION_EXTENDED {
            decode_legacy_data_call(&mut reader)?
        } else {
            decode_data_call(&mut reader)?
        };
        calls.push(call);
    }
    Ok(calls)
}

/// Decode a data-call list body and return only its length.
///
/// # Errors
/// Returns an error if the body is truncated.
pub fn decode_data_call_count(body: &[u8]) -> Result<usize, ParcelError> {
    decode_data_call_list(body).map(|calls| calls.len())
}

fn split_list(reader: &mut ParcelReader<'_>) -> Result<Vec<String>, ParcelError> {
    Ok(reader
        .read_string_or_empty()?
        .split_whitespace()
        .map(str::to_owned)
        .collect())
}

fn decode_data_call(reader: &mut ParcelReader<'_>) -> Result<DataCall, ParcelError> {
    Ok(DataCall {
        status: reader.read_i32()?,
        suggested_retry_time: reader.read_i32()?,
        cid: reader.read_i32()?,
        active: reader.read_i32()?,
        pdp_type: reader.read_string_or_empty()?,
        ifname: reader.read_string_or_empty()?,
        addresses: split_list(reader)?,
        dnses: split_list(reader)?,
        gateways: split_list(reader)?,
    })
}

fn decode_legacy_data_call(reader: &mut ParcelReader<'_>) -> Result<DataCall, ParcelError> {
    let cid = reader.read_i32()?;
    let active = reader.read_i32()?;
    let pdp_type = reader.read_string_or_empty()?;
    // APN is carried but not reported.
    reader.read_string()?;
    let addresses = split_list(reader)?;
    Ok(DataCall {
        suggested_retry_time: -1,
        cid,
        active,
        pdp_type,
        addresses,
        ..DataCall::default()
    })
}

/// Decode a supplementary service notification. No correction is applied.
///
/// # Errors
/// Returns an error if the body is truncated or the type ordinal is invalid.
pub fn decode_supp_service_notification(
    body: &[u8],
) -> Result<SuppServiceNotification, ParcelError> {
    let mut reader = ParcelReader::new(body);
    Ok(SuppServiceNotification {
        notification_type: NotificationType::try_from(reader.read_i32()?)?,
        code: reader.read_i32()?,
        index: reader.read_i32()?,
        toa: reader.read_i32()?,
        number: reader.read_string()?,
    })
}
