//! Numeric identifiers for modem requests and unsolicited notifications.

/// Commands the host can issue to the modem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Enumerate current voice calls.
    GetCurrentCalls,
    /// Bring up a packet data connection.
    SetupDataCall,
    /// Tear down a packet data connection.
    DeactivateDataCall,
    /// Enumerate active packet data connections.
    DataCallList,
    /// Any other request id not explicitly covered.
    Other(i32),
}

impl From<i32> for RequestKind {
    fn from(v: i32) -> Self {
        match v {
            9 => Self::GetCurrentCalls,
            27 => Self::SetupDataCall,
            41 => Self::DeactivateDataCall,
            57 => Self::DataCallList,
            other => Self::Other(other),
        }
    }
}

impl From<RequestKind> for i32 {
    fn from(k: RequestKind) -> Self {
        match k {
            RequestKind::GetCurrentCalls => 9,
            RequestKind::SetupDataCall => 27,
            RequestKind::DeactivateDataCall => 41,
            RequestKind::DataCallList => 57,
            RequestKind::Other(v) => v,
        }
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GetCurrentCalls => f.write_str("GET_CURRENT_CALLS"),
            Self::SetupDataCall => f.write_str("SETUP_DATA_CALL"),
            Self::DeactivateDataCall => f.write_str("DEACTIVATE_DATA_CALL"),
            Self::DataCallList => f.write_str("DATA_CALL_LIST"),
            Self::Other(v) => write!(f, "REQUEST({v})"),
        }
    }
}

/// Notifications the modem raises without a matching request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnsolicitedKind {
    /// Call state changed; the host should re-query the call list.
    CallStateChanged,
    /// The set of active data connections changed.
    DataCallListChanged,
    /// Supplementary service notification (forwarding, waiting, ...).
    SuppSvcNotification,
    /// Any other notification id not explicitly covered.
    Other(i32),
}

impl From<i32> for UnsolicitedKind {
    fn from(v: i32) -> Self {
        match v {
            1001 => Self::CallStateChanged,
            1010 => Self::DataCallListChanged,
            1011 => Self::SuppSvcNotification,
            other => Self::Other(other),
        }
    }
}

impl From<UnsolicitedKind> for i32 {
    fn from(k: UnsolicitedKind) -> Self {
        match k {
            UnsolicitedKind::CallStateChanged => 1001,
            UnsolicitedKind::DataCallListChanged => 1010,
            UnsolicitedKind::SuppSvcNotification => 1011,
            UnsolicitedKind::Other(v) => v,
        }
    }
}

impl std::fmt::Display for UnsolicitedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CallStateChanged => f.write_str("UNSOL_CALL_STATE_CHANGED"),
            Self::DataCallListChanged => f.write_str("UNSOL_DATA_CALL_LIST_CHANGED"),
            Self::SuppSvcNotification => f.write_str("UNSOL_SUPP_SVC_NOTIFICATION"),
            Self::Other(v) => write!(f, "UNSOL({v})"),
        }
    }
}
