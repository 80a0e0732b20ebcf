//! Packet data connection records and the requests that manage them.

use crate::parcel::{ParcelError, ParcelReader, ParcelWriter};

/// Number of string parameters carried by a setup-data-call request.
pub const SETUP_DATA_CALL_PARAMS: i32 = 7;

/// State of one packet data connection as reported by the modem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataCall {
    /// Failure cause; zero when the connection is healthy.
    pub status: i32,
    /// Modem-suggested retry delay in milliseconds, or `-1`.
    pub suggested_retry_time: i32,
    /// Connection identifier.
    pub cid: i32,
    /// Link state: 0 inactive, 1 dormant, 2 up.
    pub active: i32,
    /// PDP type, e.g. `IP` or `IPV6`.
    pub pdp_type: String,
    /// Network interface name.
    pub ifname: String,
    /// Assigned addresses.
    pub addresses: Vec<String>,
    /// DNS servers.
    pub dnses: Vec<String>,
    /// Gateways.
    pub gateways: Vec<String>,
}

/// Parameters of a setup-data-call request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupDataCall {
    /// Radio technology selector.
    pub radio_technology: String,
    /// Data profile.
    pub profile: String,
    /// Access point name.
    pub apn: String,
    /// APN user name.
    pub user: String,
    /// APN password.
    pub password: String,
    /// Authentication type.
    pub auth_type: String,
    /// IP protocol, e.g. `IP`, `IPV6`, `IPV4V6`.
    pub protocol: String,
}

impl SetupDataCall {
    fn fields(&self) -> [&str; 7] {
        [
            self.radio_technology.as_str(),
            self.profile.as_str(),
            self.apn.as_str(),
            self.user.as_str(),
            self.password.as_str(),
            self.auth_type.as_str(),
            self.protocol.as_str(),
        ]
    }

    /// Encode the request parameters: a count of 7 followed by each string.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = ParcelWriter::new();
        writer.write_i32(SETUP_DATA_CALL_PARAMS);
        for field in self.fields() {
            writer.write_string(Some(field));
        }
        writer.into_bytes()
    }

    /// Decode request parameters, as the receiving side would.
    ///
    /// # Errors
    /// Returns [`ParcelError::ParamCount`] if the block does not declare seven
    /// parameters, or a read error if the block is truncated.
    pub fn decode(body: &[u8]) -> Result<Self, ParcelError> {
        let mut reader = ParcelReader::new(body);
        let found = reader.read_i32()?;
        if found != SETUP_DATA_CALL_PARAMS {
            return Err(ParcelError::ParamCount {
                expected: SETUP_DATA_CALL_PARAMS,
                found,
            });
        }
        Ok(Self {
            radio_technology: reader.read_string_or_empty()?,
            profile: reader.read_string_or_empty()?,
            apn: reader.read_string_or_empty()?,
            user: reader.read_string_or_empty()?,
            password: reader.read_string_or_empty()?,
            auth_type: reader.read_string_or_empty()?,
            protocol: reader.read_string_or_empty()?,
        })
    }
}

/// Parameters of a deactivate-data-call request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeactivateDataCall {
    /// Connection identifier to tear down.
    pub cid: i32,
    /// Teardown reason code.
    pub reason: i32,
}

impl DeactivateDataCall {
    /// Encode the request parameters.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = ParcelWriter::new();
        writer.write_i32(self.cid);
        writer.write_i32(self.reason);
        writer.into_bytes()
    }

    /// Decode request parameters, as the receiving side would.
    ///
    /// # Errors
    /// Returns [`ParcelError::MalformedFrame`] if the block is truncated.
    pub fn decode(body: &[u8]) -> Result<Self, ParcelError> {
        let mut reader = ParcelReader::new(body);
        Ok(Self {
            cid: reader.read_i32()?,
            reason: reader.read_i32()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn setup_parameters_survive_the_wire_in_order() {
        let request = SetupDataCall {
            radio_technology: "1".to_owned(),
            profile: "0".to_owned(),
            apn: "internet".to_owned(),
            user: "guest".to_owned(),
            password: "secret".to_owned(),
            auth_type: "3".to_owned(),
            protocol: "IP".to_owned(),
        };

        let decoded = SetupDataCall::decode(&request.encode()).expect("decode");

        assert_eq!(decoded, request);
    }

    #[rstest]
    fn setup_block_declares_seven_params() {
        let bytes = SetupDataCall::default().encode();
        let mut reader = ParcelReader::new(&bytes);

        assert_eq!(reader.read_i32(), Ok(SETUP_DATA_CALL_PARAMS));
    }

    #[rstest]
    fn setup_rejects_wrong_param_count() {
        let mut writer = ParcelWriter::new();
        writer.write_i32(6);

        let err = SetupDataCall::decode(&writer.into_bytes()).expect_err("count");

        assert_eq!(
            err,
            ParcelError::ParamCount {
                expected: 7,
                found: 6
            }
        );
    }
}
