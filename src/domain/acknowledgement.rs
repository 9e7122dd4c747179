//! Protocol acknowledgements and the OICP status code table

use crate::domain::identifiers::{PartnerSessionId, SessionId};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

macro_rules! status_codes {
    ($($variant:ident = $code:literal, $description:literal;)+) => {
        /// Three-digit OICP result codes
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum StatusCodeKind {
            $($variant,)+
        }

        impl StatusCodeKind {
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            pub fn code(self) -> &'static str {
                match self {
                    $(Self::$variant => $code,)+
                }
            }

            pub fn description(self) -> &'static str {
                match self {
                    $(Self::$variant => $description,)+
                }
            }

            pub fn from_code(code: &str) -> Option<Self> {
                match code {
                    $($code => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

status_codes! {
    Success = "000", "Success";
    HubCommunicationError = "001", "Hub communication error";
    HubInternalError = "002", "Hub error";
    DataError = "009", "Data error";
    UnauthorizedAccess = "017", "Unauthorized access";
    InconsistentEvseId = "018", "Inconsistent EvseID";
    InconsistentEvcoId = "019", "Inconsistent EvcoID";
    SystemError = "021", "System error";
    DataErrorHub = "022", "Data error";
    QrCodeAuthenticationFailed = "101", "QR code authentication failed - invalid credentials";
    RfidAuthenticationFailedInvalidUid = "102", "RFID authentication failed - invalid UID";
    RfidAuthenticationFailedCardNotReadable = "103", "RFID authentication failed - card not readable";
    PlcAuthenticationFailedInvalidEvcoId = "105", "PLC authentication failed - invalid EvcoID";
    NoPositiveAuthenticationResponse = "106", "No positive authentication response";
    QrCodeAppAuthenticationTimeout = "110", "QR code app authentication failed - time out error";
    PlcAuthenticationFailedInvalidUnderlyingEvcoId = "120", "PLC authentication failed - invalid underlying EvcoID";
    PlcAuthenticationFailedInvalidCertificate = "121", "PLC authentication failed - invalid certificate";
    PlcAuthenticationTimeout = "122", "PLC authentication failed - time out error";
    EvcoIdLocked = "200", "EvcoID locked";
    NoValidContract = "210", "No valid contract";
    PartnerNotFound = "300", "Partner not found";
    PartnerDidNotRespond = "310", "Partner did not respond";
    ServiceNotAvailable = "320", "Service not available";
    SessionIsInvalid = "400", "Session is invalid";
    CommunicationToEvseFailed = "501", "Communication to EVSE failed";
    NoEvConnectedToEvse = "510", "No EV connected to EVSE";
    EvseAlreadyReserved = "601", "EVSE already reserved";
    EvseAlreadyInUse = "602", "EVSE already in use or wrong token";
    UnknownEvseId = "603", "Unknown EVSE ID";
    EvseIdNotHubjectCompatible = "604", "EVSE ID is not Hubject compatible";
    EvseOutOfService = "700", "EVSE out of service";
}

impl StatusCodeKind {
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl fmt::Display for StatusCodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for StatusCodeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for StatusCodeKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Self::from_code(&code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown status code '{code}'")))
    }
}

/// Status code substructure of every OICP response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatusCode {
    pub code: StatusCodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
}

impl StatusCode {
    /// Status code carrying the table description of `code`
    pub fn new(code: StatusCodeKind) -> Self {
        Self {
            code,
            description: Some(code.description().to_string()),
            additional_info: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_additional_info(mut self, additional_info: impl Into<String>) -> Self {
        self.additional_info = Some(additional_info.into());
        self
    }
}

impl From<StatusCodeKind> for StatusCode {
    fn from(code: StatusCodeKind) -> Self {
        Self::new(code)
    }
}

/// Outcome of a push or CDR exchange
///
/// Carries no retry state; retrying is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    #[serde(rename = "Result")]
    pub result: bool,
    #[serde(rename = "StatusCode")]
    pub status_code: StatusCode,
    #[serde(rename = "SessionID", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    #[serde(
        rename = "CPOPartnerSessionID",
        skip_serializing_if = "Option::is_none"
    )]
    pub cpo_partner_session_id: Option<PartnerSessionId>,
    #[serde(
        rename = "EMPPartnerSessionID",
        skip_serializing_if = "Option::is_none"
    )]
    pub emp_partner_session_id: Option<PartnerSessionId>,
}

impl Acknowledgement {
    pub const NO_OP_INFO: &'static str = "Nothing to push";

    pub fn success() -> Self {
        Self::with_result(true, StatusCode::new(StatusCodeKind::Success))
    }

    pub fn failure(status_code: impl Into<StatusCode>) -> Self {
        Self::with_result(false, status_code.into())
    }

    /// Successful acknowledgement for a request that was never sent
    pub fn no_op() -> Self {
        Self::with_result(
            true,
            StatusCode::new(StatusCodeKind::Success).with_additional_info(Self::NO_OP_INFO),
        )
    }

    fn with_result(result: bool, status_code: StatusCode) -> Self {
        Self {
            result,
            status_code,
            session_id: None,
            cpo_partner_session_id: None,
            emp_partner_session_id: None,
        }
    }

    pub fn with_session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn with_partner_session_ids(
        mut self,
        cpo_partner_session_id: Option<PartnerSessionId>,
        emp_partner_session_id: Option<PartnerSessionId>,
    ) -> Self {
        self.cpo_partner_session_id = cpo_partner_session_id;
        self.emp_partner_session_id = emp_partner_session_id;
        self
    }

    pub fn is_success(&self) -> bool {
        self.result
    }

    pub fn description(&self) -> Option<&str> {
        self.status_code.description.as_deref()
    }

    pub fn additional_info(&self) -> Option<&str> {
        self.status_code.additional_info.as_deref()
    }
}
