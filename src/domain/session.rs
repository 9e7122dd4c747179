//! Roaming session lifecycle with compile-time state guarantees
//!
//! A session is opened when an Authorize-Start is accepted and closed exactly
//! once. Only an active session can be stopped and only a closed session can
//! be turned into a charge detail record, so both states are separate types.

use crate::{
    domain::identifiers::{
        EvseId, HashValue, OperatorId, PartnerProductId, PartnerSessionId, Pin, ProviderId,
        SessionId, Uid,
    },
    error::{Error, Result},
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How the driver identified at the charge point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Identification {
    #[serde(rename = "RFIDMifareFamilyIdentification")]
    RfidMifareFamily {
        #[serde(rename = "UID")]
        uid: Uid,
    },
    #[serde(rename = "RFIDIdentification")]
    RfidWithPin {
        #[serde(rename = "UID")]
        uid: Uid,
        #[serde(rename = "PIN")]
        pin: Pin,
    },
    #[serde(rename = "QRCodeIdentification")]
    QrCode {
        #[serde(rename = "UID")]
        uid: Uid,
        #[serde(rename = "HashedPIN")]
        hashed_pin: HashValue,
    },
}

impl Identification {
    pub fn rfid(uid: Uid) -> Self {
        Self::RfidMifareFamily { uid }
    }

    pub fn uid(&self) -> &Uid {
        match self {
            Self::RfidMifareFamily { uid }
            | Self::RfidWithPin { uid, .. }
            | Self::QrCode { uid, .. } => uid,
        }
    }
}

// Marker types for session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Active;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Closed {
    ended_at: DateTime<Utc>,
}

/// Charging session shared between CPO and EMP
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoamingSession<State> {
    pub session_id: SessionId,
    pub operator_id: OperatorId,
    pub provider_id: Option<ProviderId>,
    pub evse_id: Option<EvseId>,
    pub identification: Identification,
    pub partner_product_id: Option<PartnerProductId>,
    pub cpo_partner_session_id: Option<PartnerSessionId>,
    pub emp_partner_session_id: Option<PartnerSessionId>,
    pub started_at: DateTime<Utc>,
    state: State,
}

impl RoamingSession<Active> {
    pub fn new(
        session_id: SessionId,
        operator_id: OperatorId,
        identification: Identification,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id,
            operator_id,
            provider_id: None,
            evse_id: None,
            identification,
            partner_product_id: None,
            cpo_partner_session_id: None,
            emp_partner_session_id: None,
            started_at,
            state: Active,
        }
    }

    pub fn with_provider_id(mut self, provider_id: ProviderId) -> Self {
        self.provider_id = Some(provider_id);
        self
    }

    pub fn with_evse_id(mut self, evse_id: EvseId) -> Self {
        self.evse_id = Some(evse_id);
        self
    }

    pub fn with_partner_product_id(mut self, partner_product_id: PartnerProductId) -> Self {
        self.partner_product_id = Some(partner_product_id);
        self
    }

    pub fn with_cpo_partner_session_id(mut self, id: PartnerSessionId) -> Self {
        self.cpo_partner_session_id = Some(id);
        self
    }

    pub fn with_emp_partner_session_id(mut self, id: PartnerSessionId) -> Self {
        self.emp_partner_session_id = Some(id);
        self
    }

    /// Close the session; fails if `ended_at` lies before the start
    pub fn close(self, ended_at: DateTime<Utc>) -> Result<RoamingSession<Closed>> {
        if ended_at < self.started_at {
            return Err(Error::argument_invalid("ended_at"));
        }

        Ok(RoamingSession {
            session_id: self.session_id,
            operator_id: self.operator_id,
            provider_id: self.provider_id,
            evse_id: self.evse_id,
            identification: self.identification,
            partner_product_id: self.partner_product_id,
            cpo_partner_session_id: self.cpo_partner_session_id,
            emp_partner_session_id: self.emp_partner_session_id,
            started_at: self.started_at,
            state: Closed { ended_at },
        })
    }
}

impl RoamingSession<Closed> {
    pub fn ended_at(&self) -> DateTime<Utc> {
        self.state.ended_at
    }

    pub fn duration(&self) -> Duration {
        self.state.ended_at - self.started_at
    }
}
