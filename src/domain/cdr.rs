//! Charge detail records: settlement data of one completed session

use crate::{
    domain::{
        identifiers::{
            EvseId, OperatorId, PartnerProductId, PartnerSessionId, ProviderId, SessionId,
        },
        session::{Closed, Identification, RoamingSession},
        types::ConsumedEnergy,
    },
    error::{Error, Result},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChargeDetailRecord {
    #[serde(rename = "SessionID")]
    pub session_id: SessionId,
    #[serde(rename = "CPOPartnerSessionID", skip_serializing_if = "Option::is_none")]
    pub cpo_partner_session_id: Option<PartnerSessionId>,
    #[serde(rename = "EMPPartnerSessionID", skip_serializing_if = "Option::is_none")]
    pub emp_partner_session_id: Option<PartnerSessionId>,
    #[serde(rename = "PartnerProductID", skip_serializing_if = "Option::is_none")]
    pub partner_product_id: Option<PartnerProductId>,
    #[serde(rename = "EvseID")]
    pub evse_id: EvseId,
    pub identification: Identification,
    pub session_start: DateTime<Utc>,
    pub session_end: DateTime<Utc>,
    pub consumed_energy: ConsumedEnergy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meter_value_start: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meter_value_end: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meter_values_in_between: Vec<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metering_signature: Option<String>,
    #[serde(rename = "HubOperatorID", skip_serializing_if = "Option::is_none")]
    pub hub_operator_id: Option<OperatorId>,
    #[serde(rename = "HubProviderID", skip_serializing_if = "Option::is_none")]
    pub hub_provider_id: Option<ProviderId>,
}

impl ChargeDetailRecord {
    /// Settlement record of a closed session
    ///
    /// Meter start and end values are taken from the first and last entries of
    /// `meter_values`; the signature is carried verbatim.
    pub fn from_session(
        session: &RoamingSession<Closed>,
        consumed_energy: ConsumedEnergy,
        meter_values: Vec<Decimal>,
        metering_signature: Option<String>,
    ) -> Result<Self> {
        let evse_id = session
            .evse_id
            .clone()
            .ok_or_else(|| Error::argument_invalid("evse_id"))?;

        Ok(Self {
            session_id: session.session_id.clone(),
            cpo_partner_session_id: session.cpo_partner_session_id.clone(),
            emp_partner_session_id: session.emp_partner_session_id.clone(),
            partner_product_id: session.partner_product_id.clone(),
            evse_id,
            identification: session.identification.clone(),
            session_start: session.started_at,
            session_end: session.ended_at(),
            consumed_energy,
            meter_value_start: meter_values.first().copied(),
            meter_value_end: meter_values.last().copied(),
            meter_values_in_between: meter_values,
            metering_signature,
            hub_operator_id: Some(session.operator_id.clone()),
            hub_provider_id: session.provider_id.clone(),
        })
    }

    pub fn builder() -> ChargeDetailRecordBuilder {
        ChargeDetailRecordBuilder::default()
    }
}

/// Builder for records that were not produced from a tracked session
#[derive(Debug, Clone, Default)]
pub struct ChargeDetailRecordBuilder {
    session_id: Option<SessionId>,
    evse_id: Option<EvseId>,
    identification: Option<Identification>,
    session_start: Option<DateTime<Utc>>,
    session_end: Option<DateTime<Utc>>,
    consumed_energy: Option<ConsumedEnergy>,
    meter_values: Vec<Decimal>,
    metering_signature: Option<String>,
    partner_product_id: Option<PartnerProductId>,
    cpo_partner_session_id: Option<PartnerSessionId>,
    emp_partner_session_id: Option<PartnerSessionId>,
    hub_operator_id: Option<OperatorId>,
    hub_provider_id: Option<ProviderId>,
}

impl ChargeDetailRecordBuilder {
    pub fn session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn evse_id(mut self, evse_id: EvseId) -> Self {
        self.evse_id = Some(evse_id);
        self
    }

    pub fn identification(mut self, identification: Identification) -> Self {
        self.identification = Some(identification);
        self
    }

    pub fn session_start(mut self, session_start: DateTime<Utc>) -> Self {
        self.session_start = Some(session_start);
        self
    }

    pub fn session_end(mut self, session_end: DateTime<Utc>) -> Self {
        self.session_end = Some(session_end);
        self
    }

    pub fn consumed_energy(mut self, consumed_energy: ConsumedEnergy) -> Self {
        self.consumed_energy = Some(consumed_energy);
        self
    }

    pub fn meter_values(mut self, meter_values: impl IntoIterator<Item = Decimal>) -> Self {
        self.meter_values = meter_values.into_iter().collect();
        self
    }

    pub fn metering_signature(mut self, metering_signature: impl Into<String>) -> Self {
        self.metering_signature = Some(metering_signature.into());
        self
    }

    pub fn partner_product_id(mut self, partner_product_id: PartnerProductId) -> Self {
        self.partner_product_id = Some(partner_product_id);
        self
    }

    pub fn cpo_partner_session_id(mut self, id: PartnerSessionId) -> Self {
        self.cpo_partner_session_id = Some(id);
        self
    }

    pub fn emp_partner_session_id(mut self, id: PartnerSessionId) -> Self {
        self.emp_partner_session_id = Some(id);
        self
    }

    pub fn hub_operator_id(mut self, operator_id: OperatorId) -> Self {
        self.hub_operator_id = Some(operator_id);
        self
    }

    pub fn hub_provider_id(mut self, provider_id: ProviderId) -> Self {
        self.hub_provider_id = Some(provider_id);
        self
    }

    pub fn build(self) -> Result<ChargeDetailRecord> {
        let session_id = self
            .session_id
            .ok_or_else(|| Error::argument_invalid("session_id"))?;
        let evse_id = self
            .evse_id
            .ok_or_else(|| Error::argument_invalid("evse_id"))?;
        let identification = self
            .identification
            .ok_or_else(|| Error::argument_invalid("identification"))?;
        let session_start = self
            .session_start
            .ok_or_else(|| Error::argument_invalid("session_start"))?;
        let session_end = self
            .session_end
            .ok_or_else(|| Error::argument_invalid("session_end"))?;
        let consumed_energy = self
            .consumed_energy
            .ok_or_else(|| Error::argument_invalid("consumed_energy"))?;

        if session_end < session_start {
            return Err(Error::argument_invalid("session_end"));
        }

        Ok(ChargeDetailRecord {
            session_id,
            cpo_partner_session_id: self.cpo_partner_session_id,
            emp_partner_session_id: self.emp_partner_session_id,
            partner_product_id: self.partner_product_id,
            evse_id,
            identification,
            session_start,
            session_end,
            consumed_energy,
            meter_value_start: self.meter_values.first().copied(),
            meter_value_end: self.meter_values.last().copied(),
            meter_values_in_between: self.meter_values,
            metering_signature: self.metering_signature,
            hub_operator_id: self.hub_operator_id,
            hub_provider_id: self.hub_provider_id,
        })
    }
}
