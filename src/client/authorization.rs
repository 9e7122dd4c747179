//! Authorize-Start and Authorize-Stop exchanges
//!
//! Both exchanges resolve in one hop to [`AuthorizationOutcome::Authorized`],
//! [`AuthorizationOutcome::NotAuthorized`] or [`AuthorizationOutcome::Error`].
//! Requests are validated when they are built, so a request value that
//! exists is always complete enough to be sent.

use crate::{
    client::{
        messages,
        observer::{
            AuthorizeStartEvent, AuthorizeStartedEvent, AuthorizeStopEvent, AuthorizeStoppedEvent,
        },
        transport::{RequestOptions, TransportResult},
        CpoClient,
    },
    domain::{
        Active, EvseId, Identification, OperatorId, PartnerProductId, PartnerSessionId,
        ProviderId, RoamingSession, SessionId, StatusCode, StatusCodeKind,
    },
    error::{Error, Result},
};
use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthorizeStartRequest {
    #[serde(rename = "OperatorID")]
    pub operator_id: OperatorId,
    pub identification: Identification,
    #[serde(rename = "EvseID", skip_serializing_if = "Option::is_none")]
    pub evse_id: Option<EvseId>,
    #[serde(rename = "PartnerProductID", skip_serializing_if = "Option::is_none")]
    pub partner_product_id: Option<PartnerProductId>,
    /// Pre-existing session to confirm instead of opening a new one
    #[serde(rename = "SessionID", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    #[serde(rename = "CPOPartnerSessionID", skip_serializing_if = "Option::is_none")]
    pub cpo_partner_session_id: Option<PartnerSessionId>,
    #[serde(rename = "EMPPartnerSessionID", skip_serializing_if = "Option::is_none")]
    pub emp_partner_session_id: Option<PartnerSessionId>,
}

impl AuthorizeStartRequest {
    pub fn builder() -> AuthorizeStartRequestBuilder {
        AuthorizeStartRequestBuilder::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuthorizeStartRequestBuilder {
    operator_id: Option<OperatorId>,
    identification: Option<Identification>,
    evse_id: Option<EvseId>,
    partner_product_id: Option<PartnerProductId>,
    session_id: Option<SessionId>,
    cpo_partner_session_id: Option<PartnerSessionId>,
    emp_partner_session_id: Option<PartnerSessionId>,
}

impl AuthorizeStartRequestBuilder {
    pub fn operator_id(mut self, operator_id: OperatorId) -> Self {
        self.operator_id = Some(operator_id);
        self
    }

    pub fn identification(mut self, identification: Identification) -> Self {
        self.identification = Some(identification);
        self
    }

    pub fn evse_id(mut self, evse_id: EvseId) -> Self {
        self.evse_id = Some(evse_id);
        self
    }

    pub fn partner_product_id(mut self, partner_product_id: PartnerProductId) -> Self {
        self.partner_product_id = Some(partner_product_id);
        self
    }

    pub fn session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
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

    /// Fails with `ArgumentInvalid` when the operator or the identification is missing
    pub fn build(self) -> Result<AuthorizeStartRequest> {
        Ok(AuthorizeStartRequest {
            operator_id: self
                .operator_id
                .ok_or_else(|| Error::argument_invalid("operator_id"))?,
            identification: self
                .identification
                .ok_or_else(|| Error::argument_invalid("identification"))?,
            evse_id: self.evse_id,
            partner_product_id: self.partner_product_id,
            session_id: self.session_id,
            cpo_partner_session_id: self.cpo_partner_session_id,
            emp_partner_session_id: self.emp_partner_session_id,
        })
    }
}

/// Stop request for an existing session
///
/// The identification does not have to match the one that started the
/// session; fleet cards are commonly shared between drivers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthorizeStopRequest {
    #[serde(rename = "OperatorID")]
    pub operator_id: OperatorId,
    #[serde(rename = "SessionID")]
    pub session_id: SessionId,
    pub identification: Identification,
    #[serde(rename = "EvseID", skip_serializing_if = "Option::is_none")]
    pub evse_id: Option<EvseId>,
    #[serde(rename = "CPOPartnerSessionID", skip_serializing_if = "Option::is_none")]
    pub cpo_partner_session_id: Option<PartnerSessionId>,
    #[serde(rename = "EMPPartnerSessionID", skip_serializing_if = "Option::is_none")]
    pub emp_partner_session_id: Option<PartnerSessionId>,
}

impl AuthorizeStopRequest {
    pub fn builder() -> AuthorizeStopRequestBuilder {
        AuthorizeStopRequestBuilder::default()
    }

    /// Stop request for `session`, identified by `identification`
    pub fn for_session(session: &RoamingSession<Active>, identification: Identification) -> Self {
        Self {
            operator_id: session.operator_id.clone(),
            session_id: session.session_id.clone(),
            identification,
            evse_id: session.evse_id.clone(),
            cpo_partner_session_id: session.cpo_partner_session_id.clone(),
            emp_partner_session_id: session.emp_partner_session_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuthorizeStopRequestBuilder {
    operator_id: Option<OperatorId>,
    session_id: Option<SessionId>,
    identification: Option<Identification>,
    evse_id: Option<EvseId>,
    cpo_partner_session_id: Option<PartnerSessionId>,
    emp_partner_session_id: Option<PartnerSessionId>,
}

impl AuthorizeStopRequestBuilder {
    pub fn operator_id(mut self, operator_id: OperatorId) -> Self {
        self.operator_id = Some(operator_id);
        self
    }

    pub fn session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn identification(mut self, identification: Identification) -> Self {
        self.identification = Some(identification);
        self
    }

    pub fn evse_id(mut self, evse_id: EvseId) -> Self {
        self.evse_id = Some(evse_id);
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

    /// Fails with `ArgumentInvalid` when operator, session or identification is missing
    pub fn build(self) -> Result<AuthorizeStopRequest> {
        Ok(AuthorizeStopRequest {
            operator_id: self
                .operator_id
                .ok_or_else(|| Error::argument_invalid("operator_id"))?,
            session_id: self
                .session_id
                .ok_or_else(|| Error::argument_invalid("session_id"))?,
            identification: self
                .identification
                .ok_or_else(|| Error::argument_invalid("identification"))?,
            evse_id: self.evse_id,
            cpo_partner_session_id: self.cpo_partner_session_id,
            emp_partner_session_id: self.emp_partner_session_id,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorizationStatus {
    Authorized,
    NotAuthorized,
}

/// Verdict of the EMP as relayed by the hub
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthorizationResponse {
    pub authorization_status: AuthorizationStatus,
    pub status_code: StatusCode,
    #[serde(rename = "SessionID", default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    #[serde(rename = "CPOPartnerSessionID", default, skip_serializing_if = "Option::is_none")]
    pub cpo_partner_session_id: Option<PartnerSessionId>,
    #[serde(rename = "EMPPartnerSessionID", default, skip_serializing_if = "Option::is_none")]
    pub emp_partner_session_id: Option<PartnerSessionId>,
    #[serde(rename = "ProviderID", default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<ProviderId>,
}

impl AuthorizationResponse {
    pub fn authorized(session_id: SessionId, provider_id: ProviderId) -> Self {
        Self {
            authorization_status: AuthorizationStatus::Authorized,
            status_code: StatusCode::new(StatusCodeKind::Success),
            session_id: Some(session_id),
            cpo_partner_session_id: None,
            emp_partner_session_id: None,
            provider_id: Some(provider_id),
        }
    }

    pub fn not_authorized(status_code: impl Into<StatusCode>) -> Self {
        Self {
            authorization_status: AuthorizationStatus::NotAuthorized,
            status_code: status_code.into(),
            session_id: None,
            cpo_partner_session_id: None,
            emp_partner_session_id: None,
            provider_id: None,
        }
    }

    pub fn with_provider_id(mut self, provider_id: ProviderId) -> Self {
        self.provider_id = Some(provider_id);
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
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum AuthorizationOutcome {
    #[display("authorized")]
    Authorized {
        session_id: SessionId,
        provider_id: Option<ProviderId>,
        status_code: StatusCode,
        cpo_partner_session_id: Option<PartnerSessionId>,
        emp_partner_session_id: Option<PartnerSessionId>,
    },
    #[display("not authorized")]
    NotAuthorized {
        provider_id: Option<ProviderId>,
        status_code: StatusCode,
    },
    /// No verdict could be obtained from the hub
    #[display("error")]
    Error { status_code: StatusCode },
}

impl AuthorizationOutcome {
    /// Map a transport outcome; `requested_session` fills in a missing session id
    fn from_response(
        response: TransportResult<AuthorizationResponse>,
        requested_session: Option<&SessionId>,
    ) -> Self {
        let response = match response {
            Ok(response) => response,
            Err(error) => {
                return Self::Error {
                    status_code: error.status_code(),
                }
            }
        };
        let success = response.is_success();
        let missing = response.missing_content_status();

        match response.content {
            None if success => Self::Error {
                status_code: missing,
            },
            None => Self::NotAuthorized {
                provider_id: None,
                status_code: missing,
            },
            Some(content)
                if success && content.authorization_status == AuthorizationStatus::Authorized =>
            {
                match content.session_id.or_else(|| requested_session.cloned()) {
                    Some(session_id) => Self::Authorized {
                        session_id,
                        provider_id: content.provider_id,
                        status_code: content.status_code,
                        cpo_partner_session_id: content.cpo_partner_session_id,
                        emp_partner_session_id: content.emp_partner_session_id,
                    },
                    None => Self::Error {
                        status_code: StatusCode::new(StatusCodeKind::DataError)
                            .with_additional_info(messages::AUTHORIZED_WITHOUT_SESSION),
                    },
                }
            }
            Some(content) => Self::NotAuthorized {
                provider_id: content.provider_id,
                status_code: content.status_code,
            },
        }
    }

    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized { .. })
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        match self {
            Self::Authorized { session_id, .. } => Some(session_id),
            _ => None,
        }
    }

    pub fn provider_id(&self) -> Option<&ProviderId> {
        match self {
            Self::Authorized { provider_id, .. } | Self::NotAuthorized { provider_id, .. } => {
                provider_id.as_ref()
            }
            Self::Error { .. } => None,
        }
    }

    pub fn status_code(&self) -> &StatusCode {
        match self {
            Self::Authorized { status_code, .. }
            | Self::NotAuthorized { status_code, .. }
            | Self::Error { status_code } => status_code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthStartResult {
    pub outcome: AuthorizationOutcome,
    pub runtime: Duration,
}

impl AuthStartResult {
    pub fn is_authorized(&self) -> bool {
        self.outcome.is_authorized()
    }

    /// Active session for an authorized start, `None` otherwise
    ///
    /// Partner session ids returned by the hub win over those of the request.
    pub fn open_session(
        &self,
        request: &AuthorizeStartRequest,
        started_at: DateTime<Utc>,
    ) -> Option<RoamingSession<Active>> {
        let AuthorizationOutcome::Authorized {
            session_id,
            provider_id,
            cpo_partner_session_id,
            emp_partner_session_id,
            ..
        } = &self.outcome
        else {
            return None;
        };

        let mut session = RoamingSession::new(
            session_id.clone(),
            request.operator_id.clone(),
            request.identification.clone(),
            started_at,
        );
        session.provider_id = provider_id.clone();
        session.evse_id = request.evse_id.clone();
        session.partner_product_id = request.partner_product_id.clone();
        session.cpo_partner_session_id = cpo_partner_session_id
            .clone()
            .or_else(|| request.cpo_partner_session_id.clone());
        session.emp_partner_session_id = emp_partner_session_id
            .clone()
            .or_else(|| request.emp_partner_session_id.clone());
        Some(session)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthStopResult {
    pub outcome: AuthorizationOutcome,
    pub runtime: Duration,
}

impl AuthStopResult {
    pub fn is_authorized(&self) -> bool {
        self.outcome.is_authorized()
    }
}

impl CpoClient {
    /// Ask the hub whether the driver may start charging
    #[instrument(skip_all, fields(operator_id = %request.operator_id))]
    pub async fn authorize_start(
        &self,
        request: AuthorizeStartRequest,
        options: RequestOptions,
    ) -> AuthStartResult {
        let correlation_id = Uuid::now_v7();
        let started = Instant::now();

        self.observers.notify("on_authorize_start", |observer| {
            observer.on_authorize_start(&AuthorizeStartEvent {
                correlation_id,
                timestamp: self.clock.now(),
                request: &request,
            })
        });

        let response = self
            .dispatch(
                &options,
                self.transport.authorize_start(request.clone(), &options),
            )
            .await;
        let result = AuthStartResult {
            outcome: AuthorizationOutcome::from_response(response, request.session_id.as_ref()),
            runtime: started.elapsed(),
        };

        info!(
            outcome = %result.outcome,
            code = %result.outcome.status_code().code,
            elapsed = ?result.runtime,
            "{}",
            messages::log::AUTHORIZE_START_COMPLETED
        );

        self.observers.notify("on_authorize_started", |observer| {
            observer.on_authorize_started(&AuthorizeStartedEvent {
                correlation_id,
                timestamp: self.clock.now(),
                request: &request,
                result: &result,
                elapsed: result.runtime,
            })
        });

        result
    }

    /// Ask the hub whether the driver may stop the session
    #[instrument(skip_all, fields(operator_id = %request.operator_id, session_id = %request.session_id))]
    pub async fn authorize_stop(
        &self,
        request: AuthorizeStopRequest,
        options: RequestOptions,
    ) -> AuthStopResult {
        let correlation_id = Uuid::now_v7();
        let started = Instant::now();

        self.observers.notify("on_authorize_stop", |observer| {
            observer.on_authorize_stop(&AuthorizeStopEvent {
                correlation_id,
                timestamp: self.clock.now(),
                request: &request,
            })
        });

        let response = self
            .dispatch(
                &options,
                self.transport.authorize_stop(request.clone(), &options),
            )
            .await;
        let result = AuthStopResult {
            outcome: AuthorizationOutcome::from_response(response, Some(&request.session_id)),
            runtime: started.elapsed(),
        };

        info!(
            outcome = %result.outcome,
            code = %result.outcome.status_code().code,
            elapsed = ?result.runtime,
            "{}",
            messages::log::AUTHORIZE_STOP_COMPLETED
        );

        self.observers.notify("on_authorize_stopped", |observer| {
            observer.on_authorize_stopped(&AuthorizeStoppedEvent {
                correlation_id,
                timestamp: self.clock.now(),
                request: &request,
                result: &result,
                elapsed: result.runtime,
            })
        });

        result
    }
}
