//! Transport collaborator: the only way requests leave this crate
//!
//! Implementations own the wire format (SOAP or JSON over HTTP). The client
//! hands them protocol-level payloads and interprets the protocol-level
//! responses they return.

use crate::{
    client::{
        authorization::{AuthorizationResponse, AuthorizeStartRequest, AuthorizeStopRequest},
        messages,
    },
    domain::{
        Acknowledgement, ActionType, ChargeDetailRecord, EvseDataRecord, EvseStatusRecord,
        HttpStatusCode, OperatorId, OperatorName, StatusCode, StatusCodeKind,
    },
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

pub type TransportResult<T> = Result<TransportResponse<T>, TransportError>;

/// Delivery of OICP requests to the hub
#[async_trait]
pub trait Transport: Send + Sync {
    async fn push_evse_data(
        &self,
        request: PushEvseDataRequest,
        options: &RequestOptions,
    ) -> TransportResult<Acknowledgement>;

    async fn push_evse_status(
        &self,
        request: PushEvseStatusRequest,
        options: &RequestOptions,
    ) -> TransportResult<Acknowledgement>;

    async fn authorize_start(
        &self,
        request: AuthorizeStartRequest,
        options: &RequestOptions,
    ) -> TransportResult<AuthorizationResponse>;

    async fn authorize_stop(
        &self,
        request: AuthorizeStopRequest,
        options: &RequestOptions,
    ) -> TransportResult<AuthorizationResponse>;

    async fn send_charge_detail_record(
        &self,
        request: ChargeDetailRecord,
        options: &RequestOptions,
    ) -> TransportResult<Acknowledgement>;
}

/// Upload of records that all belong to one operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PushRequest<T> {
    #[serde(rename = "OperatorID")]
    pub operator_id: OperatorId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_name: Option<OperatorName>,
    #[serde(rename = "ActionType")]
    pub action: ActionType,
    pub records: Vec<T>,
}

pub type PushEvseDataRequest = PushRequest<EvseDataRecord>;
pub type PushEvseStatusRequest = PushRequest<EvseStatusRecord>;

/// HTTP status plus the decoded protocol payload, if the body had one
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse<T> {
    pub http_status: HttpStatusCode,
    pub content: Option<T>,
}

impl<T> TransportResponse<T> {
    pub fn new(http_status: HttpStatusCode, content: Option<T>) -> Self {
        Self {
            http_status,
            content,
        }
    }

    pub fn ok(content: T) -> Self {
        Self::new(HttpStatusCode::ok(), Some(content))
    }

    pub fn is_success(&self) -> bool {
        self.http_status.is_success()
    }

    /// Status code describing a response whose body carried no payload
    pub(crate) fn missing_content_status(&self) -> StatusCode {
        if self.is_success() {
            StatusCode::new(StatusCodeKind::DataError).with_additional_info(messages::EMPTY_RESPONSE)
        } else {
            StatusCode::new(StatusCodeKind::HubCommunicationError).with_additional_info(format!(
                "{} {}",
                messages::HTTP_STATUS_PREFIX,
                self.http_status
            ))
        }
    }
}

/// Failures below the protocol level
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Request was cancelled")]
    Cancelled,

    #[error("Hub unreachable: {0}")]
    Unreachable(String),
}

impl TransportError {
    /// Protocol status code reported to callers in place of a hub response
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Timeout(timeout) => StatusCode::new(StatusCodeKind::PartnerDidNotRespond)
                .with_additional_info(format!(
                    "{} {} ms",
                    messages::TIMED_OUT_AFTER,
                    timeout.as_millis()
                )),
            Self::Cancelled => StatusCode::new(StatusCodeKind::SystemError)
                .with_additional_info(messages::REQUEST_CANCELLED),
            Self::Unreachable(reason) => {
                StatusCode::new(StatusCodeKind::HubCommunicationError).with_additional_info(reason)
            }
        }
    }
}

/// Per-request parameters passed through to the transport
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Overrides the client's default request timeout
    pub timeout: Option<Duration>,
    pub cancellation: Option<CancellationSignal>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationSignal) -> Self {
        self.cancellation = Some(cancellation);
        self
    }
}

/// Receiving side of a cancellation pair
#[derive(Debug, Clone)]
pub struct CancellationSignal {
    receiver: watch::Receiver<bool>,
}

/// Sending side of a cancellation pair
#[derive(Debug)]
pub struct CancellationHandle {
    sender: watch::Sender<bool>,
}

impl CancellationSignal {
    pub fn pair() -> (CancellationHandle, CancellationSignal) {
        let (sender, receiver) = watch::channel(false);
        (CancellationHandle { sender }, CancellationSignal { receiver })
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once cancelled; never resolves if the handle is dropped first
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        if receiver.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

impl CancellationHandle {
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}
