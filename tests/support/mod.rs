//! Shared fixtures for the client integration tests
//!
//! `MockTransport` records every request it receives and answers from a
//! script; `RecordingObserver` keeps a log of the hooks that fired.

#![allow(dead_code)]

use async_trait::async_trait;
use oicp_core::{
    client::{
        AfterPushEvent, AuthorizationResponse, AuthorizeStartEvent, AuthorizeStartRequest,
        AuthorizeStartedEvent, AuthorizeStopEvent, AuthorizeStopRequest, AuthorizeStoppedEvent,
        BeforePushEvent, CdrSentEvent, CpoClientObserver, ObserverError, ObserverResult,
        PushEvseDataRequest, PushEvseStatusRequest, RequestOptions, SendCdrEvent, Transport,
        TransportError, TransportResponse, TransportResult,
    },
    domain::{
        Acknowledgement, Address, ChargeDetailRecord, Country, EvseDataRecord, EvseId,
        HttpStatusCode, OperatorId,
    },
};
use parking_lot::Mutex;

/// Scripted answer of the mock transport
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Respond(TransportResponse<T>),
    Fail(TransportError),
    /// Never answers; only a timeout or a cancellation ends the call
    Hang,
}

impl<T> Reply<T> {
    pub fn ok(content: T) -> Self {
        Self::Respond(TransportResponse::ok(content))
    }

    pub fn status(code: u16, content: Option<T>) -> Self {
        Self::Respond(TransportResponse::new(
            HttpStatusCode::try_new(code).unwrap(),
            content,
        ))
    }

    async fn resolve(self) -> TransportResult<T> {
        match self {
            Self::Respond(response) => Ok(response),
            Self::Fail(error) => Err(error),
            Self::Hang => std::future::pending().await,
        }
    }
}

pub struct MockTransport {
    acknowledgement: Mutex<Reply<Acknowledgement>>,
    rejected_operators: Mutex<Vec<OperatorId>>,
    authorization: Mutex<Reply<AuthorizationResponse>>,
    data_requests: Mutex<Vec<PushEvseDataRequest>>,
    status_requests: Mutex<Vec<PushEvseStatusRequest>>,
    start_requests: Mutex<Vec<AuthorizeStartRequest>>,
    stop_requests: Mutex<Vec<AuthorizeStopRequest>>,
    cdrs: Mutex<Vec<ChargeDetailRecord>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            acknowledgement: Mutex::new(Reply::ok(Acknowledgement::success())),
            rejected_operators: Mutex::new(Vec::new()),
            authorization: Mutex::new(Reply::Fail(TransportError::Unreachable(
                "no authorization scripted".to_string(),
            ))),
            data_requests: Mutex::new(Vec::new()),
            status_requests: Mutex::new(Vec::new()),
            start_requests: Mutex::new(Vec::new()),
            stop_requests: Mutex::new(Vec::new()),
            cdrs: Mutex::new(Vec::new()),
        }
    }

    /// Answer for pushes and CDRs
    pub fn acknowledge_with(self, reply: Reply<Acknowledgement>) -> Self {
        *self.acknowledgement.lock() = reply;
        self
    }

    /// Pushes for this operator get a negative acknowledgement
    pub fn reject_operator(self, operator_id: OperatorId) -> Self {
        self.rejected_operators.lock().push(operator_id);
        self
    }

    pub fn authorize_with(self, reply: Reply<AuthorizationResponse>) -> Self {
        *self.authorization.lock() = reply;
        self
    }

    pub fn data_requests(&self) -> Vec<PushEvseDataRequest> {
        self.data_requests.lock().clone()
    }

    pub fn status_requests(&self) -> Vec<PushEvseStatusRequest> {
        self.status_requests.lock().clone()
    }

    pub fn start_requests(&self) -> Vec<AuthorizeStartRequest> {
        self.start_requests.lock().clone()
    }

    pub fn stop_requests(&self) -> Vec<AuthorizeStopRequest> {
        self.stop_requests.lock().clone()
    }

    pub fn cdrs(&self) -> Vec<ChargeDetailRecord> {
        self.cdrs.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.data_requests.lock().len()
            + self.status_requests.lock().len()
            + self.start_requests.lock().len()
            + self.stop_requests.lock().len()
            + self.cdrs.lock().len()
    }

    fn push_reply(&self, operator_id: &OperatorId) -> Reply<Acknowledgement> {
        if self.rejected_operators.lock().contains(operator_id) {
            Reply::ok(Acknowledgement::failure(
                oicp_core::domain::StatusCodeKind::DataError,
            ))
        } else {
            self.acknowledgement.lock().clone()
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn push_evse_data(
        &self,
        request: PushEvseDataRequest,
        _options: &RequestOptions,
    ) -> TransportResult<Acknowledgement> {
        let reply = self.push_reply(&request.operator_id);
        self.data_requests.lock().push(request);
        reply.resolve().await
    }

    async fn push_evse_status(
        &self,
        request: PushEvseStatusRequest,
        _options: &RequestOptions,
    ) -> TransportResult<Acknowledgement> {
        let reply = self.push_reply(&request.operator_id);
        self.status_requests.lock().push(request);
        reply.resolve().await
    }

    async fn authorize_start(
        &self,
        request: AuthorizeStartRequest,
        _options: &RequestOptions,
    ) -> TransportResult<AuthorizationResponse> {
        let reply = self.authorization.lock().clone();
        self.start_requests.lock().push(request);
        reply.resolve().await
    }

    async fn authorize_stop(
        &self,
        request: AuthorizeStopRequest,
        _options: &RequestOptions,
    ) -> TransportResult<AuthorizationResponse> {
        let reply = self.authorization.lock().clone();
        self.stop_requests.lock().push(request);
        reply.resolve().await
    }

    async fn send_charge_detail_record(
        &self,
        request: ChargeDetailRecord,
        _options: &RequestOptions,
    ) -> TransportResult<Acknowledgement> {
        let reply = self.acknowledgement.lock().clone();
        self.cdrs.lock().push(request);
        reply.resolve().await
    }
}

/// Logs hook names plus the one detail each test cares about
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<String>>,
    fail_every_hook: bool,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records, then reports an error from every hook
    pub fn failing() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail_every_hook: true,
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    fn record(&self, event: String) -> ObserverResult {
        self.events.lock().push(event);
        if self.fail_every_hook {
            Err(ObserverError::new("observer sink unavailable"))
        } else {
            Ok(())
        }
    }
}

impl CpoClientObserver for RecordingObserver {
    fn on_before_push(&self, event: &BeforePushEvent<'_>) -> ObserverResult {
        self.record(format!("before_push {} {}", event.operator_id, event.count))
    }

    fn on_after_push(&self, event: &AfterPushEvent<'_>) -> ObserverResult {
        self.record(format!(
            "after_push {} {} {}",
            event.operator_id,
            event.acknowledgement.is_success(),
            event.acknowledgement.status_code.code
        ))
    }

    fn on_authorize_start(&self, _event: &AuthorizeStartEvent<'_>) -> ObserverResult {
        self.record("authorize_start".to_string())
    }

    fn on_authorize_started(&self, event: &AuthorizeStartedEvent<'_>) -> ObserverResult {
        self.record(format!("authorize_started {}", event.result.outcome))
    }

    fn on_authorize_stop(&self, _event: &AuthorizeStopEvent<'_>) -> ObserverResult {
        self.record("authorize_stop".to_string())
    }

    fn on_authorize_stopped(&self, event: &AuthorizeStoppedEvent<'_>) -> ObserverResult {
        self.record(format!("authorize_stopped {}", event.result.outcome))
    }

    fn on_send_cdr(&self, _event: &SendCdrEvent<'_>) -> ObserverResult {
        self.record("send_cdr".to_string())
    }

    fn on_cdr_sent(&self, event: &CdrSentEvent<'_>) -> ObserverResult {
        self.record(format!("cdr_sent {}", event.result.is_forwarded()))
    }
}

pub fn operator(text: &str) -> OperatorId {
    OperatorId::parse(text).unwrap()
}

pub fn evse(text: &str) -> EvseId {
    EvseId::parse(text).unwrap()
}

pub fn address() -> Address {
    Address::new(
        Country::from_alpha2("DE").unwrap(),
        "07743",
        "Jena",
        "Biberweg",
    )
    .with_house_number("18")
}

pub fn data_record(evse_id: &str) -> EvseDataRecord {
    EvseDataRecord::new(evse(evse_id), address())
}
