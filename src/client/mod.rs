//! CPO-side protocol client
//!
//! [`CpoClient`] drives the three exchanges a charge point operator has with
//! the hub: pushing EVSE data and status, authorizing charging sessions and
//! submitting charge detail records. It owns no background tasks; every call
//! is one request/response round trip through the [`Transport`].

pub mod authorization;
pub mod cdr;
pub mod clock;
pub(crate) mod messages;
pub mod observer;
pub mod push;
pub mod transport;

pub use authorization::{
    AuthStartResult, AuthStopResult, AuthorizationOutcome, AuthorizationResponse,
    AuthorizationStatus, AuthorizeStartRequest, AuthorizeStartRequestBuilder,
    AuthorizeStopRequest, AuthorizeStopRequestBuilder,
};
pub use cdr::SendCdrResult;
pub use clock::{Clock, SystemClock};
pub use observer::{
    AfterPushEvent, AuthorizeStartEvent, AuthorizeStartedEvent, AuthorizeStopEvent,
    AuthorizeStoppedEvent, BeforePushEvent, CdrSentEvent, CpoClientObserver, ObserverError,
    ObserverResult, PushKind, SendCdrEvent,
};
pub use push::{IncludeFilter, PushOptions};
pub use transport::{
    CancellationHandle, CancellationSignal, PushEvseDataRequest, PushEvseStatusRequest,
    PushRequest, RequestOptions, Transport, TransportError, TransportResponse, TransportResult,
};

use crate::{
    config::ClientSettings,
    domain::{
        ChargingPoolId, ChargingStationId, DerivationInput, DerivedIdLength, EvseDataRecord,
        IdentifierError, OperatorName,
    },
    error::{Error, Result},
};
use futures_util::FutureExt;
use observer::ObserverList;
use std::{future::Future, panic::AssertUnwindSafe, sync::Arc, time::Duration};
use tracing::warn;

/// Customises EVSE data records right before they are handed to the transport
pub type EvseDataMapper = Arc<dyn Fn(EvseDataRecord) -> EvseDataRecord + Send + Sync>;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct CpoClient {
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    observers: ObserverList,
    request_timeout: Duration,
    default_operator_name: Option<OperatorName>,
    derived_id_length: DerivedIdLength,
    evse_data_mapper: Option<EvseDataMapper>,
}

impl CpoClient {
    pub fn builder(transport: Arc<dyn Transport>) -> CpoClientBuilder {
        CpoClientBuilder::new(transport)
    }

    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::builder(transport).build()
    }

    /// Client configured from the `client` settings section
    pub fn from_settings(transport: Arc<dyn Transport>, settings: &ClientSettings) -> Result<Self> {
        let mut builder = Self::builder(transport)
            .request_timeout(settings.request_timeout())
            .derived_id_length(settings.derived_id_length());

        if let Some(name) = &settings.default_operator_name {
            let name = OperatorName::try_new(name.clone())
                .map_err(|_| Error::argument_invalid("default_operator_name"))?;
            builder = builder.default_operator_name(name);
        }

        Ok(builder.build())
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn derived_id_length(&self) -> DerivedIdLength {
        self.derived_id_length
    }

    /// Deterministic pool id using the configured hash length
    pub fn charging_pool_id(
        &self,
        input: &DerivationInput<'_>,
    ) -> std::result::Result<ChargingPoolId, IdentifierError> {
        ChargingPoolId::generate(input, self.derived_id_length, None)
    }

    /// Deterministic station id using the configured hash length
    pub fn charging_station_id(
        &self,
        input: &DerivationInput<'_>,
    ) -> std::result::Result<ChargingStationId, IdentifierError> {
        ChargingStationId::generate(input, self.derived_id_length, None)
    }

    /// Bound a transport call by timeout, cancellation and panics
    ///
    /// Whatever happens inside the transport, the caller gets a value back so
    /// that the after-events can always fire.
    pub(crate) async fn dispatch<T, F>(&self, options: &RequestOptions, call: F) -> TransportResult<T>
    where
        F: Future<Output = TransportResult<T>>,
    {
        let timeout = options.timeout.unwrap_or(self.request_timeout);
        let guarded = AssertUnwindSafe(call).catch_unwind();
        let cancelled = async {
            match &options.cancellation {
                Some(signal) => signal.cancelled().await,
                None => std::future::pending::<()>().await,
            }
        };

        let outcome = tokio::select! {
            biased;
            () = cancelled => Err(TransportError::Cancelled),
            outcome = tokio::time::timeout(timeout, guarded) => match outcome {
                Err(_elapsed) => Err(TransportError::Timeout(timeout)),
                Ok(Err(_panic)) => Err(TransportError::Unreachable(
                    messages::TRANSPORT_PANICKED.to_string(),
                )),
                Ok(Ok(response)) => response,
            },
        };

        if let Err(error) = &outcome {
            warn!(%error, "{}", messages::log::TRANSPORT_FAILED);
        }
        outcome
    }
}

pub struct CpoClientBuilder {
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    observers: ObserverList,
    request_timeout: Duration,
    default_operator_name: Option<OperatorName>,
    derived_id_length: DerivedIdLength,
    evse_data_mapper: Option<EvseDataMapper>,
}

impl CpoClientBuilder {
    fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            clock: Arc::new(SystemClock),
            observers: ObserverList::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            default_operator_name: None,
            derived_id_length: DerivedIdLength::default(),
            evse_data_mapper: None,
        }
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn observer(mut self, observer: Arc<dyn CpoClientObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn default_operator_name(mut self, name: OperatorName) -> Self {
        self.default_operator_name = Some(name);
        self
    }

    pub fn derived_id_length(mut self, length: DerivedIdLength) -> Self {
        self.derived_id_length = length;
        self
    }

    pub fn evse_data_mapper(
        mut self,
        mapper: impl Fn(EvseDataRecord) -> EvseDataRecord + Send + Sync + 'static,
    ) -> Self {
        self.evse_data_mapper = Some(Arc::new(mapper));
        self
    }

    pub fn build(self) -> CpoClient {
        CpoClient {
            transport: self.transport,
            clock: self.clock,
            observers: self.observers,
            request_timeout: self.request_timeout,
            default_operator_name: self.default_operator_name,
            derived_id_length: self.derived_id_length,
            evse_data_mapper: self.evse_data_mapper,
        }
    }
}
