//! Observability hooks of the CPO client
//!
//! Observers see every exchange twice: before dispatch and after the result
//! is resolved, whether the transport succeeded, failed, timed out or was
//! cancelled. A failing or panicking observer is logged and skipped; it never
//! changes the result returned to the caller.

use crate::{
    client::{
        authorization::{AuthStartResult, AuthStopResult, AuthorizeStartRequest, AuthorizeStopRequest},
        cdr::SendCdrResult,
        messages,
    },
    domain::{Acknowledgement, ActionType, ChargeDetailRecord, OperatorId},
};
use chrono::{DateTime, Utc};
use derive_more::Display;
use std::{
    panic::{catch_unwind, AssertUnwindSafe},
    sync::Arc,
    time::Duration,
};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ObserverError(String);

impl ObserverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type ObserverResult = Result<(), ObserverError>;

/// Which record family a push carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum PushKind {
    #[display("EVSE data")]
    EvseData,
    #[display("EVSE status")]
    EvseStatus,
}

#[derive(Debug, Clone)]
pub struct BeforePushEvent<'a> {
    pub correlation_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub kind: PushKind,
    pub operator_id: &'a OperatorId,
    pub action: ActionType,
    pub count: usize,
}

#[derive(Debug, Clone)]
pub struct AfterPushEvent<'a> {
    pub correlation_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub kind: PushKind,
    pub operator_id: &'a OperatorId,
    pub action: ActionType,
    pub count: usize,
    pub acknowledgement: &'a Acknowledgement,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct AuthorizeStartEvent<'a> {
    pub correlation_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub request: &'a AuthorizeStartRequest,
}

#[derive(Debug, Clone)]
pub struct AuthorizeStartedEvent<'a> {
    pub correlation_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub request: &'a AuthorizeStartRequest,
    pub result: &'a AuthStartResult,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct AuthorizeStopEvent<'a> {
    pub correlation_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub request: &'a AuthorizeStopRequest,
}

#[derive(Debug, Clone)]
pub struct AuthorizeStoppedEvent<'a> {
    pub correlation_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub request: &'a AuthorizeStopRequest,
    pub result: &'a AuthStopResult,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct SendCdrEvent<'a> {
    pub correlation_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub record: &'a ChargeDetailRecord,
}

#[derive(Debug, Clone)]
pub struct CdrSentEvent<'a> {
    pub correlation_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub record: &'a ChargeDetailRecord,
    pub result: &'a SendCdrResult,
    pub elapsed: Duration,
}

/// Hooks fired by [`CpoClient`](crate::client::CpoClient); every hook defaults to a no-op
pub trait CpoClientObserver: Send + Sync {
    fn on_before_push(&self, _event: &BeforePushEvent<'_>) -> ObserverResult {
        Ok(())
    }

    fn on_after_push(&self, _event: &AfterPushEvent<'_>) -> ObserverResult {
        Ok(())
    }

    fn on_authorize_start(&self, _event: &AuthorizeStartEvent<'_>) -> ObserverResult {
        Ok(())
    }

    fn on_authorize_started(&self, _event: &AuthorizeStartedEvent<'_>) -> ObserverResult {
        Ok(())
    }

    fn on_authorize_stop(&self, _event: &AuthorizeStopEvent<'_>) -> ObserverResult {
        Ok(())
    }

    fn on_authorize_stopped(&self, _event: &AuthorizeStoppedEvent<'_>) -> ObserverResult {
        Ok(())
    }

    fn on_send_cdr(&self, _event: &SendCdrEvent<'_>) -> ObserverResult {
        Ok(())
    }

    fn on_cdr_sent(&self, _event: &CdrSentEvent<'_>) -> ObserverResult {
        Ok(())
    }
}

/// Registered observers, notified in registration order
#[derive(Clone, Default)]
pub(crate) struct ObserverList {
    observers: Vec<Arc<dyn CpoClientObserver>>,
}

impl ObserverList {
    pub(crate) fn push(&mut self, observer: Arc<dyn CpoClientObserver>) {
        self.observers.push(observer);
    }

    /// Run `hook` against every observer, isolating errors and panics
    pub(crate) fn notify<F>(&self, hook: &'static str, call: F)
    where
        F: Fn(&dyn CpoClientObserver) -> ObserverResult,
    {
        for observer in &self.observers {
            match catch_unwind(AssertUnwindSafe(|| call(observer.as_ref()))) {
                Ok(Ok(())) => {}
                Ok(Err(error)) => warn!(hook, %error, "{}", messages::log::OBSERVER_FAILED),
                Err(_) => warn!(hook, "{}", messages::log::OBSERVER_PANICKED),
            }
        }
    }
}
