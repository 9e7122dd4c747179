//! Charge detail record submission

use crate::{
    client::{
        messages,
        observer::{CdrSentEvent, SendCdrEvent},
        push::acknowledgement_from,
        transport::RequestOptions,
        CpoClient,
    },
    domain::{Acknowledgement, ChargeDetailRecord},
};
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Terminal outcome of one submission; never retried by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendCdrResult {
    Forwarded {
        acknowledgement: Acknowledgement,
        runtime: Duration,
    },
    NotForwarded {
        acknowledgement: Acknowledgement,
        description: Option<String>,
        runtime: Duration,
    },
}

impl SendCdrResult {
    fn from_acknowledgement(acknowledgement: Acknowledgement, runtime: Duration) -> Self {
        if acknowledgement.is_success() {
            Self::Forwarded {
                acknowledgement,
                runtime,
            }
        } else {
            Self::NotForwarded {
                description: acknowledgement.description().map(str::to_string),
                acknowledgement,
                runtime,
            }
        }
    }

    pub fn is_forwarded(&self) -> bool {
        matches!(self, Self::Forwarded { .. })
    }

    pub fn acknowledgement(&self) -> &Acknowledgement {
        match self {
            Self::Forwarded {
                acknowledgement, ..
            }
            | Self::NotForwarded {
                acknowledgement, ..
            } => acknowledgement,
        }
    }

    pub fn runtime(&self) -> Duration {
        match self {
            Self::Forwarded { runtime, .. } | Self::NotForwarded { runtime, .. } => *runtime,
        }
    }
}

impl CpoClient {
    #[instrument(skip_all, fields(session_id = %record.session_id, evse_id = %record.evse_id))]
    pub async fn send_charge_detail_record(
        &self,
        record: ChargeDetailRecord,
        options: RequestOptions,
    ) -> SendCdrResult {
        let correlation_id = Uuid::now_v7();
        let started = Instant::now();

        self.observers.notify("on_send_cdr", |observer| {
            observer.on_send_cdr(&SendCdrEvent {
                correlation_id,
                timestamp: self.clock.now(),
                record: &record,
            })
        });

        let response = self
            .dispatch(
                &options,
                self.transport
                    .send_charge_detail_record(record.clone(), &options),
            )
            .await;
        let result =
            SendCdrResult::from_acknowledgement(acknowledgement_from(response), started.elapsed());

        if result.is_forwarded() {
            info!(
                consumed_energy = %record.consumed_energy,
                elapsed = ?result.runtime(),
                "{}",
                messages::log::CDR_FORWARDED
            );
        } else {
            warn!(
                code = %result.acknowledgement().status_code.code,
                additional_info = result.acknowledgement().additional_info().unwrap_or_default(),
                "{}",
                messages::log::CDR_NOT_FORWARDED
            );
        }

        self.observers.notify("on_cdr_sent", |observer| {
            observer.on_cdr_sent(&CdrSentEvent {
                correlation_id,
                timestamp: self.clock.now(),
                record: &record,
                result: &result,
                elapsed: result.runtime(),
            })
        });

        result
    }
}
