//! Push orchestration for EVSE data and EVSE status
//!
//! Every public overload flattens its input to EVSE-level records and runs
//! the same algorithm: filter, short-circuit when nothing is left, group by
//! operator, then send one request per operator group. Groups are sent
//! concurrently; no ordering between them is guaranteed.

use crate::{
    client::{
        messages,
        observer::{AfterPushEvent, BeforePushEvent, PushKind},
        transport::{PushRequest, RequestOptions, Transport, TransportResult},
        CpoClient,
    },
    domain::{
        Acknowledgement, ActionType, ChargingPool, ChargingStation, ChargingStationOperator,
        EvseDataRecord, EvseStatusDiff, EvseStatusRecord, OperatorId, OperatorName,
        RoamingNetwork,
    },
};
use futures_util::future::{join_all, BoxFuture};
use std::{collections::BTreeMap, fmt, sync::Arc, time::Duration, time::Instant};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Caller supplied predicate selecting which records are pushed
pub type IncludeFilter<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Parameters of one push call
pub struct PushOptions<T> {
    pub action: ActionType,
    /// Scopes the whole batch to this operator instead of grouping per EVSE
    pub operator_id: Option<OperatorId>,
    pub operator_name: Option<OperatorName>,
    pub include: Option<IncludeFilter<T>>,
    pub request: RequestOptions,
}

impl<T> PushOptions<T> {
    pub fn new(action: ActionType) -> Self {
        Self {
            action,
            operator_id: None,
            operator_name: None,
            include: None,
            request: RequestOptions::default(),
        }
    }

    pub fn full_load() -> Self {
        Self::new(ActionType::FullLoad)
    }

    pub fn insert() -> Self {
        Self::new(ActionType::Insert)
    }

    pub fn update() -> Self {
        Self::new(ActionType::Update)
    }

    pub fn delete() -> Self {
        Self::new(ActionType::Delete)
    }

    pub fn with_action(mut self, action: ActionType) -> Self {
        self.action = action;
        self
    }

    pub fn with_operator_id(mut self, operator_id: OperatorId) -> Self {
        self.operator_id = Some(operator_id);
        self
    }

    pub fn with_operator_name(mut self, operator_name: OperatorName) -> Self {
        self.operator_name = Some(operator_name);
        self
    }

    pub fn with_include(mut self, include: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.include = Some(Arc::new(include));
        self
    }

    pub fn with_request_options(mut self, request: RequestOptions) -> Self {
        self.request = request;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request.timeout = Some(timeout);
        self
    }

    fn or_operator_name(mut self, operator: &ChargingStationOperator) -> Self {
        if self.operator_name.is_none() {
            self.operator_name = operator.name.clone();
        }
        self
    }

    fn includes(&self, record: &T) -> bool {
        match &self.include {
            Some(include) => include(record),
            None => true,
        }
    }
}

/// Full load, all records, operators taken from the EVSE ids
impl<T> Default for PushOptions<T> {
    fn default() -> Self {
        Self::full_load()
    }
}

impl<T> Clone for PushOptions<T> {
    fn clone(&self) -> Self {
        Self {
            action: self.action,
            operator_id: self.operator_id.clone(),
            operator_name: self.operator_name.clone(),
            include: self.include.clone(),
            request: self.request.clone(),
        }
    }
}

impl<T> fmt::Debug for PushOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushOptions")
            .field("action", &self.action)
            .field("operator_id", &self.operator_id)
            .field("operator_name", &self.operator_name)
            .field("include", &self.include.as_ref().map(|_| "<filter>"))
            .field("request", &self.request)
            .finish()
    }
}

/// Record families the push algorithm is generic over
trait PushRecord: Sized + Send + Sync + 'static {
    const KIND: PushKind;

    fn operator_id(&self) -> &OperatorId;

    fn prepare(self, _client: &CpoClient) -> Self {
        self
    }

    fn send<'a>(
        transport: &'a dyn Transport,
        request: PushRequest<Self>,
        options: &'a RequestOptions,
    ) -> BoxFuture<'a, TransportResult<Acknowledgement>>;
}

impl PushRecord for EvseDataRecord {
    const KIND: PushKind = PushKind::EvseData;

    fn operator_id(&self) -> &OperatorId {
        self.evse_id.operator_id()
    }

    fn prepare(self, client: &CpoClient) -> Self {
        match &client.evse_data_mapper {
            Some(mapper) => mapper(self),
            None => self,
        }
    }

    fn send<'a>(
        transport: &'a dyn Transport,
        request: PushRequest<Self>,
        options: &'a RequestOptions,
    ) -> BoxFuture<'a, TransportResult<Acknowledgement>> {
        transport.push_evse_data(request, options)
    }
}

impl PushRecord for EvseStatusRecord {
    const KIND: PushKind = PushKind::EvseStatus;

    fn operator_id(&self) -> &OperatorId {
        self.evse_id.operator_id()
    }

    fn send<'a>(
        transport: &'a dyn Transport,
        request: PushRequest<Self>,
        options: &'a RequestOptions,
    ) -> BoxFuture<'a, TransportResult<Acknowledgement>> {
        transport.push_evse_status(request, options)
    }
}

/// Success iff every group succeeded, otherwise the first failure in operator order
fn fold_acknowledgements(acknowledgements: BTreeMap<OperatorId, Acknowledgement>) -> Acknowledgement {
    let mut first_success = None;
    for acknowledgement in acknowledgements.into_values() {
        if !acknowledgement.is_success() {
            return acknowledgement;
        }
        first_success.get_or_insert(acknowledgement);
    }
    first_success.unwrap_or_else(Acknowledgement::no_op)
}

/// Interpret a transport outcome as an acknowledgement
pub(crate) fn acknowledgement_from(response: TransportResult<Acknowledgement>) -> Acknowledgement {
    let response = match response {
        Ok(response) => response,
        Err(error) => return Acknowledgement::failure(error.status_code()),
    };
    let missing = response.missing_content_status();

    match response.content {
        None => Acknowledgement::failure(missing),
        Some(acknowledgement) if response.http_status.is_success() => acknowledgement,
        Some(acknowledgement) => Acknowledgement {
            result: false,
            ..acknowledgement
        },
    }
}

impl CpoClient {
    pub async fn push_evse_data(
        &self,
        records: impl IntoIterator<Item = EvseDataRecord>,
        options: PushOptions<EvseDataRecord>,
    ) -> Acknowledgement {
        fold_acknowledgements(self.push_grouped(records, options).await)
    }

    /// One acknowledgement per operator group
    pub async fn push_evse_data_grouped(
        &self,
        records: impl IntoIterator<Item = EvseDataRecord>,
        options: PushOptions<EvseDataRecord>,
    ) -> BTreeMap<OperatorId, Acknowledgement> {
        self.push_grouped(records, options).await
    }

    pub async fn push_evse_data_record(
        &self,
        record: EvseDataRecord,
        options: PushOptions<EvseDataRecord>,
    ) -> Acknowledgement {
        self.push_evse_data([record], options).await
    }

    pub async fn push_charging_station(
        &self,
        station: &ChargingStation,
        options: PushOptions<EvseDataRecord>,
    ) -> Acknowledgement {
        self.push_evse_data(station.evses().map(|evse| evse.data.clone()), options)
            .await
    }

    pub async fn push_charging_pool(
        &self,
        pool: &ChargingPool,
        options: PushOptions<EvseDataRecord>,
    ) -> Acknowledgement {
        self.push_evse_data(pool.evses().map(|evse| evse.data.clone()), options)
            .await
    }

    /// Uses the operator's name unless the options carry one
    pub async fn push_operator(
        &self,
        operator: &ChargingStationOperator,
        options: PushOptions<EvseDataRecord>,
    ) -> Acknowledgement {
        self.push_evse_data(
            operator.evses().map(|evse| evse.data.clone()),
            options.or_operator_name(operator),
        )
        .await
    }

    pub async fn push_roaming_network(
        &self,
        network: &RoamingNetwork,
        options: PushOptions<EvseDataRecord>,
    ) -> Acknowledgement {
        self.push_evse_data(network.evses().map(|evse| evse.data.clone()), options)
            .await
    }

    pub async fn push_evse_status(
        &self,
        records: impl IntoIterator<Item = EvseStatusRecord>,
        options: PushOptions<EvseStatusRecord>,
    ) -> Acknowledgement {
        fold_acknowledgements(self.push_grouped(records, options).await)
    }

    /// One acknowledgement per operator group
    pub async fn push_evse_status_grouped(
        &self,
        records: impl IntoIterator<Item = EvseStatusRecord>,
        options: PushOptions<EvseStatusRecord>,
    ) -> BTreeMap<OperatorId, Acknowledgement> {
        self.push_grouped(records, options).await
    }

    pub async fn push_evse_status_record(
        &self,
        record: EvseStatusRecord,
        options: PushOptions<EvseStatusRecord>,
    ) -> Acknowledgement {
        self.push_evse_status([record], options).await
    }

    pub async fn push_charging_station_status(
        &self,
        station: &ChargingStation,
        options: PushOptions<EvseStatusRecord>,
    ) -> Acknowledgement {
        self.push_evse_status(station.evses().map(|evse| evse.status_record()), options)
            .await
    }

    pub async fn push_charging_pool_status(
        &self,
        pool: &ChargingPool,
        options: PushOptions<EvseStatusRecord>,
    ) -> Acknowledgement {
        self.push_evse_status(pool.evses().map(|evse| evse.status_record()), options)
            .await
    }

    /// Uses the operator's name unless the options carry one
    pub async fn push_operator_status(
        &self,
        operator: &ChargingStationOperator,
        options: PushOptions<EvseStatusRecord>,
    ) -> Acknowledgement {
        self.push_evse_status(
            operator.evses().map(|evse| evse.status_record()),
            options.or_operator_name(operator),
        )
        .await
    }

    pub async fn push_roaming_network_status(
        &self,
        network: &RoamingNetwork,
        options: PushOptions<EvseStatusRecord>,
    ) -> Acknowledgement {
        self.push_evse_status(network.evses().map(|evse| evse.status_record()), options)
            .await
    }

    /// Upload a status diff as insert, update and delete batches, in that order
    ///
    /// The action of `options` is ignored. Stops at the first batch the hub
    /// does not acknowledge; an empty diff never reaches the transport.
    #[instrument(skip_all, fields(operator_id = %diff.operator_id(), changes = diff.len()))]
    pub async fn push_status_diff(
        &self,
        diff: EvseStatusDiff,
        options: PushOptions<EvseStatusRecord>,
    ) -> Acknowledgement {
        if diff.is_empty() {
            debug!("{}", messages::log::STATUS_DIFF_EMPTY);
            return Acknowledgement::no_op();
        }

        let operator_id = diff.operator_id().clone();
        let mut last = Acknowledgement::no_op();
        for (action, records) in diff.into_status_records() {
            let options = options
                .clone()
                .with_action(action)
                .with_operator_id(operator_id.clone());
            last = self.push_evse_status(records, options).await;
            if !last.is_success() {
                break;
            }
        }
        last
    }

    #[instrument(skip_all, fields(kind = %T::KIND, action = %options.action))]
    async fn push_grouped<T: PushRecord>(
        &self,
        records: impl IntoIterator<Item = T>,
        options: PushOptions<T>,
    ) -> BTreeMap<OperatorId, Acknowledgement> {
        let records: Vec<T> = records
            .into_iter()
            .filter(|record| options.includes(record))
            .map(|record| record.prepare(self))
            .collect();

        if records.is_empty() {
            debug!("{}", messages::log::PUSH_SKIPPED);
            return BTreeMap::new();
        }

        let mut groups: BTreeMap<OperatorId, Vec<T>> = BTreeMap::new();
        match &options.operator_id {
            Some(operator_id) => {
                groups.insert(operator_id.clone(), records);
            }
            None => {
                for record in records {
                    groups
                        .entry(record.operator_id().clone())
                        .or_default()
                        .push(record);
                }
            }
        }

        let operator_name = options
            .operator_name
            .clone()
            .or_else(|| self.default_operator_name.clone());

        let pushes = groups.into_iter().map(|(operator_id, records)| {
            self.push_group(
                operator_id,
                operator_name.clone(),
                options.action,
                records,
                &options.request,
            )
        });

        join_all(pushes).await.into_iter().collect()
    }

    async fn push_group<T: PushRecord>(
        &self,
        operator_id: OperatorId,
        operator_name: Option<OperatorName>,
        action: ActionType,
        records: Vec<T>,
        request_options: &RequestOptions,
    ) -> (OperatorId, Acknowledgement) {
        let correlation_id = Uuid::now_v7();
        let started = Instant::now();
        let count = records.len();

        self.observers.notify("on_before_push", |observer| {
            observer.on_before_push(&BeforePushEvent {
                correlation_id,
                timestamp: self.clock.now(),
                kind: T::KIND,
                operator_id: &operator_id,
                action,
                count,
            })
        });

        let request = PushRequest {
            operator_id: operator_id.clone(),
            operator_name,
            action,
            records,
        };
        let response = self
            .dispatch(
                request_options,
                T::send(self.transport.as_ref(), request, request_options),
            )
            .await;
        let acknowledgement = acknowledgement_from(response);
        let elapsed = started.elapsed();

        if acknowledgement.is_success() {
            info!(
                %operator_id,
                count,
                elapsed = ?elapsed,
                "{}",
                messages::log::PUSH_COMPLETED
            );
        } else {
            warn!(
                %operator_id,
                count,
                code = %acknowledgement.status_code.code,
                additional_info = acknowledgement.additional_info().unwrap_or_default(),
                "{}",
                messages::log::PUSH_REJECTED
            );
        }

        self.observers.notify("on_after_push", |observer| {
            observer.on_after_push(&AfterPushEvent {
                correlation_id,
                timestamp: self.clock.now(),
                kind: T::KIND,
                operator_id: &operator_id,
                action,
                count,
                acknowledgement: &acknowledgement,
                elapsed,
            })
        });

        (operator_id, acknowledgement)
    }
}
