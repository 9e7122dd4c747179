//! Push orchestration against a scripted transport

mod support;

use chrono::{TimeZone, Utc};
use oicp_core::{
    client::{PushOptions, TransportError},
    domain::{
        Acknowledgement, ActionType, ChargingPool, ChargingPoolId, ChargingStation,
        ChargingStationId, ChargingStationOperator, Evse, EvseDataRecord, EvseStatusDiff,
        EvseStatusRecord, EvseStatusType, OperatorName, RoamingNetwork, StatusCodeKind,
        StatusSnapshot,
    },
    CpoClient,
};
use std::{sync::Arc, time::Duration};
use support::{data_record, evse, operator, MockTransport, RecordingObserver, Reply};

fn client_with(transport: &Arc<MockTransport>, observer: &Arc<RecordingObserver>) -> CpoClient {
    CpoClient::builder(transport.clone())
        .observer(observer.clone())
        .build()
}

fn status(evse_id: &str, status: EvseStatusType) -> EvseStatusRecord {
    EvseStatusRecord::new(evse(evse_id), status)
}

#[tokio::test]
async fn test_empty_push_never_reaches_the_transport() {
    let transport = Arc::new(MockTransport::new());
    let observer = Arc::new(RecordingObserver::new());
    let client = client_with(&transport, &observer);

    let ack = client
        .push_evse_status(Vec::new(), PushOptions::full_load())
        .await;

    assert!(ack.is_success());
    assert_eq!(ack.additional_info(), Some(Acknowledgement::NO_OP_INFO));
    assert_eq!(transport.calls(), 0);
    assert!(observer.events().is_empty());
}

#[tokio::test]
async fn test_fully_filtered_push_is_a_no_op() {
    let transport = Arc::new(MockTransport::new());
    let observer = Arc::new(RecordingObserver::new());
    let client = client_with(&transport, &observer);

    let options = PushOptions::update().with_include(|_: &EvseDataRecord| false);
    let ack = client
        .push_evse_data(
            vec![data_record("DE*ABC*E1"), data_record("DE*ABC*E2")],
            options,
        )
        .await;

    assert_eq!(ack, Acknowledgement::no_op());
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_mixed_operators_are_split_into_one_request_each() {
    let transport = Arc::new(MockTransport::new());
    let observer = Arc::new(RecordingObserver::new());
    let client = client_with(&transport, &observer);

    let records = vec![
        status("DE*ABC*E1", EvseStatusType::Available),
        status("DE*XYZ*E1", EvseStatusType::Occupied),
        status("DE*ABC*E2", EvseStatusType::Reserved),
    ];
    let acks = client
        .push_evse_status_grouped(records, PushOptions::update())
        .await;

    assert_eq!(acks.len(), 2);
    assert!(acks.values().all(Acknowledgement::is_success));

    let mut requests = transport.status_requests();
    requests.sort_by(|a, b| a.operator_id.cmp(&b.operator_id));
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].operator_id, operator("DE*ABC"));
    assert_eq!(requests[0].records.len(), 2);
    assert_eq!(requests[0].action, ActionType::Update);
    assert_eq!(requests[1].operator_id, operator("DE*XYZ"));
    assert_eq!(requests[1].records.len(), 1);

    let events = observer.events();
    assert!(events.contains(&"before_push DE*ABC 2".to_string()));
    assert!(events.contains(&"before_push DE*XYZ 1".to_string()));
    assert_eq!(
        events.iter().filter(|e| e.starts_with("after_push")).count(),
        2
    );
}

#[tokio::test]
async fn test_explicit_operator_scopes_the_whole_batch() {
    let transport = Arc::new(MockTransport::new());
    let observer = Arc::new(RecordingObserver::new());
    let client = client_with(&transport, &observer);

    let records = vec![
        status("DE*ABC*E1", EvseStatusType::Available),
        status("DE*XYZ*E1", EvseStatusType::Available),
    ];
    client
        .push_evse_status(
            records,
            PushOptions::full_load().with_operator_id(operator("DE*HUB")),
        )
        .await;

    let requests = transport.status_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].operator_id, operator("DE*HUB"));
    assert_eq!(requests[0].records.len(), 2);
}

#[tokio::test]
async fn test_one_rejected_group_fails_the_combined_acknowledgement() {
    let transport = Arc::new(MockTransport::new().reject_operator(operator("DE*XYZ")));
    let observer = Arc::new(RecordingObserver::new());
    let client = client_with(&transport, &observer);

    let records = vec![
        status("DE*ABC*E1", EvseStatusType::Available),
        status("DE*XYZ*E1", EvseStatusType::Available),
    ];
    let ack = client
        .push_evse_status(records.clone(), PushOptions::update())
        .await;
    assert!(!ack.is_success());
    assert_eq!(ack.status_code.code, StatusCodeKind::DataError);

    let grouped = client
        .push_evse_status_grouped(records, PushOptions::update())
        .await;
    assert!(grouped[&operator("DE*ABC")].is_success());
    assert!(!grouped[&operator("DE*XYZ")].is_success());
}

#[tokio::test]
async fn test_mapper_and_operator_name_reach_the_request() {
    let transport = Arc::new(MockTransport::new());
    let client = CpoClient::builder(transport.clone())
        .default_operator_name(OperatorName::try_new("Default Charging").unwrap())
        .evse_data_mapper(|record| record.with_renewable_energy(true))
        .build();

    client
        .push_evse_data_record(data_record("DE*ABC*E1"), PushOptions::insert())
        .await;

    let requests = transport.data_requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].records[0].renewable_energy);
    assert_eq!(
        requests[0].operator_name.clone().map(OperatorName::into_inner),
        Some("Default Charging".to_string())
    );
}

#[tokio::test]
async fn test_operator_push_prefers_the_operator_name() {
    let transport = Arc::new(MockTransport::new());
    let client = CpoClient::builder(transport.clone())
        .default_operator_name(OperatorName::try_new("Default Charging").unwrap())
        .build();

    let station = ChargingStation::new(ChargingStationId::parse("DE*ABC*S1").unwrap())
        .with_evse(Evse::new(data_record("DE*ABC*E1"), EvseStatusType::Available))
        .with_evse(Evse::new(data_record("DE*ABC*E2"), EvseStatusType::Occupied));
    let pool = ChargingPool::new(ChargingPoolId::parse("DE*ABC*P1").unwrap()).with_station(station);
    let cso = ChargingStationOperator::new(operator("DE*ABC"))
        .with_name(OperatorName::try_new("ABC Energy").unwrap())
        .with_pool(pool);

    let ack = client.push_operator(&cso, PushOptions::full_load()).await;
    assert!(ack.is_success());
    let ack = client
        .push_operator_status(&cso, PushOptions::full_load())
        .await;
    assert!(ack.is_success());

    let data = transport.data_requests();
    assert_eq!(data[0].records.len(), 2);
    assert_eq!(
        data[0].operator_name.clone().map(OperatorName::into_inner),
        Some("ABC Energy".to_string())
    );
    let status = transport.status_requests();
    assert_eq!(status[0].records[1].status, EvseStatusType::Occupied);
}

#[tokio::test]
async fn test_roaming_network_push_groups_by_operator() {
    let transport = Arc::new(MockTransport::new());
    let client = CpoClient::new(transport.clone());

    let network = ["DE*ABC", "DE*XYZ"]
        .into_iter()
        .fold(RoamingNetwork::new(), |network, id| {
            let station = ChargingStation::new(ChargingStationId::parse(&format!("{id}*S1")).unwrap())
                .with_evse(Evse::new(
                    data_record(&format!("{id}*E1")),
                    EvseStatusType::Available,
                ));
            network.with_operator(
                ChargingStationOperator::new(operator(id)).with_pool(
                    ChargingPool::new(ChargingPoolId::parse(&format!("{id}*P1")).unwrap())
                        .with_station(station),
                ),
            )
        });

    let ack = client
        .push_roaming_network_status(&network, PushOptions::full_load())
        .await;
    assert!(ack.is_success());
    assert_eq!(transport.status_requests().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_timed_out_push_still_fires_the_after_event() {
    let transport = Arc::new(MockTransport::new().acknowledge_with(Reply::Hang));
    let observer = Arc::new(RecordingObserver::new());
    let client = client_with(&transport, &observer);

    let ack = client
        .push_evse_status(
            vec![status("DE*ABC*E1", EvseStatusType::Available)],
            PushOptions::update().with_timeout(Duration::from_millis(250)),
        )
        .await;

    assert!(!ack.is_success());
    assert_eq!(ack.status_code.code, StatusCodeKind::PartnerDidNotRespond);
    assert_eq!(
        observer.events(),
        vec![
            "before_push DE*ABC 1".to_string(),
            "after_push DE*ABC false 310".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_unreachable_hub_becomes_a_failed_acknowledgement() {
    let transport = Arc::new(
        MockTransport::new()
            .acknowledge_with(Reply::Fail(TransportError::Unreachable("connection refused".into()))),
    );
    let client = CpoClient::new(transport.clone());

    let ack = client
        .push_evse_status_record(
            status("DE*ABC*E1", EvseStatusType::Available),
            PushOptions::update(),
        )
        .await;

    assert!(!ack.is_success());
    assert_eq!(ack.status_code.code, StatusCodeKind::HubCommunicationError);
    assert_eq!(ack.additional_info(), Some("connection refused"));
}

#[tokio::test]
async fn test_failing_observers_do_not_change_the_result() {
    let transport = Arc::new(MockTransport::new());
    let observer = Arc::new(RecordingObserver::failing());
    let client = client_with(&transport, &observer);

    let ack = client
        .push_evse_status_record(
            status("DE*ABC*E1", EvseStatusType::Available),
            PushOptions::update(),
        )
        .await;

    assert!(ack.is_success());
    assert_eq!(observer.events().len(), 2);
}

#[tokio::test]
async fn test_status_diff_uploads_insert_update_delete_in_order() {
    let transport = Arc::new(MockTransport::new());
    let client = CpoClient::new(transport.clone());
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();

    let baseline = StatusSnapshot::new()
        .with(evse("DE*ABC*EA"), EvseStatusType::Available, at)
        .with(evse("DE*ABC*EB"), EvseStatusType::Available, at);
    let current = StatusSnapshot::new()
        .with(evse("DE*ABC*EB"), EvseStatusType::Occupied, at)
        .with(evse("DE*ABC*EC"), EvseStatusType::Available, at);
    let diff = EvseStatusDiff::compute(&operator("DE*ABC"), &baseline, &current);

    let ack = client.push_status_diff(diff, PushOptions::default()).await;
    assert!(ack.is_success());

    let requests = transport.status_requests();
    let actions: Vec<ActionType> = requests.iter().map(|r| r.action).collect();
    assert_eq!(
        actions,
        vec![ActionType::Insert, ActionType::Update, ActionType::Delete]
    );
    assert_eq!(requests[0].records, vec![status("DE*ABC*EC", EvseStatusType::Available)]);
    assert_eq!(requests[1].records, vec![status("DE*ABC*EB", EvseStatusType::Occupied)]);
    assert_eq!(requests[2].records, vec![status("DE*ABC*EA", EvseStatusType::EvseNotFound)]);
}

#[tokio::test]
async fn test_status_diff_stops_at_the_first_rejected_batch() {
    let transport = Arc::new(MockTransport::new().reject_operator(operator("DE*ABC")));
    let client = CpoClient::new(transport.clone());
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();

    let baseline = StatusSnapshot::new().with(evse("DE*ABC*EA"), EvseStatusType::Available, at);
    let current = StatusSnapshot::new().with(evse("DE*ABC*EC"), EvseStatusType::Available, at);
    let diff = EvseStatusDiff::compute(&operator("DE*ABC"), &baseline, &current);

    let ack = client.push_status_diff(diff, PushOptions::default()).await;
    assert!(!ack.is_success());
    assert_eq!(transport.status_requests().len(), 1);
}

#[tokio::test]
async fn test_empty_status_diff_is_a_no_op() {
    let transport = Arc::new(MockTransport::new());
    let client = CpoClient::new(transport.clone());
    let snapshot = StatusSnapshot::new().with(
        evse("DE*ABC*EA"),
        EvseStatusType::Available,
        Utc::now(),
    );

    let diff = EvseStatusDiff::compute(&operator("DE*ABC"), &snapshot, &snapshot);
    let ack = client.push_status_diff(diff, PushOptions::default()).await;

    assert_eq!(ack, Acknowledgement::no_op());
    assert_eq!(transport.calls(), 0);
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<parking_lot::Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_completed_push_logs_the_elapsed_duration() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let transport = Arc::new(MockTransport::new());
    let observer = Arc::new(RecordingObserver::new());
    let client = client_with(&transport, &observer);

    let ack = client
        .push_evse_status(
            vec![status("DE*ABC*E1", EvseStatusType::Available)],
            PushOptions::full_load(),
        )
        .await;

    assert!(ack.is_success());
    let output = logs.contents();
    assert!(output.contains("Push acknowledged"));
    assert!(output.contains("elapsed="));
    assert!(!output.contains("elapsed_ms"));
}
