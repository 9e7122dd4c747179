//! EVSE status values and timestamped status snapshots

use crate::domain::identifiers::{EvseId, OperatorId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Operational status of a single EVSE as reported to the hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvseStatusType {
    Available,
    Reserved,
    Occupied,
    OutOfService,
    /// Marks an EVSE the hub should forget
    EvseNotFound,
    Unknown,
}

/// Wire record of one EVSE status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvseStatusRecord {
    #[serde(rename = "EvseID")]
    pub evse_id: EvseId,
    #[serde(rename = "EvseStatus")]
    pub status: EvseStatusType,
}

impl EvseStatusRecord {
    pub fn new(evse_id: EvseId, status: EvseStatusType) -> Self {
        Self { evse_id, status }
    }

    pub fn operator_id(&self) -> &OperatorId {
        self.evse_id.operator_id()
    }
}

/// A status value together with the moment it was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampedStatus {
    pub status: EvseStatusType,
    pub timestamp: DateTime<Utc>,
}

/// One entry of a status snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusObservation {
    pub evse_id: EvseId,
    pub status: EvseStatusType,
    pub timestamp: DateTime<Utc>,
}

impl StatusObservation {
    pub fn new(evse_id: EvseId, status: EvseStatusType, timestamp: DateTime<Utc>) -> Self {
        Self {
            evse_id,
            status,
            timestamp,
        }
    }
}

/// Status observations collected during one synchronisation cycle
///
/// A snapshot may hold several observations for the same EVSE; only the most
/// recent one counts once the snapshot is collapsed with [`latest`](Self::latest).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    observations: Vec<StatusObservation>,
}

impl StatusSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, observation: StatusObservation) {
        self.observations.push(observation);
    }

    pub fn with(
        mut self,
        evse_id: EvseId,
        status: EvseStatusType,
        timestamp: DateTime<Utc>,
    ) -> Self {
        self.record(StatusObservation::new(evse_id, status, timestamp));
        self
    }

    pub fn observations(&self) -> &[StatusObservation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Most recent status per EVSE; on equal timestamps the later observation wins
    pub fn latest(&self) -> BTreeMap<EvseId, TimestampedStatus> {
        let mut latest: BTreeMap<EvseId, TimestampedStatus> = BTreeMap::new();
        for observation in &self.observations {
            let candidate = TimestampedStatus {
                status: observation.status,
                timestamp: observation.timestamp,
            };
            latest
                .entry(observation.evse_id.clone())
                .and_modify(|current| {
                    if candidate.timestamp >= current.timestamp {
                        *current = candidate;
                    }
                })
                .or_insert(candidate);
        }
        latest
    }
}

impl FromIterator<StatusObservation> for StatusSnapshot {
    fn from_iter<I: IntoIterator<Item = StatusObservation>>(iter: I) -> Self {
        Self {
            observations: iter.into_iter().collect(),
        }
    }
}

impl Extend<StatusObservation> for StatusSnapshot {
    fn extend<I: IntoIterator<Item = StatusObservation>>(&mut self, iter: I) {
        self.observations.extend(iter);
    }
}
