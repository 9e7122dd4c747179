//! Minimal change-sets between two EVSE status snapshots
//!
//! The baseline is the state the hub last acknowledged, the current snapshot is
//! the latest local state. Both are collapsed to the newest status per EVSE
//! before they are compared, since the protocol only carries the latest value.
//! Diffs are always scoped to one operator because uploads are.

use crate::domain::{
    action::ActionType,
    identifiers::{EvseId, OperatorId},
    status::{EvseStatusRecord, EvseStatusType, StatusSnapshot},
};
use std::collections::{BTreeMap, BTreeSet};

type LatestByOperator = BTreeMap<OperatorId, BTreeMap<EvseId, EvseStatusType>>;

/// New, changed and removed EVSE statuses of one operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvseStatusDiff {
    operator_id: OperatorId,
    new_status: Vec<EvseStatusRecord>,
    changed_status: Vec<EvseStatusRecord>,
    removed_ids: Vec<EvseId>,
}

impl EvseStatusDiff {
    /// Diff of the EVSEs belonging to `operator_id`; other operators are ignored
    pub fn compute(
        operator_id: &OperatorId,
        baseline: &StatusSnapshot,
        current: &StatusSnapshot,
    ) -> Self {
        let mut baseline = latest_by_operator(baseline);
        let mut current = latest_by_operator(current);
        Self::between(
            operator_id.clone(),
            baseline.remove(operator_id).unwrap_or_default(),
            current.remove(operator_id).unwrap_or_default(),
        )
    }

    /// One diff per operator that appears in either snapshot
    pub fn by_operator(
        baseline: &StatusSnapshot,
        current: &StatusSnapshot,
    ) -> BTreeMap<OperatorId, Self> {
        let mut baseline = latest_by_operator(baseline);
        let mut current = latest_by_operator(current);
        let operators: BTreeSet<OperatorId> =
            baseline.keys().chain(current.keys()).cloned().collect();

        operators
            .into_iter()
            .map(|operator_id| {
                let diff = Self::between(
                    operator_id.clone(),
                    baseline.remove(&operator_id).unwrap_or_default(),
                    current.remove(&operator_id).unwrap_or_default(),
                );
                (operator_id, diff)
            })
            .collect()
    }

    fn between(
        operator_id: OperatorId,
        baseline: BTreeMap<EvseId, EvseStatusType>,
        current: BTreeMap<EvseId, EvseStatusType>,
    ) -> Self {
        let mut new_status = Vec::new();
        let mut changed_status = Vec::new();

        for (evse_id, status) in &current {
            match baseline.get(evse_id) {
                None => new_status.push(EvseStatusRecord::new(evse_id.clone(), *status)),
                Some(previous) if previous != status => {
                    changed_status.push(EvseStatusRecord::new(evse_id.clone(), *status));
                }
                Some(_) => {}
            }
        }

        let removed_ids = baseline
            .into_keys()
            .filter(|evse_id| !current.contains_key(evse_id))
            .collect();

        Self {
            operator_id,
            new_status,
            changed_status,
            removed_ids,
        }
    }

    pub fn operator_id(&self) -> &OperatorId {
        &self.operator_id
    }

    pub fn new_status(&self) -> &[EvseStatusRecord] {
        &self.new_status
    }

    pub fn changed_status(&self) -> &[EvseStatusRecord] {
        &self.changed_status
    }

    pub fn removed_ids(&self) -> &[EvseId] {
        &self.removed_ids
    }

    pub fn len(&self) -> usize {
        self.new_status.len() + self.changed_status.len() + self.removed_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Upload batches in protocol order: inserts, updates, then deletes
    ///
    /// Removed EVSEs are sent as `EvseNotFound`; empty batches are skipped.
    pub fn into_status_records(self) -> Vec<(ActionType, Vec<EvseStatusRecord>)> {
        let removed = self
            .removed_ids
            .into_iter()
            .map(|evse_id| EvseStatusRecord::new(evse_id, EvseStatusType::EvseNotFound))
            .collect();

        [
            (ActionType::Insert, self.new_status),
            (ActionType::Update, self.changed_status),
            (ActionType::Delete, removed),
        ]
        .into_iter()
        .filter(|(_, records)| !records.is_empty())
        .collect()
    }
}

fn latest_by_operator(snapshot: &StatusSnapshot) -> LatestByOperator {
    let mut grouped = LatestByOperator::new();
    for (evse_id, latest) in snapshot.latest() {
        grouped
            .entry(evse_id.operator_id().clone())
            .or_default()
            .insert(evse_id, latest.status);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn evse(text: &str) -> EvseId {
        EvseId::parse(text).unwrap()
    }

    fn operator(text: &str) -> OperatorId {
        OperatorId::parse(text).unwrap()
    }

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
    }

    fn snapshot(entries: &[(&str, EvseStatusType)]) -> StatusSnapshot {
        entries.iter().fold(StatusSnapshot::new(), |snapshot, (id, status)| {
            snapshot.with(evse(id), *status, at(0))
        })
    }

    #[test]
    fn partitions_into_new_changed_and_removed() {
        use EvseStatusType::*;
        let baseline = snapshot(&[("DE*ABC*EA", Available), ("DE*ABC*EB", Reserved)]);
        let current = snapshot(&[("DE*ABC*EB", Occupied), ("DE*ABC*EC", OutOfService)]);

        let diff = EvseStatusDiff::compute(&operator("DE*ABC"), &baseline, &current);

        assert_eq!(
            diff.new_status(),
            &[EvseStatusRecord::new(evse("DE*ABC*EC"), OutOfService)]
        );
        assert_eq!(
            diff.changed_status(),
            &[EvseStatusRecord::new(evse("DE*ABC*EB"), Occupied)]
        );
        assert_eq!(diff.removed_ids(), &[evse("DE*ABC*EA")]);
        assert_eq!(diff.len(), 3);
    }

    #[test]
    fn unchanged_status_is_not_reported() {
        let baseline = snapshot(&[("DE*ABC*E1", EvseStatusType::Available)]);
        let current = snapshot(&[("DEABCE1", EvseStatusType::Available)]);

        let diff = EvseStatusDiff::compute(&operator("DE*ABC"), &baseline, &current);
        assert!(diff.is_empty());
        assert!(diff.into_status_records().is_empty());
    }

    #[test]
    fn only_the_latest_observation_is_compared() {
        let baseline = snapshot(&[("DE*ABC*E1", EvseStatusType::Available)]);
        let current = StatusSnapshot::new()
            .with(evse("DE*ABC*E1"), EvseStatusType::Occupied, at(1))
            .with(evse("DE*ABC*E1"), EvseStatusType::Available, at(2));

        let diff = EvseStatusDiff::compute(&operator("DE*ABC"), &baseline, &current);
        assert!(diff.is_empty());
    }

    #[test]
    fn compute_ignores_other_operators() {
        let baseline = snapshot(&[("DE*XYZ*E1", EvseStatusType::Available)]);
        let current = snapshot(&[("DE*ABC*E1", EvseStatusType::Available)]);

        let diff = EvseStatusDiff::compute(&operator("DE*ABC"), &baseline, &current);
        assert_eq!(diff.new_status().len(), 1);
        assert!(diff.removed_ids().is_empty());
    }

    #[test]
    fn by_operator_scopes_every_diff() {
        let baseline = snapshot(&[("DE*XYZ*E1", EvseStatusType::Available)]);
        let current = snapshot(&[("DE*ABC*E1", EvseStatusType::Available)]);

        let diffs = EvseStatusDiff::by_operator(&baseline, &current);
        assert_eq!(diffs.len(), 2);
        assert_eq!(diffs[&operator("DE*ABC")].new_status().len(), 1);
        assert_eq!(diffs[&operator("DEXYZ")].removed_ids(), &[evse("DE*XYZ*E1")]);
        assert!(diffs
            .iter()
            .all(|(operator_id, diff)| diff.operator_id() == operator_id));
    }

    #[test]
    fn status_records_follow_insert_update_delete_order() {
        use EvseStatusType::*;
        let baseline = snapshot(&[("DE*ABC*EA", Available), ("DE*ABC*EB", Reserved)]);
        let current = snapshot(&[("DE*ABC*EB", Occupied), ("DE*ABC*EC", Available)]);

        let batches = EvseStatusDiff::compute(&operator("DE*ABC"), &baseline, &current)
            .into_status_records();
        let actions: Vec<ActionType> = batches.iter().map(|(action, _)| *action).collect();
        assert_eq!(
            actions,
            vec![ActionType::Insert, ActionType::Update, ActionType::Delete]
        );
        assert_eq!(batches[2].1[0].status, EvseNotFound);
    }
}
