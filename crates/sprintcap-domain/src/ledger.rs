//! Pending-change ledger.
//!
//! Records every net-effective local edit as a typed, timestamped entry so
//! that it can be pushed to the remote tracker later, shown to the user, or
//! undone individually. Pure state with no I/O.

use chrono::Utc;
use uuid::Uuid;

use crate::change::{ChangeField, ChangeId, ChangeValue, PendingChange};
use crate::task::{Task, TaskUpdate};

/// Value the `new_value` of a creation entry holds.
pub const CREATED_MARKER: &str = "created";

/// Ordered log of pending changes (oldest first).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeLedger {
    entries: Vec<PendingChange>,
    next_sequence: u64,
}

impl ChangeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from persisted entries, keeping their order.
    pub fn from_entries(mut entries: Vec<PendingChange>) -> Self {
        entries.sort_by_key(|e| e.sequence);
        let next_sequence = entries.iter().map(|e| e.sequence + 1).max().unwrap_or(0);
        Self {
            entries,
            next_sequence,
        }
    }

    /// Append one entry when `old` and `new` differ. Returns the new entry id.
    pub fn record(
        &mut self,
        task: &Task,
        field: ChangeField,
        old_value: ChangeValue,
        new_value: ChangeValue,
    ) -> Option<ChangeId> {
        self.record_titled(task, &task.title, field, old_value, new_value)
    }

    fn record_titled(
        &mut self,
        task: &Task,
        title: &str,
        field: ChangeField,
        old_value: ChangeValue,
        new_value: ChangeValue,
    ) -> Option<ChangeId> {
        if old_value == new_value {
            return None;
        }

        let change = PendingChange {
            id: Uuid::new_v4(),
            sequence: self.next_sequence,
            task_id: task.id.clone(),
            task_title: title.to_string(),
            field,
            old_value,
            new_value,
            timestamp: Utc::now(),
        };
        self.next_sequence += 1;

        tracing::debug!("Ledger +{} ({} pending)", change.summary(), self.entries.len() + 1);
        let id = change.id;
        self.entries.push(change);
        Some(id)
    }

    pub fn record_creation(&mut self, task: &Task) -> Option<ChangeId> {
        self.record(
            task,
            ChangeField::Created,
            ChangeValue::Empty,
            ChangeValue::from(CREATED_MARKER),
        )
    }

    /// Append one entry per field that `updates` would effectively change on
    /// `task`. Colour is cosmetic and never recorded. Must be called before
    /// the update is applied.
    pub fn record_updates(&mut self, task: &Task, updates: &TaskUpdate) -> Vec<ChangeId> {
        let title = updates.title.as_deref().unwrap_or(&task.title);
        field_diffs(task, updates)
            .into_iter()
            .filter_map(|(field, old, new)| self.record_titled(task, title, field, old, new))
            .collect()
    }

    pub fn entries(&self) -> &[PendingChange] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: ChangeId) -> Option<&PendingChange> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn for_task<'a>(&'a self, task_id: &'a str) -> impl Iterator<Item = &'a PendingChange> {
        self.entries.iter().filter(move |e| e.task_id == task_id)
    }

    /// Entries newest first, for display.
    pub fn recent_first(&self) -> impl Iterator<Item = &PendingChange> {
        self.entries.iter().rev()
    }

    /// Remove and return one entry.
    pub fn take(&mut self, id: ChangeId) -> Option<PendingChange> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(pos))
    }

    /// Remove every entry whose id is listed. Returns how many were removed.
    pub fn remove_many(&mut self, ids: &[ChangeId]) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !ids.contains(&e.id));
        before - self.entries.len()
    }

    pub fn remove_for_task(&mut self, task_id: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.task_id != task_id);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn into_entries(self) -> Vec<PendingChange> {
        self.entries
    }
}

fn field_diffs(task: &Task, updates: &TaskUpdate) -> Vec<(ChangeField, ChangeValue, ChangeValue)> {
    let mut diffs = Vec::new();

    if let Some(title) = &updates.title {
        diffs.push((
            ChangeField::Title,
            ChangeValue::from(task.title.as_str()),
            ChangeValue::from(title.as_str()),
        ));
    }
    if let Some(points) = updates.points {
        diffs.push((
            ChangeField::Points,
            ChangeValue::from(task.points),
            ChangeValue::from(crate::task::sanitize_points(points)),
        ));
    }
    if let Some(status) = updates.status {
        diffs.push((
            ChangeField::Status,
            ChangeValue::from(task.status),
            ChangeValue::from(status),
        ));
    }
    if let Some(target) = updates.assignee.target() {
        diffs.push((
            ChangeField::Assignee,
            ChangeValue::from(task.assignee.as_ref()),
            ChangeValue::from(target),
        ));
    }
    if let Some(target) = updates.sprint.target() {
        diffs.push((
            ChangeField::Sprint,
            ChangeValue::from(task.sprint.as_ref()),
            ChangeValue::from(target),
        ));
    }
    if let Some(target) = updates.description.target() {
        diffs.push((
            ChangeField::Description,
            ChangeValue::from(task.description.as_ref()),
            ChangeValue::from(target),
        ));
    }

    diffs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field_update::FieldUpdate;
    use crate::task::TaskStatus;

    fn task() -> Task {
        let mut task = Task::new("1", "Task 1", 5.0);
        task.status = TaskStatus::ToDo;
        task.sprint = Some("Sprint 1".to_string());
        task.assignee = Some("Alice".to_string());
        task.color = Some("red".to_string());
        task
    }

    #[test]
    fn test_records_one_entry_per_changed_field() {
        let mut ledger = ChangeLedger::new();
        let updates = TaskUpdate {
            status: Some(TaskStatus::Done),
            points: Some(8.0),
            ..TaskUpdate::default()
        };

        let ids = ledger.record_updates(&task(), &updates);

        assert_eq!(ids.len(), 2);
        let status = ledger
            .entries()
            .iter()
            .find(|c| c.field == ChangeField::Status)
            .unwrap();
        assert_eq!(status.old_value, ChangeValue::Status(TaskStatus::ToDo));
        assert_eq!(status.new_value, ChangeValue::Status(TaskStatus::Done));
        let points = ledger
            .entries()
            .iter()
            .find(|c| c.field == ChangeField::Points)
            .unwrap();
        assert_eq!(points.old_value, ChangeValue::Number(5.0));
        assert_eq!(points.new_value, ChangeValue::Number(8.0));
    }

    #[test]
    fn test_identical_values_are_not_recorded() {
        let mut ledger = ChangeLedger::new();
        let updates = TaskUpdate {
            title: Some("Task 1".to_string()),
            points: Some(5.0),
            status: Some(TaskStatus::ToDo),
            assignee: FieldUpdate::Set("Alice".to_string()),
            sprint: FieldUpdate::Set("Sprint 1".to_string()),
            description: FieldUpdate::Clear,
            ..TaskUpdate::default()
        };

        assert!(ledger.record_updates(&task(), &updates).is_empty());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_color_is_never_recorded() {
        let mut ledger = ChangeLedger::new();
        let updates = TaskUpdate {
            color: FieldUpdate::Set("blue".to_string()),
            ..TaskUpdate::default()
        };

        assert!(ledger.record_updates(&task(), &updates).is_empty());
    }

    #[test]
    fn test_title_change_snapshots_new_title() {
        let mut ledger = ChangeLedger::new();
        let updates = TaskUpdate {
            title: Some("Renamed".to_string()),
            ..TaskUpdate::default()
        };

        ledger.record_updates(&task(), &updates);
        assert_eq!(ledger.entries()[0].task_title, "Renamed");
        assert_eq!(ledger.entries()[0].old_value, ChangeValue::from("Task 1"));
    }

    #[test]
    fn test_sequences_increase_in_append_order() {
        let mut ledger = ChangeLedger::new();
        let task = task();
        ledger.record_creation(&task);
        ledger.record(
            &task,
            ChangeField::Sprint,
            ChangeValue::from("Sprint 1"),
            ChangeValue::Empty,
        );

        let sequences: Vec<u64> = ledger.entries().iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![0, 1]);
        let newest = ledger.recent_first().next().unwrap();
        assert_eq!(newest.field, ChangeField::Sprint);
    }

    #[test]
    fn test_take_and_remove_many() {
        let mut ledger = ChangeLedger::new();
        let task = task();
        let a = ledger.record_creation(&task).unwrap();
        let b = ledger
            .record(&task, ChangeField::Points, 5.0.into(), 3.0.into())
            .unwrap();
        let c = ledger
            .record(&task, ChangeField::Points, 3.0.into(), 2.0.into())
            .unwrap();

        let taken = ledger.take(b).unwrap();
        assert_eq!(taken.id, b);
        assert_eq!(ledger.len(), 2);
        assert!(ledger.take(b).is_none());

        assert_eq!(ledger.remove_many(&[a, c, Uuid::new_v4()]), 2);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_from_entries_continues_sequence() {
        let mut ledger = ChangeLedger::new();
        let task = task();
        ledger.record_creation(&task);
        ledger.record(&task, ChangeField::Points, 5.0.into(), 1.0.into());

        let mut restored = ChangeLedger::from_entries(ledger.clone().into_entries());
        restored.record(&task, ChangeField::Points, 1.0.into(), 2.0.into());
        assert_eq!(restored.entries().last().unwrap().sequence, 2);
    }
}
