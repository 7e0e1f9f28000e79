use crate::models::{EntryId, Goal, GoalId, LedgerData, MovementEntry};
use chrono::NaiveDate;

/// Entry fields supplied by the ledger; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub goal_id: GoalId,
    pub date: NaiveDate,
    pub applied_delta: i64,
    pub note: String,
}

/// Persistence collaborator consumed by the ledger.
///
/// Implementations only store what they are given; clamping and validation
/// live in [`crate::ledger`].
pub trait LedgerStore {
    /// All goals ordered by id.
    fn load_goals(&self) -> Vec<Goal>;

    fn load_goal(&self, goal_id: GoalId) -> Option<Goal>;

    /// Entries of one goal in insertion order.
    fn load_entries(&self, goal_id: GoalId) -> Vec<MovementEntry>;

    fn load_entry(&self, entry_id: EntryId) -> Option<MovementEntry>;

    fn insert_entry(&mut self, entry: NewEntry) -> EntryId;

    /// Returns false when the entry does not exist.
    fn update_entry(&mut self, entry_id: EntryId, magnitude: u64, note: &str, delta: i64) -> bool;

    fn delete_entry(&mut self, entry_id: EntryId) -> Option<MovementEntry>;

    fn insert_goal(&mut self, label: &str, target: u32) -> GoalId;

    fn update_goal_label(&mut self, goal_id: GoalId, label: &str) -> bool;

    /// Removes the goal together with all of its entries.
    fn delete_goal(&mut self, goal_id: GoalId) -> Option<Goal>;
}

impl LedgerStore for LedgerData {
    fn load_goals(&self) -> Vec<Goal> {
        self.goals.values().cloned().collect()
    }

    fn load_goal(&self, goal_id: GoalId) -> Option<Goal> {
        self.goals.get(&goal_id).cloned()
    }

    fn load_entries(&self, goal_id: GoalId) -> Vec<MovementEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.goal_id == goal_id)
            .cloned()
            .collect()
    }

    fn load_entry(&self, entry_id: EntryId) -> Option<MovementEntry> {
        self.entries.iter().find(|entry| entry.id == entry_id).cloned()
    }

    fn insert_entry(&mut self, entry: NewEntry) -> EntryId {
        // Older snapshots may lack the counter; never hand out an id in use.
        let floor = self.entries.iter().map(|e| e.id).max().unwrap_or(0);
        let id = self.next_entry_id.max(floor) + 1;
        self.next_entry_id = id;
        self.entries.push(MovementEntry {
            id,
            goal_id: entry.goal_id,
            date: entry.date,
            applied_delta: entry.applied_delta,
            requested_magnitude: entry.applied_delta.unsigned_abs(),
            note: entry.note,
        });
        id
    }

    fn update_entry(&mut self, entry_id: EntryId, magnitude: u64, note: &str, delta: i64) -> bool {
        match self.entries.iter_mut().find(|entry| entry.id == entry_id) {
            Some(entry) => {
                entry.requested_magnitude = magnitude;
                entry.note = note.to_string();
                entry.applied_delta = delta;
                true
            }
            None => false,
        }
    }

    fn delete_entry(&mut self, entry_id: EntryId) -> Option<MovementEntry> {
        let index = self.entries.iter().position(|entry| entry.id == entry_id)?;
        Some(self.entries.remove(index))
    }

    fn insert_goal(&mut self, label: &str, target: u32) -> GoalId {
        let floor = self.goals.keys().next_back().copied().unwrap_or(0);
        let id = self.next_goal_id.max(floor) + 1;
        self.next_goal_id = id;
        self.goals.insert(
            id,
            Goal {
                id,
                label: label.to_string(),
                target,
            },
        );
        id
    }

    fn update_goal_label(&mut self, goal_id: GoalId, label: &str) -> bool {
        match self.goals.get_mut(&goal_id) {
            Some(goal) => {
                goal.label = label.to_string();
                true
            }
            None => false,
        }
    }

    fn delete_goal(&mut self, goal_id: GoalId) -> Option<Goal> {
        let goal = self.goals.remove(&goal_id)?;
        self.entries.retain(|entry| entry.goal_id != goal_id);
        Some(goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn entry(goal_id: GoalId, delta: i64) -> NewEntry {
        NewEntry {
            goal_id,
            date: day(),
            applied_delta: delta,
            note: String::new(),
        }
    }

    #[test]
    fn entry_ids_are_never_reused() {
        let mut data = LedgerData::default();
        let goal = data.insert_goal("patrols", 10);
        let first = data.insert_entry(entry(goal, 3));
        let second = data.insert_entry(entry(goal, 2));
        data.delete_entry(second);
        let third = data.insert_entry(entry(goal, 1));

        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(third, 3);
    }

    #[test]
    fn insert_respects_existing_ids_without_counter() {
        let mut data = LedgerData::default();
        let goal = data.insert_goal("patrols", 10);
        data.insert_entry(entry(goal, 1));
        data.insert_entry(entry(goal, 1));
        data.next_entry_id = 0;

        assert_eq!(data.insert_entry(entry(goal, 1)), 3);
    }

    #[test]
    fn goal_ids_survive_deleting_the_newest_goal() {
        let mut data = LedgerData::default();
        let first = data.insert_goal("patrols", 10);
        let second = data.insert_goal("talks", 4);
        data.delete_goal(second);
        let third = data.insert_goal("workshops", 1);

        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(third, 3);
        assert!(data.load_goal(second).is_none());
    }

    #[test]
    fn goal_counter_never_falls_below_existing_ids() {
        let mut data = LedgerData::default();
        data.insert_goal("patrols", 10);
        data.insert_goal("talks", 4);
        data.next_goal_id = 0;

        assert_eq!(data.insert_goal("workshops", 1), 3);
    }

    #[test]
    fn delete_goal_cascades_entries() {
        let mut data = LedgerData::default();
        let kept = data.insert_goal("kept", 5);
        let dropped = data.insert_goal("dropped", 5);
        data.insert_entry(entry(kept, 1));
        data.insert_entry(entry(dropped, 2));
        data.insert_entry(entry(dropped, 1));

        let removed = data.delete_goal(dropped).expect("goal exists");
        assert_eq!(removed.label, "dropped");
        assert_eq!(data.entries.len(), 1);
        assert!(data.load_entries(dropped).is_empty());
        assert_eq!(data.load_entries(kept).len(), 1);
    }

    #[test]
    fn entries_load_in_insertion_order() {
        let mut data = LedgerData::default();
        let goal = data.insert_goal("patrols", 10);
        let other = data.insert_goal("talks", 10);
        data.insert_entry(entry(goal, 4));
        data.insert_entry(entry(other, 1));
        data.insert_entry(entry(goal, -1));

        let deltas: Vec<i64> = data.load_entries(goal).iter().map(|e| e.applied_delta).collect();
        assert_eq!(deltas, vec![4, -1]);
    }
}
