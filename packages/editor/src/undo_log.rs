//! # Undo Log
//!
//! Stack of inverse patches.
//!
//! Each logical edit pushes one **group** of inverse patches tagged with a
//! monotonically increasing group id; [`UndoLog::pop_group`] hands back a
//! whole group so one undo reverts one edit, however many steps it takes
//! (deleting a subtree is undone by recreating every node and rebinding
//! every input).
//!
//! Timestamps are kept per entry for debouncing: a `set-node-input` to the
//! same target within `debounce_ms` of the entry on top of the log is not
//! logged again, so the oldest pre-edit value stays the one restored.

use crate::config::UndoConfig;
use crate::patch::Patch;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct UndoEntry {
    pub group: u64,
    pub timestamp: DateTime<Utc>,
    pub patch: Patch,
}

#[derive(Debug, Clone)]
pub struct UndoLog {
    /// Most recent entry last
    entries: Vec<UndoEntry>,
    next_group: u64,
    config: UndoConfig,
}

impl UndoLog {
    pub fn new(config: UndoConfig) -> Self {
        Self {
            entries: Vec::new(),
            next_group: 0,
            config,
        }
    }

    pub fn config(&self) -> &UndoConfig {
        &self.config
    }

    /// Push one group of inverse patches, given in the order they must be
    /// applied to undo the edit
    ///
    /// Returns the group id, or `None` when there was nothing to push.
    pub fn push_group(&mut self, timestamp: DateTime<Utc>, inverses: Vec<Patch>) -> Option<u64> {
        if inverses.is_empty() {
            return None;
        }

        let group = self.next_group;
        self.next_group += 1;
        self.entries
            .extend(inverses.into_iter().rev().map(|patch| UndoEntry {
                group,
                timestamp,
                patch,
            }));
        self.trim();
        Some(group)
    }

    /// Whether a `set-node-input` on this target at `now` folds into the
    /// entry on top of the log
    pub fn should_debounce(
        &self,
        node_id: &str,
        input_name: &str,
        index: Option<u32>,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(top) = self.entries.last() else {
            return false;
        };
        let Patch::SetNodeInput {
            node_id: top_node_id,
            input_name: top_input_name,
            index: top_index,
            ..
        } = &top.patch
        else {
            return false;
        };
        if self.group_len(top.group) != 1 {
            return false;
        }

        let elapsed = now.signed_duration_since(top.timestamp).num_milliseconds();
        top_node_id == node_id
            && top_input_name == input_name
            && *top_index == index
            && (0..=self.config.debounce_ms as i64).contains(&elapsed)
    }

    /// Remove the most recent group, returned in apply order
    pub fn pop_group(&mut self) -> Option<Vec<UndoEntry>> {
        let group = self.entries.last()?.group;
        let start = self
            .entries
            .iter()
            .rposition(|entry| entry.group != group)
            .map_or(0, |i| i + 1);

        let mut popped = self.entries.split_off(start);
        popped.reverse();
        Some(popped)
    }

    /// Put back a group returned by [`UndoLog::pop_group`]
    pub fn restore(&mut self, mut group: Vec<UndoEntry>) {
        group.reverse();
        self.entries.extend(group);
    }

    /// The entry the next undo starts with
    pub fn peek(&self) -> Option<&UndoEntry> {
        self.entries.last()
    }

    /// All entries, most recent last
    pub fn entries(&self) -> &[UndoEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of undo steps available
    pub fn group_count(&self) -> usize {
        let mut count = 0;
        let mut previous = None;
        for entry in &self.entries {
            if previous != Some(entry.group) {
                count += 1;
                previous = Some(entry.group);
            }
        }
        count
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn group_len(&self, group: u64) -> usize {
        self.entries
            .iter()
            .rev()
            .take_while(|entry| entry.group == group)
            .count()
    }

    /// Drop the oldest whole groups beyond `max_groups`
    fn trim(&mut self) {
        if self.config.max_groups == 0 {
            return;
        }
        while self.group_count() > self.config.max_groups {
            let oldest = self.entries[0].group;
            let end = self
                .entries
                .iter()
                .position(|entry| entry.group != oldest)
                .unwrap_or(self.entries.len());
            self.entries.drain(..end);
        }
    }
}

impl Default for UndoLog {
    fn default() -> Self {
        Self::new(UndoConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use initiative_expression::ExpressionJson;

    fn set(node_id: &str, value: &str) -> Patch {
        Patch::set_input(node_id, "label", None, Some(ExpressionJson::string(value)))
    }

    fn t0() -> DateTime<Utc> {
        DateTime::<Utc>::default()
    }

    #[test]
    fn test_pop_group_returns_apply_order() {
        let mut log = UndoLog::default();
        log.push_group(t0(), vec![Patch::delete("A")]);
        log.push_group(
            t0(),
            vec![Patch::create_root("Root"), set("Root1", "a"), set("Root1", "b")],
        );

        assert_eq!(log.len(), 4);
        assert_eq!(log.group_count(), 2);
        assert_eq!(log.peek().map(|e| &e.patch), Some(&Patch::create_root("Root")));

        let group = log.pop_group().unwrap();
        let patches: Vec<_> = group.into_iter().map(|e| e.patch).collect();
        assert_eq!(
            patches,
            vec![Patch::create_root("Root"), set("Root1", "a"), set("Root1", "b")]
        );

        let group = log.pop_group().unwrap();
        assert_eq!(group.len(), 1);
        assert!(log.pop_group().is_none());
    }

    #[test]
    fn test_groups_are_separate_even_with_equal_timestamps() {
        let mut log = UndoLog::default();
        log.push_group(t0(), vec![set("A", "1")]);
        log.push_group(t0(), vec![set("B", "1")]);

        assert_eq!(log.pop_group().unwrap().len(), 1);
        assert_eq!(log.pop_group().unwrap().len(), 1);
    }

    #[test]
    fn test_restore_puts_group_back() {
        let mut log = UndoLog::default();
        log.push_group(t0(), vec![set("A", "1"), set("A", "2")]);
        let before = log.entries().to_vec();

        let group = log.pop_group().unwrap();
        log.restore(group);
        assert_eq!(log.entries(), before.as_slice());
    }

    #[test]
    fn test_debounce_window() {
        let mut log = UndoLog::default();
        log.push_group(t0(), vec![set("A", "old")]);

        let soon = t0() + TimeDelta::milliseconds(150);
        let late = t0() + TimeDelta::milliseconds(201);

        assert!(log.should_debounce("A", "label", None, soon));
        assert!(log.should_debounce("A", "label", None, t0() + TimeDelta::milliseconds(200)));
        assert!(!log.should_debounce("A", "label", None, late));
        assert!(!log.should_debounce("B", "label", None, soon));
        assert!(!log.should_debounce("A", "label", Some(0), soon));
        assert!(!log.should_debounce("A", "title", None, soon));
    }

    #[test]
    fn test_no_debounce_into_multi_entry_group() {
        let mut log = UndoLog::default();
        log.push_group(t0(), vec![set("A", "1"), set("A", "2")]);
        assert!(!log.should_debounce("A", "label", None, t0()));
    }

    #[test]
    fn test_max_groups_drops_oldest() {
        let mut log = UndoLog::new(UndoConfig {
            max_groups: 2,
            ..UndoConfig::default()
        });
        log.push_group(t0(), vec![set("A", "1"), set("A", "2")]);
        log.push_group(t0(), vec![set("B", "1")]);
        log.push_group(t0(), vec![set("C", "1")]);

        assert_eq!(log.group_count(), 2);
        assert_eq!(log.len(), 2);
        assert!(log
            .entries()
            .iter()
            .all(|e| !matches!(&e.patch, Patch::SetNodeInput { node_id, .. } if node_id == "A")));
    }

    #[test]
    fn test_empty_push_is_ignored() {
        let mut log = UndoLog::default();
        assert_eq!(log.push_group(t0(), vec![]), None);
        assert!(log.is_empty());
    }
}
