use crate::models::ResumeRecord;

/// Append-only record snapshots. Snapshot zero is the loaded record and is
/// never removed, so there is always a current state.
#[derive(Debug, Clone)]
pub struct EditHistory {
    initial: ResumeRecord,
    edits: Vec<ResumeRecord>,
}

impl EditHistory {
    pub fn new(initial: ResumeRecord) -> Self {
        Self {
            initial,
            edits: Vec::new(),
        }
    }

    pub fn current(&self) -> &ResumeRecord {
        self.edits.last().unwrap_or(&self.initial)
    }

    pub fn push(&mut self, snapshot: ResumeRecord) {
        self.edits.push(snapshot);
    }

    /// Drops the latest snapshot and returns the new current one.
    /// `None` when only the initial snapshot is left.
    pub fn undo(&mut self) -> Option<&ResumeRecord> {
        self.edits.pop()?;
        Some(self.current())
    }

    pub fn can_undo(&self) -> bool {
        !self.edits.is_empty()
    }

    /// Number of snapshots, counting the initial one.
    pub fn len(&self) -> usize {
        self.edits.len() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> ResumeRecord {
        ResumeRecord {
            name: name.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_undo_steps_back_one_snapshot_at_a_time() {
        let mut history = EditHistory::new(named("v0"));
        for v in ["v1", "v2", "v3"] {
            history.push(named(v));
        }
        assert_eq!(history.len(), 4);

        assert_eq!(history.undo().map(|r| r.name.clone()), Some("v2".into()));
        assert_eq!(history.undo().map(|r| r.name.clone()), Some("v1".into()));
        assert_eq!(history.current().name, "v1");
    }

    #[test]
    fn test_undo_at_initial_snapshot_is_noop() {
        let mut history = EditHistory::new(named("v0"));
        assert!(!history.can_undo());
        assert!(history.undo().is_none());
        assert_eq!(history.current().name, "v0");
        assert_eq!(history.len(), 1);
    }
}
