//! Per-user history of snapshots with viewed and comparator cursors.
//!
//! The timeline is append-only and never empty. Step `0` is the first
//! snapshot; the current step is always the newest. The newest snapshot is
//! held apart from the older ones so every lookup is total.

use serde::Serialize;

use crate::snapshot::Snapshot;

/// The three cursors of a [`Timeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cursors {
    /// The newest step.
    pub current_step: usize,
    /// The step being displayed.
    pub viewed_step: usize,
    /// The step the display compares against.
    pub comparator_step: usize,
}

/// Append-only snapshot history.
#[derive(Debug, Clone)]
pub struct Timeline {
    /// Steps `0..current_step`, oldest first.
    history: Vec<Snapshot>,
    /// Step `current_step`.
    latest: Snapshot,
    viewed_step: usize,
    comparator_step: usize,
}

impl Timeline {
    /// A timeline holding one snapshot at step 0.
    pub const fn new(first: Snapshot) -> Self {
        Self {
            history: Vec::new(),
            latest: first,
            viewed_step: 0,
            comparator_step: 0,
        }
    }

    /// Add a new newest snapshot and view it.
    pub fn append(&mut self, snapshot: Snapshot) {
        let previous = std::mem::replace(&mut self.latest, snapshot);
        self.history.push(previous);
        self.viewed_step = self.current_step();
    }

    /// View the previous step.
    ///
    /// Once a comparison is under way the comparator moves back with it.
    /// Does nothing at step 0.
    pub const fn step_back(&mut self) {
        if self.viewed_step > 0 {
            self.viewed_step = self.viewed_step.saturating_sub(1);
        }
        if self.comparator_step > 0 {
            self.comparator_step = self.comparator_step.saturating_sub(1);
        }
    }

    /// View the next step.
    ///
    /// Once a comparison is under way the comparator moves forward with it.
    /// Does nothing when the newest step is already viewed.
    pub fn step_forward(&mut self) {
        let current = self.current_step();
        if self.viewed_step >= current {
            return;
        }
        self.viewed_step = self.viewed_step.saturating_add(1);
        if self.comparator_step != 0 && self.comparator_step < current {
            self.comparator_step = self.comparator_step.saturating_add(1);
        }
    }

    /// Compare against `step`, clamped to the newest step.
    pub fn compare_with(&mut self, step: usize) {
        self.comparator_step = step.min(self.current_step());
    }

    /// View the newest step, leaving the comparator alone.
    pub fn view_latest(&mut self) {
        self.viewed_step = self.current_step();
    }

    /// View and compare against the newest step, so nothing reads as changed.
    pub fn collapse_to_latest(&mut self) {
        let current = self.current_step();
        self.viewed_step = current;
        self.comparator_step = current;
    }

    /// Index of the newest step.
    pub fn current_step(&self) -> usize {
        self.history.len()
    }

    /// Index of the displayed step.
    pub const fn viewed_step(&self) -> usize {
        self.viewed_step
    }

    /// Index of the comparison step.
    pub const fn comparator_step(&self) -> usize {
        self.comparator_step
    }

    /// All three cursors.
    pub fn cursors(&self) -> Cursors {
        Cursors {
            current_step: self.current_step(),
            viewed_step: self.viewed_step,
            comparator_step: self.comparator_step,
        }
    }

    /// Number of snapshots held.
    pub fn len(&self) -> usize {
        self.history.len().saturating_add(1)
    }

    /// Always false; a timeline holds at least one snapshot.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// The snapshot at `step`, or the newest one for steps past the end.
    pub fn get(&self, step: usize) -> &Snapshot {
        self.history.get(step).unwrap_or(&self.latest)
    }

    /// The displayed snapshot.
    pub fn viewed(&self) -> &Snapshot {
        self.get(self.viewed_step)
    }

    /// The comparison snapshot.
    pub fn compared(&self) -> &Snapshot {
        self.get(self.comparator_step)
    }

    /// The newest snapshot.
    pub const fn current(&self) -> &Snapshot {
        &self.latest
    }

    /// The newest snapshot, for refreshing in place.
    pub const fn current_mut(&mut self) -> &mut Snapshot {
        &mut self.latest
    }
}
