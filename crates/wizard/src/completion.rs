//! Completion tracker: which steps are done and how far along the wizard is.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::steps::{ITEM_STEPS, ItemStep, WORKING_STEP_COUNT, WizardStep};

/// Set of completed steps. Insertion order is irrelevant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepSet<S: Ord>(BTreeSet<S>);

/// Completed primary steps.
pub type CompletedSteps = StepSet<WizardStep>;

/// Completed sub-steps within one item session.
pub type CompletedItemSteps = StepSet<ItemStep>;

impl<S: Ord + Copy> StepSet<S> {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn contains(&self, step: S) -> bool {
        self.0.contains(&step)
    }

    /// Returns `true` if the step was not already present.
    pub fn insert(&mut self, step: S) -> bool {
        self.0.insert(step)
    }

    /// Drop `step` and everything ordered after it.
    pub fn truncate_from(&mut self, step: S) {
        self.0.retain(|s| *s < step);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = S> + '_ {
        self.0.iter().copied()
    }
}

impl<S: Ord + Copy> Default for StepSet<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Ord + Copy> FromIterator<S> for StepSet<S> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Integer percentage, rounded to nearest and capped at 100.
pub(crate) fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (done.min(total) * 100 + total / 2) / total;
    pct.min(100) as u8
}

/// Read-only view over the completed primary steps.
#[derive(Debug, Clone, Copy)]
pub struct CompletionTracker<'a> {
    completed: &'a CompletedSteps,
}

impl<'a> CompletionTracker<'a> {
    pub fn new(completed: &'a CompletedSteps) -> Self {
        Self { completed }
    }

    pub fn completed(&self) -> &'a CompletedSteps {
        self.completed
    }

    pub fn is_completed(&self, step: WizardStep) -> bool {
        self.completed.contains(step)
    }

    /// `|completed| / 5 * 100`, never above 100.
    pub fn progress(&self) -> u8 {
        let done = self.completed.iter().filter(|s| !s.is_terminal()).count();
        percent(done, WORKING_STEP_COUNT)
    }

    /// Required steps not yet completed, in registry order.
    pub fn remaining_required(&self) -> Vec<WizardStep> {
        crate::steps::PRIMARY_STEPS
            .iter()
            .copied()
            .filter(|s| s.is_required() && !self.completed.contains(*s))
            .collect()
    }
}

/// Progress of one item session, same rounding as the primary tracker.
pub fn item_progress(completed: &CompletedItemSteps) -> u8 {
    percent(completed.len(), ITEM_STEPS.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_set_has_zero_progress() {
        let completed = CompletedSteps::new();
        assert_eq!(CompletionTracker::new(&completed).progress(), 0);
    }

    #[test]
    fn progress_rounds_to_nearest() {
        let completed: CompletedSteps =
            [WizardStep::ClientSelection, WizardStep::BranchSelection].into_iter().collect();
        assert_eq!(CompletionTracker::new(&completed).progress(), 40);

        let items: CompletedItemSteps = [ItemStep::BasicInfo].into_iter().collect();
        assert_eq!(item_progress(&items), 20);
    }

    #[test]
    fn truncate_drops_later_steps() {
        let mut completed: CompletedSteps = [
            WizardStep::ClientSelection,
            WizardStep::BranchSelection,
            WizardStep::ItemManager,
            WizardStep::OrderParameters,
        ]
        .into_iter()
        .collect();
        completed.truncate_from(WizardStep::ItemManager);
        assert_eq!(
            completed.iter().collect::<Vec<_>>(),
            vec![WizardStep::ClientSelection, WizardStep::BranchSelection]
        );
    }

    #[test]
    fn remaining_required_skips_optional_steps() {
        let completed: CompletedSteps = [
            WizardStep::ClientSelection,
            WizardStep::BranchSelection,
            WizardStep::ItemManager,
        ]
        .into_iter()
        .collect();
        assert_eq!(
            CompletionTracker::new(&completed).remaining_required(),
            vec![WizardStep::Confirmation]
        );
    }

    proptest! {
        #[test]
        fn progress_never_exceeds_100(indices in prop::collection::vec(0usize..6, 0..12)) {
            let completed: CompletedSteps = indices
                .into_iter()
                .filter_map(WizardStep::from_index)
                .collect();
            let progress = CompletionTracker::new(&completed).progress();
            prop_assert!(progress <= 100);
        }
    }
}
