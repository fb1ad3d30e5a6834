//! Navigation service: pure functions over the step registry.

use serde::{Deserialize, Serialize};

use crate::completion::{CompletedItemSteps, CompletedSteps, percent};
use crate::steps::{ITEM_STEPS, ItemStep, PRIMARY_STEPS, WORKING_STEP_COUNT, WizardStep};

/// Step ordering and reachability rules.
///
/// Stateless; every answer is derived from the registry and the arguments.
/// Boundaries return `None` rather than wrapping around.
pub trait NavigationService {
    fn next_step(&self, step: WizardStep) -> Option<WizardStep>;

    fn previous_step(&self, step: WizardStep) -> Option<WizardStep>;

    fn next_item_step(&self, step: ItemStep) -> Option<ItemStep>;

    fn previous_item_step(&self, step: ItemStep) -> Option<ItemStep>;

    /// First step, or the immediately preceding step is completed.
    fn is_step_accessible(&self, step: WizardStep, completed: &CompletedSteps) -> bool;

    /// Same rule as [`NavigationService::is_step_accessible`], within one item session.
    fn is_item_step_accessible(&self, step: ItemStep, completed: &CompletedItemSteps) -> bool;

    /// `index(step) / 5` as an integer percentage.
    fn calculate_progress(&self, step: WizardStep) -> u8;
}

/// Navigation over the fixed linear registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinearNavigation;

impl NavigationService for LinearNavigation {
    fn next_step(&self, step: WizardStep) -> Option<WizardStep> {
        WizardStep::from_index(step.index() + 1)
    }

    fn previous_step(&self, step: WizardStep) -> Option<WizardStep> {
        step.index().checked_sub(1).and_then(WizardStep::from_index)
    }

    fn next_item_step(&self, step: ItemStep) -> Option<ItemStep> {
        ItemStep::from_index(step.index() + 1)
    }

    fn previous_item_step(&self, step: ItemStep) -> Option<ItemStep> {
        step.index().checked_sub(1).and_then(ItemStep::from_index)
    }

    fn is_step_accessible(&self, step: WizardStep, completed: &CompletedSteps) -> bool {
        match self.previous_step(step) {
            None => true,
            Some(prev) => completed.contains(prev),
        }
    }

    fn is_item_step_accessible(&self, step: ItemStep, completed: &CompletedItemSteps) -> bool {
        match self.previous_item_step(step) {
            None => true,
            Some(prev) => completed.contains(prev),
        }
    }

    fn calculate_progress(&self, step: WizardStep) -> u8 {
        percent(step.index(), WORKING_STEP_COUNT)
    }
}

/// Stepper view of the primary wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationSnapshot {
    pub current_step: WizardStep,
    pub available_steps: Vec<WizardStep>,
    pub completed_steps: Vec<WizardStep>,
    pub can_go_next: bool,
    pub can_go_prev: bool,
    pub progress: u8,
}

/// Stepper view of an open item session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemNavigationSnapshot {
    pub current_step: ItemStep,
    pub available_steps: Vec<ItemStep>,
    pub completed_steps: Vec<ItemStep>,
    pub can_go_next: bool,
    pub can_go_prev: bool,
    pub progress: u8,
}

/// Primary steps reachable from `completed` (terminal step excluded).
pub fn available_steps<N: NavigationService + ?Sized>(
    nav: &N,
    completed: &CompletedSteps,
) -> Vec<WizardStep> {
    PRIMARY_STEPS
        .iter()
        .copied()
        .filter(|s| !s.is_terminal() && nav.is_step_accessible(*s, completed))
        .collect()
}

pub fn available_item_steps<N: NavigationService + ?Sized>(
    nav: &N,
    completed: &CompletedItemSteps,
) -> Vec<ItemStep> {
    ITEM_STEPS
        .iter()
        .copied()
        .filter(|s| nav.is_item_step_accessible(*s, completed))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn next_and_previous_stop_at_boundaries() {
        let nav = LinearNavigation;
        assert_eq!(nav.next_step(WizardStep::ClientSelection), Some(WizardStep::BranchSelection));
        assert_eq!(nav.next_step(WizardStep::Confirmation), Some(WizardStep::Completed));
        assert_eq!(nav.next_step(WizardStep::Completed), None);
        assert_eq!(nav.previous_step(WizardStep::ClientSelection), None);
        assert_eq!(nav.previous_item_step(ItemStep::BasicInfo), None);
        assert_eq!(nav.next_item_step(ItemStep::PhotoManagement), None);
        assert_eq!(
            nav.next_item_step(ItemStep::DefectsAndRisks),
            Some(ItemStep::PriceCalculation)
        );
    }

    #[test]
    fn accessibility_follows_predecessor() {
        let nav = LinearNavigation;
        let mut completed = CompletedSteps::new();
        assert!(!nav.is_step_accessible(WizardStep::OrderParameters, &completed));
        completed.insert(WizardStep::ItemManager);
        assert!(nav.is_step_accessible(WizardStep::OrderParameters, &completed));
    }

    #[test]
    fn progress_excludes_terminal_step_from_denominator() {
        let nav = LinearNavigation;
        assert_eq!(nav.calculate_progress(WizardStep::ClientSelection), 0);
        assert_eq!(nav.calculate_progress(WizardStep::ItemManager), 40);
        assert_eq!(nav.calculate_progress(WizardStep::Confirmation), 80);
        assert_eq!(nav.calculate_progress(WizardStep::Completed), 100);
    }

    #[test]
    fn available_steps_grow_with_completion() {
        let nav = LinearNavigation;
        let completed: CompletedSteps = [WizardStep::ClientSelection].into_iter().collect();
        assert_eq!(
            available_steps(&nav, &completed),
            vec![WizardStep::ClientSelection, WizardStep::BranchSelection]
        );
        let items = CompletedItemSteps::new();
        assert_eq!(available_item_steps(&nav, &items), vec![ItemStep::BasicInfo]);
    }

    proptest! {
        #[test]
        fn only_first_step_accessible_from_empty_set(index in 0usize..6) {
            let step = WizardStep::from_index(index).unwrap();
            let accessible = LinearNavigation.is_step_accessible(step, &CompletedSteps::new());
            prop_assert_eq!(accessible, step == WizardStep::FIRST);
        }

        #[test]
        fn progress_is_bounded(index in 0usize..6) {
            let step = WizardStep::from_index(index).unwrap();
            prop_assert!(LinearNavigation.calculate_progress(step) <= 100);
        }
    }
}
