//! Item sub-wizard: one session composing a single item draft.
//!
//! The `check_*` methods decide; the crate-private mutators evolve. The primary
//! machine calls the former in `handle` and the latter in `apply`.

use serde::{Deserialize, Serialize};

use cleanorder_core::{DomainError, DomainResult, ItemId, SessionId};

use crate::completion::{CompletedItemSteps, item_progress};
use crate::draft::{DraftChange, ItemDraft, ItemRecord};
use crate::navigation::{ItemNavigationSnapshot, NavigationService, available_item_steps};
use crate::steps::{ITEM_STEPS, ItemStep};
use crate::validation::{ValidationGate, ensure_valid, reject};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemWizardMode {
    /// Commit appends a new record.
    Create,
    /// Commit replaces the record with the same id.
    Edit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemWizard {
    session: SessionId,
    item_id: ItemId,
    mode: ItemWizardMode,
    step: ItemStep,
    completed: CompletedItemSteps,
    draft: ItemDraft,
}

impl ItemWizard {
    pub fn start_new(session: SessionId, item_id: ItemId) -> Self {
        Self {
            session,
            item_id,
            mode: ItemWizardMode::Create,
            step: ItemStep::FIRST,
            completed: CompletedItemSteps::new(),
            draft: ItemDraft::new(),
        }
    }

    /// Re-enter at the first sub-step with the draft taken from `record`.
    ///
    /// Leading sub-steps the record already satisfies start out completed, so
    /// the user can jump straight to the part they want to change.
    pub fn start_edit<G: ValidationGate + ?Sized>(
        session: SessionId,
        record: &ItemRecord,
        gate: &G,
    ) -> Self {
        let draft = ItemDraft::from_record(record);
        let completed = ITEM_STEPS
            .into_iter()
            .filter(|s| *s != ItemStep::LAST)
            .take_while(|s| gate.validate_item_step(*s, &draft).is_empty())
            .collect();
        Self {
            session,
            item_id: record.id,
            mode: ItemWizardMode::Edit,
            step: ItemStep::FIRST,
            completed,
            draft,
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn mode(&self) -> ItemWizardMode {
        self.mode
    }

    pub fn current_step(&self) -> ItemStep {
        self.step
    }

    pub fn completed(&self) -> &CompletedItemSteps {
        &self.completed
    }

    pub fn draft(&self) -> &ItemDraft {
        &self.draft
    }

    pub fn progress(&self) -> u8 {
        item_progress(&self.completed)
    }

    /// Stepper view. `can_go_next` also requires the current sub-step to be valid.
    pub fn snapshot<G, N>(&self, gate: &G, nav: &N) -> ItemNavigationSnapshot
    where
        G: ValidationGate + ?Sized,
        N: NavigationService + ?Sized,
    {
        ItemNavigationSnapshot {
            current_step: self.step,
            available_steps: available_item_steps(nav, &self.completed),
            completed_steps: self.completed.iter().collect(),
            can_go_next: nav.next_item_step(self.step).is_some()
                && gate.validate_item_step(self.step, &self.draft).is_empty(),
            can_go_prev: nav.previous_item_step(self.step).is_some(),
            progress: self.progress(),
        }
    }

    /// Target of `NEXT_ITEM_STEP`, if the current sub-step is valid.
    pub fn check_next<G, N>(&self, gate: &G, nav: &N) -> DomainResult<ItemStep>
    where
        G: ValidationGate + ?Sized,
        N: NavigationService + ?Sized,
    {
        ensure_valid(gate.validate_item_step(self.step, &self.draft))?;
        nav.next_item_step(self.step).ok_or_else(|| {
            reject(
                "navigation",
                "item_step",
                "already at the last item step; complete the item to commit it",
            )
        })
    }

    pub fn check_previous<N: NavigationService + ?Sized>(&self, nav: &N) -> DomainResult<ItemStep> {
        nav.previous_item_step(self.step)
            .ok_or_else(|| reject("navigation", "item_step", "already at the first item step"))
    }

    /// `Ok(false)` when `step` is already current.
    pub fn check_go_to<N: NavigationService + ?Sized>(&self, step: ItemStep, nav: &N) -> DomainResult<bool> {
        if step == self.step {
            return Ok(false);
        }
        if !nav.is_item_step_accessible(step, &self.completed) {
            return Err(reject(
                "navigation",
                "item_step",
                format!("{} is not reachable yet", step.label()),
            ));
        }
        Ok(true)
    }

    /// Field edits are allowed on any reachable sub-step of this session.
    pub fn check_change<N: NavigationService + ?Sized>(&self, change: &DraftChange, nav: &N) -> DomainResult<()> {
        let step = change.step();
        if step != self.step && !nav.is_item_step_accessible(step, &self.completed) {
            return Err(reject(
                step.section(),
                "step",
                format!("{} is not reachable yet", step.label()),
            ));
        }
        Ok(())
    }

    /// Record this session would commit: the last sub-step must be open and
    /// every sub-step gate must pass.
    pub fn commit_record<G: ValidationGate + ?Sized>(&self, gate: &G) -> DomainResult<ItemRecord> {
        if self.step != ItemStep::LAST {
            return Err(reject(
                "navigation",
                "item_step",
                format!("open {} to confirm the item", ItemStep::LAST.label()),
            ));
        }
        ensure_valid(gate.validate_item(&self.draft))?;
        self.draft.to_record(self.item_id).map_err(DomainError::Validation)
    }

    pub(crate) fn enter(&mut self, step: ItemStep) {
        self.step = step;
    }

    pub(crate) fn complete_step(&mut self, step: ItemStep) {
        self.completed.insert(step);
    }

    pub(crate) fn apply_change(&mut self, change: &DraftChange) {
        self.draft.apply_change(change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::PriceBreakdown;
    use crate::navigation::LinearNavigation;
    use crate::validation::RuleValidationGate;
    use cleanorder_core::{Money, Quantity};

    fn gate() -> RuleValidationGate {
        RuleValidationGate::default()
    }

    fn filled() -> ItemWizard {
        let mut w = ItemWizard::start_new(SessionId::new(), ItemId::new());
        w.apply_change(&DraftChange::SetCategory("Coats".into()));
        w.apply_change(&DraftChange::SetName("Wool Coat".into()));
        let inputs = w.draft().price_inputs();
        w.apply_change(&DraftChange::ApplyPricing(PriceBreakdown {
            inputs,
            base_price: Money::from_minor(45_000),
            adjustments: vec![],
            final_price: Money::from_minor(45_000),
        }));
        w
    }

    #[test]
    fn new_session_starts_at_first_step_with_empty_draft() {
        let w = ItemWizard::start_new(SessionId::new(), ItemId::new());
        assert_eq!(w.current_step(), ItemStep::BasicInfo);
        assert!(w.completed().is_empty());
        assert_eq!(w.draft(), &ItemDraft::new());
        assert_eq!(w.progress(), 0);
    }

    #[test]
    fn next_requires_valid_basic_info() {
        let w = ItemWizard::start_new(SessionId::new(), ItemId::new());
        let err = w.check_next(&gate(), &LinearNavigation).unwrap_err();
        assert!(err.violations().unwrap().has_field("category"));

        let w = filled();
        assert_eq!(
            w.check_next(&gate(), &LinearNavigation).unwrap(),
            ItemStep::Characteristics
        );
    }

    #[test]
    fn previous_at_first_step_is_rejected() {
        let w = ItemWizard::start_new(SessionId::new(), ItemId::new());
        let err = w.check_previous(&LinearNavigation).unwrap_err();
        assert!(err.violations().unwrap().has_field("item_step"));
    }

    #[test]
    fn jump_needs_completed_predecessor() {
        let mut w = filled();
        assert!(w.check_go_to(ItemStep::DefectsAndRisks, &LinearNavigation).is_err());
        assert_eq!(w.check_go_to(ItemStep::BasicInfo, &LinearNavigation), Ok(false));
        w.complete_step(ItemStep::BasicInfo);
        w.complete_step(ItemStep::Characteristics);
        assert_eq!(w.check_go_to(ItemStep::DefectsAndRisks, &LinearNavigation), Ok(true));
    }

    #[test]
    fn commit_only_from_last_step() {
        let mut w = filled();
        assert!(w.commit_record(&gate()).is_err());
        w.enter(ItemStep::LAST);
        let record = w.commit_record(&gate()).unwrap();
        assert_eq!(record.id, w.item_id());
        assert_eq!(record.final_price, Money::from_minor(45_000));
    }

    #[test]
    fn stale_price_blocks_commit() {
        let mut w = filled();
        w.enter(ItemStep::LAST);
        w.apply_change(&DraftChange::SetQuantity(Quantity::whole(3)));
        let err = w.commit_record(&gate()).unwrap_err();
        assert!(err.violations().unwrap().has_field("final_price"));
    }

    #[test]
    fn edit_session_premarks_satisfied_steps() {
        let mut w = filled();
        w.enter(ItemStep::LAST);
        let record = w.commit_record(&gate()).unwrap();

        let edit = ItemWizard::start_edit(SessionId::new(), &record, &gate());
        assert_eq!(edit.mode(), ItemWizardMode::Edit);
        assert_eq!(edit.item_id(), record.id);
        assert_eq!(edit.current_step(), ItemStep::FIRST);
        assert_eq!(edit.completed().len(), 4);
        assert!(!edit.completed().contains(ItemStep::LAST));
        assert_eq!(edit.check_go_to(ItemStep::LAST, &LinearNavigation), Ok(true));
    }

    #[test]
    fn changes_on_unreached_steps_are_rejected() {
        let w = ItemWizard::start_new(SessionId::new(), ItemId::new());
        let change = DraftChange::AddStain("wine".into());
        assert!(w.check_change(&change, &LinearNavigation).is_err());
        assert!(w.check_change(&DraftChange::SetQuantity(Quantity::whole(2)), &LinearNavigation).is_ok());
    }
}
