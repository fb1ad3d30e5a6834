//! Primary wizard state machine.
//!
//! `handle` decides which events a command produces (guards only, no mutation),
//! `apply` evolves [`WizardState`] and the [`OrderDraft`] from those events.
//! While an item session is open, item commands are routed to it and primary
//! navigation is refused.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use cleanorder_core::{
    DomainError, DomainResult, Event, ItemId, OrderId, SessionId, StateMachine, ViolationList,
    execute, invariant_breach,
};

use crate::completion::{CompletedSteps, CompletionTracker};
use crate::draft::{DraftChange, ItemRecord};
use crate::item_wizard::{ItemWizard, ItemWizardMode};
use crate::items::ItemCollection;
use crate::navigation::{
    ItemNavigationSnapshot, LinearNavigation, NavigationService, NavigationSnapshot,
    available_steps,
};
use crate::order::{OrderChange, OrderDraft};
use crate::steps::{ItemStep, PRIMARY_STEPS, WORKING_STEP_COUNT, WizardStep};
use crate::validation::{RuleValidationGate, ValidationGate, ensure_valid, reject};

/// Control state of the wizard.
///
/// `current_sub_step()` is `Some` exactly when an item session is open, and a
/// session can only be open on [`WizardStep::ItemManager`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardState {
    current_step: WizardStep,
    completed: CompletedSteps,
    item_session: Option<ItemWizard>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self::initial()
    }
}

impl WizardState {
    pub fn initial() -> Self {
        Self {
            current_step: WizardStep::FIRST,
            completed: CompletedSteps::new(),
            item_session: None,
        }
    }

    pub fn current_step(&self) -> WizardStep {
        self.current_step
    }

    pub fn current_sub_step(&self) -> Option<ItemStep> {
        self.item_session.as_ref().map(ItemWizard::current_step)
    }

    pub fn is_item_sub_wizard_active(&self) -> bool {
        self.item_session.is_some()
    }

    pub fn completed_steps(&self) -> &CompletedSteps {
        &self.completed
    }

    pub fn item_session(&self) -> Option<&ItemWizard> {
        self.item_session.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.current_step.is_terminal()
    }

    /// Structural consistency of the control state.
    pub fn check_invariants<N: NavigationService + ?Sized>(&self, nav: &N) -> Result<(), String> {
        if self.item_session.is_some() && self.current_step != WizardStep::ItemManager {
            return Err(format!(
                "item session open while on {}",
                self.current_step.label()
            ));
        }
        if self.completed.contains(WizardStep::Completed) {
            return Err("terminal step recorded as completed".into());
        }
        for step in self.completed.iter() {
            if let Some(prev) = nav.previous_step(step) {
                if !self.completed.contains(prev) {
                    return Err(format!(
                        "{} completed without {}",
                        step.label(),
                        prev.label()
                    ));
                }
            }
        }
        if !nav.is_step_accessible(self.current_step, &self.completed) {
            return Err(format!("{} is current but unreachable", self.current_step.label()));
        }
        if self.current_step.is_terminal() && self.completed.len() != WORKING_STEP_COUNT {
            return Err("wizard finished with unfinished steps".into());
        }
        if let Some(session) = &self.item_session {
            if !nav.is_item_step_accessible(session.current_step(), session.completed()) {
                return Err(format!(
                    "{} is current but unreachable in item session",
                    session.current_step().label()
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardCommand {
    Next,
    Prev,
    GoToStep(WizardStep),
    StartItemWizard { session: SessionId, item_id: ItemId },
    EditItem { session: SessionId, item_id: ItemId },
    NextItemStep,
    PrevItemStep,
    GoToItemStep(ItemStep),
    EditDraft(DraftChange),
    /// `persisted` is the record returned by the item store, if the draft was saved first.
    CompleteItemWizard { persisted: Option<ItemRecord> },
    CancelItemWizard,
    RemoveItem(ItemId),
    LoadItems(Vec<ItemRecord>),
    UpdateOrder(OrderChange),
    CompleteWizard,
    Reset,
}

impl WizardCommand {
    /// Start a create session with fresh identifiers.
    pub fn start_item() -> Self {
        Self::StartItemWizard {
            session: SessionId::new(),
            item_id: ItemId::new(),
        }
    }

    pub fn edit_item(item_id: ItemId) -> Self {
        Self::EditItem {
            session: SessionId::new(),
            item_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WizardCommand::Next => "NEXT",
            WizardCommand::Prev => "PREV",
            WizardCommand::GoToStep(_) => "GO_TO_STEP",
            WizardCommand::StartItemWizard { .. } => "START_ITEM_WIZARD",
            WizardCommand::EditItem { .. } => "EDIT_ITEM",
            WizardCommand::NextItemStep => "NEXT_ITEM_STEP",
            WizardCommand::PrevItemStep => "PREV_ITEM_STEP",
            WizardCommand::GoToItemStep(_) => "GO_TO_ITEM_STEP",
            WizardCommand::EditDraft(_) => "EDIT_DRAFT",
            WizardCommand::CompleteItemWizard { .. } => "COMPLETE_ITEM_WIZARD",
            WizardCommand::CancelItemWizard => "CANCEL_ITEM_WIZARD",
            WizardCommand::RemoveItem(_) => "REMOVE_ITEM",
            WizardCommand::LoadItems(_) => "LOAD_ITEMS",
            WizardCommand::UpdateOrder(_) => "UPDATE_ORDER",
            WizardCommand::CompleteWizard => "COMPLETE_WIZARD",
            WizardCommand::Reset => "RESET",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardEvent {
    StepCompleted(WizardStep),
    StepEntered { from: WizardStep, to: WizardStep },
    ItemSessionOpened(ItemWizard),
    ItemStepCompleted { session: SessionId, step: ItemStep },
    ItemStepEntered { session: SessionId, from: ItemStep, to: ItemStep },
    DraftChanged { session: SessionId, change: DraftChange },
    ItemCommitted { session: SessionId, mode: ItemWizardMode, record: ItemRecord },
    ItemSessionCancelled { session: SessionId },
    ItemRemoved(ItemId),
    /// `step` and every later step lose their completion; the cursor moves back
    /// if it was past `step`.
    StepsReopened(WizardStep),
    ItemsLoaded(ItemCollection),
    OrderUpdated(OrderChange),
    WizardCompleted,
    WizardReset,
}

impl Event for WizardEvent {
    fn event_type(&self) -> &'static str {
        match self {
            WizardEvent::StepCompleted(_) => "wizard.step.completed",
            WizardEvent::StepEntered { .. } => "wizard.step.entered",
            WizardEvent::ItemSessionOpened(_) => "wizard.item.session_opened",
            WizardEvent::ItemStepCompleted { .. } => "wizard.item.step_completed",
            WizardEvent::ItemStepEntered { .. } => "wizard.item.step_entered",
            WizardEvent::DraftChanged { .. } => "wizard.item.draft_changed",
            WizardEvent::ItemCommitted { .. } => "wizard.item.committed",
            WizardEvent::ItemSessionCancelled { .. } => "wizard.item.session_cancelled",
            WizardEvent::ItemRemoved(_) => "wizard.item.removed",
            WizardEvent::StepsReopened(_) => "wizard.steps.reopened",
            WizardEvent::ItemsLoaded(_) => "wizard.items.loaded",
            WizardEvent::OrderUpdated(_) => "wizard.order.updated",
            WizardEvent::WizardCompleted => "wizard.completed",
            WizardEvent::WizardReset => "wizard.reset",
        }
    }
}

/// The order wizard: control state, order draft and the services guarding them.
#[derive(Debug, Clone)]
pub struct OrderWizard<G = RuleValidationGate, N = LinearNavigation> {
    state: WizardState,
    order: OrderDraft,
    gate: G,
    nav: N,
    version: u64,
}

impl OrderWizard {
    /// Fresh wizard with the default rules.
    pub fn new(order_id: OrderId, opened_on: NaiveDate) -> Self {
        Self::with_services(
            OrderDraft::new(order_id, opened_on),
            RuleValidationGate::default(),
            LinearNavigation,
        )
    }
}

impl<G: ValidationGate, N: NavigationService> OrderWizard<G, N> {
    pub fn with_services(order: OrderDraft, gate: G, nav: N) -> Self {
        Self {
            state: WizardState::initial(),
            order,
            gate,
            nav,
            version: 0,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn order(&self) -> &OrderDraft {
        &self.order
    }

    pub fn gate(&self) -> &G {
        &self.gate
    }

    pub fn navigation(&self) -> &N {
        &self.nav
    }

    pub fn completion(&self) -> CompletionTracker<'_> {
        CompletionTracker::new(&self.state.completed)
    }

    pub fn progress(&self) -> u8 {
        self.completion().progress()
    }

    /// Violations of whatever the user is looking at: the open item sub-step,
    /// otherwise the current primary step.
    pub fn validate_current(&self) -> ViolationList {
        match &self.state.item_session {
            Some(session) => self
                .gate
                .validate_item_step(session.current_step(), session.draft()),
            None => self.gate.validate_step(self.state.current_step, &self.order),
        }
    }

    /// Stepper view. `can_go_next` also requires the current step to be valid.
    pub fn snapshot(&self) -> NavigationSnapshot {
        let current = self.state.current_step;
        let idle = self.state.item_session.is_none() && !current.is_terminal();
        NavigationSnapshot {
            current_step: current,
            available_steps: available_steps(&self.nav, &self.state.completed),
            completed_steps: self.state.completed.iter().collect(),
            can_go_next: idle
                && self.nav.next_step(current).is_some_and(|s| !s.is_terminal())
                && self.gate.validate_step(current, &self.order).is_empty(),
            can_go_prev: idle && self.nav.previous_step(current).is_some(),
            progress: self.progress(),
        }
    }

    pub fn item_snapshot(&self) -> Option<ItemNavigationSnapshot> {
        self.state
            .item_session
            .as_ref()
            .map(|session| session.snapshot(&self.gate, &self.nav))
    }

    /// Run one command through the reducer.
    ///
    /// On rejection nothing changes and the error carries the violations.
    pub fn dispatch(&mut self, command: WizardCommand) -> DomainResult<Vec<WizardEvent>> {
        match execute(self, &command) {
            Ok(events) => {
                for event in &events {
                    tracing::debug!(
                        event = event.event_type(),
                        step = ?self.state.current_step,
                        sub_step = ?self.state.current_sub_step(),
                        "wizard transition applied"
                    );
                    log_lifecycle(self.order.order_id, event);
                }
                Ok(events)
            }
            Err(err) => {
                tracing::debug!(command = command.name(), error = %err, "wizard command rejected");
                Err(err)
            }
        }
    }

    fn open_session(&self) -> DomainResult<&ItemWizard> {
        self.state
            .item_session
            .as_ref()
            .ok_or_else(|| reject(WizardStep::ItemManager.section(), "item_session", "no item is open"))
    }

    fn ensure_no_session(&self) -> DomainResult<()> {
        if self.state.item_session.is_some() {
            return Err(reject(
                WizardStep::ItemManager.section(),
                "item_session",
                "finish or cancel the open item first",
            ));
        }
        Ok(())
    }

    fn ensure_on_items_step(&self) -> DomainResult<()> {
        if self.state.current_step != WizardStep::ItemManager {
            return Err(reject(
                WizardStep::ItemManager.section(),
                "step",
                "items can only be managed on the items step",
            ));
        }
        Ok(())
    }

    fn decide(&self, command: &WizardCommand) -> DomainResult<Vec<WizardEvent>> {
        if self.state.is_finished() && !matches!(command, WizardCommand::Reset) {
            return Err(reject(
                "wizard",
                "state",
                "the order is already completed; reset to start a new one",
            ));
        }

        match command {
            WizardCommand::Next => self.decide_next(),
            WizardCommand::Prev => {
                self.ensure_no_session()?;
                let from = self.state.current_step;
                let to = self
                    .nav
                    .previous_step(from)
                    .ok_or_else(|| reject("navigation", "step", "already at the first step"))?;
                Ok(vec![WizardEvent::StepEntered { from, to }])
            }
            WizardCommand::GoToStep(to) => self.decide_go_to(*to),
            WizardCommand::StartItemWizard { session, item_id } => {
                self.ensure_on_items_step()?;
                self.ensure_no_session()?;
                ensure_valid(self.gate.validate_item_capacity(&self.order))?;
                let wizard = self.order.items.begin_add(*session, *item_id)?;
                Ok(vec![WizardEvent::ItemSessionOpened(wizard)])
            }
            WizardCommand::EditItem { session, item_id } => {
                self.ensure_on_items_step()?;
                self.ensure_no_session()?;
                let wizard = self.order.items.begin_edit(*session, *item_id, &self.gate)?;
                Ok(vec![WizardEvent::ItemSessionOpened(wizard)])
            }
            WizardCommand::NextItemStep => {
                let session = self.open_session()?;
                let from = session.current_step();
                let to = session.check_next(&self.gate, &self.nav)?;
                let mut events = Vec::with_capacity(2);
                if !session.completed().contains(from) {
                    events.push(WizardEvent::ItemStepCompleted {
                        session: session.session(),
                        step: from,
                    });
                }
                events.push(WizardEvent::ItemStepEntered {
                    session: session.session(),
                    from,
                    to,
                });
                Ok(events)
            }
            WizardCommand::PrevItemStep => {
                let session = self.open_session()?;
                let to = session.check_previous(&self.nav)?;
                Ok(vec![WizardEvent::ItemStepEntered {
                    session: session.session(),
                    from: session.current_step(),
                    to,
                }])
            }
            WizardCommand::GoToItemStep(to) => {
                let session = self.open_session()?;
                if !session.check_go_to(*to, &self.nav)? {
                    return Ok(Vec::new());
                }
                Ok(vec![WizardEvent::ItemStepEntered {
                    session: session.session(),
                    from: session.current_step(),
                    to: *to,
                }])
            }
            WizardCommand::EditDraft(change) => {
                let session = self.open_session()?;
                session.check_change(change, &self.nav)?;
                Ok(vec![WizardEvent::DraftChanged {
                    session: session.session(),
                    change: change.clone(),
                }])
            }
            WizardCommand::CompleteItemWizard { persisted } => {
                let session = self.open_session()?;
                let record = self
                    .order
                    .items
                    .prepare_commit(session, &self.gate, persisted.as_ref())?;
                Ok(vec![WizardEvent::ItemCommitted {
                    session: session.session(),
                    mode: session.mode(),
                    record,
                }])
            }
            WizardCommand::CancelItemWizard => {
                let session = self.open_session()?;
                Ok(vec![WizardEvent::ItemSessionCancelled {
                    session: session.session(),
                }])
            }
            WizardCommand::RemoveItem(item_id) => {
                self.ensure_on_items_step()?;
                self.ensure_no_session()?;
                if !self.order.items.contains(*item_id) {
                    return Err(DomainError::not_found(format!("item {item_id}")));
                }
                let mut events = vec![WizardEvent::ItemRemoved(*item_id)];
                if self.order.items.len() == 1 {
                    events.extend(self.reopen_items_step());
                }
                Ok(events)
            }
            WizardCommand::LoadItems(records) => {
                self.ensure_no_session()?;
                let items = ItemCollection::from_records(records.clone())?;
                let emptied = items.is_empty();
                let mut events = vec![WizardEvent::ItemsLoaded(items)];
                if emptied {
                    events.extend(self.reopen_items_step());
                }
                Ok(events)
            }
            WizardCommand::UpdateOrder(change) => {
                self.ensure_no_session()?;
                let step = change.step();
                if step != self.state.current_step
                    && !self.nav.is_step_accessible(step, &self.state.completed)
                {
                    return Err(reject(
                        step.section(),
                        "step",
                        format!("{} is not reachable yet", step.label()),
                    ));
                }
                Ok(vec![WizardEvent::OrderUpdated(change.clone())])
            }
            WizardCommand::CompleteWizard => {
                self.ensure_no_session()?;
                ensure_valid(self.gate.validate_order(&self.order))?;
                let mut events: Vec<WizardEvent> = PRIMARY_STEPS
                    .into_iter()
                    .filter(|s| !s.is_terminal() && !self.state.completed.contains(*s))
                    .map(WizardEvent::StepCompleted)
                    .collect();
                events.push(WizardEvent::WizardCompleted);
                Ok(events)
            }
            WizardCommand::Reset => Ok(vec![WizardEvent::WizardReset]),
        }
    }

    fn decide_next(&self) -> DomainResult<Vec<WizardEvent>> {
        self.ensure_no_session()?;
        let from = self.state.current_step;
        ensure_valid(self.gate.validate_step(from, &self.order))?;
        let to = self
            .nav
            .next_step(from)
            .ok_or_else(|| reject("navigation", "step", "already at the last step"))?;
        if to.is_terminal() {
            return Err(reject(
                "navigation",
                "step",
                "use COMPLETE_WIZARD to finish the order",
            ));
        }
        let mut events = Vec::with_capacity(2);
        if !self.state.completed.contains(from) {
            events.push(WizardEvent::StepCompleted(from));
        }
        events.push(WizardEvent::StepEntered { from, to });
        Ok(events)
    }

    fn decide_go_to(&self, to: WizardStep) -> DomainResult<Vec<WizardEvent>> {
        self.ensure_no_session()?;
        if to.is_terminal() {
            return Err(reject(
                "navigation",
                "step",
                "use COMPLETE_WIZARD to finish the order",
            ));
        }
        let from = self.state.current_step;
        if to == from {
            return Ok(Vec::new());
        }
        if !self.nav.is_step_accessible(to, &self.state.completed) {
            return Err(reject(
                "navigation",
                "step",
                format!("{} is not reachable yet", to.label()),
            ));
        }
        Ok(vec![WizardEvent::StepEntered { from, to }])
    }

    /// Items step loses completion once the collection is about to be empty.
    fn reopen_items_step(&self) -> Option<WizardEvent> {
        self.state
            .completed
            .contains(WizardStep::ItemManager)
            .then_some(WizardEvent::StepsReopened(WizardStep::ItemManager))
    }
}

impl<G: ValidationGate, N: NavigationService> StateMachine for OrderWizard<G, N> {
    type Command = WizardCommand;
    type Event = WizardEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        evolve(&mut self.state, &mut self.order, event);
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        let events = self.decide(command)?;
        if !events.is_empty() {
            // Replay on a copy; a configuration that breaks the state
            // invariants is never applied.
            let mut state = self.state.clone();
            let mut order = self.order.clone();
            for event in &events {
                evolve(&mut state, &mut order, event);
            }
            state.check_invariants(&self.nav).map_err(invariant_breach)?;
        }
        Ok(events)
    }

    fn version(&self) -> u64 {
        self.version
    }
}

fn evolve(state: &mut WizardState, order: &mut OrderDraft, event: &WizardEvent) {
    match event {
        WizardEvent::StepCompleted(step) => {
            state.completed.insert(*step);
        }
        WizardEvent::StepEntered { to, .. } => state.current_step = *to,
        WizardEvent::ItemSessionOpened(session) => state.item_session = Some(session.clone()),
        WizardEvent::ItemStepCompleted { session, step } => {
            if let Some(open) = session_mut(state, *session) {
                open.complete_step(*step);
            }
        }
        WizardEvent::ItemStepEntered { session, to, .. } => {
            if let Some(open) = session_mut(state, *session) {
                open.enter(*to);
            }
        }
        WizardEvent::DraftChanged { session, change } => {
            if let Some(open) = session_mut(state, *session) {
                open.apply_change(change);
            }
        }
        WizardEvent::ItemCommitted { record, .. } => {
            order.items.upsert(record.clone());
            state.item_session = None;
        }
        WizardEvent::ItemSessionCancelled { .. } => state.item_session = None,
        WizardEvent::ItemRemoved(item_id) => {
            order.items.remove(*item_id);
        }
        WizardEvent::StepsReopened(step) => {
            state.completed.truncate_from(*step);
            if state.current_step > *step {
                state.current_step = *step;
            }
        }
        WizardEvent::ItemsLoaded(items) => order.items.replace_all(items.clone()),
        WizardEvent::OrderUpdated(change) => order.apply_change(change),
        WizardEvent::WizardCompleted => {
            state.current_step = WizardStep::Completed;
            state.item_session = None;
        }
        WizardEvent::WizardReset => {
            *state = WizardState::initial();
            *order = OrderDraft::new(order.order_id, order.opened_on);
        }
    }
}

fn session_mut(state: &mut WizardState, session: SessionId) -> Option<&mut ItemWizard> {
    state
        .item_session
        .as_mut()
        .filter(|open| open.session() == session)
}

fn log_lifecycle(order_id: OrderId, event: &WizardEvent) {
    match event {
        WizardEvent::ItemSessionOpened(session) => tracing::info!(
            %order_id,
            session = %session.session(),
            item_id = %session.item_id(),
            mode = ?session.mode(),
            "item session opened"
        ),
        WizardEvent::ItemCommitted { session, mode, record } => tracing::info!(
            %order_id,
            %session,
            item_id = %record.id,
            ?mode,
            final_price = %record.final_price,
            "item committed"
        ),
        WizardEvent::ItemSessionCancelled { session } => {
            tracing::info!(%order_id, %session, "item session cancelled")
        }
        WizardEvent::WizardCompleted => tracing::info!(%order_id, "wizard completed"),
        WizardEvent::WizardReset => tracing::info!(%order_id, "wizard reset"),
        _ => {}
    }
}
