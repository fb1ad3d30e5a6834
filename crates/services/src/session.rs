//! Composition root: one wizard, its collaborators and the journal.
//!
//! All mutation funnels through [`WizardSession::dispatch`]. Async calls run
//! outside the reducer and their results come back through the same path,
//! tagged with the item session they were issued for:
//!
//! ```text
//! price_request()      -> ticket (SessionId + draft snapshot)
//!   ... pricing call runs, the user may keep editing or cancel ...
//! apply_price(ticket)  -> Applied | Discarded
//! ```
//!
//! A result whose session is no longer open is dropped on arrival. Nothing is
//! aborted and there are no timeouts.

use chrono::NaiveDate;

use cleanorder_core::{DomainError, OrderId, SessionId, StateMachine, Violation};
use cleanorder_wizard::{
    DraftChange, ItemDraft, ItemNavigationSnapshot, ItemRecord, ItemWizard, LinearNavigation,
    NavigationSnapshot, OrderDraft, OrderWizard, PriceBreakdown, WizardCommand, WizardEvent,
    WizardState, WizardStep,
};

use crate::config::WizardConfig;
use crate::error::{ServiceError, SessionError};
use crate::journal::Journal;
use crate::ports::{ItemStore, OrderFinalizer, PricingService};

/// Snapshot handed to the pricing service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRequest {
    pub session: SessionId,
    pub draft: ItemDraft,
}

/// What happened to an async result when it came back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceOutcome {
    Applied(PriceBreakdown),
    /// The item session closed, or the draft changed since the request.
    Discarded,
}

pub struct WizardSession<S, P, F> {
    wizard: OrderWizard,
    journal: Journal,
    finalized: Option<OrderId>,
    store: S,
    pricing: P,
    finalizer: F,
}

impl<S, P, F> WizardSession<S, P, F>
where
    S: ItemStore,
    P: PricingService,
    F: OrderFinalizer,
{
    pub fn new(wizard: OrderWizard, store: S, pricing: P, finalizer: F) -> Self {
        Self {
            wizard,
            journal: Journal::new(),
            finalized: None,
            store,
            pricing,
            finalizer,
        }
    }

    /// Start a wizard for `order_id` and seed it with the order's stored items.
    pub async fn open(
        order_id: OrderId,
        opened_on: NaiveDate,
        config: &WizardConfig,
        store: S,
        pricing: P,
        finalizer: F,
    ) -> Result<Self, SessionError> {
        let wizard = OrderWizard::with_services(
            OrderDraft::new(order_id, opened_on),
            config.gate(),
            LinearNavigation,
        );
        let mut session = Self::new(wizard, store, pricing, finalizer);
        let records = session.store.load_items(order_id).await.map_err(|err| {
            tracing::warn!(%order_id, error = %err, "loading order items failed");
            err
        })?;
        if !records.is_empty() {
            session.dispatch(WizardCommand::LoadItems(records))?;
        }
        tracing::info!(%order_id, items = session.order().items.len(), "wizard session opened");
        Ok(session)
    }

    pub fn wizard(&self) -> &OrderWizard {
        &self.wizard
    }

    pub fn state(&self) -> &WizardState {
        self.wizard.state()
    }

    pub fn order(&self) -> &OrderDraft {
        self.wizard.order()
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn snapshot(&self) -> NavigationSnapshot {
        self.wizard.snapshot()
    }

    pub fn item_snapshot(&self) -> Option<ItemNavigationSnapshot> {
        self.wizard.item_snapshot()
    }

    pub fn pricing(&self) -> &P {
        &self.pricing
    }

    /// Order id assigned by the finalizer, once finalization succeeded.
    pub fn finalized_order(&self) -> Option<OrderId> {
        self.finalized
    }

    /// Synchronous transition; rejected commands leave everything untouched.
    pub fn dispatch(&mut self, command: WizardCommand) -> Result<Vec<WizardEvent>, SessionError> {
        let events = self.wizard.dispatch(command)?;
        self.journal.record(&events);
        Ok(events)
    }

    /// Ticket for pricing the open item draft.
    pub fn price_request(&self) -> Result<PriceRequest, SessionError> {
        let open = self.open_item()?;
        Ok(PriceRequest {
            session: open.session(),
            draft: open.draft().clone(),
        })
    }

    /// Bring a pricing result back into the wizard.
    ///
    /// Results for a closed session, or for a draft whose price inputs changed
    /// since the request, are discarded. A failed call surfaces as
    /// [`SessionError::Service`] and changes nothing.
    pub fn apply_price(
        &mut self,
        request: &PriceRequest,
        result: Result<PriceBreakdown, ServiceError>,
    ) -> Result<PriceOutcome, SessionError> {
        let current = self.state().item_session().map(|s| s.session());
        if current != Some(request.session) {
            tracing::warn!(session = %request.session, "discarding price for a closed item session");
            return Ok(PriceOutcome::Discarded);
        }

        let breakdown = result.map_err(|err| {
            tracing::warn!(session = %request.session, error = %err, "pricing failed");
            err
        })?;

        let still_current = self
            .state()
            .item_session()
            .is_some_and(|s| s.draft().price_inputs() == breakdown.inputs);
        if !still_current {
            tracing::warn!(session = %request.session, "discarding price for superseded item data");
            return Ok(PriceOutcome::Discarded);
        }

        self.dispatch(WizardCommand::EditDraft(DraftChange::ApplyPricing(breakdown.clone())))?;
        Ok(PriceOutcome::Applied(breakdown))
    }

    /// Price the open draft and apply the result.
    pub async fn recalculate_price(&mut self) -> Result<PriceOutcome, SessionError> {
        let request = self.price_request()?;
        let result = self.pricing.calculate_item_price(&request.draft).await;
        self.apply_price(&request, result)
    }

    /// Persist the open item, then commit it.
    ///
    /// The reducer's commit guards run before the store is called, so an
    /// invalid draft never reaches persistence.
    pub async fn complete_item(&mut self) -> Result<ItemRecord, SessionError> {
        let open = self.open_item()?;
        let session = open.session();
        let candidate = self
            .order()
            .items
            .prepare_commit(open, self.wizard.gate(), None)?;

        let saved = self
            .store
            .save_item(self.order().order_id, &candidate)
            .await
            .map_err(|err| {
                tracing::warn!(%session, item_id = %candidate.id, error = %err, "saving item failed");
                err
            })?;

        self.dispatch(WizardCommand::CompleteItemWizard {
            persisted: Some(saved.clone()),
        })?;
        Ok(saved)
    }

    /// Complete the wizard, then hand the order to the finalizer.
    ///
    /// A finalizer failure keeps the completed wizard; calling again retries
    /// only the external call.
    pub async fn finalize(&mut self) -> Result<OrderId, SessionError> {
        if let Some(order_id) = self.finalized {
            return Ok(order_id);
        }
        if self.state().current_step() != WizardStep::Completed {
            self.dispatch(WizardCommand::CompleteWizard)?;
        }

        let order_id = self
            .finalizer
            .finalize_order(self.wizard.order())
            .await
            .map_err(|err| {
                tracing::warn!(order_id = %self.order().order_id, error = %err, "finalizing order failed");
                err
            })?;
        tracing::info!(%order_id, version = self.wizard.version(), "order finalized");
        self.finalized = Some(order_id);
        Ok(order_id)
    }

    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.dispatch(WizardCommand::Reset)?;
        self.finalized = None;
        Ok(())
    }

    fn open_item(&self) -> Result<&ItemWizard, SessionError> {
        self.state().item_session().ok_or_else(|| {
            SessionError::Domain(DomainError::validation(Violation::error(
                WizardStep::ItemManager.section(),
                "item_session",
                "no item is open",
            )))
        })
    }
}
