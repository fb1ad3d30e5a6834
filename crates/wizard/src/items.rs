//! Item collection manager: committed items of one order.
//!
//! Records only ever enter through a sub-wizard commit or a bulk load; the
//! mutating methods are crate-private so the reducer stays the single writer.

use serde::{Deserialize, Serialize};

use cleanorder_core::{DomainError, DomainResult, ItemId, Money, SessionId};

use crate::draft::ItemRecord;
use crate::item_wizard::{ItemWizard, ItemWizardMode};
use crate::validation::ValidationGate;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemCollection {
    items: Vec<ItemRecord>,
}

impl ItemCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from loaded records, rejecting duplicate ids.
    pub fn from_records(records: Vec<ItemRecord>) -> DomainResult<Self> {
        let mut collection = Self::new();
        for record in records {
            if collection.contains(record.id) {
                return Err(DomainError::conflict(format!("duplicate item id {}", record.id)));
            }
            collection.items.push(record);
        }
        Ok(collection)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemRecord> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[ItemRecord] {
        &self.items
    }

    pub fn get(&self, id: ItemId) -> Option<&ItemRecord> {
        self.items.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.get(id).is_some()
    }

    pub fn total(&self) -> Money {
        self.items.iter().map(|r| r.final_price).sum()
    }

    /// Open a create session for a new item.
    pub fn begin_add(&self, session: SessionId, item_id: ItemId) -> DomainResult<ItemWizard> {
        if self.contains(item_id) {
            return Err(DomainError::conflict(format!("item {item_id} already exists")));
        }
        Ok(ItemWizard::start_new(session, item_id))
    }

    /// Open an edit session pre-populated from the stored record.
    pub fn begin_edit<G: ValidationGate + ?Sized>(
        &self,
        session: SessionId,
        item_id: ItemId,
        gate: &G,
    ) -> DomainResult<ItemWizard> {
        let record = self
            .get(item_id)
            .ok_or_else(|| DomainError::not_found(format!("item {item_id}")))?;
        Ok(ItemWizard::start_edit(session, record, gate))
    }

    /// Decide the record a session would commit, without touching the collection.
    ///
    /// `persisted` is the record returned by the item store, when the caller saved
    /// the draft first; it must belong to the session's item.
    pub fn prepare_commit<G: ValidationGate + ?Sized>(
        &self,
        wizard: &ItemWizard,
        gate: &G,
        persisted: Option<&ItemRecord>,
    ) -> DomainResult<ItemRecord> {
        let record = wizard.commit_record(gate)?;
        match wizard.mode() {
            ItemWizardMode::Create if self.contains(record.id) => {
                return Err(DomainError::conflict(format!("item {} already exists", record.id)));
            }
            ItemWizardMode::Edit if !self.contains(record.id) => {
                return Err(DomainError::not_found(format!("item {}", record.id)));
            }
            _ => {}
        }
        match persisted {
            None => Ok(record),
            Some(saved) if saved.id == record.id => Ok(saved.clone()),
            Some(saved) => Err(DomainError::conflict(format!(
                "persisted item {} does not match session item {}",
                saved.id, record.id
            ))),
        }
    }

    /// Append a new record or replace the existing one with the same id.
    pub(crate) fn upsert(&mut self, record: ItemRecord) {
        match self.items.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => *slot = record,
            None => self.items.push(record),
        }
    }

    pub(crate) fn remove(&mut self, id: ItemId) -> Option<ItemRecord> {
        let index = self.items.iter().position(|r| r.id == id)?;
        Some(self.items.remove(index))
    }

    pub(crate) fn replace_all(&mut self, other: ItemCollection) {
        *self = other;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::{DraftChange, ItemDraft, PriceBreakdown};
    use crate::steps::ItemStep;
    use crate::validation::RuleValidationGate;
    use cleanorder_core::Quantity;

    fn record(name: &str, price: u64) -> ItemRecord {
        let mut draft = ItemDraft::new();
        draft.apply_change(&DraftChange::SetCategory("Coats".into()));
        draft.apply_change(&DraftChange::SetName(name.into()));
        let breakdown = PriceBreakdown {
            inputs: draft.price_inputs(),
            base_price: Money::from_minor(price),
            adjustments: vec![],
            final_price: Money::from_minor(price),
        };
        draft.apply_change(&DraftChange::ApplyPricing(breakdown));
        draft.to_record(ItemId::new()).unwrap()
    }

    #[test]
    fn total_sums_final_prices() {
        let items = ItemCollection::from_records(vec![record("Coat", 40_000), record("Scarf", 12_050)]).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items.total(), Money::from_minor(52_050));
    }

    #[test]
    fn duplicate_ids_are_rejected_on_load() {
        let a = record("Coat", 100);
        let err = ItemCollection::from_records(vec![a.clone(), a]).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn editing_unknown_item_is_not_found() {
        let items = ItemCollection::new();
        let err = items
            .begin_edit(SessionId::new(), ItemId::new(), &RuleValidationGate::default())
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn edit_session_starts_prepopulated() {
        let existing = record("Wool Coat", 45_000);
        let items = ItemCollection::from_records(vec![existing.clone()]).unwrap();
        let wizard = items
            .begin_edit(SessionId::new(), existing.id, &RuleValidationGate::default())
            .unwrap();
        assert_eq!(wizard.mode(), ItemWizardMode::Edit);
        assert_eq!(wizard.current_step(), ItemStep::FIRST);
        assert_eq!(wizard.draft().name.as_deref(), Some("Wool Coat"));
    }

    #[test]
    fn upsert_replaces_in_place() {
        let existing = record("Wool Coat", 45_000);
        let mut items = ItemCollection::from_records(vec![existing.clone(), record("Scarf", 100)]).unwrap();
        let mut changed = existing.clone();
        changed.quantity = Quantity::whole(2);
        items.upsert(changed);
        assert_eq!(items.len(), 2);
        assert_eq!(items.as_slice()[0].quantity, Quantity::whole(2));
    }

    #[test]
    fn remove_returns_the_record() {
        let existing = record("Wool Coat", 45_000);
        let mut items = ItemCollection::from_records(vec![existing.clone()]).unwrap();
        assert_eq!(items.remove(existing.id).map(|r| r.id), Some(existing.id));
        assert!(items.remove(existing.id).is_none());
        assert!(items.is_empty());
    }
}
