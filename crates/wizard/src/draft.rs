//! Item draft (transient, owned by one sub-wizard session) and the committed
//! item record it turns into.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use cleanorder_core::{ItemId, Money, Quantity, Violation, ViolationList};

use crate::steps::ItemStep;

/// Unit the quantity is measured in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Pieces,
    Kilograms,
}

/// Visible wear recorded at reception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WearLevel {
    Percent10,
    Percent30,
    Percent50,
    Percent75,
}

impl WearLevel {
    pub fn percent(self) -> u8 {
        match self {
            WearLevel::Percent10 => 10,
            WearLevel::Percent30 => 30,
            WearLevel::Percent50 => 50,
            WearLevel::Percent75 => 75,
        }
    }
}

/// Filler of padded items (down, synthetic...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filler {
    pub kind: Option<String>,
    pub compressed: bool,
}

/// Reference to an uploaded photo. Upload itself happens outside the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRef {
    pub id: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
}

/// The draft fields a price depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceInputs {
    pub category: Option<String>,
    pub quantity: Quantity,
    pub unit: Unit,
    pub material: Option<String>,
    pub modifiers: Vec<String>,
}

/// One priced modifier line (surcharge positive, reduction negative).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceAdjustment {
    pub code: String,
    pub amount_minor: i64,
}

/// Result of the external pricing service, tagged with the inputs it priced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub inputs: PriceInputs,
    pub base_price: Money,
    pub adjustments: Vec<PriceAdjustment>,
    pub final_price: Money,
}

/// A single field change on the open draft.
///
/// Every draft mutation is expressed as one of these and goes through the
/// wizard reducer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftChange {
    SetCategory(String),
    SetName(String),
    SetQuantity(Quantity),
    SetUnit(Unit),
    SetMaterial(Option<String>),
    SetColor(Option<String>),
    SetFiller(Filler),
    SetWearLevel(Option<WearLevel>),
    AddStain(String),
    RemoveStain(String),
    AddDefect(String),
    RemoveDefect(String),
    SetNoWarranty { enabled: bool, reason: Option<String> },
    SetNotes(Option<String>),
    AddModifier(String),
    RemoveModifier(String),
    ApplyPricing(PriceBreakdown),
    AttachPhoto(PhotoRef),
    RemovePhoto(String),
}

impl DraftChange {
    /// Sub-step whose form produces this change.
    pub fn step(&self) -> ItemStep {
        match self {
            DraftChange::SetCategory(_)
            | DraftChange::SetName(_)
            | DraftChange::SetQuantity(_)
            | DraftChange::SetUnit(_) => ItemStep::BasicInfo,
            DraftChange::SetMaterial(_)
            | DraftChange::SetColor(_)
            | DraftChange::SetFiller(_)
            | DraftChange::SetWearLevel(_) => ItemStep::Characteristics,
            DraftChange::AddStain(_)
            | DraftChange::RemoveStain(_)
            | DraftChange::AddDefect(_)
            | DraftChange::RemoveDefect(_)
            | DraftChange::SetNoWarranty { .. }
            | DraftChange::SetNotes(_) => ItemStep::DefectsAndRisks,
            DraftChange::AddModifier(_)
            | DraftChange::RemoveModifier(_)
            | DraftChange::ApplyPricing(_) => ItemStep::PriceCalculation,
            DraftChange::AttachPhoto(_) | DraftChange::RemovePhoto(_) => ItemStep::PhotoManagement,
        }
    }
}

/// Mutable record accumulated across the item sub-steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub category: Option<String>,
    pub name: Option<String>,
    pub quantity: Quantity,
    pub unit: Unit,
    pub material: Option<String>,
    pub color: Option<String>,
    pub filler: Filler,
    pub wear_level: Option<WearLevel>,
    pub stains: BTreeSet<String>,
    pub defects: BTreeSet<String>,
    pub no_warranty: bool,
    pub no_warranty_reason: Option<String>,
    pub notes: Option<String>,
    pub modifiers: Vec<String>,
    pub pricing: Option<PriceBreakdown>,
    pub photos: Vec<PhotoRef>,
}

impl Default for ItemDraft {
    fn default() -> Self {
        Self {
            category: None,
            name: None,
            quantity: Quantity::ONE,
            unit: Unit::Pieces,
            material: None,
            color: None,
            filler: Filler::default(),
            wear_level: None,
            stains: BTreeSet::new(),
            defects: BTreeSet::new(),
            no_warranty: false,
            no_warranty_reason: None,
            notes: None,
            modifiers: Vec::new(),
            pricing: None,
            photos: Vec::new(),
        }
    }
}

fn normalized(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl ItemDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a draft from a committed record (edit entry).
    pub fn from_record(record: &ItemRecord) -> Self {
        let mut draft = Self {
            category: Some(record.category.clone()),
            name: Some(record.name.clone()),
            quantity: record.quantity,
            unit: record.unit,
            material: record.material.clone(),
            color: record.color.clone(),
            filler: record.filler.clone(),
            wear_level: record.wear_level,
            stains: record.stains.clone(),
            defects: record.defects.clone(),
            no_warranty: record.no_warranty_reason.is_some(),
            no_warranty_reason: record.no_warranty_reason.clone(),
            notes: record.notes.clone(),
            modifiers: record.modifiers.clone(),
            pricing: None,
            photos: record.photos.clone(),
        };
        draft.pricing = Some(PriceBreakdown {
            inputs: draft.price_inputs(),
            base_price: record.base_price,
            adjustments: record.adjustments.clone(),
            final_price: record.final_price,
        });
        draft
    }

    pub fn price_inputs(&self) -> PriceInputs {
        PriceInputs {
            category: self.category.clone(),
            quantity: self.quantity,
            unit: self.unit,
            material: self.material.clone(),
            modifiers: self.modifiers.clone(),
        }
    }

    /// Breakdown matching the current inputs, if any.
    pub fn current_pricing(&self) -> Option<&PriceBreakdown> {
        self.pricing
            .as_ref()
            .filter(|p| p.inputs == self.price_inputs())
    }

    /// A breakdown exists but a price-affecting field changed since.
    pub fn is_price_stale(&self) -> bool {
        self.pricing.is_some() && self.current_pricing().is_none()
    }

    pub fn base_price(&self) -> Option<Money> {
        self.current_pricing().map(|p| p.base_price)
    }

    pub fn final_price(&self) -> Option<Money> {
        self.current_pricing().map(|p| p.final_price)
    }

    /// Apply one change in place.
    pub fn apply_change(&mut self, change: &DraftChange) {
        match change.clone() {
            DraftChange::SetCategory(v) => self.category = normalized(v),
            DraftChange::SetName(v) => self.name = normalized(v),
            DraftChange::SetQuantity(q) => self.quantity = q,
            DraftChange::SetUnit(u) => self.unit = u,
            DraftChange::SetMaterial(v) => self.material = v.and_then(normalized),
            DraftChange::SetColor(v) => self.color = v.and_then(normalized),
            DraftChange::SetFiller(f) => {
                self.filler = Filler {
                    kind: f.kind.and_then(normalized),
                    compressed: f.compressed,
                }
            }
            DraftChange::SetWearLevel(w) => self.wear_level = w,
            DraftChange::AddStain(tag) => {
                if let Some(tag) = normalized(tag) {
                    self.stains.insert(tag);
                }
            }
            DraftChange::RemoveStain(tag) => {
                self.stains.remove(tag.trim());
            }
            DraftChange::AddDefect(tag) => {
                if let Some(tag) = normalized(tag) {
                    self.defects.insert(tag);
                }
            }
            DraftChange::RemoveDefect(tag) => {
                self.defects.remove(tag.trim());
            }
            DraftChange::SetNoWarranty { enabled, reason } => {
                self.no_warranty = enabled;
                // Turning the flag off discards any justification.
                self.no_warranty_reason = if enabled { reason.and_then(normalized) } else { None };
            }
            DraftChange::SetNotes(v) => self.notes = v.and_then(normalized),
            DraftChange::AddModifier(code) => {
                if let Some(code) = normalized(code) {
                    if !self.modifiers.contains(&code) {
                        self.modifiers.push(code);
                    }
                }
            }
            DraftChange::RemoveModifier(code) => {
                let code = code.trim();
                self.modifiers.retain(|m| m != code);
            }
            DraftChange::ApplyPricing(breakdown) => self.pricing = Some(breakdown),
            DraftChange::AttachPhoto(photo) => {
                self.photos.retain(|p| p.id != photo.id);
                self.photos.push(photo);
            }
            DraftChange::RemovePhoto(id) => self.photos.retain(|p| p.id != id),
        }
    }

    /// Convert into a committed record under `id`.
    ///
    /// Only fails on structurally missing data; rule checks belong to the gate.
    pub fn to_record(&self, id: ItemId) -> Result<ItemRecord, ViolationList> {
        let mut violations = ViolationList::new();
        let section = ItemStep::BasicInfo.section();
        if self.category.is_none() {
            violations.error(section, "category", "category is required");
        }
        if self.name.is_none() {
            violations.error(section, "name", "item name is required");
        }
        let pricing = self.current_pricing();
        if pricing.is_none() {
            violations.push(Violation::error(
                ItemStep::PriceCalculation.section(),
                "final_price",
                "price must be calculated for the current item data",
            ));
        }
        let (Some(category), Some(name), Some(pricing)) = (&self.category, &self.name, pricing)
        else {
            return Err(violations);
        };

        Ok(ItemRecord {
            id,
            category: category.clone(),
            name: name.clone(),
            quantity: self.quantity,
            unit: self.unit,
            material: self.material.clone(),
            color: self.color.clone(),
            filler: self.filler.clone(),
            wear_level: self.wear_level,
            stains: self.stains.clone(),
            defects: self.defects.clone(),
            no_warranty_reason: if self.no_warranty { self.no_warranty_reason.clone() } else { None },
            notes: self.notes.clone(),
            modifiers: self.modifiers.clone(),
            base_price: pricing.base_price,
            adjustments: pricing.adjustments.clone(),
            final_price: pricing.final_price,
            photos: self.photos.clone(),
        })
    }
}

/// Item attached to the order once committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    pub category: String,
    pub name: String,
    pub quantity: Quantity,
    pub unit: Unit,
    pub material: Option<String>,
    pub color: Option<String>,
    pub filler: Filler,
    pub wear_level: Option<WearLevel>,
    pub stains: BTreeSet<String>,
    pub defects: BTreeSet<String>,
    pub no_warranty_reason: Option<String>,
    pub notes: Option<String>,
    pub modifiers: Vec<String>,
    pub base_price: Money,
    pub adjustments: Vec<PriceAdjustment>,
    pub final_price: Money,
    pub photos: Vec<PhotoRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn priced(draft: &mut ItemDraft, final_minor: u64) {
        let breakdown = PriceBreakdown {
            inputs: draft.price_inputs(),
            base_price: Money::from_minor(final_minor),
            adjustments: Vec::new(),
            final_price: Money::from_minor(final_minor),
        };
        draft.apply_change(&DraftChange::ApplyPricing(breakdown));
    }

    fn coat() -> ItemDraft {
        let mut draft = ItemDraft::new();
        draft.apply_change(&DraftChange::SetCategory("Coats".into()));
        draft.apply_change(&DraftChange::SetName("Wool Coat".into()));
        draft
    }

    #[test]
    fn price_goes_stale_when_inputs_change() {
        let mut draft = coat();
        priced(&mut draft, 45_000);
        assert_eq!(draft.final_price(), Some(Money::from_minor(45_000)));
        assert!(!draft.is_price_stale());

        draft.apply_change(&DraftChange::SetQuantity(Quantity::whole(2)));
        assert!(draft.is_price_stale());
        assert_eq!(draft.final_price(), None);

        draft.apply_change(&DraftChange::SetQuantity(Quantity::ONE));
        assert!(!draft.is_price_stale());
    }

    #[test]
    fn non_price_fields_keep_price_fresh() {
        let mut draft = coat();
        priced(&mut draft, 45_000);
        draft.apply_change(&DraftChange::SetColor(Some("navy".into())));
        draft.apply_change(&DraftChange::AddStain("grease".into()));
        assert!(!draft.is_price_stale());
    }

    #[test]
    fn disabling_no_warranty_clears_reason() {
        let mut draft = coat();
        draft.apply_change(&DraftChange::SetNoWarranty {
            enabled: true,
            reason: Some("fabric too thin".into()),
        });
        assert_eq!(draft.no_warranty_reason.as_deref(), Some("fabric too thin"));
        draft.apply_change(&DraftChange::SetNoWarranty { enabled: false, reason: Some("x".into()) });
        assert!(!draft.no_warranty);
        assert_eq!(draft.no_warranty_reason, None);
    }

    #[test]
    fn blank_values_are_treated_as_missing() {
        let mut draft = ItemDraft::new();
        draft.apply_change(&DraftChange::SetCategory("   ".into()));
        draft.apply_change(&DraftChange::AddStain(" ".into()));
        draft.apply_change(&DraftChange::AddModifier("silk".into()));
        draft.apply_change(&DraftChange::AddModifier("silk".into()));
        assert_eq!(draft.category, None);
        assert!(draft.stains.is_empty());
        assert_eq!(draft.modifiers, vec!["silk".to_string()]);
    }

    #[test]
    fn record_round_trips_into_fresh_draft() {
        let mut draft = coat();
        draft.apply_change(&DraftChange::AddModifier("manual_cleaning".into()));
        priced(&mut draft, 52_000);
        let id = ItemId::new();
        let record = draft.to_record(id).unwrap();
        assert_eq!(record.id, id);

        let reopened = ItemDraft::from_record(&record);
        assert_eq!(reopened.final_price(), Some(Money::from_minor(52_000)));
        assert!(!reopened.is_price_stale());
    }

    #[test]
    fn unpriced_draft_cannot_become_record() {
        let draft = coat();
        let violations = draft.to_record(ItemId::new()).unwrap_err();
        assert!(violations.has_field("final_price"));
    }

    #[test]
    fn changes_map_to_their_sub_step() {
        assert_eq!(DraftChange::SetQuantity(Quantity::whole(3)).step(), ItemStep::BasicInfo);
        assert_eq!(DraftChange::RemovePhoto("p".into()).step(), ItemStep::PhotoManagement);
    }
}
