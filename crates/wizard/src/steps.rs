//! Step registry: the fixed order of primary steps and item sub-steps.

use serde::{Deserialize, Serialize};

/// Top-level wizard stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WizardStep {
    ClientSelection,
    BranchSelection,
    ItemManager,
    OrderParameters,
    Confirmation,
    /// Terminal pseudo-step reached through `COMPLETE_WIZARD`.
    Completed,
}

/// Sub-step of the item sub-wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStep {
    BasicInfo,
    Characteristics,
    DefectsAndRisks,
    PriceCalculation,
    PhotoManagement,
}

/// Primary steps in execution order (terminal step last).
pub const PRIMARY_STEPS: [WizardStep; 6] = [
    WizardStep::ClientSelection,
    WizardStep::BranchSelection,
    WizardStep::ItemManager,
    WizardStep::OrderParameters,
    WizardStep::Confirmation,
    WizardStep::Completed,
];

/// Item sub-steps in execution order.
pub const ITEM_STEPS: [ItemStep; 5] = [
    ItemStep::BasicInfo,
    ItemStep::Characteristics,
    ItemStep::DefectsAndRisks,
    ItemStep::PriceCalculation,
    ItemStep::PhotoManagement,
];

/// Number of primary steps a user actually works through (`Completed` excluded).
pub const WORKING_STEP_COUNT: usize = PRIMARY_STEPS.len() - 1;

impl WizardStep {
    pub const FIRST: WizardStep = WizardStep::ClientSelection;

    /// Position in [`PRIMARY_STEPS`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<WizardStep> {
        PRIMARY_STEPS.get(index).copied()
    }

    pub fn is_terminal(self) -> bool {
        self == WizardStep::Completed
    }

    /// Steps that must be passed to finish the order. Order parameters have
    /// usable defaults apart from the date and payment method, so they are optional
    /// in the stepper even though their gate still runs on completion.
    pub fn is_required(self) -> bool {
        !matches!(self, WizardStep::OrderParameters | WizardStep::Completed)
    }

    /// Validation section name used in violations.
    pub fn section(self) -> &'static str {
        match self {
            WizardStep::ClientSelection => "client",
            WizardStep::BranchSelection => "branch",
            WizardStep::ItemManager => "items",
            WizardStep::OrderParameters => "parameters",
            WizardStep::Confirmation => "confirmation",
            WizardStep::Completed => "completed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WizardStep::ClientSelection => "Client selection",
            WizardStep::BranchSelection => "Branch selection",
            WizardStep::ItemManager => "Items",
            WizardStep::OrderParameters => "Order parameters",
            WizardStep::Confirmation => "Confirmation",
            WizardStep::Completed => "Completed",
        }
    }
}

impl ItemStep {
    pub const FIRST: ItemStep = ItemStep::BasicInfo;
    pub const LAST: ItemStep = ItemStep::PhotoManagement;

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<ItemStep> {
        ITEM_STEPS.get(index).copied()
    }

    /// Defects and photos may be skipped; everything else must be filled in.
    pub fn is_required(self) -> bool {
        !matches!(self, ItemStep::DefectsAndRisks | ItemStep::PhotoManagement)
    }

    pub fn section(self) -> &'static str {
        match self {
            ItemStep::BasicInfo => "item.basic",
            ItemStep::Characteristics => "item.characteristics",
            ItemStep::DefectsAndRisks => "item.defects",
            ItemStep::PriceCalculation => "item.pricing",
            ItemStep::PhotoManagement => "item.photos",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ItemStep::BasicInfo => "Basic information",
            ItemStep::Characteristics => "Characteristics",
            ItemStep::DefectsAndRisks => "Defects and risks",
            ItemStep::PriceCalculation => "Price calculation",
            ItemStep::PhotoManagement => "Photos",
        }
    }
}

impl core::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

impl core::fmt::Display for ItemStep {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_match_registry_order() {
        for (i, step) in PRIMARY_STEPS.iter().enumerate() {
            assert_eq!(step.index(), i);
            assert_eq!(WizardStep::from_index(i), Some(*step));
        }
        for (i, step) in ITEM_STEPS.iter().enumerate() {
            assert_eq!(step.index(), i);
            assert_eq!(ItemStep::from_index(i), Some(*step));
        }
        assert_eq!(WizardStep::from_index(6), None);
        assert_eq!(ItemStep::from_index(5), None);
    }

    #[test]
    fn required_flags() {
        assert!(WizardStep::ClientSelection.is_required());
        assert!(!WizardStep::OrderParameters.is_required());
        assert!(ItemStep::PriceCalculation.is_required());
        assert!(!ItemStep::PhotoManagement.is_required());
    }

    #[test]
    fn serializes_in_screaming_case() {
        let json = serde_json::to_string(&WizardStep::ItemManager).unwrap();
        assert_eq!(json, "\"ITEM_MANAGER\"");
    }
}
