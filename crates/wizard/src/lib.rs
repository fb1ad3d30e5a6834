//! `cleanorder-wizard`: the order wizard orchestration engine.
//!
//! Pure domain code: a two-level state machine (primary steps plus a nested
//! item sub-wizard), the validation gate that guards its transitions and the
//! completion tracker derived from it. No IO and no async code lives here.

pub mod completion;
pub mod draft;
pub mod item_wizard;
pub mod items;
pub mod limits;
pub mod machine;
pub mod navigation;
pub mod order;
pub mod steps;
pub mod validation;

pub use completion::{CompletedItemSteps, CompletedSteps, CompletionTracker, StepSet, item_progress};
pub use draft::{
    DraftChange, Filler, ItemDraft, ItemRecord, PhotoRef, PriceAdjustment, PriceBreakdown,
    PriceInputs, Unit, WearLevel,
};
pub use item_wizard::{ItemWizard, ItemWizardMode};
pub use items::ItemCollection;
pub use limits::ValidationLimits;
pub use machine::{OrderWizard, WizardCommand, WizardEvent, WizardState};
pub use navigation::{
    ItemNavigationSnapshot, LinearNavigation, NavigationService, NavigationSnapshot,
    available_item_steps, available_steps,
};
pub use order::{
    BranchRef, ClientRef, Confirmation, Discount, ExecutionParams, OrderChange, OrderDraft,
    PaymentInfo, PaymentMethod, Urgency,
};
pub use steps::{ITEM_STEPS, ItemStep, PRIMARY_STEPS, WORKING_STEP_COUNT, WizardStep};
pub use validation::{RuleValidationGate, ValidationGate};
