//! Validation gate: per-step rules producing violation lists.
//!
//! Every check is a pure function of the data slice it receives; calling it
//! any number of times yields the same list.

use cleanorder_core::{DomainError, Quantity, Violation, ViolationList};

use crate::draft::{ItemDraft, Unit};
use crate::limits::ValidationLimits;
use crate::order::{Discount, OrderDraft};
use crate::steps::{ITEM_STEPS, ItemStep, PRIMARY_STEPS, WizardStep};

/// Guards consulted by the wizard before any transition.
pub trait ValidationGate {
    /// Rules for one primary step over the order draft.
    fn validate_step(&self, step: WizardStep, order: &OrderDraft) -> ViolationList;

    /// Rules for one item sub-step over the item draft.
    fn validate_item_step(&self, step: ItemStep, draft: &ItemDraft) -> ViolationList;

    /// Whether another item may be started on this order.
    fn validate_item_capacity(&self, order: &OrderDraft) -> ViolationList;

    /// Every item sub-step.
    fn validate_item(&self, draft: &ItemDraft) -> ViolationList {
        let mut all = ViolationList::new();
        for step in ITEM_STEPS {
            all.extend(self.validate_item_step(step, draft));
        }
        all
    }

    /// Every working primary step.
    fn validate_order(&self, order: &OrderDraft) -> ViolationList {
        let mut all = ViolationList::new();
        for step in PRIMARY_STEPS.into_iter().filter(|s| !s.is_terminal()) {
            all.extend(self.validate_step(step, order));
        }
        all
    }
}

/// Build a rejection carrying a single violation.
pub(crate) fn reject(section: &str, field: &str, message: impl Into<String>) -> DomainError {
    DomainError::validation(Violation::error(section, field, message))
}

/// Turn a non-empty list into a rejection.
pub(crate) fn ensure_valid(violations: ViolationList) -> Result<(), DomainError> {
    violations.into_result().map_err(DomainError::Validation)
}

/// Rule set used at the reception desk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleValidationGate {
    limits: ValidationLimits,
}

impl RuleValidationGate {
    pub fn new(limits: ValidationLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &ValidationLimits {
        &self.limits
    }

    fn client(&self, order: &OrderDraft, out: &mut ViolationList) {
        let section = WizardStep::ClientSelection.section();
        match &order.client {
            None => out.error(section, "client", "select or create a client"),
            Some(client) => {
                if client.full_name.trim().is_empty() {
                    out.error(section, "full_name", "client name is required");
                }
                if let Some(phone) = &client.phone {
                    if !is_ua_phone(phone) {
                        out.error(section, "phone", "phone must be 10 digits, optionally prefixed with +38");
                    }
                }
            }
        }
    }

    fn branch(&self, order: &OrderDraft, out: &mut ViolationList) {
        let section = WizardStep::BranchSelection.section();
        if order.branch.is_none() {
            out.error(section, "branch", "select a reception branch");
        }
        match &order.receipt_number {
            None => out.error(section, "receipt_number", "receipt number is required"),
            Some(number) => {
                if number.chars().count() > self.limits.receipt_number_max {
                    out.error(
                        section,
                        "receipt_number",
                        format!("receipt number is longer than {} characters", self.limits.receipt_number_max),
                    );
                }
                if !number.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
                    out.error(section, "receipt_number", "receipt number may contain only letters, digits, '-' and '_'");
                }
            }
        }
        if let Some(label) = &order.unique_label {
            if label.chars().count() > self.limits.unique_label_max {
                out.error(
                    section,
                    "unique_label",
                    format!("unique label is longer than {} characters", self.limits.unique_label_max),
                );
            }
            if !label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c.is_whitespace())
            {
                out.error(
                    section,
                    "unique_label",
                    "unique label may contain only letters, digits, spaces, '-' and '_'",
                );
            }
        }
    }

    fn items(&self, order: &OrderDraft, out: &mut ViolationList) {
        let section = WizardStep::ItemManager.section();
        if order.items.is_empty() {
            out.error(section, "items", "add at least one item to the order");
        }
        if order.items.len() > self.limits.max_items {
            out.error(
                section,
                "items",
                format!("an order may hold at most {} items", self.limits.max_items),
            );
        }
    }

    fn parameters(&self, order: &OrderDraft, out: &mut ViolationList) {
        let section = WizardStep::OrderParameters.section();
        match order.execution.execution_date {
            None => out.error(section, "execution_date", "execution date is required"),
            Some(date) if date < order.opened_on => {
                out.error(section, "execution_date", "execution date cannot be before the order date")
            }
            Some(_) => {}
        }
        if let Discount::Custom { percent } = order.discount {
            if !(1..=100).contains(&percent) {
                out.error(section, "discount", "custom discount must be between 1 and 100 percent");
            }
        }
        if order.payment.method.is_none() {
            out.error(section, "payment_method", "select a payment method");
        }
        if order.payment.prepaid > order.items_total() {
            out.error(section, "prepaid", "prepaid amount exceeds the order total");
        }
    }

    fn confirmation(&self, order: &OrderDraft, out: &mut ViolationList) {
        if !order.confirmation.terms_accepted {
            out.error(
                WizardStep::Confirmation.section(),
                "terms_accepted",
                "the client must accept the service terms",
            );
        }
    }

    fn basic_info(&self, draft: &ItemDraft, out: &mut ViolationList) {
        let section = ItemStep::BasicInfo.section();
        let l = &self.limits;
        if draft.category.is_none() {
            out.error(section, "category", "category is required");
        }
        match &draft.name {
            None => out.error(section, "name", "item name is required"),
            Some(name) => {
                let len = name.chars().count();
                if len < l.item_name_min || len > l.item_name_max {
                    out.error(
                        section,
                        "name",
                        format!("item name must be {}..={} characters", l.item_name_min, l.item_name_max),
                    );
                }
            }
        }
        let q = draft.quantity;
        match draft.unit {
            Unit::Pieces => {
                let in_range = q >= Quantity::whole(l.quantity_min) && q <= Quantity::whole(l.quantity_max);
                if !q.is_whole() || !in_range {
                    out.error(
                        section,
                        "quantity",
                        format!("quantity must be a whole number between {} and {}", l.quantity_min, l.quantity_max),
                    );
                }
            }
            Unit::Kilograms => {
                if q < l.weight_min || q > l.weight_max {
                    out.error(
                        section,
                        "quantity",
                        format!("weight must be between {} and {} kg", l.weight_min, l.weight_max),
                    );
                }
            }
        }
    }

    fn characteristics(&self, draft: &ItemDraft, out: &mut ViolationList) {
        let section = ItemStep::Characteristics.section();
        let l = &self.limits;
        if let Some(color) = &draft.color {
            let len = color.chars().count();
            if len < l.color_min || len > l.color_max {
                out.error(
                    section,
                    "color",
                    format!("colour must be {}..={} characters", l.color_min, l.color_max),
                );
            }
        }
        if draft.filler.compressed && draft.filler.kind.is_none() {
            out.error(section, "filler", "compressed filler requires the filler type");
        }
    }

    fn defects(&self, draft: &ItemDraft, out: &mut ViolationList) {
        let section = ItemStep::DefectsAndRisks.section();
        if draft.no_warranty && draft.no_warranty_reason.is_none() {
            out.error(section, "no_warranty_reason", "a reason is required when no warranty is given");
        }
        if let Some(notes) = &draft.notes {
            if notes.chars().count() > self.limits.notes_max {
                out.error(
                    section,
                    "notes",
                    format!("notes are longer than {} characters", self.limits.notes_max),
                );
            }
        }
    }

    fn pricing(&self, draft: &ItemDraft, out: &mut ViolationList) {
        let section = ItemStep::PriceCalculation.section();
        if draft.pricing.is_none() {
            out.error(section, "final_price", "price has not been calculated");
        } else if draft.is_price_stale() {
            out.error(section, "final_price", "item data changed; recalculate the price");
        } else if draft.final_price().is_some_and(|p| p.is_zero()) {
            out.error(section, "final_price", "final price must be greater than zero");
        }
    }

    fn photos(&self, draft: &ItemDraft, out: &mut ViolationList) {
        let section = ItemStep::PhotoManagement.section();
        let l = &self.limits;
        if draft.photos.len() > l.max_photos {
            out.error(section, "photos", format!("at most {} photos per item", l.max_photos));
        }
        for photo in &draft.photos {
            if photo.size_bytes > l.max_photo_bytes {
                out.error(section, "photos", format!("{} is too large", photo.file_name));
            }
            if !l.photo_content_types.iter().any(|t| t.eq_ignore_ascii_case(&photo.content_type)) {
                out.error(section, "photos", format!("{} has an unsupported file type", photo.file_name));
            }
        }
    }
}

impl ValidationGate for RuleValidationGate {
    fn validate_step(&self, step: WizardStep, order: &OrderDraft) -> ViolationList {
        let mut out = ViolationList::new();
        match step {
            WizardStep::ClientSelection => self.client(order, &mut out),
            WizardStep::BranchSelection => self.branch(order, &mut out),
            WizardStep::ItemManager => self.items(order, &mut out),
            WizardStep::OrderParameters => self.parameters(order, &mut out),
            WizardStep::Confirmation => self.confirmation(order, &mut out),
            WizardStep::Completed => {}
        }
        out
    }

    fn validate_item_step(&self, step: ItemStep, draft: &ItemDraft) -> ViolationList {
        let mut out = ViolationList::new();
        match step {
            ItemStep::BasicInfo => self.basic_info(draft, &mut out),
            ItemStep::Characteristics => self.characteristics(draft, &mut out),
            ItemStep::DefectsAndRisks => self.defects(draft, &mut out),
            ItemStep::PriceCalculation => self.pricing(draft, &mut out),
            ItemStep::PhotoManagement => self.photos(draft, &mut out),
        }
        out
    }

    fn validate_item_capacity(&self, order: &OrderDraft) -> ViolationList {
        let mut out = ViolationList::new();
        if order.items.len() >= self.limits.max_items {
            out.error(
                WizardStep::ItemManager.section(),
                "items",
                format!("an order may hold at most {} items", self.limits.max_items),
            );
        }
        out
    }
}

/// `+38` prefix optional, then exactly ten digits.
fn is_ua_phone(phone: &str) -> bool {
    let digits = phone.trim().strip_prefix("+38").unwrap_or(phone.trim());
    digits.len() == 10 && digits.bytes().all(|b| b.is_ascii_digit())
}
