//! Order draft: everything the later primary steps fill in.
//!
//! The engine only decides *when* each piece may be entered; prices come from
//! the pricing service and are merely summed here.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use cleanorder_core::{BranchId, ClientId, Money, OrderId};

use crate::items::ItemCollection;
use crate::steps::WizardStep;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRef {
    pub id: ClientId,
    pub full_name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRef {
    pub id: BranchId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    #[default]
    Normal,
    Within48Hours,
    Within24Hours,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionParams {
    pub execution_date: Option<NaiveDate>,
    pub urgency: Urgency,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Discount {
    #[default]
    None,
    Evercard,
    SocialMedia,
    Military,
    Custom { percent: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Terminal,
    Cash,
    BankTransfer,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub method: Option<PaymentMethod>,
    pub prepaid: Money,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub terms_accepted: bool,
    pub signature: Option<String>,
}

/// A single change to the order draft, routed through the wizard reducer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderChange {
    SelectClient(ClientRef),
    ClearClient,
    SelectBranch(BranchRef),
    SetReceiptNumber(String),
    SetUniqueLabel(Option<String>),
    SetExecution(ExecutionParams),
    SetDiscount(Discount),
    SetPayment(PaymentInfo),
    SetConfirmation(Confirmation),
}

impl OrderChange {
    /// Primary step that owns the changed data.
    pub fn step(&self) -> WizardStep {
        match self {
            OrderChange::SelectClient(_) | OrderChange::ClearClient => WizardStep::ClientSelection,
            OrderChange::SelectBranch(_)
            | OrderChange::SetReceiptNumber(_)
            | OrderChange::SetUniqueLabel(_) => WizardStep::BranchSelection,
            OrderChange::SetExecution(_)
            | OrderChange::SetDiscount(_)
            | OrderChange::SetPayment(_) => WizardStep::OrderParameters,
            OrderChange::SetConfirmation(_) => WizardStep::Confirmation,
        }
    }
}

/// Client, branch, committed items, execution, discount and payment for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub order_id: OrderId,
    /// Business date the order was opened; execution may not be earlier.
    pub opened_on: NaiveDate,
    pub client: Option<ClientRef>,
    pub branch: Option<BranchRef>,
    pub receipt_number: Option<String>,
    pub unique_label: Option<String>,
    pub items: ItemCollection,
    pub execution: ExecutionParams,
    pub discount: Discount,
    pub payment: PaymentInfo,
    pub confirmation: Confirmation,
}

impl OrderDraft {
    pub fn new(order_id: OrderId, opened_on: NaiveDate) -> Self {
        Self {
            order_id,
            opened_on,
            client: None,
            branch: None,
            receipt_number: None,
            unique_label: None,
            items: ItemCollection::new(),
            execution: ExecutionParams::default(),
            discount: Discount::default(),
            payment: PaymentInfo::default(),
            confirmation: Confirmation::default(),
        }
    }

    /// Sum of committed items' final prices.
    pub fn items_total(&self) -> Money {
        self.items.total()
    }

    pub fn apply_change(&mut self, change: &OrderChange) {
        match change.clone() {
            OrderChange::SelectClient(client) => self.client = Some(client),
            OrderChange::ClearClient => self.client = None,
            OrderChange::SelectBranch(branch) => self.branch = Some(branch),
            OrderChange::SetReceiptNumber(number) => {
                let number = number.trim();
                self.receipt_number = (!number.is_empty()).then(|| number.to_string());
            }
            OrderChange::SetUniqueLabel(label) => {
                self.unique_label = label
                    .map(|l| l.trim().to_string())
                    .filter(|l| !l.is_empty());
            }
            OrderChange::SetExecution(params) => self.execution = params,
            OrderChange::SetDiscount(discount) => self.discount = discount,
            OrderChange::SetPayment(payment) => self.payment = payment,
            OrderChange::SetConfirmation(confirmation) => self.confirmation = confirmation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opened() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    #[test]
    fn changes_map_to_owning_step() {
        assert_eq!(OrderChange::ClearClient.step(), WizardStep::ClientSelection);
        assert_eq!(
            OrderChange::SetReceiptNumber("RC1".into()).step(),
            WizardStep::BranchSelection
        );
        assert_eq!(
            OrderChange::SetDiscount(Discount::Military).step(),
            WizardStep::OrderParameters
        );
    }

    #[test]
    fn blank_receipt_number_is_cleared() {
        let mut order = OrderDraft::new(OrderId::new(), opened());
        order.apply_change(&OrderChange::SetReceiptNumber(" RC-001 ".into()));
        assert_eq!(order.receipt_number.as_deref(), Some("RC-001"));
        order.apply_change(&OrderChange::SetReceiptNumber("  ".into()));
        assert_eq!(order.receipt_number, None);
    }

    #[test]
    fn new_order_has_no_items_and_zero_total() {
        let order = OrderDraft::new(OrderId::new(), opened());
        assert!(order.items.is_empty());
        assert_eq!(order.items_total(), Money::ZERO);
    }

    #[test]
    fn discount_serializes_with_kind_tag() {
        let json = serde_json::to_value(Discount::Custom { percent: 15 }).unwrap();
        assert_eq!(json["kind"], "custom");
        assert_eq!(json["percent"], 15);
    }
}
