//! In-memory adapters for the ports.
//!
//! Intended for tests/dev. Not optimized for performance.

use std::collections::HashMap;

use tokio::sync::RwLock;

use cleanorder_core::{Money, OrderId, Quantity};
use cleanorder_wizard::{ItemDraft, ItemRecord, OrderDraft, PriceAdjustment, PriceBreakdown};

use crate::error::ServiceError;
use crate::ports::{ItemStore, OrderFinalizer, PricingService};

/// Item store keeping records per order.
#[derive(Debug, Default)]
pub struct InMemoryItemStore {
    orders: RwLock<HashMap<OrderId, Vec<ItemRecord>>>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with existing items of one order.
    pub fn with_items(order_id: OrderId, records: Vec<ItemRecord>) -> Self {
        Self {
            orders: RwLock::new(HashMap::from([(order_id, records)])),
        }
    }

    pub async fn items(&self, order_id: OrderId) -> Vec<ItemRecord> {
        self.orders
            .read()
            .await
            .get(&order_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl ItemStore for InMemoryItemStore {
    async fn save_item(&self, order_id: OrderId, record: &ItemRecord) -> Result<ItemRecord, ServiceError> {
        let mut orders = self.orders.write().await;
        let items = orders.entry(order_id).or_default();
        match items.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => *slot = record.clone(),
            None => items.push(record.clone()),
        }
        Ok(record.clone())
    }

    async fn load_items(&self, order_id: OrderId) -> Result<Vec<ItemRecord>, ServiceError> {
        Ok(self.items(order_id).await)
    }
}

/// Price list: a unit price per category plus percentage modifiers.
///
/// Modifier percentages apply to the base price; negative values are reductions.
/// Weighed categories are priced per kilogram.
#[derive(Debug, Clone, Default)]
pub struct PriceListPricing {
    unit_prices: HashMap<String, Money>,
    modifiers: HashMap<String, i64>,
}

impl PriceListPricing {
    pub const SERVICE: &'static str = "pricing";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: impl Into<String>, unit_price: Money) -> Self {
        self.unit_prices.insert(category.into(), unit_price);
        self
    }

    pub fn with_modifier(mut self, code: impl Into<String>, percent: i64) -> Self {
        self.modifiers.insert(code.into(), percent);
        self
    }
}

#[async_trait::async_trait]
impl PricingService for PriceListPricing {
    async fn calculate_item_price(&self, draft: &ItemDraft) -> Result<PriceBreakdown, ServiceError> {
        let inputs = draft.price_inputs();
        let category = inputs
            .category
            .as_deref()
            .ok_or_else(|| ServiceError::rejected(Self::SERVICE, "category is required"))?;
        let unit_price = self
            .unit_prices
            .get(category)
            .ok_or_else(|| ServiceError::not_found(Self::SERVICE, format!("price for category '{category}'")))?;

        // Unit price is per piece or per kilogram; fractions round half up.
        let scale = u64::from(Quantity::SCALE);
        let base_minor = unit_price
            .minor()
            .saturating_mul(u64::from(inputs.quantity.milli()))
            .saturating_add(scale / 2)
            / scale;
        let base_price = Money::from_minor(base_minor);

        let mut adjustments = Vec::with_capacity(inputs.modifiers.len());
        for code in &inputs.modifiers {
            let percent = self
                .modifiers
                .get(code)
                .ok_or_else(|| ServiceError::rejected(Self::SERVICE, format!("unknown modifier '{code}'")))?;
            let base = i64::try_from(base_minor).unwrap_or(i64::MAX);
            adjustments.push(PriceAdjustment {
                code: code.clone(),
                amount_minor: base.saturating_mul(*percent) / 100,
            });
        }

        let delta: i64 = adjustments.iter().map(|a| a.amount_minor).sum();
        let final_price = if delta >= 0 {
            base_price.saturating_add(Money::from_minor(delta.unsigned_abs()))
        } else {
            base_price.saturating_sub(Money::from_minor(delta.unsigned_abs()))
        };

        Ok(PriceBreakdown {
            inputs,
            base_price,
            adjustments,
            final_price,
        })
    }
}

/// Finalizer that accepts every order and remembers it.
#[derive(Debug, Default)]
pub struct InMemoryFinalizer {
    finalized: RwLock<Vec<OrderDraft>>,
}

impl InMemoryFinalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn finalized(&self) -> Vec<OrderDraft> {
        self.finalized.read().await.clone()
    }
}

#[async_trait::async_trait]
impl OrderFinalizer for InMemoryFinalizer {
    async fn finalize_order(&self, order: &OrderDraft) -> Result<OrderId, ServiceError> {
        let mut finalized = self.finalized.write().await;
        if finalized.iter().any(|o| o.order_id == order.order_id) {
            return Err(ServiceError::rejected(
                "finalizer",
                format!("order {} already finalized", order.order_id),
            ));
        }
        finalized.push(order.clone());
        Ok(order.order_id)
    }
}

/// Adapter for every port that always fails as unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineService;

#[async_trait::async_trait]
impl ItemStore for OfflineService {
    async fn save_item(&self, _order_id: OrderId, _record: &ItemRecord) -> Result<ItemRecord, ServiceError> {
        Err(ServiceError::unavailable("item_store", "offline"))
    }

    async fn load_items(&self, _order_id: OrderId) -> Result<Vec<ItemRecord>, ServiceError> {
        Err(ServiceError::unavailable("item_store", "offline"))
    }
}

#[async_trait::async_trait]
impl PricingService for OfflineService {
    async fn calculate_item_price(&self, _draft: &ItemDraft) -> Result<PriceBreakdown, ServiceError> {
        Err(ServiceError::unavailable(PriceListPricing::SERVICE, "offline"))
    }
}

#[async_trait::async_trait]
impl OrderFinalizer for OfflineService {
    async fn finalize_order(&self, _order: &OrderDraft) -> Result<OrderId, ServiceError> {
        Err(ServiceError::unavailable("finalizer", "offline"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleanorder_wizard::{DraftChange, Unit};

    fn price_list() -> PriceListPricing {
        PriceListPricing::new()
            .with_category("Coats", Money::from_minor(30_000))
            .with_category("Bed linen", Money::from_minor(6_000))
            .with_modifier("manual_cleaning", 20)
            .with_modifier("loyal_client", -10)
    }

    fn coat(quantity: u32) -> ItemDraft {
        let mut draft = ItemDraft::new();
        draft.apply_change(&DraftChange::SetCategory("Coats".into()));
        draft.apply_change(&DraftChange::SetName("Wool Coat".into()));
        draft.apply_change(&DraftChange::SetQuantity(Quantity::whole(quantity)));
        draft
    }

    #[tokio::test]
    async fn price_scales_with_quantity_and_modifiers() {
        let mut draft = coat(2);
        draft.apply_change(&DraftChange::AddModifier("manual_cleaning".into()));
        draft.apply_change(&DraftChange::AddModifier("loyal_client".into()));

        let breakdown = price_list().calculate_item_price(&draft).await.unwrap();
        assert_eq!(breakdown.base_price, Money::from_minor(60_000));
        assert_eq!(breakdown.adjustments.len(), 2);
        assert_eq!(breakdown.final_price, Money::from_minor(66_000));
        assert_eq!(breakdown.inputs, draft.price_inputs());
    }

    #[tokio::test]
    async fn weighed_items_are_priced_per_kilogram() {
        let mut draft = ItemDraft::new();
        draft.apply_change(&DraftChange::SetCategory("Bed linen".into()));
        draft.apply_change(&DraftChange::SetUnit(Unit::Kilograms));
        draft.apply_change(&DraftChange::SetQuantity(Quantity::from_milli(2_500)));

        let breakdown = price_list().calculate_item_price(&draft).await.unwrap();
        assert_eq!(breakdown.base_price, Money::from_minor(15_000));
        assert_eq!(breakdown.final_price, Money::from_minor(15_000));

        draft.apply_change(&DraftChange::SetQuantity(Quantity::from_milli(333)));
        let breakdown = price_list().calculate_item_price(&draft).await.unwrap();
        assert_eq!(breakdown.base_price, Money::from_minor(1_998));
    }

    #[tokio::test]
    async fn unknown_category_is_not_found() {
        let mut draft = coat(1);
        draft.apply_change(&DraftChange::SetCategory("Carpets".into()));
        let err = price_list().calculate_item_price(&draft).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn finalizer_rejects_second_finalization() {
        let finalizer = InMemoryFinalizer::new();
        let order = OrderDraft::new(OrderId::new(), chrono::NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        assert_eq!(finalizer.finalize_order(&order).await, Ok(order.order_id));
        assert!(finalizer.finalize_order(&order).await.is_err());
        assert_eq!(finalizer.finalized().await.len(), 1);
    }

    #[tokio::test]
    async fn offline_service_is_retryable() {
        let err = OfflineService.load_items(OrderId::new()).await.unwrap_err();
        assert!(err.is_retryable());
    }
}
