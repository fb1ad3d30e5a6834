//! External collaborators consumed by the wizard, as async ports.
//!
//! Each call either succeeds with a payload or fails with a [`ServiceError`].
//! No retry, throttling or caching happens on this side of the boundary.

use std::sync::Arc;

use cleanorder_core::OrderId;
use cleanorder_wizard::{ItemDraft, ItemRecord, OrderDraft, PriceBreakdown};

use crate::error::ServiceError;

/// Persistence of committed items.
#[async_trait::async_trait]
pub trait ItemStore: Send + Sync {
    /// Persist a record about to be committed and return the stored version.
    ///
    /// The returned record must keep the id it was given.
    async fn save_item(&self, order_id: OrderId, record: &ItemRecord) -> Result<ItemRecord, ServiceError>;

    /// Items already attached to the order, in display order.
    async fn load_items(&self, order_id: OrderId) -> Result<Vec<ItemRecord>, ServiceError>;
}

/// Black-box price calculation.
#[async_trait::async_trait]
pub trait PricingService: Send + Sync {
    /// Price the draft. The breakdown's `inputs` must describe the draft that was priced.
    async fn calculate_item_price(&self, draft: &ItemDraft) -> Result<PriceBreakdown, ServiceError>;
}

/// Hands a completed order to the back office.
#[async_trait::async_trait]
pub trait OrderFinalizer: Send + Sync {
    async fn finalize_order(&self, order: &OrderDraft) -> Result<OrderId, ServiceError>;
}

#[async_trait::async_trait]
impl<T: ItemStore + ?Sized> ItemStore for Arc<T> {
    async fn save_item(&self, order_id: OrderId, record: &ItemRecord) -> Result<ItemRecord, ServiceError> {
        (**self).save_item(order_id, record).await
    }

    async fn load_items(&self, order_id: OrderId) -> Result<Vec<ItemRecord>, ServiceError> {
        (**self).load_items(order_id).await
    }
}

#[async_trait::async_trait]
impl<T: PricingService + ?Sized> PricingService for Arc<T> {
    async fn calculate_item_price(&self, draft: &ItemDraft) -> Result<PriceBreakdown, ServiceError> {
        (**self).calculate_item_price(draft).await
    }
}

#[async_trait::async_trait]
impl<T: OrderFinalizer + ?Sized> OrderFinalizer for Arc<T> {
    async fn finalize_order(&self, order: &OrderDraft) -> Result<OrderId, ServiceError> {
        (**self).finalize_order(order).await
    }
}
