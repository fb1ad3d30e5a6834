//! `cleanorder-services`: the wizard's async boundary.
//!
//! Ports for the external collaborators, in-memory adapters, configuration and
//! the [`WizardSession`] composition root that ties them to the pure engine.

pub mod config;
pub mod error;
pub mod journal;
pub mod memory;
pub mod ports;
pub mod session;

pub use config::WizardConfig;
pub use error::{ServiceError, SessionError};
pub use journal::{Journal, JournalEntry};
pub use memory::{InMemoryFinalizer, InMemoryItemStore, OfflineService, PriceListPricing};
pub use ports::{ItemStore, OrderFinalizer, PricingService};
pub use session::{PriceOutcome, PriceRequest, WizardSession};
