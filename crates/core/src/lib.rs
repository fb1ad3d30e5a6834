//! `cleanorder-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod machine;
pub mod money;
pub mod quantity;
pub mod violation;

pub use error::{DomainError, DomainResult, invariant_breach};
pub use id::{BranchId, ClientId, ItemId, OrderId, SessionId};
pub use machine::{Event, StateMachine, execute};
pub use money::Money;
pub use quantity::Quantity;
pub use violation::{Severity, Violation, ViolationList};
