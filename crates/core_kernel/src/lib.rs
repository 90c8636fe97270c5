//! Core Kernel - Foundational types and utilities for the billing engine
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Calendar types for billing-period arithmetic
//! - Common identifiers and value objects

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod error;

pub use money::{Money, Currency, MoneyError, Rate};
pub use temporal::{DateRange, Timezone, TemporalError, month_start, month_end, days_in_month};
pub use identifiers::{
    CustomerId, ProviderId, EngagementId, SettlementId,
    InvoiceId, HolidayId, CouponId,
};
pub use error::CoreError;
