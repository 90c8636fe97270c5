//! Billing Domain - Recurring Settlements and Invoice Calculation
//!
//! This crate implements the recurring billing engine for the marketplace:
//! the monthly settlement chain between customers and service providers,
//! and on-demand customer invoice calculation with vacation discounts.
//!
//! # Settlement Chains
//!
//! Every active engagement owns an append-only chain of settlements that
//! partitions time contiguously from the engagement's start date:
//!
//! - `period_start(n+1) == period_end(n) + 1 day` for every consecutive pair
//! - settlements are never mutated after creation
//! - the chain's last `period_end` is the engagement's billing cursor
//!
//! # Invoice Calculation
//!
//! Customer invoices are computed on demand from a fixed 30-day daily rate,
//! the customer's active vacation days in the invoice month, and an optional
//! coupon discount. At most one invoice exists per customer and month;
//! recomputation overwrites the existing row.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{compute_settlement, Engagement};
//! use core_kernel::DateRange;
//!
//! let settlement = compute_settlement(&engagement, period)?;
//! ledger.extend_chain(&engagement, month_end).await?;
//! ```

pub mod discount;
pub mod engagement;
pub mod error;
pub mod holiday;
pub mod invoice;
pub mod ports;
pub mod scheduler;
pub mod service;
pub mod settlement;

pub use discount::vacation_discount;
pub use engagement::{Engagement, PaymentMode};
pub use error::BillingError;
pub use holiday::{vacation_days_within, Holiday};
pub use invoice::{compute_invoice_amounts, CustomerInvoice, InvoiceAmounts, BILLING_MONTH_DAYS};
pub use ports::{CouponService, CustomerDirectory, EngagementLedger, InvoiceStore};
pub use scheduler::{BillingScheduler, CycleFailure, CycleOutcome, CycleReport, CycleState};
pub use service::{CalculateInvoiceRequest, InvoiceService};
pub use settlement::{compute_settlement, next_billing_period, Settlement};
