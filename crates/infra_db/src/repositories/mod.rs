//! Repository implementations for the billing tables
//!
//! Repositories speak SQL and row structs; the adapters in
//! [`crate::adapters`] translate rows into domain types.

pub mod customer;
pub mod engagement;
pub mod holiday;
pub mod invoice;
pub mod settlement;

pub use customer::CustomerRepository;
pub use engagement::{EngagementRepository, EngagementRow, NewEngagement};
pub use holiday::{HolidayRepository, HolidayRow};
pub use invoice::{InvoiceRepository, InvoiceRow, NewInvoice};
pub use settlement::{NewSettlement, SettlementRepository, SettlementRow};
