//! Port adapters over the PostgreSQL repositories
//!
//! Each adapter implements a `domain_billing` port trait, translating
//! between database rows and domain types and owning the transaction
//! boundaries the domain contracts require.

pub mod billing;

pub use billing::{PgCustomerDirectory, PgEngagementLedger, PgInvoiceStore};
