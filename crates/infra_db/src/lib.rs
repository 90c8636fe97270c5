//! Infrastructure Database Layer
//!
//! This crate provides the PostgreSQL persistence for the billing engine
//! using SQLx: connection pooling, repositories over the billing tables,
//! and adapters implementing the `domain_billing` port traits.
//!
//! # Architecture
//!
//! Repositories speak in row structs and SQL; adapters translate between
//! rows and domain types and own the transaction boundaries. The settlement
//! chain invariant (contiguous, non-overlapping periods per engagement) is
//! defended twice: the adapter serializes read-cursor-then-append inside a
//! single transaction, and the schema carries a uniqueness constraint plus
//! a GiST exclusion constraint on the period range.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, DatabaseConfig, PgEngagementLedger};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/homecrew_billing")).await?;
//! let ledger = PgEngagementLedger::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{DatabasePool, create_pool, run_migrations, DatabaseConfig};
pub use error::DatabaseError;
pub use adapters::{PgCustomerDirectory, PgEngagementLedger, PgInvoiceStore};
