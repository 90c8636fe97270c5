//! HTTP API Layer
//!
//! This crate provides the REST API for the billing engine using Axum,
//! plus the timer that drives the monthly billing cycle.
//!
//! # Architecture
//!
//! - **Handlers**: invoice calculation, settlement history, cycle trigger
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: consistent mapping of domain errors onto statuses
//! - **Scheduler driver**: a tokio task that fires at each month boundary
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod dto;
pub mod scheduler;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use core_kernel::Timezone;
use domain_billing::{BillingScheduler, EngagementLedger, InvoiceService};

use crate::handlers::{billing_cycle, health, invoices, settlements};

/// Application state shared across handlers
///
/// Handlers depend on the domain services and port traits, never on the
/// database directly, so the same router runs against Postgres adapters in
/// production and in-memory adapters in tests.
#[derive(Clone)]
pub struct AppState {
    pub invoices: Arc<InvoiceService>,
    pub ledger: Arc<dyn EngagementLedger>,
    pub scheduler: Arc<BillingScheduler>,
    pub timezone: Timezone,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Public routes (no versioning)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Invoice routes
    let invoice_routes = Router::new()
        .route("/calculate", post(invoices::calculate_invoice));

    // Settlement history routes
    let settlement_routes = Router::new()
        .route("/engagements/:id/settlements", get(settlements::list_for_engagement))
        .route("/providers/:id/settlements", get(settlements::list_for_provider));

    // Operational billing-cycle routes
    let billing_routes = Router::new()
        .route("/run", post(billing_cycle::run_cycle))
        .route("/status", get(billing_cycle::cycle_status));

    let api_routes = Router::new()
        .nest("/invoices", invoice_routes)
        .merge(settlement_routes)
        .nest("/billing", billing_routes);

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
