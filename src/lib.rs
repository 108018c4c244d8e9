//src/lib.rs

use axum::{
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use crate::{config::AppState, docs::ApiDoc};

/// Monta o roteador completo. O binário só adiciona o listener.
pub fn app(app_state: AppState) -> Router {
    let lease_routes = Router::new()
        .route("/"
               ,post(handlers::leases::create_lease)
               .get(handlers::leases::list_leases)
        )
        .route("/{id}", get(handlers::leases::get_lease))
        .route("/{id}/send", post(handlers::leases::send_lease))
        .route("/{id}/sign", post(handlers::leases::sign_lease))
        .route("/{id}/approve", post(handlers::leases::approve_lease))
        .route("/{id}/reject", post(handlers::leases::reject_lease))
        .route("/{id}/request-revision", post(handlers::leases::request_revision))
        .route("/{id}/terminate", post(handlers::leases::terminate_lease))
        // Cobranças e caução penduradas no contrato
        .route("/{id}/payments", get(handlers::payments::list_payments))
        .route("/{id}/payments/schedule", post(handlers::payments::generate_schedule))
        .route("/{id}/deposit"
               ,get(handlers::deposits::get_deposit)
               .post(handlers::deposits::create_deposit)
        );

    let payment_routes = Router::new()
        .route("/{id}/mark-paid", post(handlers::payments::mark_paid));

    let deposit_routes = Router::new()
        .route("/{id}/confirm", post(handlers::deposits::confirm_deposit))
        .route("/{id}/request-release", post(handlers::deposits::request_release))
        .route("/{id}/release", post(handlers::deposits::release_deposit))
        .route("/{id}/forfeit", post(handlers::deposits::forfeit_deposit));

    let maintenance_routes = Router::new()
        .route("/sweeps", post(handlers::maintenance::run_sweeps));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/leases", lease_routes)
        .nest("/api/payments", payment_routes)
        .nest("/api/deposits", deposit_routes)
        .nest("/api/maintenance", maintenance_routes)
        .with_state(app_state)
}
