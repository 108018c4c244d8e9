// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Leases ---
        handlers::leases::create_lease,
        handlers::leases::list_leases,
        handlers::leases::get_lease,
        handlers::leases::send_lease,
        handlers::leases::sign_lease,
        handlers::leases::approve_lease,
        handlers::leases::reject_lease,
        handlers::leases::request_revision,
        handlers::leases::terminate_lease,

        // --- Payments ---
        handlers::payments::list_payments,
        handlers::payments::generate_schedule,
        handlers::payments::mark_paid,

        // --- Deposits ---
        handlers::deposits::get_deposit,
        handlers::deposits::create_deposit,
        handlers::deposits::confirm_deposit,
        handlers::deposits::request_release,
        handlers::deposits::release_deposit,
        handlers::deposits::forfeit_deposit,

        // --- Maintenance ---
        handlers::maintenance::run_sweeps,
    ),
    components(
        schemas(
            // --- Leases ---
            models::lease::LeaseStatus,
            models::lease::DocumentKind,
            models::lease::TenantDocument,
            models::lease::Lease,
            services::document_service::DocumentUpload,
            handlers::leases::CreateLeasePayload,
            handlers::leases::SignLeasePayload,
            handlers::leases::ApproveLeasePayload,
            handlers::leases::LandlordNotesPayload,
            handlers::leases::TerminateLeasePayload,

            // --- Payments ---
            models::payment::PaymentStatus,
            models::payment::PaymentKind,
            models::payment::Payment,
            handlers::payments::GenerateSchedulePayload,
            handlers::payments::MarkPaidPayload,

            // --- Deposits ---
            models::deposit::DepositStatus,
            models::deposit::Deposit,
            handlers::deposits::CreateDepositPayload,
            handlers::deposits::ConfirmDepositPayload,
            handlers::deposits::RequestReleasePayload,
            handlers::deposits::ReleaseDepositPayload,
            handlers::deposits::ForfeitDepositPayload,

            // --- Maintenance ---
            services::sweep_service::SweepReport,
            handlers::maintenance::RunSweepsPayload,
        )
    ),
    tags(
        (name = "Leases", description = "Ciclo de vida do contrato de locação"),
        (name = "Payments", description = "Cobranças de aluguel"),
        (name = "Deposits", description = "Custódia da caução"),
        (name = "Maintenance", description = "Varreduras de sistema")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let doc = ApiDoc::openapi();

        for path in [
            "/api/leases",
            "/api/leases/{id}/approve",
            "/api/leases/{id}/payments/schedule",
            "/api/payments/{id}/mark-paid",
            "/api/deposits/{id}/release",
            "/api/maintenance/sweeps",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing from OpenAPI");
        }
    }
}
