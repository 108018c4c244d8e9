mod common;

use common::{date, dec, Harness};
use rental_backend::{
    common::error::AppError,
    db::LedgerStore,
    models::{
        deposit::DepositStatus,
        events::LeaseEvent,
        lease::{DocumentKind, LeaseStatus},
        payment::{PaymentKind, PaymentStatus},
    },
    services::{document_service::DocumentUpload, lease_service::SignLease},
};

#[tokio::test]
async fn send_sign_approve_opens_the_lease() {
    let h = Harness::new().await;
    let leases = &h.state.lease_service;

    let lease = h.draft(date(2026, 1, 15), date(2027, 1, 14)).await;
    assert_eq!(lease.status, LeaseStatus::Draft);
    assert_eq!(lease.landlord_id, h.landlord.id);

    let sent = leases.send(Some(&h.landlord), lease.id).await.unwrap();
    assert_eq!(sent.status, LeaseStatus::SentToTenant);
    assert!(sent.sent_at.is_some());

    let signed = leases.sign(Some(&h.tenant), lease.id, Harness::signature()).await.unwrap();
    assert_eq!(signed.status, LeaseStatus::TenantSigned);
    assert!(signed.signed_at.is_some());
    assert_eq!(signed.tenant_documents.len(), 2);
    assert_eq!(signed.tenant_documents[0].url, "https://files.test/tenant/front.jpg");

    let approved = leases
        .approve(Some(&h.landlord), lease.id, Some("assinatura-locador".into()))
        .await
        .unwrap();
    assert_eq!(approved.status, LeaseStatus::Approved);
    assert!(approved.approved_at.is_some());
    assert_eq!(approved.landlord_signature_data.as_deref(), Some("assinatura-locador"));

    assert!(!h.property().await.is_available);

    // Uma cobrança: dia 1 do mês seguinte ao início
    let payments = h.store.list_payments(lease.id).await.unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].due_date, date(2026, 2, 1));
    assert_eq!(payments[0].amount, dec(1500));
    assert_eq!(payments[0].status, PaymentStatus::Pending);
    assert_eq!(payments[0].kind, PaymentKind::Rent);

    let deposit = h.store.find_deposit_by_lease(lease.id).await.unwrap().unwrap();
    assert_eq!(deposit.status, DepositStatus::Pending);
    assert_eq!(deposit.amount, dec(3000));

    assert_eq!(h.events.kinds(), vec!["lease_sent", "lease_signed", "lease_approved"]);
    assert_eq!(
        h.events.events()[1],
        LeaseEvent::LeaseSigned { lease_id: lease.id, landlord_id: h.landlord.id }
    );
}

#[tokio::test]
async fn approval_without_deposit_amount_opens_no_escrow() {
    let h = Harness::new().await;
    let leases = &h.state.lease_service;

    let mut input = h.lease_input(date(2026, 3, 1), date(2026, 9, 1));
    input.deposit_amount = dec(0);
    let lease = leases.create_lease(Some(&h.landlord), input).await.unwrap();

    leases.send(Some(&h.landlord), lease.id).await.unwrap();
    leases.sign(Some(&h.tenant), lease.id, Harness::signature()).await.unwrap();
    leases.approve(Some(&h.admin), lease.id, None).await.unwrap();

    assert!(h.store.find_deposit_by_lease(lease.id).await.unwrap().is_none());
    // Começa no dia 1: a primeira cobrança é no próprio mês
    let payments = h.store.list_payments(lease.id).await.unwrap();
    assert_eq!(payments[0].due_date, date(2026, 3, 1));
}

#[tokio::test]
async fn terminate_approved_lease_frees_the_property() {
    let h = Harness::new().await;
    let lease = h.approved(date(2026, 1, 15), date(2027, 1, 14)).await;
    assert!(!h.property().await.is_available);

    let terminated = h
        .state
        .lease_service
        .terminate(Some(&h.landlord), lease.id, "  mudança de cidade ")
        .await
        .unwrap();

    assert_eq!(terminated.status, LeaseStatus::Terminated);
    assert_eq!(terminated.termination_reason.as_deref(), Some("mudança de cidade"));
    assert!(terminated.terminated_at.is_some());
    assert!(h.property().await.is_available);

    // Cobranças existentes ficam como estavam
    let payments = h.store.list_payments(lease.id).await.unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].due_date, date(2026, 2, 1));
    assert_eq!(payments[0].status, PaymentStatus::Pending);

    // Estado terminal
    let again = h.state.lease_service.terminate(Some(&h.landlord), lease.id, "de novo").await;
    assert!(matches!(again, Err(AppError::InvalidState(_))));
}

#[tokio::test]
async fn terminating_a_draft_keeps_property_availability() {
    let h = Harness::new().await;
    let lease = h.draft(date(2026, 1, 15), date(2027, 1, 14)).await;

    h.state
        .lease_service
        .terminate(Some(&h.landlord), lease.id, "desistência")
        .await
        .unwrap();

    assert!(h.property().await.is_available);
    assert!(h.events.events().is_empty());
}

#[tokio::test]
async fn revision_request_clears_signature_and_allows_resigning() {
    let h = Harness::new().await;
    let leases = &h.state.lease_service;
    let lease = h.signed(date(2026, 1, 15), date(2027, 1, 14)).await;

    let revised = leases
        .request_revision(Some(&h.landlord), lease.id, "Documento ilegível")
        .await
        .unwrap();

    assert_eq!(revised.status, LeaseStatus::RevisionRequested);
    assert_eq!(revised.tenant_signature_data, None);
    assert!(revised.tenant_documents.is_empty());
    assert_eq!(revised.signed_at, None);
    assert_eq!(revised.landlord_notes.as_deref(), Some("Documento ilegível"));
    assert_eq!(
        h.events.events().last(),
        Some(&LeaseEvent::RevisionRequested {
            lease_id: lease.id,
            tenant_id: h.tenant.id,
            notes: "Documento ilegível".into(),
        })
    );

    let resigned = leases.sign(Some(&h.tenant), lease.id, Harness::signature()).await.unwrap();
    assert_eq!(resigned.status, LeaseStatus::TenantSigned);
    assert_eq!(resigned.tenant_documents.len(), 2);
}

#[tokio::test]
async fn reject_is_terminal_and_requires_notes() {
    let h = Harness::new().await;
    let leases = &h.state.lease_service;
    let lease = h.signed(date(2026, 1, 15), date(2027, 1, 14)).await;

    let missing = leases.reject(Some(&h.landlord), lease.id, "   ").await;
    assert!(matches!(missing, Err(AppError::Validation(_))));
    assert_eq!(h.lease(lease.id).await.status, LeaseStatus::TenantSigned);

    let rejected = leases.reject(Some(&h.landlord), lease.id, "Renda insuficiente").await.unwrap();
    assert_eq!(rejected.status, LeaseStatus::Rejected);
    assert_eq!(rejected.landlord_notes.as_deref(), Some("Renda insuficiente"));

    let approve = leases.approve(Some(&h.landlord), lease.id, None).await;
    assert!(matches!(approve, Err(AppError::InvalidState(_))));
    assert!(h.property().await.is_available);
}

#[tokio::test]
async fn out_of_order_actions_name_the_precondition() {
    let h = Harness::new().await;
    let leases = &h.state.lease_service;
    let lease = h.draft(date(2026, 1, 15), date(2027, 1, 14)).await;

    let err = leases.approve(Some(&h.landlord), lease.id, None).await.unwrap_err();
    match err {
        AppError::InvalidState(message) => {
            assert!(message.contains("assinado pelo inquilino"), "{message}");
            assert!(message.contains("draft"), "{message}");
        }
        other => panic!("expected InvalidState, got {other:?}"),
    }

    let sign = leases.sign(Some(&h.tenant), lease.id, Harness::signature()).await;
    assert!(matches!(sign, Err(AppError::InvalidState(_))));

    // Nada mudou
    assert_eq!(h.lease(lease.id).await.status, LeaseStatus::Draft);
    assert!(h.events.events().is_empty());
}

#[tokio::test]
async fn authentication_and_authorization_come_before_state_checks() {
    let h = Harness::new().await;
    let leases = &h.state.lease_service;
    let lease = h.draft(date(2026, 1, 15), date(2027, 1, 14)).await;

    assert!(matches!(leases.send(None, lease.id).await, Err(AppError::Unauthenticated)));
    assert!(matches!(leases.send(Some(&h.tenant), lease.id).await, Err(AppError::Unauthorized(_))));
    assert!(matches!(leases.get_lease(Some(&h.stranger), lease.id).await, Err(AppError::Unauthorized(_))));

    // Mesmo em estado errado, o estranho recebe 403 e não 409
    let sign = leases.sign(Some(&h.stranger), lease.id, Harness::signature()).await;
    assert!(matches!(sign, Err(AppError::Unauthorized(_))));

    // Admin não assina pelo inquilino
    leases.send(Some(&h.admin), lease.id).await.unwrap();
    let sign = leases.sign(Some(&h.admin), lease.id, Harness::signature()).await;
    assert!(matches!(sign, Err(AppError::Unauthorized(_))));

    let missing = leases.get_lease(Some(&h.tenant), uuid::Uuid::new_v4()).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn signing_requires_signature_and_valid_documents() {
    let h = Harness::new().await;
    let leases = &h.state.lease_service;
    let lease = h.draft(date(2026, 1, 15), date(2027, 1, 14)).await;
    leases.send(Some(&h.landlord), lease.id).await.unwrap();

    let blank = SignLease { signature_data: "  ".into(), ..Harness::signature() };
    assert!(matches!(leases.sign(Some(&h.tenant), lease.id, blank).await, Err(AppError::Validation(_))));

    let only_front = SignLease {
        documents: vec![DocumentUpload { kind: DocumentKind::IdFront, file_ref: "f.jpg".into() }],
        ..Harness::signature()
    };
    assert!(matches!(
        leases.sign(Some(&h.tenant), lease.id, only_front).await,
        Err(AppError::Validation(_))
    ));

    let mut rejected_file = Harness::signature();
    rejected_file.documents[1].file_ref = "tenant/back.exe".into();
    assert!(matches!(
        leases.sign(Some(&h.tenant), lease.id, rejected_file).await,
        Err(AppError::Validation(_))
    ));

    assert_eq!(h.lease(lease.id).await.status, LeaseStatus::SentToTenant);
}

#[tokio::test]
async fn property_holds_a_single_approved_lease() {
    let h = Harness::new().await;
    let leases = &h.state.lease_service;

    let first = h.signed(date(2026, 1, 15), date(2027, 1, 14)).await;
    let second = h.signed(date(2026, 2, 1), date(2027, 1, 31)).await;

    leases.approve(Some(&h.landlord), first.id, None).await.unwrap();
    let clash = leases.approve(Some(&h.landlord), second.id, None).await;

    assert!(matches!(clash, Err(AppError::InvalidState(_))));
    assert_eq!(h.lease(second.id).await.status, LeaseStatus::TenantSigned);
}

#[tokio::test]
async fn creation_validates_terms_and_ownership() {
    let h = Harness::new().await;
    let leases = &h.state.lease_service;

    let mut bad_dates = h.lease_input(date(2026, 5, 1), date(2026, 5, 1));
    bad_dates.start_date = date(2026, 6, 1);
    assert!(matches!(leases.create_lease(Some(&h.landlord), bad_dates).await, Err(AppError::Validation(_))));

    let mut free_rent = h.lease_input(date(2026, 5, 1), date(2027, 5, 1));
    free_rent.monthly_rent = dec(0);
    assert!(matches!(leases.create_lease(Some(&h.landlord), free_rent).await, Err(AppError::Validation(_))));

    let mut negative_deposit = h.lease_input(date(2026, 5, 1), date(2027, 5, 1));
    negative_deposit.deposit_amount = dec(-1);
    assert!(matches!(
        leases.create_lease(Some(&h.landlord), negative_deposit).await,
        Err(AppError::Validation(_))
    ));

    let someone_elses = h.lease_input(date(2026, 5, 1), date(2027, 5, 1));
    assert!(matches!(
        leases.create_lease(Some(&h.stranger), someone_elses).await,
        Err(AppError::Unauthorized(_))
    ));

    let mut unknown_property = h.lease_input(date(2026, 5, 1), date(2027, 5, 1));
    unknown_property.property_id = uuid::Uuid::new_v4();
    assert!(matches!(
        leases.create_lease(Some(&h.landlord), unknown_property).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn listing_is_scoped_to_the_principal() {
    let h = Harness::new().await;
    let leases = &h.state.lease_service;

    let lease = h.draft(date(2026, 1, 15), date(2027, 1, 14)).await;

    let for_landlord = leases.list_leases(Some(&h.landlord), None).await.unwrap();
    let for_tenant = leases.list_leases(Some(&h.tenant), None).await.unwrap();
    let for_stranger = leases.list_leases(Some(&h.stranger), None).await.unwrap();
    let for_admin = leases.list_leases(Some(&h.admin), Some(h.property.id)).await.unwrap();

    assert_eq!(for_landlord.iter().map(|l| l.id).collect::<Vec<_>>(), vec![lease.id]);
    assert_eq!(for_tenant.len(), 1);
    assert!(for_stranger.is_empty());
    assert_eq!(for_admin.len(), 1);
    assert!(matches!(leases.list_leases(None, None).await, Err(AppError::Unauthenticated)));
}

#[tokio::test]
async fn concurrent_approvals_apply_once() {
    let h = Harness::new().await;
    let lease = h.signed(date(2026, 1, 15), date(2027, 1, 14)).await;

    let a = h.state.lease_service.clone();
    let b = h.state.lease_service.clone();
    let (landlord_a, landlord_b) = (h.landlord.clone(), h.landlord.clone());
    let id = lease.id;

    let (first, second) = tokio::join!(
        async move { a.approve(Some(&landlord_a), id, None).await },
        async move { b.approve(Some(&landlord_b), id, None).await },
    );

    let successes = [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1);
    assert_eq!(h.store.list_payments(lease.id).await.unwrap().len(), 1);
    assert_eq!(h.events.kinds().iter().filter(|k| **k == "lease_approved").count(), 1);
}
