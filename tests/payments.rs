mod common;

use std::collections::HashSet;

use chrono::NaiveDate;
use common::{date, dec, Harness};
use proptest::prelude::*;
use rental_backend::{
    common::error::AppError,
    db::LedgerStore,
    models::payment::PaymentStatus,
    services::payment_scheduler::{plan_rent_schedule, BillingTerms, SchedulePolicy},
};
use uuid::Uuid;

#[tokio::test]
async fn generating_the_schedule_twice_creates_nothing_new() {
    let h = Harness::new().await;
    let payments = &h.state.payment_service;
    let lease = h.approved(date(2026, 1, 15), date(2027, 1, 14)).await;

    // A aprovação já criou fev/2026; faltam 11 no horizonte de 12
    let created = payments.generate_schedule(Some(&h.landlord), lease.id, None).await.unwrap();
    assert_eq!(created.len(), 11);
    assert_eq!(created.first().map(|p| p.due_date), Some(date(2026, 3, 1)));
    assert_eq!(created.last().map(|p| p.due_date), Some(date(2027, 1, 1)));

    let again = payments.generate_schedule(Some(&h.landlord), lease.id, None).await.unwrap();
    assert!(again.is_empty());

    let all = payments.list_payments(Some(&h.tenant), lease.id).await.unwrap();
    assert_eq!(all.len(), 12);
    let unique: HashSet<NaiveDate> = all.iter().map(|p| p.due_date).collect();
    assert_eq!(unique.len(), 12);
}

#[tokio::test]
async fn schedule_requires_an_approved_lease_and_a_sane_horizon() {
    let h = Harness::new().await;
    let payments = &h.state.payment_service;

    let signed = h.signed(date(2026, 1, 15), date(2027, 1, 14)).await;
    let not_yet = payments.generate_schedule(Some(&h.landlord), signed.id, None).await;
    assert!(matches!(not_yet, Err(AppError::InvalidState(_))));

    h.state.lease_service.approve(Some(&h.landlord), signed.id, None).await.unwrap();
    for horizon in [0, 121] {
        let result = payments.generate_schedule(Some(&h.landlord), signed.id, Some(horizon)).await;
        assert!(matches!(result, Err(AppError::Validation(_))), "horizon {horizon}");
    }

    let tenant_attempt = payments.generate_schedule(Some(&h.tenant), signed.id, Some(3)).await;
    assert!(matches!(tenant_attempt, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn mark_paid_settles_pending_and_overdue_once() {
    let h = Harness::new().await;
    let payments = &h.state.payment_service;
    let lease = h.approved(date(2026, 1, 15), date(2027, 1, 14)).await;
    payments.generate_schedule(Some(&h.landlord), lease.id, Some(2)).await.unwrap();

    let schedule = h.store.list_payments(lease.id).await.unwrap();
    let (first, second) = (schedule[0].clone(), schedule[1].clone());

    // Em 15/02 só a cobrança de fevereiro está atrasada
    assert_eq!(payments.mark_overdue(date(2026, 2, 15)).await.unwrap(), 1);
    assert_eq!(payments.mark_overdue(date(2026, 2, 15)).await.unwrap(), 0);

    let paid = payments
        .mark_paid(Some(&h.landlord), first.id, "pix", Some(" E2E-123 "))
        .await
        .unwrap();
    assert_eq!(paid.status, PaymentStatus::Paid);
    assert_eq!(paid.payment_method.as_deref(), Some("pix"));
    assert_eq!(paid.reference.as_deref(), Some("E2E-123"));
    assert!(paid.paid_at.is_some());

    let twice = payments.mark_paid(Some(&h.landlord), first.id, "pix", None).await;
    assert!(matches!(twice, Err(AppError::InvalidState(_))));

    let by_tenant = payments.mark_paid(Some(&h.tenant), second.id, "pix", None).await;
    assert!(matches!(by_tenant, Err(AppError::Unauthorized(_))));

    let no_method = payments.mark_paid(Some(&h.landlord), second.id, " ", None).await;
    assert!(matches!(no_method, Err(AppError::Validation(_))));

    let unknown = payments.mark_paid(Some(&h.landlord), Uuid::new_v4(), "pix", None).await;
    assert!(matches!(unknown, Err(AppError::NotFound(_))));

    // Pagas nunca voltam a atrasar
    assert_eq!(payments.mark_overdue(date(2026, 12, 31)).await.unwrap(), 1);
    let statuses: Vec<PaymentStatus> =
        h.store.list_payments(lease.id).await.unwrap().iter().map(|p| p.status).collect();
    assert_eq!(statuses, vec![PaymentStatus::Paid, PaymentStatus::Overdue]);
}

#[tokio::test]
async fn strangers_cannot_read_payments() {
    let h = Harness::new().await;
    let lease = h.approved(date(2026, 1, 15), date(2027, 1, 14)).await;

    let result = h.state.payment_service.list_payments(Some(&h.stranger), lease.id).await;
    assert!(matches!(result, Err(AppError::Unauthorized(_))));
}

fn arb_terms() -> impl Strategy<Value = BillingTerms> {
    (0i64..3650, 1i64..1200, 1i64..100_000).prop_map(|(offset, length, rent)| {
        let start = date(2024, 1, 1) + chrono::Duration::days(offset);
        BillingTerms {
            lease_id: Uuid::nil(),
            start_date: start,
            end_date: start + chrono::Duration::days(length),
            monthly_rent: dec(rent),
        }
    })
}

proptest! {
    #[test]
    fn planned_due_dates_are_unique_bounded_and_on_the_due_day(
        terms in arb_terms(),
        due_day in 1u32..=31,
        horizon in 1u32..=36,
    ) {
        let policy = SchedulePolicy::new(due_day, horizon);
        let plan = plan_rent_schedule(&terms, &HashSet::new(), policy);

        prop_assert!(plan.len() <= horizon as usize);

        let dates: HashSet<NaiveDate> = plan.iter().map(|p| p.due_date).collect();
        prop_assert_eq!(dates.len(), plan.len());

        for payment in &plan {
            prop_assert!(payment.due_date >= terms.start_date);
            prop_assert!(payment.due_date <= terms.end_date);
            prop_assert_eq!(chrono::Datelike::day(&payment.due_date), policy.due_day);
            prop_assert_eq!(payment.amount, terms.monthly_rent);
        }
    }

    #[test]
    fn replanning_with_existing_dates_is_empty(terms in arb_terms(), horizon in 1u32..=24) {
        let policy = SchedulePolicy::new(1, horizon);
        let first = plan_rent_schedule(&terms, &HashSet::new(), policy);
        let existing: HashSet<NaiveDate> = first.iter().map(|p| p.due_date).collect();

        prop_assert!(plan_rent_schedule(&terms, &existing, policy).is_empty());
    }
}
