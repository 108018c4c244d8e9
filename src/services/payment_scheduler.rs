// src/services/payment_scheduler.rs

//! Expansão dos termos de cobrança do contrato em vencimentos mensais.
//!
//! Funções puras: quem chama busca os vencimentos já existentes e grava o
//! resultado. Rodar duas vezes com o mesmo horizonte não gera duplicatas.

use std::collections::HashSet;

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{
    lease::Lease,
    payment::{NewPayment, PaymentKind},
};

pub const DEFAULT_DUE_DAY: u32 = 1;
pub const DEFAULT_HORIZON_MONTHS: u32 = 12;
// Dia 29+ não existe em todo mês
pub const MAX_DUE_DAY: u32 = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulePolicy {
    pub due_day: u32,
    pub horizon_months: u32,
}

impl SchedulePolicy {
    pub fn new(due_day: u32, horizon_months: u32) -> Self {
        Self {
            due_day: due_day.clamp(1, MAX_DUE_DAY),
            horizon_months,
        }
    }
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_DUE_DAY, DEFAULT_HORIZON_MONTHS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingTerms {
    pub lease_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub monthly_rent: Decimal,
}

impl From<&Lease> for BillingTerms {
    fn from(lease: &Lease) -> Self {
        Self {
            lease_id: lease.id,
            start_date: lease.start_date,
            end_date: lease.end_date,
            monthly_rent: lease.monthly_rent,
        }
    }
}

/// Primeiro vencimento: o dia configurado no mês de início, ou no mês seguinte
/// se o contrato começa depois desse dia. Não há cobrança retroativa nem
/// proporcional do primeiro período.
pub fn first_due_date(start_date: NaiveDate, due_day: u32) -> Option<NaiveDate> {
    let anchor = start_date.with_day(due_day)?;

    if start_date.day() > due_day {
        anchor.checked_add_months(Months::new(1))
    } else {
        Some(anchor)
    }
}

/// Vencimentos candidatos dentro do horizonte, parando no fim do contrato.
pub fn due_dates(terms: &BillingTerms, policy: SchedulePolicy) -> Vec<NaiveDate> {
    let Some(first) = first_due_date(terms.start_date, policy.due_day) else {
        return Vec::new();
    };

    (0..policy.horizon_months)
        .map_while(|offset| first.checked_add_months(Months::new(offset)))
        .take_while(|due| *due <= terms.end_date)
        .collect()
}

/// Novos pagamentos a criar, pulando vencimentos que já existem.
pub fn plan_rent_schedule(
    terms: &BillingTerms,
    existing_due_dates: &HashSet<NaiveDate>,
    policy: SchedulePolicy,
) -> Vec<NewPayment> {
    due_dates(terms, policy)
        .into_iter()
        .filter(|due| !existing_due_dates.contains(due))
        .map(|due_date| NewPayment {
            lease_id: terms.lease_id,
            amount: terms.monthly_rent,
            due_date,
            kind: PaymentKind::Rent,
        })
        .collect()
}
