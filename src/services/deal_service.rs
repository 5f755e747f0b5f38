// src/services/deal_service.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        validation::{field_error, max_money},
    },
    db::{AppointmentRepository, DealFilter, DealRepository, DealStatusChange, LeadRepository, UserRepository},
    models::{
        deal::{Deal, DealDetail, DealStatus, DealWithPayments, NewDeal, Payment, PaymentPlan, PaymentType},
        lead::LeadContact,
        user::CloserSummary,
    },
    services::{
        lookup::{group_by, index_by, unique_ids},
        metrics,
    },
};

pub const FULL_PAYMENT_NOTE: &str = "Full payment";
pub const DOWN_PAYMENT_NOTE: &str = "Down payment";

/// Dados de entrada de um deal novo. O closer vem da consulta.
#[derive(Debug, Clone)]
pub struct CreateDeal {
    pub appointment_id: Uuid,
    pub status: DealStatus,
    pub product_price: Decimal,
    pub plan: PaymentPlan,
    pub follow_up_date: Option<DateTime<Utc>>,
    pub lost_reason: Option<String>,
    /// Registra a entrada como pagamento já recebido (só parcelado)
    pub down_payment_received: bool,
}

#[derive(Debug, Clone)]
pub struct UpdateDealStatus {
    pub status: DealStatus,
    pub lost_reason: Option<String>,
    pub follow_up_date: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct DealService {
    deals: DealRepository,
    appointments: AppointmentRepository,
    leads: LeadRepository,
    users: UserRepository,
}

impl DealService {
    pub fn new(
        deals: DealRepository,
        appointments: AppointmentRepository,
        leads: LeadRepository,
        users: UserRepository,
    ) -> Self {
        Self {
            deals,
            appointments,
            leads,
            users,
        }
    }

    pub async fn list_deals<'e, E>(&self, executor: E, filter: &DealFilter) -> Result<Vec<DealDetail>, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;
        let deals = self.deals.list(&mut *tx, filter).await?;
        let details = self.details(&mut tx, deals).await?;
        tx.commit().await?;
        Ok(details)
    }

    pub async fn get_deal<'e, E>(&self, executor: E, id: Uuid) -> Result<DealDetail, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;
        let deal = self
            .deals
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::DealNotFound)?;
        let mut details = self.details(&mut tx, vec![deal]).await?;
        tx.commit().await?;

        details.pop().ok_or(AppError::DealNotFound)
    }

    /// Cria o deal, o pagamento automático e os contadores do closer numa
    /// única transação.
    pub async fn create_deal<'e, E>(&self, executor: E, input: CreateDeal) -> Result<DealWithPayments, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let appointment = self
            .appointments
            .find_for_update(&mut *tx, input.appointment_id)
            .await?
            .ok_or(AppError::AppointmentNotFound)?;

        let new_deal = build_new_deal(&input, appointment.closer_id, Utc::now())?;
        let deal = self.deals.create(&mut *tx, &new_deal).await?;

        let mut payments = Vec::new();
        if let Some((amount, note)) = automatic_payment(&deal, input.down_payment_received) {
            let payment = self.deals.add_payment(&mut *tx, deal.id, amount, Some(note)).await?;
            payments.push(payment);
        }

        if deal.status == DealStatus::Won {
            self.users.record_win(&mut *tx, deal.closer_id, deal.total_value).await?;
        }

        tx.commit().await?;

        tracing::info!(
            "Deal criado: {} ({:?}, valor total {})",
            deal.id,
            deal.status,
            deal.total_value
        );
        Ok(DealWithPayments::new(deal, payments))
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        input: &UpdateDealStatus,
    ) -> Result<Deal, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let current = self
            .deals
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::DealNotFound)?;

        if !current.status.can_transition_to(input.status) {
            return Err(AppError::InvalidTransition {
                from: format!("{:?}", current.status),
                to: format!("{:?}", input.status),
            });
        }

        let change = DealStatusChange {
            status: input.status,
            lost_reason: input.lost_reason.as_deref(),
            follow_up_date: input.follow_up_date,
            closed_at: (input.status == DealStatus::Won).then(Utc::now),
        };
        let updated = self.deals.update_status(&mut *tx, id, &change).await?;

        if updated.status == DealStatus::Won {
            self.users
                .record_win(&mut *tx, updated.closer_id, updated.total_value)
                .await?;
        }

        tx.commit().await?;

        tracing::info!("Deal {}: {:?} -> {:?}", id, current.status, updated.status);
        Ok(updated)
    }

    pub async fn add_payment<'e, E>(
        &self,
        executor: E,
        deal_id: Uuid,
        amount: Decimal,
        note: Option<&str>,
    ) -> Result<Payment, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        self.deals
            .find_by_id(&mut *tx, deal_id)
            .await?
            .ok_or(AppError::DealNotFound)?;
        let payment = self.deals.add_payment(&mut *tx, deal_id, amount, note).await?;

        tx.commit().await?;
        Ok(payment)
    }

    async fn details(&self, conn: &mut PgConnection, deals: Vec<Deal>) -> Result<Vec<DealDetail>, AppError> {
        let deal_ids: Vec<Uuid> = deals.iter().map(|d| d.id).collect();
        let appointment_ids = unique_ids(deals.iter().map(|d| d.appointment_id));
        let closer_ids = unique_ids(deals.iter().map(|d| d.closer_id));

        let payments = self.deals.payments_for(&mut *conn, &deal_ids).await?;
        let appointments = self.appointments.find_many(&mut *conn, &appointment_ids).await?;
        let lead_ids = unique_ids(appointments.iter().map(|a| a.lead_id));
        let leads = self.leads.find_many(&mut *conn, &lead_ids).await?;
        let closers = self.users.find_many(&mut *conn, &closer_ids).await?;

        let mut payments = group_by(payments, |p| p.deal_id);
        let appointments = index_by(appointments, |a| a.id);
        let leads = index_by(leads, |l| l.id);
        let closers = index_by(closers, |u| u.id);

        Ok(deals
            .into_iter()
            .map(|deal| {
                let lead = appointments
                    .get(&deal.appointment_id)
                    .and_then(|a| leads.get(&a.lead_id))
                    .map(LeadContact::from);
                let closer = closers.get(&deal.closer_id).map(CloserSummary::from);
                let deal_payments = payments.remove(&deal.id).unwrap_or_default();
                DealDetail {
                    deal: DealWithPayments::new(deal, deal_payments),
                    lead,
                    closer,
                }
            })
            .collect())
    }
}

/// À vista sem `fullAmount` usa o preço do produto.
/// Valor total fora da coluna de dinheiro é erro de validação.
fn build_new_deal(input: &CreateDeal, closer_id: Uuid, now: DateTime<Utc>) -> Result<NewDeal, AppError> {
    let mut plan = input.plan;
    if plan.payment_type == PaymentType::Full && plan.full_amount.is_none() {
        plan.full_amount = Some(input.product_price);
    }

    let total_value = metrics::deal_total_value(&plan)
        .filter(|total| *total <= max_money())
        .ok_or_else(|| {
            AppError::ValidationError(field_error(
                "total_value",
                "max_amount",
                "total value must not exceed 9999999999.99",
            ))
        })?;

    Ok(NewDeal {
        appointment_id: input.appointment_id,
        closer_id,
        status: input.status,
        product_price: input.product_price,
        total_value,
        plan,
        follow_up_date: input.follow_up_date,
        lost_reason: input.lost_reason.clone(),
        closed_at: (input.status == DealStatus::Won).then_some(now),
    })
}

/// Pagamento registrado junto com a criação do deal, se houver.
fn automatic_payment(deal: &Deal, down_payment_received: bool) -> Option<(Decimal, &'static str)> {
    match deal.payment_type {
        PaymentType::Full if deal.status == DealStatus::Won => deal
            .full_amount
            .filter(|a| *a > Decimal::ZERO)
            .map(|a| (a, FULL_PAYMENT_NOTE)),
        PaymentType::Installments if down_payment_received => deal
            .down_payment
            .filter(|a| *a > Decimal::ZERO)
            .map(|a| (a, DOWN_PAYMENT_NOTE)),
        _ => None,
    }
}
