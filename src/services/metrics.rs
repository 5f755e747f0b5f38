// src/services/metrics.rs
//
// Regras de negócio puras: taxas, valor total de deals, receita reconhecida
// e a consolidação diária. Nada aqui toca o banco.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::models::{
    appointment::{Appointment, AppointmentStatus},
    campaign::CampaignStats,
    deal::{Deal, DealStatus, Payment, PaymentPlan, PaymentType},
    lead::LeadFunnelRow,
    reports::{CloserStatsEntry, RevenueReport},
    stats::DailyStatsValues,
    user::User,
};

pub const NO_REASON_GIVEN: &str = "No reason given";

/// `wins / calls * 100`, ou 0 sem ligações.
pub fn conversion_rate(wins: i64, calls: i64) -> f64 {
    if calls <= 0 {
        return 0.0;
    }
    wins as f64 / calls as f64 * 100.0
}

/// `completed / (completed + no_shows) * 100`, ou 0 sem comparecimentos.
pub fn show_up_rate(completed: i64, no_shows: i64) -> f64 {
    if completed <= 0 {
        return 0.0;
    }
    completed as f64 / (completed + no_shows) as f64 * 100.0
}

/// À vista: fullAmount. Parcelado: entrada + parcela × número de parcelas.
/// Plano incompleto vale 0. `None` se a conta estoura o `Decimal`.
pub fn deal_total_value(plan: &PaymentPlan) -> Option<Decimal> {
    match plan.payment_type {
        PaymentType::Full => Some(plan.full_amount.unwrap_or(Decimal::ZERO)),
        PaymentType::Installments => {
            match (plan.down_payment, plan.monthly_rate, plan.number_of_rates) {
                (Some(down), Some(rate), Some(count)) => rate
                    .checked_mul(Decimal::from(count))
                    .and_then(|rates| rates.checked_add(down)),
                _ => Some(Decimal::ZERO),
            }
        }
    }
}

/// Receita reconhecida de um deal. À vista conta o preço inteiro assim que ganho;
/// parcelado conta só o que já entrou em caixa.
pub fn revenue_recognized(deal: &Deal, payments: &[Payment]) -> Decimal {
    if deal.status != DealStatus::Won {
        return Decimal::ZERO;
    }
    match deal.payment_type {
        PaymentType::Full => deal.product_price,
        PaymentType::Installments => payments
            .iter()
            .filter(|p| p.deal_id == deal.id)
            .map(|p| p.amount)
            .sum(),
    }
}

pub fn no_shows_by_reason<'a, I>(appointments: I) -> BTreeMap<String, i64>
where
    I: IntoIterator<Item = &'a Appointment>,
{
    let mut by_reason = BTreeMap::new();
    for appointment in appointments {
        let reason = appointment
            .no_show_reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(NO_REASON_GIVEN);
        *by_reason.entry(reason.to_string()).or_insert(0) += 1;
    }
    by_reason
}

/// Fatos brutos de um dia, já filtrados pela janela do dia.
#[derive(Debug, Clone, Default)]
pub struct DayFacts {
    pub leads_created: i64,
    pub appointment_statuses: Vec<AppointmentStatus>,
    /// Valor total dos deals ganhos no dia
    pub won_deal_values: Vec<Decimal>,
}

pub fn daily_stats(facts: &DayFacts) -> DailyStatsValues {
    let completed = facts
        .appointment_statuses
        .iter()
        .filter(|s| **s == AppointmentStatus::Completed)
        .count() as i64;
    let no_shows = facts
        .appointment_statuses
        .iter()
        .filter(|s| s.is_no_show())
        .count() as i64;
    let wins = facts.won_deal_values.len() as i64;

    DailyStatsValues {
        total_leads: clamp_i32(facts.leads_created),
        total_calls: clamp_i32(facts.appointment_statuses.len() as i64),
        total_wins: clamp_i32(wins),
        total_revenue: facts.won_deal_values.iter().copied().sum(),
        show_up_rate: show_up_rate(completed, no_shows),
        conversion_rate: conversion_rate(wins, completed),
    }
}

pub fn campaign_stats(rows: &[LeadFunnelRow]) -> CampaignStats {
    CampaignStats {
        total_leads: rows.len() as i64,
        appointments: rows.iter().filter(|r| r.appointment_status.is_some()).count() as i64,
        deals: rows
            .iter()
            .filter(|r| r.deal_status == Some(DealStatus::Won))
            .count() as i64,
        no_shows: rows
            .iter()
            .filter(|r| r.appointment_status.is_some_and(AppointmentStatus::is_no_show))
            .count() as i64,
    }
}

/// Estatísticas de um closer sobre os deals do período.
pub fn closer_stats(closer: &User, deals: &[Deal], payments: &[Payment]) -> CloserStatsEntry {
    let own: Vec<&Deal> = deals.iter().filter(|d| d.closer_id == closer.id).collect();
    let won = own.iter().filter(|d| d.status == DealStatus::Won).count() as i64;
    let lost = own.iter().filter(|d| d.status.is_lost()).count() as i64;
    let follow_up = own.iter().filter(|d| d.status == DealStatus::FollowUp).count() as i64;

    let revenue: Decimal = own.iter().map(|d| revenue_recognized(d, payments)).sum();

    CloserStatsEntry {
        id: closer.id,
        name: closer.name.clone(),
        total_deals: own.len() as i64,
        won,
        lost,
        follow_up,
        conversion_rate: round1(conversion_rate(won, own.len() as i64)),
        revenue: revenue.round_dp(2),
        avg_deal_value: average(revenue, won),
    }
}

/// Receita sobre deals já filtrados como ganhos no período.
pub fn revenue_report(won_deals: &[Deal], payments: &[Payment]) -> RevenueReport {
    let total: Decimal = won_deals
        .iter()
        .map(|d| revenue_recognized(d, payments))
        .sum();
    let count = won_deals.len() as i64;

    RevenueReport {
        total_revenue: total.round_dp(2),
        total_deals: count,
        avg_deal_value: average(total, count),
    }
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn average(total: Decimal, count: i64) -> Decimal {
    if count <= 0 {
        return Decimal::ZERO;
    }
    (total / Decimal::from(count)).round_dp(2)
}

fn clamp_i32(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn deal(status: DealStatus, payment_type: PaymentType, price: Decimal) -> Deal {
        let now = Utc::now();
        Deal {
            id: Uuid::new_v4(),
            appointment_id: Uuid::new_v4(),
            closer_id: Uuid::new_v4(),
            status,
            payment_type,
            product_price: price,
            full_amount: None,
            down_payment: None,
            monthly_rate: None,
            number_of_rates: None,
            total_value: Decimal::ZERO,
            follow_up_date: None,
            lost_reason: None,
            closed_at: (status == DealStatus::Won).then_some(now),
            created_at: now,
            updated_at: now,
        }
    }

    fn payment(deal_id: Uuid, amount: Decimal) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            deal_id,
            amount,
            paid_at: Utc::now(),
            note: None,
        }
    }

    fn no_show(reason: Option<&str>) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: Uuid::new_v4(),
            lead_id: Uuid::new_v4(),
            closer_id: Uuid::new_v4(),
            scheduled_at: now,
            status: AppointmentStatus::NoShowOther,
            no_show_reason: reason.map(str::to_string),
            showed_up: Some(false),
            call_duration: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn closer() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: "Lena".to_string(),
            email: "lena@vertrieb.de".to_string(),
            role: crate::models::user::UserRole::Closer,
            total_calls: 0,
            total_wins: 0,
            total_revenue: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn conversion_rate_is_zero_without_calls() {
        assert_eq!(conversion_rate(0, 0), 0.0);
        assert_eq!(conversion_rate(3, 0), 0.0);
    }

    #[test]
    fn conversion_rate_is_wins_over_calls() {
        assert_eq!(conversion_rate(1, 4), 25.0);
        assert_eq!(conversion_rate(3, 3), 100.0);
        assert_eq!(conversion_rate(1, 3), 1.0 / 3.0 * 100.0);
    }

    #[test]
    fn show_up_rate_counts_completed_over_attended_and_missed() {
        assert_eq!(show_up_rate(0, 0), 0.0);
        assert_eq!(show_up_rate(0, 5), 0.0);
        assert_eq!(show_up_rate(3, 1), 75.0);
        assert_eq!(show_up_rate(2, 0), 100.0);
    }

    #[test]
    fn total_value_of_full_payment_is_the_full_amount() {
        let plan = PaymentPlan {
            payment_type: PaymentType::Full,
            full_amount: Some(dec!(2500)),
            down_payment: None,
            monthly_rate: None,
            number_of_rates: None,
        };
        assert_eq!(deal_total_value(&plan), Some(dec!(2500)));
    }

    #[test]
    fn total_value_of_installments_adds_down_payment_and_rates() {
        let plan = PaymentPlan {
            payment_type: PaymentType::Installments,
            full_amount: None,
            down_payment: Some(dec!(500)),
            monthly_rate: Some(dec!(200)),
            number_of_rates: Some(10),
        };
        assert_eq!(deal_total_value(&plan), Some(dec!(2500)));

        let four_rates = PaymentPlan {
            monthly_rate: Some(dec!(250)),
            number_of_rates: Some(4),
            ..plan
        };
        assert_eq!(deal_total_value(&four_rates), Some(dec!(1500)));
    }

    #[test]
    fn overflowing_installments_have_no_total() {
        let plan = PaymentPlan {
            payment_type: PaymentType::Installments,
            full_amount: None,
            down_payment: Some(dec!(500)),
            monthly_rate: Some(Decimal::MAX),
            number_of_rates: Some(100),
        };
        assert_eq!(deal_total_value(&plan), None);

        let at_the_edge = PaymentPlan {
            monthly_rate: Some(Decimal::MAX),
            number_of_rates: Some(1),
            ..plan
        };
        assert_eq!(deal_total_value(&at_the_edge), None);
    }

    #[test]
    fn incomplete_plans_are_worth_nothing() {
        let plan = PaymentPlan {
            payment_type: PaymentType::Installments,
            full_amount: Some(dec!(999)),
            down_payment: Some(dec!(500)),
            monthly_rate: None,
            number_of_rates: Some(10),
        };
        assert_eq!(deal_total_value(&plan), Some(Decimal::ZERO));

        let full = PaymentPlan {
            payment_type: PaymentType::Full,
            full_amount: None,
            ..plan
        };
        assert_eq!(deal_total_value(&full), Some(Decimal::ZERO));
    }

    #[test]
    fn full_payment_revenue_is_recognized_immediately() {
        let won = deal(DealStatus::Won, PaymentType::Full, dec!(1000));
        assert_eq!(revenue_recognized(&won, &[]), dec!(1000));
    }

    #[test]
    fn installment_revenue_is_the_sum_of_payments() {
        let mut won = deal(DealStatus::Won, PaymentType::Installments, dec!(2500));
        won.total_value = dec!(2500);
        let other = Uuid::new_v4();
        let payments = vec![
            payment(won.id, dec!(300)),
            payment(won.id, dec!(200)),
            payment(other, dec!(1000)),
        ];
        assert_eq!(revenue_recognized(&won, &payments), dec!(500));
    }

    #[test]
    fn open_deals_recognize_no_revenue() {
        let pending = deal(DealStatus::Pending, PaymentType::Full, dec!(1000));
        let lost = deal(DealStatus::LostTooExpensive, PaymentType::Full, dec!(1000));
        assert_eq!(revenue_recognized(&pending, &[]), Decimal::ZERO);
        assert_eq!(revenue_recognized(&lost, &[]), Decimal::ZERO);
    }

    #[test]
    fn no_shows_are_grouped_by_reason() {
        let appointments = vec![
            no_show(Some("Ghosting")),
            no_show(Some("Ghosting")),
            no_show(Some("Krank")),
            no_show(None),
            no_show(Some("  ")),
        ];
        let grouped = no_shows_by_reason(&appointments);
        assert_eq!(grouped.get("Ghosting"), Some(&2));
        assert_eq!(grouped.get("Krank"), Some(&1));
        assert_eq!(grouped.get(NO_REASON_GIVEN), Some(&2));
        assert_eq!(grouped.len(), 3);
    }

    #[test]
    fn daily_stats_aggregates_the_day() {
        use AppointmentStatus::*;
        let facts = DayFacts {
            leads_created: 7,
            appointment_statuses: vec![Completed, Completed, Completed, NoShowGhosting, Scheduled],
            won_deal_values: vec![dec!(2500), dec!(1500)],
        };
        let stats = daily_stats(&facts);

        assert_eq!(stats.total_leads, 7);
        assert_eq!(stats.total_calls, 5);
        assert_eq!(stats.total_wins, 2);
        assert_eq!(stats.total_revenue, dec!(4000));
        assert_eq!(stats.show_up_rate, 75.0);
        assert_eq!(stats.conversion_rate, 2.0 / 3.0 * 100.0);
    }

    #[test]
    fn daily_stats_is_deterministic() {
        let facts = DayFacts {
            leads_created: 3,
            appointment_statuses: vec![AppointmentStatus::Completed, AppointmentStatus::NoShowSick],
            won_deal_values: vec![dec!(999.99)],
        };
        assert_eq!(daily_stats(&facts), daily_stats(&facts));
        assert_eq!(daily_stats(&DayFacts::default()), DailyStatsValues::default());
    }

    #[test]
    fn campaign_stats_count_the_funnel() {
        let rows = vec![
            LeadFunnelRow { appointment_status: None, deal_status: None },
            LeadFunnelRow {
                appointment_status: Some(AppointmentStatus::Completed),
                deal_status: Some(DealStatus::Won),
            },
            LeadFunnelRow {
                appointment_status: Some(AppointmentStatus::Completed),
                deal_status: Some(DealStatus::FollowUp),
            },
            LeadFunnelRow {
                appointment_status: Some(AppointmentStatus::NoShowForgot),
                deal_status: None,
            },
        ];
        let stats = campaign_stats(&rows);
        assert_eq!(
            stats,
            CampaignStats { total_leads: 4, appointments: 3, deals: 1, no_shows: 1 }
        );
    }

    #[test]
    fn closer_stats_use_recognized_revenue() {
        let lena = closer();
        let mut full = deal(DealStatus::Won, PaymentType::Full, dec!(1000));
        full.closer_id = lena.id;
        let mut installments = deal(DealStatus::Won, PaymentType::Installments, dec!(3000));
        installments.closer_id = lena.id;
        let mut lost = deal(DealStatus::LostNoNeed, PaymentType::Full, dec!(0));
        lost.closer_id = lena.id;
        let someone_else = deal(DealStatus::Won, PaymentType::Full, dec!(5000));

        let payments = vec![payment(installments.id, dec!(500))];
        let deals = vec![full, installments, lost, someone_else];
        let stats = closer_stats(&lena, &deals, &payments);

        assert_eq!(stats.total_deals, 3);
        assert_eq!(stats.won, 2);
        assert_eq!(stats.lost, 1);
        assert_eq!(stats.follow_up, 0);
        assert_eq!(stats.conversion_rate, 66.7);
        assert_eq!(stats.revenue, dec!(1500));
        assert_eq!(stats.avg_deal_value, dec!(750));
    }

    #[test]
    fn revenue_report_averages_over_won_deals() {
        let a = deal(DealStatus::Won, PaymentType::Full, dec!(1000));
        let b = deal(DealStatus::Won, PaymentType::Installments, dec!(2000));
        let payments = vec![payment(b.id, dec!(250))];
        let report = revenue_report(&[a, b], &payments);

        assert_eq!(report.total_revenue, dec!(1250));
        assert_eq!(report.total_deals, 2);
        assert_eq!(report.avg_deal_value, dec!(625));

        let empty = revenue_report(&[], &[]);
        assert_eq!(empty.total_deals, 0);
        assert_eq!(empty.avg_deal_value, Decimal::ZERO);
    }
}
