use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::domain::{BillStatus, MaintenanceBill};

/// Sum that clamps at `u64::MAX` instead of overflowing.
pub(crate) fn saturating_sum(amounts: impl IntoIterator<Item = u64>) -> u64 {
    amounts.into_iter().fold(0, u64::saturating_add)
}

pub fn total_amount(bills: &[MaintenanceBill]) -> u64 {
    saturating_sum(bills.iter().map(|bill| bill.amount))
}

/// Total billed plus `extra`, or `None` if it does not fit in a `u64`.
pub fn checked_total_with(bills: &[MaintenanceBill], extra: u64) -> Option<u64> {
    bills
        .iter()
        .try_fold(extra, |total, bill| total.checked_add(bill.amount))
}

/// Sum of bills whose status, recomputed for `today`, equals `status`.
pub fn amount_with_status(bills: &[MaintenanceBill], status: BillStatus, today: NaiveDate) -> u64 {
    saturating_sum(
        bills
            .iter()
            .filter(|bill| bill.effective_status(today) == status)
            .map(|bill| bill.amount),
    )
}

pub fn paid_amount(bills: &[MaintenanceBill], today: NaiveDate) -> u64 {
    amount_with_status(bills, BillStatus::Paid, today)
}

pub fn pending_amount(bills: &[MaintenanceBill], today: NaiveDate) -> u64 {
    amount_with_status(bills, BillStatus::Pending, today)
}

pub fn overdue_amount(bills: &[MaintenanceBill], today: NaiveDate) -> u64 {
    amount_with_status(bills, BillStatus::Overdue, today)
}

/// Share of billed money already collected. `None` when nothing has been billed.
pub fn collection_rate(bills: &[MaintenanceBill], today: NaiveDate) -> Option<f64> {
    ratio(paid_amount(bills, today), total_amount(bills))
}

/// Payments received in the calendar month containing `today`.
pub fn collected_in_month(bills: &[MaintenanceBill], today: NaiveDate) -> u64 {
    saturating_sum(
        bills
            .iter()
            .filter(|bill| bill.status == BillStatus::Paid)
            .filter(|bill| {
                bill.paid_on.is_some_and(|paid_on| {
                    paid_on.year() == today.year() && paid_on.month() == today.month()
                })
            })
            .map(|bill| bill.amount),
    )
}

pub(crate) fn ratio(numerator: u64, denominator: u64) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BillingSummary {
    pub total_amount: u64,
    pub paid_amount: u64,
    pub pending_amount: u64,
    pub overdue_amount: u64,
    pub paid_count: usize,
    pub pending_count: usize,
    pub overdue_count: usize,
    pub collection_rate: Option<f64>,
}

impl BillingSummary {
    pub fn from_bills(bills: &[MaintenanceBill], today: NaiveDate) -> Self {
        let mut summary = Self::default();

        for bill in bills {
            summary.total_amount = summary.total_amount.saturating_add(bill.amount);
            match bill.effective_status(today) {
                BillStatus::Paid => {
                    summary.paid_amount = summary.paid_amount.saturating_add(bill.amount);
                    summary.paid_count += 1;
                }
                BillStatus::Pending => {
                    summary.pending_amount = summary.pending_amount.saturating_add(bill.amount);
                    summary.pending_count += 1;
                }
                BillStatus::Overdue => {
                    summary.overdue_amount = summary.overdue_amount.saturating_add(bill.amount);
                    summary.overdue_count += 1;
                }
            }
        }

        summary.collection_rate = ratio(summary.paid_amount, summary.total_amount);
        summary
    }
}
