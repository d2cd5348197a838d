//! Point-in-time views of the store.
//!
//! A [`Snapshot`] is a private copy of the store's sequence of payment
//! references. Filtering, sorting and aggregation run on the copy, so they
//! need no lock and never see a half-finished insert. Payment statuses are
//! still read live from the shared payments at the moment each query runs.

use crate::payment::{Payment, PaymentStatus};
use std::sync::Arc;

/// Immutable copy of the store's payments, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    payments: Vec<Arc<Payment>>,
}

/// Aggregates over a single snapshot.
///
/// All fields are computed from the same pass, so
/// `average_success_amount == total_success_amount / success_count` whenever
/// `success_count > 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    /// Number of payments regardless of status.
    pub count: usize,

    /// Number of payments with status SUCCESS.
    pub success_count: usize,

    /// Sum of SUCCESS amounts, `0.0` when there are none.
    pub total_success_amount: f64,

    /// Mean of SUCCESS amounts, `0.0` when there are none.
    pub average_success_amount: f64,
}

impl Snapshot {
    pub(crate) fn new(payments: Vec<Arc<Payment>>) -> Self {
        Snapshot { payments }
    }

    /// Payments in insertion order.
    pub fn payments(&self) -> &[Arc<Payment>] {
        &self.payments
    }

    pub fn into_payments(self) -> Vec<Arc<Payment>> {
        self.payments
    }

    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }

    /// Payments whose status equals `status` right now, in insertion order.
    pub fn by_status(&self, status: PaymentStatus) -> Vec<Arc<Payment>> {
        self.payments
            .iter()
            .filter(|p| p.has_status(status))
            .cloned()
            .collect()
    }

    /// Plain left-to-right `f64` sum of SUCCESS amounts.
    pub fn total_success_amount(&self) -> f64 {
        self.successful_amounts().sum()
    }

    /// Mean of SUCCESS amounts, or `0.0` if there are none.
    pub fn average_success_amount(&self) -> f64 {
        let (count, total) = self
            .successful_amounts()
            .fold((0usize, 0.0f64), |(n, sum), amount| (n + 1, sum + amount));
        mean(total, count)
    }

    /// Payments ordered by amount, largest first.
    ///
    /// The sort is stable, so equal amounts keep their insertion order.
    /// Amounts are compared with [`f64::total_cmp`]; a NaN amount sorts above
    /// every number and ends up first.
    pub fn sorted_by_amount_descending(&self) -> Vec<Arc<Payment>> {
        let mut sorted = self.payments.clone();
        sorted.sort_by(|a, b| b.amount().total_cmp(&a.amount()));
        sorted
    }

    /// Count, success count, total and average in one pass.
    ///
    /// Each payment's status is read exactly once, so the figures agree with
    /// one another even while statuses are being changed elsewhere.
    pub fn statistics(&self) -> Statistics {
        let (success_count, total) = self
            .successful_amounts()
            .fold((0usize, 0.0f64), |(n, sum), amount| (n + 1, sum + amount));

        Statistics {
            count: self.payments.len(),
            success_count,
            total_success_amount: total,
            average_success_amount: mean(total, success_count),
        }
    }

    fn successful_amounts(&self) -> impl Iterator<Item = f64> + '_ {
        self.payments
            .iter()
            .filter(|p| p.has_status(PaymentStatus::Success))
            .map(|p| p.amount())
    }
}

fn mean(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}
