//! Payment model.
//!
//! A [`Payment`] is a value object whose `id`, `amount` and `currency` are
//! fixed at construction. The status is the one exception: it lives in an
//! atomic cell so any thread holding a shared reference can move the payment
//! through its lifecycle, and every other thread sees the change on its next
//! read without taking a lock.

use crate::error::{LedgerError, Result};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle state of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    /// Registered, outcome not yet known.
    Pending,

    /// Completed successfully. Only these payments count towards statistics.
    Success,

    /// Rejected or aborted.
    Failed,
}

impl PaymentStatus {
    /// All statuses, in declaration order.
    pub const ALL: [PaymentStatus; 3] = [
        PaymentStatus::Pending,
        PaymentStatus::Success,
        PaymentStatus::Failed,
    ];

    /// Upper-case name, as shown in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Success => "SUCCESS",
            PaymentStatus::Failed => "FAILED",
        }
    }

    fn to_tag(self) -> u8 {
        match self {
            PaymentStatus::Pending => 0,
            PaymentStatus::Success => 1,
            PaymentStatus::Failed => 2,
        }
    }

    // Tags are only ever written by `to_tag`.
    fn from_tag(tag: u8) -> Self {
        match tag {
            0 => PaymentStatus::Pending,
            1 => PaymentStatus::Success,
            _ => PaymentStatus::Failed,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Ok(PaymentStatus::Pending),
            "SUCCESS" => Ok(PaymentStatus::Success),
            "FAILED" => Ok(PaymentStatus::Failed),
            _ => Err(LedgerError::InvalidArgument("unknown payment status")),
        }
    }
}

/// A single payment event.
///
/// # Invariants
///
/// - `id`, `amount` and `currency` never change after construction
/// - `status` may be reassigned through [`Payment::set_status`]; the write is
///   published with release ordering and read with acquire ordering, so a
///   reader on another thread never observes a stale value once the writer's
///   call has returned
///
/// No validation is applied to the immutable fields: empty ids, duplicate
/// ids, negative, zero and non-finite amounts are all accepted as given.
pub struct Payment {
    id: String,
    amount: f64,
    currency: String,
    status: AtomicU8,
}

impl Payment {
    /// Creates a payment with the given initial status.
    pub fn new(
        id: impl Into<String>,
        amount: f64,
        currency: impl Into<String>,
        status: PaymentStatus,
    ) -> Self {
        Payment {
            id: id.into(),
            amount,
            currency: currency.into(),
            status: AtomicU8::new(status.to_tag()),
        }
    }

    /// Creates a payment from a status that may be missing.
    ///
    /// Returns [`LedgerError::InvalidArgument`] if `status` is `None`.
    pub fn try_new(
        id: impl Into<String>,
        amount: f64,
        currency: impl Into<String>,
        status: Option<PaymentStatus>,
    ) -> Result<Self> {
        let status = status.ok_or(LedgerError::InvalidArgument("status must not be absent"))?;
        Ok(Payment::new(id, amount, currency, status))
    }

    /// Caller-chosen identifier, not necessarily unique.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Amount as given, sign and finiteness unchecked.
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Currency code, not normalized.
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Current status.
    pub fn status(&self) -> PaymentStatus {
        PaymentStatus::from_tag(self.status.load(Ordering::Acquire))
    }

    /// Replaces the status. Does not touch any store lock.
    pub fn set_status(&self, status: PaymentStatus) {
        self.status.store(status.to_tag(), Ordering::Release);
    }

    /// Moves the status from `current` to `new` only if it still equals
    /// `current`. Returns `true` if the transition happened.
    pub fn compare_and_set_status(&self, current: PaymentStatus, new: PaymentStatus) -> bool {
        self.status
            .compare_exchange(
                current.to_tag(),
                new.to_tag(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Returns `true` if the payment currently has the given status.
    pub fn has_status(&self, status: PaymentStatus) -> bool {
        self.status() == status
    }
}

impl Clone for Payment {
    /// Copies the payment, including the status as observed right now. The
    /// copy's status evolves independently of the original.
    fn clone(&self) -> Self {
        Payment::new(self.id.clone(), self.amount, self.currency.clone(), self.status())
    }
}

impl fmt::Debug for Payment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payment")
            .field("id", &self.id)
            .field("amount", &self.amount)
            .field("currency", &self.currency)
            .field("status", &self.status())
            .finish()
    }
}

impl fmt::Display for Payment {
    /// Diagnostic form, e.g. `Payment{id='1', amount=120.0, currency='USD', status=SUCCESS}`.
    ///
    /// The amount is printed with `{:?}` so whole numbers keep their `.0`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Payment{{id='{}', amount={:?}, currency='{}', status={}}}",
            self.id,
            self.amount,
            self.currency,
            self.status()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new_payment_keeps_fields() {
        let payment = Payment::new("p-1", 120.0, "USD", PaymentStatus::Success);

        assert_eq!(payment.id(), "p-1");
        assert_eq!(payment.amount(), 120.0);
        assert_eq!(payment.currency(), "USD");
        assert_eq!(payment.status(), PaymentStatus::Success);
    }

    #[test]
    fn test_try_new_rejects_absent_status() {
        let result = Payment::try_new("p-1", 10.0, "USD", None);
        assert!(matches!(result, Err(LedgerError::InvalidArgument(_))));
    }

    #[test]
    fn test_try_new_accepts_present_status() {
        let payment = Payment::try_new("p-1", 10.0, "USD", Some(PaymentStatus::Failed)).unwrap();
        assert_eq!(payment.status(), PaymentStatus::Failed);
    }

    #[test]
    fn test_permissive_fields_are_accepted() {
        let payment = Payment::new("", f64::NAN, "", PaymentStatus::Pending);
        assert_eq!(payment.id(), "");
        assert!(payment.amount().is_nan());

        let negative = Payment::new("n", -5.0, "eur", PaymentStatus::Pending);
        assert_eq!(negative.amount(), -5.0);
        assert_eq!(negative.currency(), "eur");
    }

    #[test]
    fn test_set_status_round_trips_every_variant() {
        let payment = Payment::new("p-1", 1.0, "USD", PaymentStatus::Pending);
        for status in PaymentStatus::ALL {
            payment.set_status(status);
            assert_eq!(payment.status(), status);
        }
    }

    #[test]
    fn test_compare_and_set_status() {
        let payment = Payment::new("p-1", 1.0, "USD", PaymentStatus::Pending);

        assert!(payment.compare_and_set_status(PaymentStatus::Pending, PaymentStatus::Success));
        assert_eq!(payment.status(), PaymentStatus::Success);

        // Stale expectation leaves the status alone
        assert!(!payment.compare_and_set_status(PaymentStatus::Pending, PaymentStatus::Failed));
        assert_eq!(payment.status(), PaymentStatus::Success);
    }

    #[test]
    fn test_status_write_visible_across_threads() {
        let payment = Arc::new(Payment::new("p-1", 1.0, "USD", PaymentStatus::Pending));

        let writer = Arc::clone(&payment);
        thread::spawn(move || writer.set_status(PaymentStatus::Success))
            .join()
            .unwrap();

        assert_eq!(payment.status(), PaymentStatus::Success);
    }

    #[test]
    fn test_only_one_concurrent_transition_wins() {
        let payment = Arc::new(Payment::new("p-1", 1.0, "USD", PaymentStatus::Pending));

        let winners: usize = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let payment = &payment;
                    s.spawn(move || {
                        let target = if i % 2 == 0 {
                            PaymentStatus::Success
                        } else {
                            PaymentStatus::Failed
                        };
                        payment.compare_and_set_status(PaymentStatus::Pending, target)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap() as usize)
                .sum()
        });

        assert_eq!(winners, 1);
        assert_ne!(payment.status(), PaymentStatus::Pending);
    }

    #[test]
    fn test_display_is_deterministic() {
        let payment = Payment::new("1", 120.0, "USD", PaymentStatus::Success);
        let expected = "Payment{id='1', amount=120.0, currency='USD', status=SUCCESS}";

        assert_eq!(payment.to_string(), expected);
        assert_eq!(payment.to_string(), expected);

        let fractional = Payment::new("2", 75.5, "USD", PaymentStatus::Pending);
        assert_eq!(
            fractional.to_string(),
            "Payment{id='2', amount=75.5, currency='USD', status=PENDING}"
        );
    }

    #[test]
    fn test_display_reflects_status_change() {
        let payment = Payment::new("1", 1.0, "USD", PaymentStatus::Pending);
        payment.set_status(PaymentStatus::Failed);
        assert!(payment.to_string().ends_with("status=FAILED}"));
    }

    #[test]
    fn test_clone_is_independent() {
        let original = Payment::new("1", 1.0, "USD", PaymentStatus::Pending);
        let copy = original.clone();

        original.set_status(PaymentStatus::Success);

        assert_eq!(copy.status(), PaymentStatus::Pending);
        assert_eq!(copy.id(), "1");
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("SUCCESS".parse::<PaymentStatus>().unwrap(), PaymentStatus::Success);
        assert_eq!("  pending ".parse::<PaymentStatus>().unwrap(), PaymentStatus::Pending);
        assert_eq!("Failed".parse::<PaymentStatus>().unwrap(), PaymentStatus::Failed);
        assert!(matches!(
            "refunded".parse::<PaymentStatus>(),
            Err(LedgerError::InvalidArgument(_))
        ));
        assert!("".parse::<PaymentStatus>().is_err());
    }
}
