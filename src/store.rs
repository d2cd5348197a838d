//! Thread-safe payment store.
//!
//! The store keeps shared references to caller-supplied payments in
//! insertion order. A single mutex guards the sequence and is held only while
//! appending or while copying the sequence into a [`Snapshot`]; every query
//! then works on its own snapshot without the lock.

use crate::error::{LedgerError, Result};
use crate::lines::LineTracker;
use crate::payment::{Payment, PaymentStatus};
use crate::record::PaymentRecord;
use crate::snapshot::{Snapshot, Statistics};
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, trace, warn};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Outcome of a CSV import.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportSummary {
    /// Rows appended to the store.
    pub imported: usize,

    /// Rows skipped because they could not be decoded or parsed.
    pub skipped: usize,

    /// Input line of each skipped row (1-indexed, header is line 1).
    pub skipped_lines: Vec<u64>,
}

impl ImportSummary {
    fn skip(&mut self, line: u64) {
        self.skipped += 1;
        self.skipped_lines.push(line);
    }
}

/// Append-only, thread-safe collection of payments.
///
/// Share it between threads by reference (`std::thread::scope`) or behind an
/// `Arc`. Payments are never removed.
///
/// # Ordering
///
/// Inserts are totally ordered by the completion of [`PaymentStore::add`].
/// A snapshot taken after an `add` has returned always contains that payment.
#[derive(Debug, Default)]
pub struct PaymentStore {
    payments: Mutex<Vec<Arc<Payment>>>,
}

impl PaymentStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        PaymentStore {
            payments: Mutex::new(Vec::new()),
        }
    }

    /// Creates an empty store with room for `capacity` payments.
    pub fn with_capacity(capacity: usize) -> Self {
        PaymentStore {
            payments: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    /// Appends a payment to the end of the sequence.
    pub fn add(&self, payment: Arc<Payment>) {
        debug!("Adding {}", payment);
        self.lock().push(payment);
    }

    /// Appends a payment that may be missing.
    ///
    /// Returns [`LedgerError::InvalidArgument`] for `None`; the store is left
    /// untouched in that case.
    pub fn try_add(&self, payment: Option<Arc<Payment>>) -> Result<()> {
        let payment = payment.ok_or(LedgerError::InvalidArgument("payment must not be absent"))?;
        self.add(payment);
        Ok(())
    }

    /// Copies the current sequence. Later inserts do not show up in the copy.
    pub fn snapshot(&self) -> Snapshot {
        let payments = self.lock().clone();
        trace!("Snapshot of {} payments", payments.len());
        Snapshot::new(payments)
    }

    /// All payments in insertion order.
    pub fn all(&self) -> Vec<Arc<Payment>> {
        self.snapshot().into_payments()
    }

    /// Payments currently in `status`, in insertion order.
    pub fn by_status(&self, status: PaymentStatus) -> Vec<Arc<Payment>> {
        self.snapshot().by_status(status)
    }

    /// Like [`PaymentStore::by_status`], but for a status that may be missing.
    pub fn try_by_status(&self, status: Option<PaymentStatus>) -> Result<Vec<Arc<Payment>>> {
        let status = status.ok_or(LedgerError::InvalidArgument("status must not be absent"))?;
        Ok(self.by_status(status))
    }

    /// Number of payments, whatever their status.
    pub fn count(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Sum of amounts over SUCCESS payments; `0.0` if there are none.
    pub fn total_success_amount(&self) -> f64 {
        self.snapshot().total_success_amount()
    }

    /// Mean amount over SUCCESS payments; `0.0` if there are none.
    pub fn average_success_amount(&self) -> f64 {
        self.snapshot().average_success_amount()
    }

    /// Payments by amount, largest first, ties in insertion order.
    pub fn sorted_by_amount_descending(&self) -> Vec<Arc<Payment>> {
        self.snapshot().sorted_by_amount_descending()
    }

    /// Count and SUCCESS aggregates computed over one snapshot.
    pub fn statistics(&self) -> Statistics {
        self.snapshot().statistics()
    }

    /// Imports payments from CSV with an `id,amount,currency,status` header.
    ///
    /// Rows are read one at a time and each valid row is appended as soon as
    /// it is parsed. Rows that cannot be decoded or parsed are logged at warn
    /// level with their input line and skipped.
    ///
    /// A read failure on the underlying reader aborts the import with
    /// [`LedgerError::Io`]. Rows appended before the failure stay in the store.
    pub fn import_csv<R: Read>(&self, reader: R) -> Result<ImportSummary> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(LineTracker::new(reader));

        let headers = csv_reader.headers()?.clone();
        let mut raw = StringRecord::new();
        let mut summary = ImportSummary::default();

        loop {
            match csv_reader.read_record(&mut raw) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    let start = e
                        .position()
                        .map_or_else(|| csv_reader.position().byte(), |p| p.byte());
                    let line = csv_reader.get_mut().line_at(start);
                    warn!("Line {}: {}", line, e);
                    summary.skip(line);
                    continue;
                }
            }

            let start = raw.position().map_or(0, |p| p.byte());
            let line = csv_reader.get_mut().line_at(start);
            let parsed = raw
                .deserialize::<PaymentRecord>(Some(&headers))
                .map_err(LedgerError::from)
                .and_then(|r| r.parse(line));

            match parsed {
                Ok(payment) => {
                    self.add(Arc::new(payment));
                    summary.imported += 1;
                }
                Err(e @ LedgerError::InvalidRecord { .. }) => {
                    warn!("{}", e);
                    summary.skip(line);
                }
                Err(e) => {
                    warn!("Line {}: {}", line, e);
                    summary.skip(line);
                }
            }
        }

        debug!(
            "Imported {} payments, skipped {} rows",
            summary.imported, summary.skipped
        );
        Ok(summary)
    }

    /// Opens `path` and imports it with [`PaymentStore::import_csv`].
    pub fn import_csv_file<P: AsRef<Path>>(&self, path: P) -> Result<ImportSummary> {
        let file = File::open(path)?;
        self.import_csv(BufReader::new(file))
    }

    // A panic while the guard is held cannot leave the Vec half-updated, so a
    // poisoned lock still guards valid data.
    fn lock(&self) -> MutexGuard<'_, Vec<Arc<Payment>>> {
        self.payments.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
