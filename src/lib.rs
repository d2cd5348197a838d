//! # Payment Ledger
//!
//! An embedded, in-memory bookkeeping component: callers register payment
//! events as they happen and query the running collection for reporting.
//!
//! ## Design Principles
//!
//! - **Snapshot queries**: every filter, sort and statistic runs over a
//!   private copy of the sequence taken at call start
//! - **Short critical sections**: one mutex, held only to append or copy
//! - **Atomic status**: a payment's status can change after insertion without
//!   touching the store lock, and the change is visible to all threads
//! - **Permissive data**: ids, amounts and currencies are stored as given
//!
//! ## Example
//!
//! ```
//! use payment_ledger::{Payment, PaymentStatus, PaymentStore};
//! use std::sync::Arc;
//!
//! let store = PaymentStore::new();
//! store.add(Arc::new(Payment::new("1", 120.0, "USD", PaymentStatus::Success)));
//! store.add(Arc::new(Payment::new("2", 75.5, "USD", PaymentStatus::Pending)));
//!
//! assert_eq!(store.count(), 2);
//! assert_eq!(store.total_success_amount(), 120.0);
//! assert_eq!(store.by_status(PaymentStatus::Pending)[0].id(), "2");
//! ```

pub mod error;
mod lines;
pub mod payment;
pub mod record;
pub mod snapshot;
pub mod store;

pub use error::{LedgerError, Result};
pub use payment::{Payment, PaymentStatus};
pub use record::PaymentRecord;
pub use snapshot::{Snapshot, Statistics};
pub use store::{ImportSummary, PaymentStore};
