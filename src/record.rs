//! Raw payment rows as read from CSV.

use crate::error::{LedgerError, Result};
use crate::payment::{Payment, PaymentStatus};
use serde::Deserialize;

/// Raw payment record as read from CSV.
///
/// Every field is optional so that a row with blanks still deserializes and
/// can be reported with a precise message instead of a generic CSV error.
#[derive(Debug, Default, Deserialize)]
pub struct PaymentRecord {
    /// Payment identifier, required
    pub id: Option<String>,

    /// Amount as text, parsed as `f64`
    pub amount: Option<String>,

    /// Currency code, stored as given
    pub currency: Option<String>,

    /// PENDING, SUCCESS or FAILED, any case; blank means absent
    pub status: Option<String>,
}

impl PaymentRecord {
    /// Turns the raw record into a payment.
    ///
    /// `line` is the record's line in the input and only labels the error.
    pub fn parse(&self, line: u64) -> Result<Payment> {
        let id = required(&self.id, "id", line)?;
        let amount_str = required(&self.amount, "amount", line)?;
        let currency = required(&self.currency, "currency", line)?;

        let amount: f64 = amount_str.parse().map_err(|_| LedgerError::InvalidRecord {
            line,
            message: format!("amount '{}' is not a number", amount_str),
        })?;

        let status = match non_blank(&self.status) {
            Some(s) => Some(s.parse::<PaymentStatus>().map_err(|_| {
                LedgerError::InvalidRecord {
                    line,
                    message: format!("unknown status '{}'", s),
                }
            })?),
            None => None,
        };

        Payment::try_new(id, amount, currency, status).map_err(|e| LedgerError::InvalidRecord {
            line,
            message: e.to_string(),
        })
    }
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn required<'a>(field: &'a Option<String>, name: &str, line: u64) -> Result<&'a str> {
    non_blank(field).ok_or_else(|| LedgerError::InvalidRecord {
        line,
        message: format!("missing {}", name),
    })
}
