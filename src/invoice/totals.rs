//! Derives the invoice totals from a set of fee items.

use crate::{Error, invoice::core::FeeItem, money::normalize_amount};

/// The three derived monetary fields of an invoice.
///
/// Always produced together by [compute_totals]; no caller sets any of
/// these independently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    /// Sum of the item amounts.
    pub total: i64,
    /// The normalized amount received.
    pub received: i64,
    /// `max(total - received, 0)`.
    pub remaining: i64,
}

/// Compute the derived totals for `items` and the raw amount-received input.
///
/// The computation is pure and idempotent: it does not mutate its inputs
/// and the same inputs always produce the same totals.
///
/// # Errors
/// Returns [Error::ReceivedExceedsTotal] if the normalized received amount
/// is greater than the item total. The caller must not persist anything in
/// that case.
pub fn compute_totals(items: &[FeeItem], received_raw: &str) -> Result<Totals, Error> {
    let total: i64 = items.iter().map(|item| item.amount).sum();
    let received = normalize_amount(received_raw);

    if received > total {
        return Err(Error::ReceivedExceedsTotal { received, total });
    }

    Ok(Totals {
        total,
        received,
        remaining: (total - received).max(0),
    })
}
