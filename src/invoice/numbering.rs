//! Derives the next suggested invoice number from the existing records.

/// The next sequential invoice number for the given existing numbers.
///
/// Scans every existing number for its first contiguous run of digits,
/// takes the maximum value found (0 if nothing matches or the ledger is
/// empty), adds one, and formats it as `INV-` with at least four digits.
/// Malformed numbers simply contribute nothing.
///
/// The result is advisory, not a uniqueness-enforcing sequence: two
/// sessions computing it against the same records will suggest the same
/// number.
pub fn next_invoice_number<'a>(existing: impl IntoIterator<Item = &'a str>) -> String {
    let max_numeric = existing
        .into_iter()
        .filter_map(leading_number)
        .max()
        .unwrap_or(0);

    format!("INV-{:04}", max_numeric + 1)
}

/// The first contiguous run of digits in `text`, if any.
fn leading_number(text: &str) -> Option<u64> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    digits.parse().ok()
}
