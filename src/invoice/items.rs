//! Turns the raw fee item rows from the collect/edit forms into committed
//! fee items.
//!
//! The forms always post a fixed grid of item rows, most of them blank.
//! The clean projection drops the blanks and re-indexes what remains; the
//! commit gate then requires at least one fully filled-in item.

use crate::{Error, invoice::core::FeeItem, money::normalize_amount, urdu::transliterate};

/// One fee item row exactly as posted by the form, label and amount still
/// raw text.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftItem {
    /// The label text as typed.
    pub label: String,
    /// The amount text as typed.
    pub amount: String,
}

/// Pair up the parallel `item_label[]`/`item_amount[]` form fields.
///
/// The form posts the two columns as separate repeated fields; rows missing
/// an amount value (or label value) get the empty string so the row count
/// is preserved.
pub fn zip_form_rows(labels: Vec<String>, amounts: Vec<String>) -> Vec<DraftItem> {
    let row_count = labels.len().max(amounts.len());
    let mut labels = labels.into_iter();
    let mut amounts = amounts.into_iter();

    (0..row_count)
        .map(|_| DraftItem {
            label: labels.next().unwrap_or_default(),
            amount: amounts.next().unwrap_or_default(),
        })
        .collect()
}

/// The clean projection of the drafted rows.
///
/// Labels are trimmed and transliterated, amounts normalized. A row is
/// retained only if its label is non-empty OR its amount is greater than
/// zero; retained rows keep their relative order and are re-indexed
/// 0..n-1 by position for the display order.
pub fn clean_items(drafts: &[DraftItem]) -> Vec<FeeItem> {
    drafts
        .iter()
        .map(|draft| FeeItem {
            label: transliterate(draft.label.trim()),
            amount: normalize_amount(&draft.amount),
        })
        .filter(|item| !item.label.is_empty() || item.amount > 0)
        .collect()
}

/// The commit gate: at least one retained item must have BOTH a non-empty
/// label AND a positive amount.
///
/// # Errors
/// Returns [Error::IncompleteItems] otherwise; the caller must abort the
/// commit before any write.
pub fn validate_items(items: &[FeeItem]) -> Result<(), Error> {
    let has_complete_item = items
        .iter()
        .any(|item| !item.label.is_empty() && item.amount > 0);

    if has_complete_item {
        Ok(())
    } else {
        Err(Error::IncompleteItems)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, invoice::core::FeeItem};

    use super::{DraftItem, clean_items, validate_items, zip_form_rows};

    fn draft(label: &str, amount: &str) -> DraftItem {
        DraftItem {
            label: label.to_owned(),
            amount: amount.to_owned(),
        }
    }

    #[test]
    fn zip_pads_the_shorter_column() {
        let rows = zip_form_rows(
            vec!["فیس".to_owned()],
            vec!["100".to_owned(), "200".to_owned()],
        );

        assert_eq!(
            rows,
            vec![draft("فیس", "100"), draft("", "200")]
        );
    }

    #[test]
    fn clean_drops_blank_rows_and_normalizes() {
        let items = clean_items(&[draft("Tuition", "500.7"), draft("", "0"), draft("", "")]);

        assert_eq!(
            items,
            vec![FeeItem {
                // "Tuition" transliterated on the way in.
                label: "ٹئیتیہن".to_owned(),
                amount: 501
            }]
        );
    }

    #[test]
    fn clean_keeps_labelled_rows_with_zero_amount() {
        let items = clean_items(&[draft("وظیفہ", "0"), draft("", "250")]);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].amount, 0);
        assert_eq!(items[1].label, "");
        assert_eq!(items[1].amount, 250);
    }

    #[test]
    fn validate_requires_one_complete_item() {
        let complete = vec![FeeItem {
            label: "فیس".to_owned(),
            amount: 500,
        }];
        assert_eq!(validate_items(&complete), Ok(()));

        // A labelled row without an amount and an amount without a label do
        // not add up to a complete item.
        let incomplete = vec![
            FeeItem {
                label: "فیس".to_owned(),
                amount: 0,
            },
            FeeItem {
                label: "".to_owned(),
                amount: 500,
            },
        ];
        assert_eq!(validate_items(&incomplete), Err(Error::IncompleteItems));

        assert_eq!(validate_items(&[]), Err(Error::IncompleteItems));
    }
}
