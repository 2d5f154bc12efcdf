//! In-memory filtering of the payment history.
//!
//! The history page fetches the full ledger (already in display order) and
//! filters it here: all predicates are conjunctive, so a record must match
//! the free-text search AND the class AND the date range to be shown.

use time::Date;

use crate::invoice::core::Invoice;

/// The predicate set for the history page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceFilter {
    /// Case-insensitive substring match across student name, father name,
    /// class and invoice number. `None` or whitespace matches everything.
    pub search: Option<String>,
    /// Exact class match.
    pub class_name: Option<String>,
    /// Inclusive lower bound on the payment date.
    pub date_from: Option<Date>,
    /// Inclusive upper bound on the payment date.
    pub date_to: Option<Date>,
}

impl InvoiceFilter {
    /// Whether `invoice` satisfies every predicate in the set.
    pub fn matches(&self, invoice: &Invoice) -> bool {
        let matches_search = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(search) => {
                let search = search.to_lowercase();

                invoice.student_name.to_lowercase().contains(&search)
                    || invoice.father_name.to_lowercase().contains(&search)
                    || invoice.class_name.to_lowercase().contains(&search)
                    || invoice.invoice_no.to_lowercase().contains(&search)
            }
        };

        let matches_class = match self.class_name.as_deref() {
            None | Some("") => true,
            Some(class_name) => invoice.class_name == class_name,
        };

        let matches_date_from = self.date_from.is_none_or(|from| invoice.date >= from);
        let matches_date_to = self.date_to.is_none_or(|to| invoice.date <= to);

        matches_search && matches_class && matches_date_from && matches_date_to
    }
}

/// Keep the invoices matching `filter`, preserving the input order.
pub fn filter_invoices(invoices: Vec<Invoice>, filter: &InvoiceFilter) -> Vec<Invoice> {
    invoices
        .into_iter()
        .filter(|invoice| filter.matches(invoice))
        .collect()
}

/// The distinct non-empty class names, in first-seen order, for the class
/// filter dropdown.
pub fn class_options(invoices: &[Invoice]) -> Vec<String> {
    let mut options: Vec<String> = Vec::new();

    for invoice in invoices {
        if !invoice.class_name.is_empty() && !options.contains(&invoice.class_name) {
            options.push(invoice.class_name.clone());
        }
    }

    options
}
