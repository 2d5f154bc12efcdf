//! Time-bucketed aggregation of the ledger for the dashboard.
//!
//! Provides the monthly/daily collection rollups, the top-N outstanding and
//! expenditure lists, and the overall income vs. expenditure totals.

use std::collections::HashMap;

use time::{Date, Month};

use crate::{expenditure::Expenditure, invoice::Invoice};

/// One bucket of a collection rollup: a calendar month or day with the
/// amount collected and the number of invoices in it.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionBucket {
    /// The bucket key: the first of the month for monthly rollups, the day
    /// itself for daily ones.
    pub date: Date,
    /// Sum of the amounts received in the bucket.
    pub collected: i64,
    /// Number of invoices in the bucket.
    pub invoices: usize,
}

/// Roll the ledger up by calendar month and keep the last `window` months
/// that have data, in chronological order.
pub fn monthly_collection(invoices: &[Invoice], window: usize) -> Vec<CollectionBucket> {
    bucket_collection(invoices, window, |date| date.replace_day(1).unwrap())
}

/// Roll the ledger up by calendar day and keep the last `window` days that
/// have data, in chronological order.
pub fn daily_collection(invoices: &[Invoice], window: usize) -> Vec<CollectionBucket> {
    bucket_collection(invoices, window, |date| date)
}

fn bucket_collection(
    invoices: &[Invoice],
    window: usize,
    bucket_key: impl Fn(Date) -> Date,
) -> Vec<CollectionBucket> {
    let mut buckets: HashMap<Date, CollectionBucket> = HashMap::new();

    for invoice in invoices {
        let date = bucket_key(invoice.date);
        let bucket = buckets.entry(date).or_insert(CollectionBucket {
            date,
            collected: 0,
            invoices: 0,
        });
        bucket.collected += invoice.amount_received;
        bucket.invoices += 1;
    }

    let mut sorted: Vec<CollectionBucket> = buckets.into_values().collect();
    sorted.sort_by_key(|bucket| bucket.date);

    if sorted.len() > window {
        sorted.drain(..sorted.len() - window);
    }

    sorted
}

/// Format a monthly bucket key like "Jan 2024".
pub fn month_label(date: Date) -> String {
    let month = match date.month() {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    };

    format!("{month} {}", date.year())
}

/// The invoices with something still owing, highest remaining amount
/// first, at most `count` of them.
pub fn top_outstanding(invoices: &[Invoice], count: usize) -> Vec<&Invoice> {
    let mut outstanding: Vec<&Invoice> = invoices
        .iter()
        .filter(|invoice| invoice.remaining_amount > 0)
        .collect();

    outstanding.sort_by(|a, b| b.remaining_amount.cmp(&a.remaining_amount));
    outstanding.truncate(count);

    outstanding
}

/// The largest expenditures, at most `count` of them.
pub fn top_expenditures(expenditures: &[Expenditure], count: usize) -> Vec<&Expenditure> {
    let mut largest: Vec<&Expenditure> = expenditures.iter().collect();

    largest.sort_by(|a, b| b.amount.cmp(&a.amount));
    largest.truncate(count);

    largest
}

/// The overall income vs. expenditure figures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerTotals {
    /// Sum of all invoice totals.
    pub billed: i64,
    /// Sum of all amounts received.
    pub collected: i64,
    /// Sum of all remaining amounts.
    pub outstanding: i64,
    /// Sum of all expenditures.
    pub spent: i64,
}

impl LedgerTotals {
    /// Collected minus spent.
    pub fn net(&self) -> i64 {
        self.collected - self.spent
    }
}

/// Sum the ledger into its overall totals.
pub fn ledger_totals(invoices: &[Invoice], expenditures: &[Expenditure]) -> LedgerTotals {
    LedgerTotals {
        billed: invoices.iter().map(|invoice| invoice.total_amount).sum(),
        collected: invoices.iter().map(|invoice| invoice.amount_received).sum(),
        outstanding: invoices
            .iter()
            .map(|invoice| invoice.remaining_amount)
            .sum(),
        spent: expenditures
            .iter()
            .map(|expenditure| expenditure.amount)
            .sum(),
    }
}

/// The amount collected in the calendar month of `date`.
pub fn collected_in_month(invoices: &[Invoice], date: Date) -> i64 {
    invoices
        .iter()
        .filter(|invoice| {
            invoice.date.year() == date.year() && invoice.date.month() == date.month()
        })
        .map(|invoice| invoice.amount_received)
        .sum()
}

/// The amount collected on exactly `date`.
pub fn collected_on(invoices: &[Invoice], date: Date) -> i64 {
    invoices
        .iter()
        .filter(|invoice| invoice.date == date)
        .map(|invoice| invoice.amount_received)
        .sum()
}
