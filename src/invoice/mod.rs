//! Fee invoice management.
//!
//! This module contains everything related to fee payments:
//! - The `Invoice`/`FeeItem` models and the ledger write paths that keep an
//!   invoice and its items consistent
//! - The derived-totals calculator, fee item cleaning, and the invoice
//!   numbering policy
//! - The collect, history, edit and printable views with their endpoints

mod collect_page;
mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod form;
mod history_page;
mod items;
mod numbering;
mod print;
mod query;
mod totals;

pub use collect_page::get_collect_page;
pub use core::{Invoice, create_fee_item_table, create_invoice_table, get_all_invoices};
pub use create_endpoint::create_invoice_endpoint;
pub use delete_endpoint::delete_invoice_endpoint;
pub use edit_endpoint::edit_invoice_endpoint;
pub use edit_page::get_edit_invoice_page;
pub use history_page::get_history_page;
pub use print::{get_history_report_page, get_invoice_print_page};

#[cfg(test)]
pub use core::{FeeItem, create_invoice, test_draft};
