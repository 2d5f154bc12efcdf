//! Expenditure tracking.
//!
//! Expenditures are flat records independent of invoices: the list page,
//! a record form, and edit/delete endpoints.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod expenditures_page;
mod form;

pub use core::{Expenditure, create_expenditure_table, get_all_expenditures};
pub use create_endpoint::create_expenditure_endpoint;
pub use delete_endpoint::delete_expenditure_endpoint;
pub use edit_endpoint::edit_expenditure_endpoint;
pub use edit_page::get_edit_expenditure_page;
pub use expenditures_page::get_expenditures_page;

#[cfg(test)]
pub use core::{create_expenditure, test_expenditure_draft};
