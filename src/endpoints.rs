//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/invoices/{invoice_id}/edit',
//! use [format_endpoint].

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The landing page with the income vs. expenditure overview.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for recording a new fee payment.
pub const COLLECT_VIEW: &str = "/collect";
/// The page for browsing and filtering the payment history.
pub const HISTORY_VIEW: &str = "/history";
/// The printable report of the filtered payment history.
pub const HISTORY_REPORT_VIEW: &str = "/history/report";
/// The page for editing an existing invoice.
pub const EDIT_INVOICE_VIEW: &str = "/invoices/{invoice_id}/edit";
/// The printable fee receipt for one invoice.
pub const INVOICE_PRINT_VIEW: &str = "/invoices/{invoice_id}/print";
/// The page for listing and recording expenditures.
pub const EXPENDITURES_VIEW: &str = "/expenditures";
/// The page for editing an existing expenditure.
pub const EDIT_EXPENDITURE_VIEW: &str = "/expenditures/{expenditure_id}/edit";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to create an invoice.
pub const INVOICES_API: &str = "/api/invoices";
/// The route to update or delete a single invoice.
pub const INVOICE: &str = "/api/invoices/{invoice_id}";
/// The route to create an expenditure.
pub const EXPENDITURES_API: &str = "/api/expenditures";
/// The route to update or delete a single expenditure.
pub const EXPENDITURE: &str = "/api/expenditures/{expenditure_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace. For
/// example, in the endpoint path '/invoices/{invoice_id}/edit',
/// '{invoice_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII
/// characters and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
