//! Application router configuration.

use axum::{
    Router,
    response::Redirect,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    dashboard::get_dashboard_page,
    endpoints,
    expenditure::{
        create_expenditure_endpoint, delete_expenditure_endpoint, edit_expenditure_endpoint,
        get_edit_expenditure_page, get_expenditures_page,
    },
    internal_server_error::get_internal_server_error_page,
    invoice::{
        create_invoice_endpoint, delete_invoice_endpoint, edit_invoice_endpoint, get_collect_page,
        get_edit_invoice_page, get_history_page, get_history_report_page, get_invoice_print_page,
    },
    not_found::get_404_not_found,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::COLLECT_VIEW, get(get_collect_page))
        .route(endpoints::HISTORY_VIEW, get(get_history_page))
        .route(endpoints::HISTORY_REPORT_VIEW, get(get_history_report_page))
        .route(endpoints::EDIT_INVOICE_VIEW, get(get_edit_invoice_page))
        .route(endpoints::INVOICE_PRINT_VIEW, get(get_invoice_print_page))
        .route(endpoints::EXPENDITURES_VIEW, get(get_expenditures_page))
        .route(
            endpoints::EDIT_EXPENDITURE_VIEW,
            get(get_edit_expenditure_page),
        )
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let api_routes = Router::new()
        .route(endpoints::INVOICES_API, post(create_invoice_endpoint))
        .route(
            endpoints::INVOICE,
            put(edit_invoice_endpoint).delete(delete_invoice_endpoint),
        )
        .route(
            endpoints::EXPENDITURES_API,
            post(create_expenditure_endpoint),
        )
        .route(
            endpoints::EXPENDITURE,
            put(edit_expenditure_endpoint).delete(delete_expenditure_endpoint),
        );

    page_routes
        .merge(api_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

#[cfg(test)]
mod root_route_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{endpoints, routing::get_index_page};

    #[tokio::test]
    async fn root_redirects_to_dashboard() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::DASHBOARD_VIEW);
    }
}
