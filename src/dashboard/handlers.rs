//! Dashboard HTTP handler and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error, endpoints,
    dashboard::rollup::{
        CollectionBucket, LedgerTotals, collected_in_month, collected_on, daily_collection,
        ledger_totals, month_label, monthly_collection, top_expenditures, top_outstanding,
    },
    expenditure::{Expenditure, get_all_expenditures},
    html::{
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_amount, format_date_dmy,
    },
    invoice::{Invoice, get_all_invoices},
    navigation::NavBar,
    timezone::current_local_date,
};

/// How many months the monthly collection table looks back.
const MONTHLY_WINDOW: usize = 6;
/// How many days the daily collection table looks back.
const DAILY_WINDOW: usize = 7;
/// How many rows the outstanding and expenditure top lists show.
const TOP_COUNT: usize = 5;

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading the ledger.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Karachi".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display a page with an overview of the ledger: income vs. expenditure
/// figures, collection rollups, and the highest outstanding balances.
pub async fn get_dashboard_page(State(state): State<DashboardState>) -> Result<Response, Error> {
    let today = current_local_date(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let invoices = get_all_invoices(&connection)
        .inspect_err(|error| tracing::error!("could not get invoices: {error}"))?;
    let expenditures = get_all_expenditures(&connection)
        .inspect_err(|error| tracing::error!("could not get expenditures: {error}"))?;

    Ok(dashboard_view(&invoices, &expenditures, today).into_response())
}

fn dashboard_view(invoices: &[Invoice], expenditures: &[Expenditure], today: Date) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);
    let totals = ledger_totals(invoices, expenditures);
    let monthly = monthly_collection(invoices, MONTHLY_WINDOW);
    let daily = daily_collection(invoices, DAILY_WINDOW);
    let outstanding = top_outstanding(invoices, TOP_COUNT);
    let largest_expenditures = top_expenditures(expenditures, TOP_COUNT);

    let content = html! {
        (nav_bar.into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-6xl"
            {
                div class="flex items-baseline justify-between mb-6"
                {
                    h1 class="text-2xl font-bold" { "Dashboard" }

                    span class="text-sm text-gray-600 dark:text-gray-400"
                    {
                        "Total invoices: " (invoices.len())
                    }
                }

                (kpi_cards(&totals, invoices, today))

                div class="grid grid-cols-1 lg:grid-cols-2 gap-6 mt-8"
                {
                    (collection_panel(
                        "Monthly Collection Data",
                        "Last 6 months",
                        "Month",
                        &monthly,
                        month_label,
                    ))

                    (collection_panel(
                        "Daily Collection Data",
                        "Last 7 days",
                        "Date",
                        &daily,
                        format_date_dmy,
                    ))
                }

                div class="grid grid-cols-1 lg:grid-cols-2 gap-6 mt-8"
                {
                    (outstanding_panel(&outstanding))
                    (expenditures_panel(&largest_expenditures))
                }
            }
        }
    };

    base("Dashboard", &[], &content)
}

fn kpi_cards(totals: &LedgerTotals, invoices: &[Invoice], today: Date) -> Markup {
    let cards = [
        ("Total Collected", format_amount(totals.collected)),
        ("Total Spent", format_amount(totals.spent)),
        ("Net Balance", format_amount(totals.net())),
        ("Outstanding", format_amount(totals.outstanding)),
        (
            "Collection This Month",
            format_amount(collected_in_month(invoices, today)),
        ),
        (
            "Collection Today",
            format_amount(collected_on(invoices, today)),
        ),
    ];

    html! {
        div class="grid grid-cols-2 md:grid-cols-3 xl:grid-cols-6 gap-4"
        {
            @for (label, value) in cards {
                article
                    class="bg-white dark:bg-gray-800 border border-gray-200
                        dark:border-gray-700 rounded-lg p-4 shadow-md"
                {
                    span class="block text-sm text-gray-600 dark:text-gray-400" { (label) }
                    strong class="block text-2xl mt-1" { (value) }
                }
            }
        }
    }
}

fn collection_panel(
    title: &str,
    subtitle: &str,
    key_header: &str,
    buckets: &[CollectionBucket],
    label: impl Fn(Date) -> String,
) -> Markup {
    html! {
        section
            class="bg-white dark:bg-gray-800 border border-gray-200
                dark:border-gray-700 rounded-lg p-4 shadow-md"
        {
            div class="flex items-baseline justify-between mb-3"
            {
                h3 class="text-lg font-semibold" { (title) }
                span class="text-sm text-gray-600 dark:text-gray-400" { (subtitle) }
            }

            @if buckets.is_empty() {
                p class="text-gray-600 dark:text-gray-400" data-empty-state="true"
                {
                    "No records available."
                }
            } @else {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class="px-6 py-3" { (key_header) }
                            th scope="col" class="px-6 py-3" { "Invoices" }
                            th scope="col" class="px-6 py-3" { "Collected" }
                        }
                    }

                    tbody
                    {
                        @for bucket in buckets {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) { (label(bucket.date)) }
                                td class=(TABLE_CELL_STYLE) { (bucket.invoices) }
                                td class=(TABLE_CELL_STYLE) { (format_amount(bucket.collected)) }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn outstanding_panel(outstanding: &[&Invoice]) -> Markup {
    html! {
        section
            class="bg-white dark:bg-gray-800 border border-gray-200
                dark:border-gray-700 rounded-lg p-4 shadow-md"
        {
            h3 class="text-lg font-semibold mb-3" { "Highest Outstanding" }

            @if outstanding.is_empty() {
                p class="text-gray-600 dark:text-gray-400" data-empty-state="true"
                {
                    "No outstanding records."
                }
            } @else {
                ul class="divide-y divide-gray-200 dark:divide-gray-700"
                {
                    @for invoice in outstanding {
                        li class="flex items-center justify-between gap-4 py-2"
                        {
                            span class="text-sm" { (invoice.invoice_no) }
                            span { (invoice.student_name) }
                            span class="font-semibold" { (format_amount(invoice.remaining_amount)) }
                        }
                    }
                }
            }
        }
    }
}

fn expenditures_panel(expenditures: &[&Expenditure]) -> Markup {
    html! {
        section
            class="bg-white dark:bg-gray-800 border border-gray-200
                dark:border-gray-700 rounded-lg p-4 shadow-md"
        {
            h3 class="text-lg font-semibold mb-3" { "Top Expenditures" }

            @if expenditures.is_empty() {
                p class="text-gray-600 dark:text-gray-400" data-empty-state="true"
                {
                    "No expenditures recorded."
                }
            } @else {
                ul class="divide-y divide-gray-200 dark:divide-gray-700"
                {
                    @for expenditure in expenditures {
                        li class="flex items-center justify-between gap-4 py-2"
                        {
                            span { (expenditure.title) }
                            span class="text-sm" { bdi dir="ltr" { (format_date_dmy(expenditure.date)) } }
                            span class="font-semibold" { (format_amount(expenditure.amount)) }
                        }
                    }
                }
            }
        }
    }
}
