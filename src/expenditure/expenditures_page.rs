//! Defines the route handler for the expenditures page.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_DELETE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_amount, format_date_dmy,
    },
    expenditure::{
        core::{Expenditure, get_all_expenditures},
        form::{ExpenditureFormDefaults, FormAction, expenditure_form},
    },
    navigation::NavBar,
    timezone::current_local_date,
};

/// The state needed for the expenditures page.
#[derive(Debug, Clone)]
pub struct ExpendituresPageState {
    /// The database connection for managing expenditures.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Karachi".
    pub local_timezone: String,
}

impl FromRef<AppState> for ExpendituresPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the expenditure list with the record-expenditure form on top.
pub async fn get_expenditures_page(
    State(state): State<ExpendituresPageState>,
) -> Result<Response, Error> {
    let today = current_local_date(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expenditures = get_all_expenditures(&connection)
        .inspect_err(|error| tracing::error!("could not get expenditures: {error}"))?;

    let nav_bar = NavBar::new(endpoints::EXPENDITURES_VIEW);
    let total_spent: i64 = expenditures
        .iter()
        .map(|expenditure| expenditure.amount)
        .sum();
    let defaults = ExpenditureFormDefaults {
        date: today,
        title: "",
        amount: None,
        notes: "",
    };

    let content = html! {
        (nav_bar.into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl"
            {
                div class="flex flex-wrap items-baseline justify-between gap-4 mb-4"
                {
                    h1 class="text-2xl font-bold" { "Expenditures" }

                    span class="text-sm text-gray-600 dark:text-gray-400"
                    {
                        "Total spent: " (format_amount(total_spent))
                    }
                }

                div class="mb-8"
                {
                    (expenditure_form(FormAction::Create, &defaults))
                }

                @if expenditures.is_empty() {
                    p class="mt-8 text-center text-gray-600 dark:text-gray-400"
                        data-empty-state="true"
                    {
                        "No expenditures recorded yet."
                    }
                } @else {
                    (expenditures_table(&expenditures))
                }
            }
        }
    };

    Ok(base("Expenditures", &[], &content).into_response())
}

fn expenditures_table(expenditures: &[Expenditure]) -> Markup {
    html! {
        div class="relative overflow-x-auto shadow-md sm:rounded-lg"
        {
            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class="px-6 py-3" { "تاریخ" }
                        th scope="col" class="px-6 py-3" { "تفصیل" }
                        th scope="col" class="px-6 py-3" { "رقم" }
                        th scope="col" class="px-6 py-3" { "نوٹس" }
                        th scope="col" class="px-6 py-3" { "Actions" }
                    }
                }

                tbody
                {
                    @for expenditure in expenditures {
                        tr class=(TABLE_ROW_STYLE) data-expenditure-row="true"
                        {
                            td class=(TABLE_CELL_STYLE)
                            {
                                bdi dir="ltr" { (format_date_dmy(expenditure.date)) }
                            }
                            td class=(TABLE_CELL_STYLE) { (expenditure.title) }
                            td class=(TABLE_CELL_STYLE) { (format_amount(expenditure.amount)) }
                            td class=(TABLE_CELL_STYLE) { (expenditure.notes) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                div class="flex gap-3"
                                {
                                    a
                                        href=(endpoints::format_endpoint(
                                            endpoints::EDIT_EXPENDITURE_VIEW,
                                            expenditure.id,
                                        ))
                                        class=(LINK_STYLE)
                                    {
                                        "Edit"
                                    }

                                    button
                                        type="button"
                                        class=(BUTTON_DELETE_STYLE)
                                        hx-delete=(endpoints::format_endpoint(
                                            endpoints::EXPENDITURE,
                                            expenditure.id,
                                        ))
                                        hx-target="closest tr"
                                        hx-swap="outerHTML"
                                        hx-target-error="#alert-container"
                                        hx-confirm="کیا آپ یہ اخراجات حذف کرنا چاہتے ہیں؟"
                                    {
                                        "Delete"
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod expenditures_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, response::Response};
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        db::initialize,
        expenditure::core::{create_expenditure, test_expenditure_draft},
    };

    use super::{ExpendituresPageState, get_expenditures_page};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    async fn parse_html(response: Response) -> Html {
        let body = response.into_body();
        let body = axum::body::to_bytes(body, usize::MAX)
            .await
            .expect("Could not get response body");
        let text = String::from_utf8_lossy(&body).to_string();

        Html::parse_document(&text)
    }

    #[tokio::test]
    async fn lists_expenditures_with_total() {
        let conn = get_test_connection();
        create_expenditure(
            test_expenditure_draft("بجلی کا بل", 1500, date!(2025 - 03 - 05)),
            &conn,
        )
        .unwrap();
        create_expenditure(
            test_expenditure_draft("چاک", 100, date!(2025 - 03 - 02)),
            &conn,
        )
        .unwrap();
        let state = ExpendituresPageState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_expenditures_page(State(state)).await.unwrap();

        let html = parse_html(response).await;
        let row_selector = Selector::parse("tbody tr[data-expenditure-row='true']").unwrap();
        assert_eq!(html.select(&row_selector).count(), 2);

        let text: String = html.root_element().text().collect();
        assert!(text.contains("1,600"), "expected total spent in: {text}");
    }

    #[tokio::test]
    async fn empty_list_shows_empty_state() {
        let state = ExpendituresPageState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_expenditures_page(State(state)).await.unwrap();

        let html = parse_html(response).await;
        let empty_selector = Selector::parse("[data-empty-state='true']").unwrap();
        assert!(html.select(&empty_selector).next().is_some());
    }
}
