//! Defines the route handler for the expenditure edit page.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    html::{PAGE_CONTAINER_STYLE, base},
    expenditure::{
        core::{ExpenditureId, get_expenditure},
        form::{ExpenditureFormDefaults, FormAction, expenditure_form},
    },
    navigation::NavBar,
};

/// The state needed for the expenditure edit page.
#[derive(Debug, Clone)]
pub struct EditExpenditurePageState {
    /// The database connection for managing expenditures.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditExpenditurePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the edit form for a committed expenditure.
pub async fn get_edit_expenditure_page(
    State(state): State<EditExpenditurePageState>,
    Path(expenditure_id): Path<ExpenditureId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expenditure = get_expenditure(expenditure_id, &connection).inspect_err(|error| {
        tracing::error!("could not get expenditure {expenditure_id}: {error}")
    })?;

    let nav_bar = NavBar::new(endpoints::EXPENDITURES_VIEW);
    let defaults = ExpenditureFormDefaults {
        date: expenditure.date,
        title: &expenditure.title,
        amount: Some(expenditure.amount),
        notes: &expenditure.notes,
    };

    let content = html! {
        (nav_bar.into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl"
            {
                h1 class="text-2xl font-bold mb-6" { "اخراجات میں ترمیم" }

                (expenditure_form(FormAction::Edit(expenditure.id), &defaults))
            }
        }
    };

    Ok(base("Edit Expenditure", &[], &content).into_response())
}
