//! Defines the endpoint for updating an expenditure.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    expenditure::{
        core::{ExpenditureId, update_expenditure},
        form::{ExpenditureForm, build_expenditure_draft},
    },
};

/// The state needed to edit an expenditure.
#[derive(Debug, Clone)]
pub struct EditExpenditureState {
    /// The database connection for managing expenditures.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditExpenditureState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for updating an expenditure.
pub async fn edit_expenditure_endpoint(
    State(state): State<EditExpenditureState>,
    Path(expenditure_id): Path<ExpenditureId>,
    Form(form): Form<ExpenditureForm>,
) -> Response {
    let draft = match build_expenditure_draft(form) {
        Ok(draft) => draft,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_expenditure(expenditure_id, draft, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::EXPENDITURES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not update expenditure {expenditure_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod edit_expenditure_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        expenditure::{
            core::{create_expenditure, get_expenditure, test_expenditure_draft},
            form::ExpenditureForm,
        },
        initialize_db,
    };

    use super::{EditExpenditureState, edit_expenditure_endpoint};

    fn must_create_test_state() -> EditExpenditureState {
        let connection =
            Connection::open_in_memory().expect("could not create in-memory SQLite database");
        initialize_db(&connection).expect("could not initialize test DB");

        EditExpenditureState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn updates_expenditure() {
        let state = must_create_test_state();
        let created = {
            let connection = state.db_connection.lock().unwrap();
            create_expenditure(
                test_expenditure_draft("بجلی کا بل", 1500, date!(2025 - 03 - 05)),
                &connection,
            )
            .unwrap()
        };
        let form = ExpenditureForm {
            date: date!(2025 - 03 - 06),
            title: "گیس کا بل".to_owned(),
            amount: "900".to_owned(),
            notes: "".to_owned(),
        };

        let response =
            edit_expenditure_endpoint(State(state.clone()), Path(created.id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let connection = state.db_connection.lock().unwrap();
        let updated = get_expenditure(created.id, &connection).unwrap();
        assert_eq!(updated.title, "گیس کا بل");
        assert_eq!(updated.amount, 900);
    }

    #[tokio::test]
    async fn responds_not_found_for_missing_expenditure() {
        let state = must_create_test_state();
        let form = ExpenditureForm {
            date: date!(2025 - 03 - 06),
            title: "گیس کا بل".to_owned(),
            amount: "900".to_owned(),
            notes: "".to_owned(),
        };

        let response = edit_expenditure_endpoint(State(state), Path(42), Form(form)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
