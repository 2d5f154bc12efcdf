//! Defines the endpoint for recording an expenditure.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    expenditure::{
        core::create_expenditure,
        form::{ExpenditureForm, build_expenditure_draft},
    },
};

/// The state needed to create an expenditure.
#[derive(Debug, Clone)]
pub struct CreateExpenditureState {
    /// The database connection for managing expenditures.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateExpenditureState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for recording an expenditure.
pub async fn create_expenditure_endpoint(
    State(state): State<CreateExpenditureState>,
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

    match create_expenditure(draft, &connection) {
        Ok(expenditure) => {
            tracing::info!(
                "recorded expenditure {} ({})",
                expenditure.title,
                expenditure.id
            );
            (
                HxRedirect(endpoints::EXPENDITURES_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not create expenditure: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod create_expenditure_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        extract::State,
        http::{HeaderValue, StatusCode},
    };
    use axum_htmx::HX_REDIRECT;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        endpoints,
        expenditure::{core::get_all_expenditures, form::ExpenditureForm},
        initialize_db,
    };

    use super::{CreateExpenditureState, create_expenditure_endpoint};

    fn must_create_test_state() -> CreateExpenditureState {
        let connection =
            Connection::open_in_memory().expect("could not create in-memory SQLite database");
        initialize_db(&connection).expect("could not initialize test DB");

        CreateExpenditureState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn records_expenditure_and_redirects() {
        let state = must_create_test_state();
        let form = ExpenditureForm {
            date: date!(2025 - 03 - 05),
            title: "بجلی کا بل".to_owned(),
            amount: "1500".to_owned(),
            notes: "مارچ".to_owned(),
        };

        let response = create_expenditure_endpoint(State(state.clone()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(HX_REDIRECT),
            Some(&HeaderValue::from_str(endpoints::EXPENDITURES_VIEW).unwrap())
        );

        let connection = state.db_connection.lock().unwrap();
        let expenditures = get_all_expenditures(&connection).unwrap();
        assert_eq!(expenditures.len(), 1);
        assert_eq!(expenditures[0].amount, 1500);
    }

    #[tokio::test]
    async fn rejects_zero_amount_without_committing() {
        let state = must_create_test_state();
        let form = ExpenditureForm {
            date: date!(2025 - 03 - 05),
            title: "بجلی کا بل".to_owned(),
            amount: "0".to_owned(),
            notes: "".to_owned(),
        };

        let response = create_expenditure_endpoint(State(state.clone()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_all_expenditures(&connection).unwrap(), []);
    }
}
