//! Defines the endpoint for deleting an expenditure.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    expenditure::core::{ExpenditureId, delete_expenditure},
};

/// The state needed to delete an expenditure.
#[derive(Debug, Clone)]
pub struct DeleteExpenditureState {
    /// The database connection for managing expenditures.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteExpenditureState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting an expenditure, responds with an alert.
pub async fn delete_expenditure_endpoint(
    State(state): State<DeleteExpenditureState>,
    Path(expenditure_id): Path<ExpenditureId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_expenditure(expenditure_id, &connection) {
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(()) => Alert::success_simple("اخراجات حذف کر دیے گئے۔").into_response(),
        Err(error) => {
            tracing::error!("Could not delete expenditure {expenditure_id}: {error}");
            error.into_alert_response()
        }
    }
}
