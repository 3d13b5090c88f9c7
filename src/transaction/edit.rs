//! The page and endpoint for replacing a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    database_id::TransactionID,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, loading_spinner},
    navigation::NavBar,
    transaction::{
        core::{Transaction, get_transaction, update_transaction},
        form::{TransactionForm, TransactionFormDefaults, transaction_form_fields},
    },
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the edit form for the transaction `transaction_id`.
pub async fn get_edit_transaction_page(
    State(state): State<EditTransactionState>,
    Path(transaction_id): Path<TransactionID>,
) -> Result<Response, Error> {
    let transaction = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_transaction(transaction_id, &connection)?
    };

    Ok(edit_transaction_view(&transaction).into_response())
}

fn edit_transaction_view(transaction: &Transaction) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let update_url = endpoints::format_endpoint(endpoints::TRANSACTION, transaction.id);
    let defaults = TransactionFormDefaults {
        transaction_type: transaction.type_,
        amount: Some(transaction.amount),
        vat: Some(transaction.vat),
        date: transaction.date,
        description: Some(&transaction.description),
    };

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full max-w-md space-y-4"
            {
                h1 class="text-xl font-bold" { "Edit Transaction" }

                form
                    hx-put=(update_url)
                    hx-target-error="#alert-container"
                    hx-indicator="#indicator"
                    hx-disabled-elt="#submit-button"
                    class="w-full space-y-4 md:space-y-6"
                {
                    (transaction_form_fields(&defaults))

                    button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
                    {
                        span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                        "Save Changes"
                    }
                }
            }
        }
    };

    base("Edit Transaction", &content)
}

/// Replace the transaction `transaction_id` with the submitted form and
/// redirect to the transactions page.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Path(transaction_id): Path<TransactionID>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let new_transaction = match form.parse() {
        Ok(new_transaction) => new_transaction,
        Err(error) => {
            tracing::debug!("rejected transaction form: {error}");
            return error.into_alert_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_transaction(transaction_id, new_transaction, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::UpdateMissingTransaction) => {
            tracing::warn!("Tried to update missing transaction {transaction_id}");
            Error::UpdateMissingTransaction.into_alert_response()
        }
        Err(error) => {
            tracing::error!("Could not update transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}


#[cfg(test)]
mod edit_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        endpoints, initialize_db,
        test_utils::assert_hx_redirect,
        transaction::{
            core::{
                NewTransaction, Transaction, TransactionType, create_transaction,
                delete_transaction, get_transaction,
            },
            form::TransactionForm,
        },
    };

    use super::{EditTransactionState, edit_transaction_endpoint};

    fn get_test_state() -> EditTransactionState {
        let connection = Connection::open_in_memory().unwrap();
        initialize_db(&connection).unwrap();
        create_transaction(
            NewTransaction {
                type_: TransactionType::Expense,
                amount: 1.23,
                vat: 0.23,
                description: "test".to_owned(),
                date: date!(2025 - 10 - 27),
            },
            &connection,
        )
        .unwrap();

        EditTransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn form() -> TransactionForm {
        TransactionForm {
            type_: "income".to_owned(),
            amount: "3.21".to_owned(),
            vat: "0.5".to_owned(),
            description: Some("foo".to_owned()),
            date: "2025-10-28".to_owned(),
        }
    }

    #[tokio::test]
    async fn can_update_transaction() {
        let state = get_test_state();

        let response = edit_transaction_endpoint(State(state.clone()), Path(1), Form(form())).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);
        let got = get_transaction(1, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(
            got,
            Transaction {
                id: 1,
                type_: TransactionType::Income,
                amount: 3.21,
                vat: 0.5,
                description: "foo".to_owned(),
                date: date!(2025 - 10 - 28),
            }
        );
    }

    #[tokio::test]
    async fn editing_deleted_transaction_is_not_found() {
        let state = get_test_state();
        delete_transaction(1, &state.db_connection.lock().unwrap()).unwrap();

        let response = edit_transaction_endpoint(State(state), Path(1), Form(form())).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_form_leaves_transaction_unchanged() {
        let state = get_test_state();
        let mut bad_form = form();
        bad_form.date = "yesterday".to_owned();

        let response =
            edit_transaction_endpoint(State(state.clone()), Path(1), Form(bad_form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let got = get_transaction(1, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(got.amount, 1.23);
    }
}
