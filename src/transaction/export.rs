//! Exports the ledger as a CSV file.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    transaction::core::{Transaction, get_all_transactions},
};

const CSV_HEADER: [&str; 6] = ["ID", "Type", "Amount", "VAT", "Description", "Date"];

/// The state needed to export the ledger.
#[derive(Debug, Clone)]
pub struct ExportTransactionsState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExportTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Write `transactions` as CSV with a header row, one row per transaction in
/// the given order.
///
/// # Errors
/// Returns [Error::CsvError] if a row could not be written.
pub fn export_transactions_csv(transactions: &[Transaction]) -> Result<String, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(CSV_HEADER)
        .map_err(|error| Error::CsvError(error.to_string()))?;

    for transaction in transactions {
        writer
            .write_record([
                transaction.id.to_string(),
                transaction.type_.to_string(),
                transaction.amount.to_string(),
                transaction.vat.to_string(),
                transaction.description.clone(),
                transaction.date.to_string(),
            ])
            .map_err(|error| Error::CsvError(error.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))?;

    String::from_utf8(bytes).map_err(|error| Error::CsvError(error.to_string()))
}

/// Download the whole ledger as `transactions.csv`.
pub async fn get_export_transactions(
    State(state): State<ExportTransactionsState>,
) -> Result<Response, Error> {
    let transactions = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_all_transactions(&connection)?
    };

    let csv = export_transactions_csv(&transactions)
        .inspect_err(|error| tracing::error!("Could not export transactions: {error}"))?;
    tracing::debug!("Exported {} transactions", transactions.len());

    Ok((
        [
            (CONTENT_TYPE, "text/csv"),
            (
                CONTENT_DISPOSITION,
                "attachment; filename=\"transactions.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}
