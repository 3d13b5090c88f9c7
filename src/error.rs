//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{alert::Alert, internal_server_error::InternalServerError, not_found::NotFoundError};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The username and password combination did not match a registered user.
    #[error("incorrect username or password")]
    InvalidCredentials,

    /// The token cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// There was an error parsing the date in the cookie or creating the new
    /// expiry date time.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not format expiry cookie date-time string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An empty string was used as a username.
    #[error("Username cannot be empty")]
    EmptyUsername,

    /// An empty string was used as a password.
    #[error("Password cannot be empty")]
    EmptyPassword,

    /// The username is already taken by another user.
    #[error("the username \"{0}\" is already taken")]
    DuplicateUsername(String),

    /// The transaction type was neither "income" nor "expense".
    #[error("\"{0}\" is not a valid transaction type")]
    InvalidTransactionType(String),

    /// The amount of a transaction could not be parsed as a number.
    #[error("\"{0}\" is not a valid amount")]
    InvalidAmount(String),

    /// The VAT of a transaction could not be parsed as a number.
    #[error("\"{0}\" is not a valid VAT amount")]
    InvalidVat(String),

    /// The date of a transaction was not an ISO 8601 date (YYYY-MM-DD).
    #[error("\"{0}\" is not a valid date, expected YYYY-MM-DD")]
    InvalidDate(String),

    /// The upload form did not contain a file.
    #[error("no file was uploaded")]
    MissingFile,

    /// The uploaded file has no usable name once unsafe characters are removed.
    #[error("the file name is empty")]
    EmptyFileName,

    /// An invoice with the same file name already exists in the archive.
    #[error("an invoice named \"{0}\" already exists")]
    DuplicateInvoiceFileName(String),

    /// The multipart form could not be parsed.
    #[error("Could not parse multipart form: {0}")]
    MultipartError(String),

    /// Reading or writing a file in the invoice storage directory failed.
    #[error("invoice storage error: {0}")]
    StorageError(String),

    /// The ledger could not be written as CSV.
    #[error("could not write CSV: {0}")]
    CsvError(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete an invoice that does not exist
    #[error("tried to delete an invoice that is not in the database")]
    DeleteMissingInvoice,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            Error::InvalidTransactionType(type_) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid transaction type".to_owned(),
                    details: format!(
                        "\"{type_}\" is not a transaction type. Choose either income or expense."
                    ),
                },
            ),
            Error::InvalidAmount(amount) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid amount".to_owned(),
                    details: format!("\"{amount}\" is not a number. Enter an amount like 123.45."),
                },
            ),
            Error::InvalidVat(vat) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid VAT".to_owned(),
                    details: format!("\"{vat}\" is not a number. Enter a VAT amount like 24.00."),
                },
            ),
            Error::InvalidDate(date) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid transaction date".to_owned(),
                    details: format!("\"{date}\" is not a date. Use the format YYYY-MM-DD."),
                },
            ),
            Error::MissingFile => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "No file selected".to_owned(),
                    details: "Choose an invoice file to upload.".to_owned(),
                },
            ),
            Error::EmptyFileName => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid file name".to_owned(),
                    details: "The file has no name. Rename the file and try again.".to_owned(),
                },
            ),
            Error::DuplicateInvoiceFileName(file_name) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Duplicate Invoice".to_owned(),
                    details: format!(
                        "An invoice named {file_name} already exists. \
                        Rename the file, or delete the existing invoice first."
                    ),
                },
            ),
            Error::MultipartError(error) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Could not read the upload".to_owned(),
                    details: error,
                },
            ),
            Error::UpdateMissingTransaction => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update transaction".to_owned(),
                    details: "The transaction could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingTransaction => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete transaction".to_owned(),
                    details: "The transaction could not be found. \
                    Try refreshing the page to see if the transaction has already been deleted."
                        .to_owned(),
                },
            ),
            Error::DeleteMissingInvoice => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete invoice".to_owned(),
                    details: "The invoice could not be found. \
                    Try refreshing the page to see if the invoice has already been deleted."
                        .to_owned(),
                },
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Not found".to_owned(),
                    details: "The requested item could not be found.".to_owned(),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details:
                            "An unexpected error occurred, check the server logs for more details."
                                .to_owned(),
                    },
                )
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}
