//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/transactions/{transaction_id}/edit', use [format_endpoint].

/// The root route which redirects to the dashboard or log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page listing the transaction ledger.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for recording a new transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";
/// The page for editing an existing transaction.
pub const EDIT_TRANSACTION_VIEW: &str = "/transactions/{transaction_id}/edit";
/// The route for downloading the ledger as a CSV file.
pub const EXPORT_TRANSACTIONS: &str = "/transactions/export";
/// The page summarising VAT across the ledger.
pub const VAT_VIEW: &str = "/vat";
/// The page listing archived invoices.
pub const INVOICES_VIEW: &str = "/invoices";
/// The page for uploading a new invoice.
pub const NEW_INVOICE_VIEW: &str = "/invoices/new";
/// The route for downloading an archived invoice file.
pub const INVOICE_FILE: &str = "/invoices/files/{file_name}";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to register users.
pub const USERS: &str = "/api/users";
/// The route to create transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to update or delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to upload invoices.
pub const INVOICES_API: &str = "/api/invoices";
/// The route to delete a single invoice.
pub const INVOICE: &str = "/api/invoices/{invoice_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/invoices/{invoice_id}', '{invoice_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    replace_parameter(endpoint_path, &id.to_string())
}

/// Replace the parameter in `endpoint_path` with a file name.
///
/// `file_name` is expected to be sanitized already, so it contains no
/// characters that need percent encoding.
pub fn format_file_endpoint(endpoint_path: &str, file_name: &str) -> String {
    replace_parameter(endpoint_path, file_name)
}

fn replace_parameter(endpoint_path: &str, value: &str) -> String {
    let param_start = match endpoint_path.find('{') {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        value,
        &endpoint_path[param_end..]
    )
}
