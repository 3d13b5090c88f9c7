//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    response::Redirect,
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        auth_guard, auth_guard_hx, get_log_in_page, get_log_out, get_register_page, post_log_in,
        register_user,
    },
    dashboard::get_dashboard_page,
    endpoints,
    internal_server_error::get_internal_server_error_page,
    invoice::{
        delete_invoice_endpoint, get_invoice_file, get_invoices_page, get_new_invoice_page,
        upload_invoice_endpoint,
    },
    not_found::get_404_not_found,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        get_edit_transaction_page, get_export_transactions, get_new_transaction_page,
        get_transactions_page,
    },
    vat::get_vat_page,
};

/// The largest invoice file that can be uploaded.
const MAX_INVOICE_SIZE: usize = 16 * 1024 * 1024;

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(endpoints::USERS, post(register_user))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(endpoints::NEW_TRANSACTION_VIEW, get(get_new_transaction_page))
        .route(
            endpoints::EDIT_TRANSACTION_VIEW,
            get(get_edit_transaction_page),
        )
        .route(endpoints::EXPORT_TRANSACTIONS, get(get_export_transactions))
        .route(endpoints::VAT_VIEW, get(get_vat_page))
        .route(endpoints::INVOICES_VIEW, get(get_invoices_page))
        .route(endpoints::NEW_INVOICE_VIEW, get(get_new_invoice_page))
        .route(endpoints::INVOICE_FILE, get(get_invoice_file))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These routes need to use the HX-REDIRECT header for auth redirects to work properly for HTMX requests.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(
                endpoints::TRANSACTIONS_API,
                post(create_transaction_endpoint),
            )
            .route(
                endpoints::TRANSACTION,
                put(edit_transaction_endpoint).delete(delete_transaction_endpoint),
            )
            .route(
                endpoints::INVOICES_API,
                post(upload_invoice_endpoint).layer(DefaultBodyLimit::max(MAX_INVOICE_SIZE)),
            )
            .route(endpoints::INVOICE, delete(delete_invoice_endpoint))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

#[cfg(test)]
mod root_route_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{endpoints, routing::get_index_page};

    #[tokio::test]
    async fn root_redirects_to_dashboard() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::DASHBOARD_VIEW);
    }
}

#[cfg(test)]
mod router_tests {
    use axum::{body::Bytes, http::StatusCode, middleware};
    use axum_test::{
        TestResponse, TestServer,
        multipart::{MultipartForm, Part},
    };
    use rusqlite::Connection;
    use tempfile::TempDir;

    use crate::{
        AppState, endpoints, invoice::InvoiceStorage, logging::MAX_LOGGED_REQUEST_SIZE,
        logging_middleware, register,
    };

    use super::{MAX_INVOICE_SIZE, build_router};

    fn get_test_server(temp_dir: &TempDir) -> TestServer {
        TestServer::try_new(build_router(get_test_state(temp_dir)))
            .expect("Could not create test server.")
    }

    /// The router wrapped in the request logging layer, as the server runs it.
    fn get_logged_test_server(temp_dir: &TempDir) -> TestServer {
        let app = build_router(get_test_state(temp_dir))
            .layer(middleware::from_fn(logging_middleware));

        TestServer::try_new(app).expect("Could not create test server.")
    }

    fn get_test_state(temp_dir: &TempDir) -> AppState {
        let connection = Connection::open_in_memory().unwrap();
        let storage = InvoiceStorage::new(temp_dir.path().join("uploads")).unwrap();
        let mut state = AppState::new(connection, "routing tests", "Etc/UTC", storage).unwrap();
        state.password_hash_cost = 4;
        register(
            "alice",
            "hunter2",
            state.password_hash_cost,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        state
    }

    async fn log_in(server: &TestServer) -> TestResponse {
        server
            .post(endpoints::LOG_IN_API)
            .form(&[("username", "alice"), ("password", "hunter2")])
            .await
    }

    #[tokio::test]
    async fn anonymous_page_request_redirects_to_log_in() {
        let temp_dir = TempDir::new().unwrap();
        let server = get_test_server(&temp_dir);

        for path in [
            endpoints::DASHBOARD_VIEW,
            endpoints::TRANSACTIONS_VIEW,
            endpoints::VAT_VIEW,
            endpoints::INVOICES_VIEW,
            endpoints::EXPORT_TRANSACTIONS,
        ] {
            let response = server.get(path).await;

            response.assert_status_see_other();
            let location = response.header("location");
            let location = location.to_str().unwrap();
            assert!(
                location.starts_with("/log_in?redirect_url="),
                "{path} redirected to {location}"
            );
        }
    }

    #[tokio::test]
    async fn anonymous_api_request_gets_hx_redirect() {
        let temp_dir = TempDir::new().unwrap();
        let server = get_test_server(&temp_dir);

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .add_header("HX-Request", "true")
            .add_header("HX-Current-URL", "/transactions/new")
            .form(&[("type", "income"), ("amount", "1"), ("vat", "0"), ("date", "2024-01-01")])
            .await;

        response.assert_status_ok();
        assert!(
            response
                .header("hx-redirect")
                .to_str()
                .unwrap()
                .starts_with(endpoints::LOG_IN_VIEW)
        );
    }

    #[tokio::test]
    async fn log_in_page_is_public() {
        let temp_dir = TempDir::new().unwrap();
        let server = get_test_server(&temp_dir);

        server.get(endpoints::LOG_IN_VIEW).await.assert_status_ok();
        server.get(endpoints::REGISTER_VIEW).await.assert_status_ok();
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let server = get_test_server(&temp_dir);

        server
            .get("/does/not/exist")
            .expect_failure()
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn logged_in_user_can_record_and_export() {
        let temp_dir = TempDir::new().unwrap();
        let server = get_test_server(&temp_dir);
        let cookies = log_in(&server).await.cookies();

        server
            .post(endpoints::TRANSACTIONS_API)
            .add_cookies(cookies.clone())
            .form(&[
                ("type", "income"),
                ("amount", "1200"),
                ("vat", "240"),
                ("description", "Consulting, January"),
                ("date", "2024-01-31"),
            ])
            .await
            .assert_status(StatusCode::SEE_OTHER);

        let response = server
            .get(endpoints::EXPORT_TRANSACTIONS)
            .add_cookies(cookies.clone())
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.text(),
            "ID,Type,Amount,VAT,Description,Date\n\
            1,income,1200,240,\"Consulting, January\",2024-01-31\n"
        );

        server
            .get(endpoints::DASHBOARD_VIEW)
            .add_cookies(cookies)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn logged_in_user_can_upload_and_download_invoice() {
        let temp_dir = TempDir::new().unwrap();
        let server = get_test_server(&temp_dir);
        let cookies = log_in(&server).await.cookies();
        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(b"%PDF-1.7".to_vec()).file_name("March Invoice.pdf"),
        );

        server
            .post(endpoints::INVOICES_API)
            .add_cookies(cookies.clone())
            .multipart(form)
            .await
            .assert_status(StatusCode::SEE_OTHER);

        let response = server
            .get(&endpoints::format_file_endpoint(
                endpoints::INVOICE_FILE,
                "March_Invoice.pdf",
            ))
            .add_cookies(cookies)
            .await;

        response.assert_status_ok();
        assert_eq!(response.as_bytes().as_ref(), b"%PDF-1.7");
    }

    #[tokio::test]
    async fn transaction_with_missing_field_gets_alert() {
        let temp_dir = TempDir::new().unwrap();
        let server = get_test_server(&temp_dir);
        let cookies = log_in(&server).await.cookies();

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .add_cookies(cookies)
            .form(&[("type", "income"), ("vat", "0"), ("date", "2024-01-31")])
            .expect_failure()
            .await;

        response.assert_status_bad_request();
        assert!(response.text().contains("Invalid amount"));
    }

    #[tokio::test]
    async fn anonymous_oversized_form_is_rejected_before_buffering() {
        let temp_dir = TempDir::new().unwrap();
        let server = get_logged_test_server(&temp_dir);
        let body = format!("username=alice&password={}", "a".repeat(MAX_LOGGED_REQUEST_SIZE));

        let response = server
            .post(endpoints::LOG_IN_API)
            .content_type("application/x-www-form-urlencoded")
            .bytes(Bytes::from(body))
            .expect_failure()
            .await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn logged_requests_still_reach_handlers() {
        let temp_dir = TempDir::new().unwrap();
        let server = get_logged_test_server(&temp_dir);
        let cookies = log_in(&server).await.cookies();
        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(b"%PDF-1.7".to_vec()).file_name("receipt.pdf"),
        );

        server
            .post(endpoints::INVOICES_API)
            .add_cookies(cookies)
            .multipart(form)
            .await
            .assert_status(StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn oversized_invoice_is_rejected_through_logging_layer() {
        let temp_dir = TempDir::new().unwrap();
        let server = get_logged_test_server(&temp_dir);
        let cookies = log_in(&server).await.cookies();
        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(vec![0_u8; MAX_INVOICE_SIZE + 1]).file_name("huge.pdf"),
        );

        let response = server
            .post(endpoints::INVOICES_API)
            .add_cookies(cookies)
            .multipart(form)
            .expect_failure()
            .await;

        response.assert_status_bad_request();
        let stored_files = std::fs::read_dir(temp_dir.path().join("uploads"))
            .unwrap()
            .count();
        assert_eq!(stored_files, 0);
    }
}
