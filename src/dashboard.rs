//! The dashboard: an overview of the VAT position, the ledger and the archive.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{UserID, get_user_by_id},
    endpoints,
    html::{LINK_STYLE, PAGE_CONTAINER_STYLE, base},
    invoice::count_invoices,
    navigation::NavBar,
    transaction::{count_transactions, get_all_transactions},
    vat::{VatSummary, summarize, vat_summary_cards},
};

/// The state needed for the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

struct DashboardData {
    username: String,
    vat_summary: VatSummary,
    transaction_count: u32,
    invoice_count: u32,
}

/// Display a page with an overview of the user's books.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let data = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let user = get_user_by_id(user_id, &connection)?;
        let transactions = get_all_transactions(&connection)?;

        DashboardData {
            username: user.username.to_string(),
            vat_summary: summarize(&transactions),
            transaction_count: count_transactions(&connection)?,
            invoice_count: count_invoices(&connection)?,
        }
    };

    Ok(dashboard_view(&data).into_response())
}

fn count_card(id: &str, title: &str, count: u32, url: &str, link_text: &str) -> Markup {
    html!(
        div
            id=(id)
            class="flex-1 min-w-48 p-6 bg-white border border-gray-200 rounded-lg shadow
                dark:bg-gray-800 dark:border-gray-700"
        {
            h2 class="text-sm font-medium text-gray-500 dark:text-gray-400" { (title) }
            p class="text-2xl font-bold" { (count) }
            a href=(url) class=(LINK_STYLE) { (link_text) }
        }
    )
}

fn dashboard_view(data: &DashboardData) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-6 w-full lg:max-w-5xl"
            {
                h1 class="text-xl font-bold" { "Welcome, " (data.username) }

                (vat_summary_cards(&data.vat_summary))

                div class="flex flex-wrap gap-4 w-full"
                {
                    (count_card(
                        "transaction-count",
                        "Transactions",
                        data.transaction_count,
                        endpoints::TRANSACTIONS_VIEW,
                        "View ledger",
                    ))
                    (count_card(
                        "invoice-count",
                        "Invoices",
                        data.invoice_count,
                        endpoints::INVOICES_VIEW,
                        "View archive",
                    ))
                }

                nav id="quick-links" class="flex flex-wrap gap-6"
                {
                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE) { "Add Transaction" }
                    a href=(endpoints::NEW_INVOICE_VIEW) class=(LINK_STYLE) { "Upload Invoice" }
                    a href=(endpoints::EXPORT_TRANSACTIONS) class=(LINK_STYLE) download
                    {
                        "Export CSV"
                    }
                }
            }
        }
    );

    base("Dashboard", &content)
}

#[cfg(test)]
mod dashboard_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        endpoints, initialize_db, register,
        test_utils::{assert_valid_html, must_select_text, parse_html_document},
        transaction::{NewTransaction, TransactionType, create_transaction},
    };

    use super::{DashboardState, get_dashboard_page};

    #[tokio::test]
    async fn shows_greeting_vat_and_counts() {
        let connection = Connection::open_in_memory().unwrap();
        initialize_db(&connection).unwrap();
        let user = register("alice", "hunter2", 4, &connection).unwrap();
        for (type_, vat) in [
            (TransactionType::Income, 240.0),
            (TransactionType::Expense, 120.0),
        ] {
            create_transaction(
                NewTransaction {
                    type_,
                    amount: vat * 5.0,
                    vat,
                    description: String::new(),
                    date: date!(2024 - 01 - 15),
                },
                &connection,
            )
            .unwrap();
        }
        let state = DashboardState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_dashboard_page(State(state), Extension(user.id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        assert_eq!(must_select_text(&document, "h1"), vec!["Welcome, alice"]);
        assert_eq!(must_select_text(&document, "#vat-due p"), vec!["€120.00"]);
        assert_eq!(
            must_select_text(&document, "#transaction-count p"),
            vec!["2"]
        );
        assert_eq!(must_select_text(&document, "#invoice-count p"), vec!["0"]);

        let link_selector = Selector::parse("#quick-links a").unwrap();
        let links = document
            .select(&link_selector)
            .filter_map(|link| link.value().attr("href"))
            .collect::<Vec<_>>();
        assert_eq!(
            links,
            vec![
                endpoints::NEW_TRANSACTION_VIEW,
                endpoints::NEW_INVOICE_VIEW,
                endpoints::EXPORT_TRANSACTIONS,
            ]
        );
    }
}
