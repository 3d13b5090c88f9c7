//! VAT totals derived from the ledger.

use std::{
    ops::Add,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    html::{PAGE_CONTAINER_STYLE, base, format_currency},
    navigation::NavBar,
    transaction::{Transaction, TransactionType, get_all_transactions},
};

/// VAT collected on income, VAT paid on expenses and the difference owed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VatSummary {
    /// The sum of VAT over income transactions.
    pub vat_in: f64,
    /// The sum of VAT over expense transactions.
    pub vat_out: f64,
    /// `vat_in - vat_out`. Negative when more VAT was paid than collected.
    pub vat_due: f64,
}

impl VatSummary {
    fn new(vat_in: f64, vat_out: f64) -> Self {
        Self {
            vat_in,
            vat_out,
            vat_due: vat_in - vat_out,
        }
    }
}

impl Add for VatSummary {
    type Output = VatSummary;

    fn add(self, rhs: Self) -> Self::Output {
        VatSummary::new(self.vat_in + rhs.vat_in, self.vat_out + rhs.vat_out)
    }
}

/// Total the VAT of `transactions`. An empty ledger gives all zeros.
pub fn summarize(transactions: &[Transaction]) -> VatSummary {
    let (vat_in, vat_out) =
        transactions
            .iter()
            .fold((0.0, 0.0), |(vat_in, vat_out), transaction| {
                match transaction.type_ {
                    TransactionType::Income => (vat_in + transaction.vat, vat_out),
                    TransactionType::Expense => (vat_in, vat_out + transaction.vat),
                }
            });

    VatSummary::new(vat_in, vat_out)
}

/// The three VAT figures as a row of cards.
pub fn vat_summary_cards(summary: &VatSummary) -> Markup {
    let card = |id: &str, title: &str, amount: f64| {
        html!(
            div
                id=(id)
                class="flex-1 min-w-48 p-6 bg-white border border-gray-200 rounded-lg shadow
                    dark:bg-gray-800 dark:border-gray-700"
            {
                h2 class="text-sm font-medium text-gray-500 dark:text-gray-400" { (title) }
                p class="text-2xl font-bold" { (format_currency(amount)) }
            }
        )
    };

    html!(
        div class="flex flex-wrap gap-4 w-full"
        {
            (card("vat-in", "VAT collected", summary.vat_in))
            (card("vat-out", "VAT paid", summary.vat_out))
            (card("vat-due", "VAT due", summary.vat_due))
        }
    )
}

/// The state needed for the VAT page.
#[derive(Debug, Clone)]
pub struct VatPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for VatPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the VAT summary of the whole ledger.
pub async fn get_vat_page(State(state): State<VatPageState>) -> Result<Response, Error> {
    let transactions = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_all_transactions(&connection)?
    };

    let summary = summarize(&transactions);

    Ok(vat_view(&summary, transactions.len()).into_response())
}

fn vat_view(summary: &VatSummary, transaction_count: usize) -> Markup {
    let nav_bar = NavBar::new(endpoints::VAT_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                h1 class="text-xl font-bold" { "VAT Summary" }

                (vat_summary_cards(summary))

                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "Calculated from " (transaction_count) " transaction(s)."
                }
            }
        }
    );

    base("VAT", &content)
}


#[cfg(test)]
mod vat_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        initialize_db,
        test_utils::{assert_valid_html, must_select_text, parse_html_document},
        transaction::{NewTransaction, TransactionType, create_transaction},
    };

    use super::{VatPageState, get_vat_page};

    #[tokio::test]
    async fn shows_vat_figures() {
        let connection = Connection::open_in_memory().unwrap();
        initialize_db(&connection).unwrap();
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
        let state = VatPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_vat_page(State(state)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        assert_eq!(must_select_text(&document, "#vat-in p"), vec!["€240.00"]);
        assert_eq!(must_select_text(&document, "#vat-out p"), vec!["€120.00"]);
        assert_eq!(must_select_text(&document, "#vat-due p"), vec!["€120.00"]);
    }
}
