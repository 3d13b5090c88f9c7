//! The invoices page, which lists the archive.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error, endpoints,
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, delete_button,
    },
    invoice::{
        InvoiceState,
        db::get_all_invoices,
        domain::Invoice,
    },
    navigation::NavBar,
};

/// Render every archived invoice with download and delete actions.
pub async fn get_invoices_page(State(state): State<InvoiceState>) -> Result<Response, Error> {
    let invoices = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_all_invoices(&connection)
            .inspect_err(|error| tracing::error!("Failed to retrieve invoices: {error}"))?
    };

    Ok(invoices_view(&invoices).into_response())
}

fn invoice_row(invoice: &Invoice) -> Markup {
    let download_url =
        endpoints::format_file_endpoint(endpoints::INVOICE_FILE, invoice.file_name.as_ref());
    let delete_url = endpoints::format_endpoint(endpoints::INVOICE, invoice.id);
    let confirm_message = format!(
        "Are you sure you want to delete the invoice '{}'? The file will be removed too.",
        invoice.file_name
    );

    html!(
        tr class=(TABLE_ROW_STYLE) data-invoice-id=(invoice.id)
        {
            td class=(TABLE_CELL_STYLE)
            {
                a href=(download_url) class=(LINK_STYLE) download { (invoice.file_name) }
            }
            td class=(TABLE_CELL_STYLE) { (invoice.upload_date) }
            td class=(TABLE_CELL_STYLE)
            {
                (delete_button(&delete_url, &confirm_message, "closest tr", "delete"))
            }
        }
    )
}

fn invoices_view(invoices: &[Invoice]) -> Markup {
    let nav_bar = NavBar::new(endpoints::INVOICES_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Invoices" }

                    a href=(endpoints::NEW_INVOICE_VIEW) class=(LINK_STYLE) { "Upload Invoice" }
                }

                div class="overflow-x-auto dark:bg-gray-800"
                {
                    table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "File" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Uploaded" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for invoice in invoices {
                                (invoice_row(invoice))
                            }

                            @if invoices.is_empty() {
                                tr
                                {
                                    td
                                        colspan="3"
                                        class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                    {
                                        "No invoices archived yet. "
                                        a href=(endpoints::NEW_INVOICE_VIEW) class=(LINK_STYLE)
                                        {
                                            "Upload your first invoice"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Invoices", &content)
}
