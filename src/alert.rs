//! Alert system for displaying success and error messages to users.
//!
//! Alerts are HTML fragments swapped into the `#alert-container` element by
//! htmx, either as the main response or via `hx-target-error`.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::{Markup, html};

/// A message shown to the user after an action succeeds or fails.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message with extra details.
    Success { message: String, details: String },
    /// A success message without details.
    SuccessSimple { message: String },
    /// An error message with instructions on how to fix it.
    Error { message: String, details: String },
    /// An error message without details.
    ErrorSimple { message: String },
}

impl Alert {
    /// Render the alert as an HTML fragment.
    pub fn into_html(self) -> Html<String> {
        Html(self.into_markup().into_string())
    }

    fn into_markup(self) -> Markup {
        let (is_success, message, details) = match self {
            Alert::Success { message, details } => (true, message, Some(details)),
            Alert::SuccessSimple { message } => (true, message, None),
            Alert::Error { message, details } => (false, message, Some(details)),
            Alert::ErrorSimple { message } => (false, message, None),
        };

        let style = if is_success {
            "flex items-start p-4 mb-4 text-sm rounded border text-green-800 \
            border-green-300 bg-green-50 dark:bg-gray-800 dark:text-green-400 \
            dark:border-green-800"
        } else {
            "flex items-start p-4 mb-4 text-sm rounded border text-red-800 \
            border-red-300 bg-red-50 dark:bg-gray-800 dark:text-red-400 \
            dark:border-red-800"
        };

        html!(
            div
                class=(style)
                role="alert"
                data-alert-type=(if is_success { "success" } else { "error" })
            {
                div class="flex-1"
                {
                    p class="font-medium" { (message) }

                    @if let Some(details) = details.filter(|details| !details.is_empty()) {
                        p class="mt-1" { (details) }
                    }
                }

                button
                    type="button"
                    class="ms-4 font-bold"
                    aria-label="Dismiss"
                    data-dismiss-alert
                {
                    "×"
                }
            }
        )
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        (StatusCode::OK, self.into_html()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use scraper::{Html, Selector};

    use crate::test_utils::{assert_valid_html, must_select_text, parse_html_fragment};

    use super::Alert;

    #[tokio::test]
    async fn success_alert_renders_message() {
        let response = Alert::SuccessSimple {
            message: "Transaction deleted".to_owned(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert_eq!(must_select_text(&html, "p"), ["Transaction deleted"]);
        assert_alert_type(&html, "success");
    }

    #[tokio::test]
    async fn error_alert_renders_message_and_details() {
        let response = Alert::Error {
            message: "Invalid amount".to_owned(),
            details: "Enter a number.".to_owned(),
        }
        .into_response();

        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert_eq!(
            must_select_text(&html, "p"),
            ["Invalid amount", "Enter a number."]
        );
        assert_alert_type(&html, "error");
    }

    #[track_caller]
    fn assert_alert_type(html: &Html, want: &str) {
        let alert = html
            .select(&Selector::parse("div[role=alert]").unwrap())
            .next()
            .expect("alert element missing");

        assert_eq!(alert.value().attr("data-alert-type"), Some(want));
    }
}
