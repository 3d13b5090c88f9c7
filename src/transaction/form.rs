//! The transaction form shared by the create and edit pages, and the parsing
//! of its raw input.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    html::{
        FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE,
    },
    transaction::core::{NewTransaction, TransactionType},
};

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// The raw form data for creating or editing a transaction.
///
/// Every field is kept as text so that bad input can be reported with the
/// value the user typed.
///
/// Missing fields are read as empty so that [TransactionForm::parse] reports them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionForm {
    #[serde(rename = "type")]
    pub type_: String,
    pub amount: String,
    pub vat: String,
    pub description: Option<String>,
    pub date: String,
}

impl TransactionForm {
    /// Validate the form and convert it into a [NewTransaction].
    ///
    /// # Errors
    /// Returns the first problem found:
    /// - [Error::InvalidTransactionType] unless the type is "income" or "expense",
    /// - [Error::InvalidAmount] or [Error::InvalidVat] unless the number is finite,
    /// - [Error::InvalidDate] unless the date is formatted as YYYY-MM-DD.
    pub fn parse(&self) -> Result<NewTransaction, Error> {
        let type_ = self.type_.parse::<TransactionType>()?;
        let amount =
            parse_number(&self.amount).ok_or_else(|| Error::InvalidAmount(self.amount.clone()))?;
        let vat = parse_number(&self.vat).ok_or_else(|| Error::InvalidVat(self.vat.clone()))?;
        let date = Date::parse(self.date.trim(), DATE_FORMAT)
            .map_err(|_| Error::InvalidDate(self.date.clone()))?;

        Ok(NewTransaction {
            type_,
            amount,
            vat,
            description: self.description.clone().unwrap_or_default(),
            date,
        })
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

/// The values the form fields start with.
pub struct TransactionFormDefaults<'a> {
    pub transaction_type: TransactionType,
    pub amount: Option<f64>,
    pub vat: Option<f64>,
    pub date: Date,
    pub description: Option<&'a str>,
}

pub fn transaction_form_fields(defaults: &TransactionFormDefaults<'_>) -> Markup {
    let is_expense = matches!(defaults.transaction_type, TransactionType::Expense);
    let amount = defaults.amount.map(|amount| amount.to_string());
    let vat = defaults.vat.map(|vat| vat.to_string());

    html! {
        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { "Transaction type" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                div class="flex items-center gap-3"
                {
                    input
                        name="type"
                        id="transaction-type-expense"
                        type="radio"
                        value=(TransactionType::Expense)
                        checked[is_expense]
                        required
                        tabindex="0"
                        class=(FORM_RADIO_INPUT_STYLE);

                    label
                        for="transaction-type-expense"
                        class=(FORM_RADIO_LABEL_STYLE)
                    {
                        "Expense"
                    }
                }

                div class="flex items-center gap-3"
                {
                    input
                        name="type"
                        id="transaction-type-income"
                        type="radio"
                        value=(TransactionType::Income)
                        checked[!is_expense]
                        required
                        tabindex="0"
                        class=(FORM_RADIO_INPUT_STYLE);

                    label
                        for="transaction-type-income"
                        class=(FORM_RADIO_LABEL_STYLE)
                    {
                        "Income"
                    }
                }
            }
        }

        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

            input
                name="amount"
                id="amount"
                type="number"
                step="0.01"
                placeholder="0.00"
                required
                value=[amount.as_deref()]
                autofocus
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="vat" class=(FORM_LABEL_STYLE) { "VAT" }

            input
                name="vat"
                id="vat"
                type="number"
                step="0.01"
                placeholder="0.00"
                required
                value=[vat.as_deref()]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="date" class=(FORM_LABEL_STYLE) { "Date" }

            input
                name="date"
                id="date"
                type="date"
                value=(defaults.date)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="description" class=(FORM_LABEL_STYLE) { "Description" }

            input
                name="description"
                id="description"
                type="text"
                placeholder="Description"
                value=[defaults.description]
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}
