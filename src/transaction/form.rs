//! The form shared by the add and edit transaction pages.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::{Date, macros::format_description};

use crate::{
    CategoryId, Error,
    category::Category,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, field_error,
        page,
    },
    transaction::{Transaction, TransactionBuilder, TransactionType},
    validation::{REQUIRED_FIELD_MSG, required},
};

pub const INVALID_AMOUNT_MSG: &str = "Invalid amount, enter a number greater than zero.";
pub const INVALID_DATE_MSG: &str = "Enter a date in the format YYYY-MM-DD.";
pub const INVALID_TRANSACTION_TYPE_MSG: &str = "Choose either expense or income.";
pub const INVALID_CATEGORY_MSG: &str = "Choose categories from the list.";

/// The raw data entered by the user in the transaction form.
///
/// Every field is kept as text so that invalid input can be shown back to the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionForm {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub transaction_type: String,
    #[serde(default)]
    pub date: String,
    /// The selected category IDs. The field is repeated once per selected option.
    #[serde(default)]
    pub categories: Vec<String>,
}

/// The error message for each form field, if any.
#[derive(Debug, Default, PartialEq)]
pub struct TransactionFormErrors {
    pub description: Option<&'static str>,
    pub amount: Option<&'static str>,
    pub transaction_type: Option<&'static str>,
    pub date: Option<&'static str>,
    pub categories: Option<&'static str>,
}

impl TransactionFormErrors {
    fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.amount.is_none()
            && self.transaction_type.is_none()
            && self.date.is_none()
            && self.categories.is_none()
    }

    /// Map a validation error from the database layer to the offending field.
    ///
    /// Errors that are not caused by user input are returned unchanged.
    pub fn from_error(error: Error) -> Result<Self, Error> {
        let mut errors = Self::default();

        match error {
            Error::InvalidAmount(_) => errors.amount = Some(INVALID_AMOUNT_MSG),
            Error::EmptyDescription => errors.description = Some(REQUIRED_FIELD_MSG),
            Error::InvalidTransactionType(_) => {
                errors.transaction_type = Some(INVALID_TRANSACTION_TYPE_MSG)
            }
            Error::InvalidCategory(_) => errors.categories = Some(INVALID_CATEGORY_MSG),
            error => return Err(error),
        }

        Ok(errors)
    }
}

impl TransactionForm {
    /// An empty expense form dated `date`.
    pub fn new(date: Date) -> Self {
        Self {
            transaction_type: TransactionType::Expense.to_string(),
            date: date.to_string(),
            ..Default::default()
        }
    }

    /// A form filled in with the values of an existing transaction.
    pub fn from_transaction(transaction: &Transaction) -> Self {
        Self {
            description: transaction.description.clone(),
            amount: format!("{:.2}", transaction.amount),
            transaction_type: transaction.transaction_type.to_string(),
            date: transaction.date.to_string(),
            categories: transaction
                .category_ids
                .iter()
                .map(|id| id.to_string())
                .collect(),
        }
    }

    /// Check every field and collect a message for each invalid one.
    ///
    /// Whether the categories belong to the user is checked when the transaction is saved.
    pub fn validate(&self) -> Result<TransactionBuilder, TransactionFormErrors> {
        let mut errors = TransactionFormErrors::default();

        let description = required(&self.description)
            .map_err(|error| errors.description = Some(error))
            .ok();

        let amount = required(&self.amount)
            .and_then(|amount| {
                amount
                    .parse::<f64>()
                    .ok()
                    .filter(|amount| amount.is_finite() && *amount > 0.0)
                    .ok_or(INVALID_AMOUNT_MSG)
            })
            .map_err(|error| errors.amount = Some(error))
            .ok();

        let transaction_type = required(&self.transaction_type)
            .and_then(|transaction_type| {
                transaction_type
                    .parse::<TransactionType>()
                    .map_err(|_| INVALID_TRANSACTION_TYPE_MSG)
            })
            .map_err(|error| errors.transaction_type = Some(error))
            .ok();

        let date = required(&self.date)
            .and_then(|date| {
                Date::parse(date, format_description!("[year]-[month]-[day]"))
                    .map_err(|_| INVALID_DATE_MSG)
            })
            .map_err(|error| errors.date = Some(error))
            .ok();

        let category_ids = self
            .categories
            .iter()
            .filter(|id| !id.trim().is_empty())
            .map(|id| id.trim().parse::<CategoryId>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| errors.categories = Some(INVALID_CATEGORY_MSG))
            .ok();

        match (description, amount, transaction_type, date, category_ids) {
            (
                Some(description),
                Some(amount),
                Some(transaction_type),
                Some(date),
                Some(category_ids),
            ) if errors.is_empty() => Ok(Transaction::build(amount, date, description)
                .transaction_type(transaction_type)
                .category_ids(category_ids)),
            _ => Err(errors),
        }
    }
}

fn is_selected(form: &TransactionForm, category_id: CategoryId) -> bool {
    form.categories
        .iter()
        .any(|selected| selected.trim().parse::<CategoryId>() == Ok(category_id))
}

fn transaction_form_fields(
    form: &TransactionForm,
    errors: &TransactionFormErrors,
    available_categories: &[Category],
) -> Markup {
    html! {
        div
        {
            label for="description" class=(FORM_LABEL_STYLE) { "Description" }

            input
                name="description"
                id="description"
                type="text"
                placeholder="e.g. Buy Milk"
                value=(form.description)
                required
                autofocus
                class=(FORM_TEXT_INPUT_STYLE);

            (field_error(errors.description))
        }

        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

            input
                name="amount"
                id="amount"
                type="number"
                step="0.01"
                min="0.01"
                placeholder="0.00"
                value=(form.amount)
                required
                class=(FORM_TEXT_INPUT_STYLE);

            (field_error(errors.amount))
        }

        fieldset
        {
            legend class=(FORM_LABEL_STYLE) { "Transaction type" }

            @for transaction_type in [TransactionType::Expense, TransactionType::Income] {
                @let id = format!("transaction-type-{transaction_type}");

                div class="radio-option"
                {
                    input
                        name="transaction_type"
                        id=(id)
                        type="radio"
                        value=(transaction_type)
                        checked[form.transaction_type == transaction_type.as_str()]
                        required;

                    label for=(id) { (transaction_type.label()) }
                }
            }

            (field_error(errors.transaction_type))
        }

        div
        {
            label for="date" class=(FORM_LABEL_STYLE) { "Date" }

            input
                name="date"
                id="date"
                type="date"
                value=(form.date)
                required
                class=(FORM_TEXT_INPUT_STYLE);

            (field_error(errors.date))
        }

        div
        {
            label for="categories" class=(FORM_LABEL_STYLE) { "Categories" }

            @if available_categories.is_empty() {
                p class="form-hint"
                {
                    "You have no categories yet. "
                    a href=(endpoints::CATEGORIES_VIEW) class=(LINK_STYLE) { "Add a category" }
                }
            } @else {
                select
                    name="categories"
                    id="categories"
                    multiple
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for category in available_categories {
                        option value=(category.id) selected[is_selected(form, category.id)] {
                            (category.name)
                        }
                    }
                }
            }

            (field_error(errors.categories))
        }
    }
}

/// The full page for the add and edit transaction forms.
///
/// `active_endpoint` is the navigation link to highlight.
pub fn transaction_form_view(
    title: &str,
    active_endpoint: &str,
    action: &str,
    submit_label: &str,
    form: &TransactionForm,
    errors: &TransactionFormErrors,
    available_categories: &[Category],
) -> Markup {
    let content = html! {
        form method="post" action=(action) class="form"
        {
            (transaction_form_fields(form, errors, available_categories))

            button type="submit" name="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_label) }

            a href=(endpoints::ROOT) class=(LINK_STYLE) { "Cancel" }
        }
    };

    page(title, active_endpoint, None, &content)
}
