//! The reports page.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    category::get_categories,
    endpoints,
    html::{
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, TABLE_STYLE, format_currency, page,
    },
    report::aggregation::{CategoryExpenses, MonthlySummary, Report, Totals, build_report},
    transaction::get_transactions,
};

/// The state needed for the reports page.
#[derive(Debug, Clone)]
pub struct ReportState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn amount_color_class(amount: f64) -> &'static str {
    if amount < 0.0 {
        "amount amount-expense"
    } else {
        "amount amount-income"
    }
}

/// The income, expense and net cards. Also used on the home page.
pub fn totals_cards(totals: &Totals) -> Markup {
    let net = totals.net();

    html! {
        div class="summary-cards"
        {
            div class="summary-card"
            {
                h3 { "Income" }
                p class="amount amount-income" { (format_currency(totals.income)) }
            }
            div class="summary-card"
            {
                h3 { "Expenses" }
                p class="amount amount-expense" { (format_currency(totals.expenses)) }
            }
            div class="summary-card"
            {
                h3 { "Net" }
                p class=(amount_color_class(net)) { (format_currency(net)) }
            }
        }
    }
}

fn category_table(expenses: &[CategoryExpenses]) -> Markup {
    html! {
        section
        {
            h2 { "Expenses by Category" }

            @if expenses.is_empty() {
                p class="empty-state" { "No expenses recorded yet." }
            } @else {
                table class=(TABLE_STYLE) id="category-expenses"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Total" }
                        }
                    }
                    tbody
                    {
                        @for row in expenses {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) { (row.name) }
                                td class=(TABLE_CELL_STYLE) { (format_currency(row.total)) }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn monthly_table(months: &[MonthlySummary]) -> Markup {
    html! {
        section
        {
            h2 { "Monthly Summary" }

            @if months.is_empty() {
                p class="empty-state" { "No transactions recorded yet." }
            } @else {
                table class=(TABLE_STYLE) id="monthly-summary"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Month" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Income" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Expenses" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Net" }
                        }
                    }
                    tbody
                    {
                        @for month in months {
                            @let net = month.totals.net();

                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) { (month.label()) }
                                td class=(TABLE_CELL_STYLE) { (format_currency(month.totals.income)) }
                                td class=(TABLE_CELL_STYLE) { (format_currency(month.totals.expenses)) }
                                td class={ (TABLE_CELL_STYLE) " " (amount_color_class(net)) }
                                {
                                    (format_currency(net))
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn reports_view(report: &Report) -> Markup {
    let content = html! {
        (totals_cards(&report.totals))
        (category_table(&report.expenses_by_category))
        (monthly_table(&report.monthly))
    };

    page("Reports", endpoints::REPORTS_VIEW, None, &content)
}

/// Display the totals, expenses per category and monthly breakdown for the user.
pub async fn get_reports_page(
    State(state): State<ReportState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions(user_id, &connection)?;
    let categories = get_categories(user_id, &connection)?;
    let report = build_report(&transactions, &categories);

    Ok(reports_view(&report).into_response())
}
