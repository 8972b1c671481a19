//! Read-only summaries of a user's income and expenses.

mod aggregation;
mod page;

pub use aggregation::build_report;
pub use page::{get_reports_page, totals_cards};
