//! Shared page layout, styles and small view helpers.

use std::sync::OnceLock;

use maud::{DOCTYPE, Markup, html};
use numfmt::{Formatter, Precision};

use crate::{alert::Alert, endpoints, navigation::NavBar};

// The class names below are defined in static/main.css.

pub const LINK_STYLE: &str = "link";

pub const BUTTON_PRIMARY_STYLE: &str = "button button-primary";
pub const BUTTON_DELETE_STYLE: &str = "button button-delete";

pub const FORM_CONTAINER_STYLE: &str = "form-container";
pub const FORM_LABEL_STYLE: &str = "form-label";
pub const FORM_TEXT_INPUT_STYLE: &str = "form-input";
pub const FORM_ERROR_STYLE: &str = "form-error";

pub const TABLE_STYLE: &str = "table";
pub const TABLE_HEADER_STYLE: &str = "table-header";
pub const TABLE_ROW_STYLE: &str = "table-row";
pub const TABLE_CELL_STYLE: &str = "table-cell";

pub const CATEGORY_BADGE_STYLE: &str = "badge";

pub const PAGE_CONTAINER_STYLE: &str = "page";

/// The HTML document shared by every page: the stylesheet, `content` and the footer.
pub fn base(title: &str, content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Pocket Ledger" }
                link href="/static/main.css" rel="stylesheet";
            }

            body
            {
                (content)

                footer class="footer"
                {
                    p { "Pocket Ledger. Keep track of where your money goes." }
                }
            }
        }
    }
}

/// A page for a logged-in user with the navigation bar, an optional flash
/// message and `content` under an `h1` of `title`.
pub fn page(title: &str, active_endpoint: &str, flash: Option<&Alert>, content: &Markup) -> Markup {
    let content = html! {
        (NavBar::new(active_endpoint).into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            @if let Some(alert) = flash {
                (alert.into_html())
            }

            h1 { (title) }

            (content)
        }
    };

    base(title, &content)
}

pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    let content = html!(
        main class="error-page"
        {
            h1 class="error-code" { (header) }
            p class="error-description" { (description) }
            p { (fix) }
            a href=(endpoints::ROOT) class=(BUTTON_PRIMARY_STYLE) { "Back to Homepage" }
        }
    );

    base(title, &content)
}

/// The centred card used by the log-in and registration pages.
pub fn log_in_register(form_title: &str, flash: Option<&Alert>, form: &Markup) -> Markup {
    html! {
        main class=(FORM_CONTAINER_STYLE)
        {
            a href=(endpoints::ROOT) class="brand" { "Pocket Ledger" }

            div class="card"
            {
                h1 { (form_title) }

                @if let Some(alert) = flash {
                    (alert.into_html())
                }

                (form)
            }
        }
    }
}

/// The inline message shown under a form field that failed validation.
pub fn field_error(error_message: Option<&str>) -> Markup {
    html! {
        @if let Some(error_message) = error_message {
            p class=(FORM_ERROR_STYLE) { (error_message) }
        }
    }
}

/// A required password field. Password values are never sent back to the client.
pub fn password_input(
    id: &str,
    label: &str,
    min_length: usize,
    error_message: Option<&str>,
) -> Markup {
    html! {
        div
        {
            label for=(id) class=(FORM_LABEL_STYLE) { (label) }

            input
                type="password"
                name=(id)
                id=(id)
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(min_length);

            (field_error(error_message))
        }
    }
}

/// Format `number` as dollars and cents, e.g. "$12.30" or "-$5.25".
pub fn format_currency(number: f64) -> String {
    fn get_formatter(
        cell: &'static OnceLock<Option<Formatter>>,
        prefix: &str,
    ) -> Option<&'static Formatter> {
        cell.get_or_init(|| match Formatter::currency(prefix) {
            Ok(formatter) => Some(formatter.precision(Precision::Decimals(2))),
            Err(error) => {
                tracing::error!("could not create currency formatter: {error:?}");
                None
            }
        })
        .as_ref()
    }

    static POSITIVE_FMT: OnceLock<Option<Formatter>> = OnceLock::new();
    static NEGATIVE_FMT: OnceLock<Option<Formatter>> = OnceLock::new();

    let formatted = if number < 0.0 {
        get_formatter(&NEGATIVE_FMT, "-$").map(|fmt| fmt.fmt_string(number.abs()))
    } else if number > 0.0 {
        get_formatter(&POSITIVE_FMT, "$").map(|fmt| fmt.fmt_string(number))
    } else {
        // numfmt renders zero as "0".
        return "$0.00".to_owned();
    };

    let Some(mut formatted_string) = formatted else {
        return if number < 0.0 {
            format!("-${:.2}", number.abs())
        } else {
            format!("${number:.2}")
        };
    };

    // numfmt drops trailing zeros, e.g. "12.30" comes out as "12.3".
    match formatted_string.rfind('.') {
        Some(point) => {
            let decimals = formatted_string.len() - point - 1;
            for _ in decimals..2 {
                formatted_string.push('0');
            }
        }
        None => formatted_string.push_str(".00"),
    }

    formatted_string
}

/// A link styled for use in a paragraph.
pub fn link(url: &str, text: &str) -> Markup {
    html! (
        a href=(url) class=(LINK_STYLE) { (text) }
    )
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::alert::Alert;

    use super::{base, format_currency, page};

    #[test]
    fn format_currency_pads_cents() {
        assert_eq!(format_currency(12.3), "$12.30");
        assert_eq!(format_currency(1.82), "$1.82");
        assert_eq!(format_currency(5.0), "$5.00");
    }

    #[test]
    fn format_currency_zero() {
        assert_eq!(format_currency(0.0), "$0.00");
    }

    #[test]
    fn format_currency_negative() {
        assert_eq!(format_currency(-5.25), "-$5.25");
    }

    #[test]
    fn base_links_stylesheet_and_has_footer() {
        let markup = base("Test", &maud::html! { p { "hello" } }).into_string();
        let document = Html::parse_document(&markup);

        let stylesheet = Selector::parse("head link[rel=stylesheet][href$='.css']").unwrap();
        assert_eq!(document.select(&stylesheet).count(), 1);

        let footer = Selector::parse("body > footer").unwrap();
        assert_eq!(document.select(&footer).count(), 1);
    }

    #[test]
    fn page_shows_flash_and_title() {
        let alert = Alert::success("Saved.");
        let markup = page("Reports", "/reports", Some(&alert), &maud::html! {}).into_string();
        let document = Html::parse_document(&markup);

        let heading = Selector::parse("main h1").unwrap();
        let heading = document.select(&heading).next().unwrap();
        assert_eq!(heading.text().collect::<String>(), "Reports");

        let alert = Selector::parse("main div.alert-success").unwrap();
        assert_eq!(document.select(&alert).count(), 1);

        let nav = Selector::parse("nav").unwrap();
        assert_eq!(document.select(&nav).count(), 1);
    }
}
