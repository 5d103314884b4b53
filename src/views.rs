//! Server-rendered page for the forecast form.

use crate::models::forecast::{ForecastForm, ForecastResult, ALLOWED_ITEMS, ALLOWED_STORES};

/// Everything the index page can show.
#[derive(Debug, Default)]
pub struct IndexView<'a> {
    pub form: Option<&'a ForecastForm>,
    pub result: Option<&'a ForecastResult>,
    pub error_message: Option<String>,
}

const STYLE: &str = "body{font-family:sans-serif;margin:2rem auto;max-width:44rem}\
label{display:block;margin-top:.75rem}\
.error{color:#a40000;border:1px solid #a40000;padding:.5rem;margin:1rem 0}\
table{border-collapse:collapse;margin-top:1rem}\
td,th{border:1px solid #ccc;padding:.25rem .75rem;text-align:right}";

/// Renders the full HTML document.
pub fn render_index(view: &IndexView<'_>) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Store Item Demand Forecast</title>\n");
    html.push_str(&format!("<style>{}</style>\n", STYLE));
    html.push_str("</head>\n<body>\n<h1>15-Day Sales Forecast</h1>\n");

    if let Some(message) = &view.error_message {
        html.push_str(&format!(
            "<div class=\"error\" role=\"alert\">{}</div>\n",
            escape_html(message)
        ));
    }

    render_form(&mut html, view.form);

    if let Some(result) = view.result {
        render_table(&mut html, result);
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_form(html: &mut String, form: Option<&ForecastForm>) {
    let field = |value: Option<&Option<String>>| {
        value
            .and_then(|v| v.as_deref())
            .map(escape_html)
            .unwrap_or_default()
    };
    let store = field(form.map(|f| &f.store_id));
    let item = field(form.map(|f| &f.item_id));
    let date = field(form.map(|f| &f.date));

    html.push_str("<form method=\"post\" action=\"/\">\n");
    html.push_str(&format!(
        "<label>Store ID <input name=\"store_id\" list=\"stores\" value=\"{}\" required></label>\n",
        store
    ));
    render_datalist(html, "stores", &ALLOWED_STORES);
    html.push_str(&format!(
        "<label>Item ID <input name=\"item_id\" list=\"items\" value=\"{}\" required></label>\n",
        item
    ));
    render_datalist(html, "items", &ALLOWED_ITEMS);
    html.push_str(&format!(
        "<label>Start date <input type=\"date\" name=\"date\" value=\"{}\" required></label>\n",
        date
    ));
    html.push_str("<button type=\"submit\">Forecast</button>\n</form>\n");

    html.push_str(&format!(
        "<p class=\"hint\">Valid stores: {}. Valid items: {}.</p>\n",
        join(&ALLOWED_STORES),
        join(&ALLOWED_ITEMS)
    ));
}

fn render_datalist(html: &mut String, id: &str, values: &[i64]) {
    html.push_str(&format!("<datalist id=\"{}\">", id));
    for value in values {
        html.push_str(&format!("<option value=\"{}\">", value));
    }
    html.push_str("</datalist>\n");
}

fn render_table(html: &mut String, result: &ForecastResult) {
    html.push_str(&format!(
        "<h2>Store {} / Item {} from {}</h2>\n",
        result.store_id,
        result.item_id,
        escape_html(&result.start_date)
    ));
    html.push_str("<table>\n<thead><tr><th>Date</th><th>Predicted Sales</th></tr></thead>\n<tbody>\n");
    for point in &result.points {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{:.2}</td></tr>\n",
            escape_html(&point.date),
            point.predicted_sales
        ));
    }
    html.push_str("</tbody>\n</table>\n");
}

fn join(values: &[i64]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Minimal HTML escaping for text and attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::forecast::ForecastPoint;

    #[test]
    fn empty_page_has_form_and_allow_lists() {
        let html = render_index(&IndexView::default());
        assert!(html.contains("<form method=\"post\""));
        assert!(html.contains("Valid stores: 1, 2, 3, 4, 5, 6, 7, 8, 9, 10."));
        assert!(html.contains("Valid items: 15, 28, 13, 18, 25, 45, 38, 22, 36, 8."));
        assert!(html.contains("<datalist id=\"stores\"><option value=\"1\">"));
        assert_eq!(html.matches("<option value=").count(), 20);
        assert!(!html.contains("<table>"));
        assert!(!html.contains("class=\"error\""));
    }

    #[test]
    fn submitted_values_are_escaped() {
        let form = ForecastForm {
            store_id: Some("\"><script>".into()),
            item_id: None,
            date: None,
        };
        let html = render_index(&IndexView {
            form: Some(&form),
            result: None,
            error_message: Some("bad <input>".into()),
        });
        assert!(html.contains("value=\"&quot;&gt;&lt;script&gt;\""));
        assert!(html.contains("bad &lt;input&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn table_has_one_row_per_point() {
        let result = ForecastResult {
            store_id: 1,
            item_id: 15,
            start_date: "2024-01-01".into(),
            points: vec![
                ForecastPoint {
                    date: "2024-01-01".into(),
                    predicted_sales: 12.5,
                },
                ForecastPoint {
                    date: "2024-01-02".into(),
                    predicted_sales: 13.0,
                },
            ],
        };
        let html = render_index(&IndexView {
            form: None,
            result: Some(&result),
            error_message: None,
        });
        assert_eq!(html.matches("<tr><td>").count(), 2);
        assert!(html.contains("<tr><td>2024-01-01</td><td>12.50</td></tr>"));
    }
}
