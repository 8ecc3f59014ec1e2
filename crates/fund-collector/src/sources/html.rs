//! Structure matching over parsed HTML.
//!
//! Pure functions over `scraper` documents: locate the table, form or pager
//! a source renders, and pull text out of it. A miss is `None` or empty,
//! never an error.

use scraper::{ElementRef, Html, Selector};

/// Parse a selector known at compile time.
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// Text content of `el`: each text node trimmed, empty nodes dropped,
/// the rest joined with `sep`.
pub fn element_text(el: &ElementRef<'_>, sep: &str) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

/// First descendant of `el` matching `css`.
pub fn select_first<'a>(el: &ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    el.select(&selector(css)).next()
}

/// Text of the first descendant matching `css`, or `""`.
pub fn select_text(el: &ElementRef<'_>, css: &str, sep: &str) -> String {
    select_first(el, css)
        .map(|found| element_text(&found, sep))
        .unwrap_or_default()
}

/// Whether `el` carries the class `class`.
pub fn has_class(el: &ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

/// First table whose `th` cells contain `required` and at least one of `any_of`.
///
/// Matching is substring containment on the trimmed header text.
pub fn find_table_by_headers<'a>(
    document: &'a Html,
    required: &str,
    any_of: &[&str],
) -> Option<ElementRef<'a>> {
    let table_sel = selector("table");
    let th_sel = selector("th");

    for table in document.select(&table_sel) {
        let headers: Vec<String> = table
            .select(&th_sel)
            .map(|th| element_text(&th, " "))
            .collect();
        let has_required = headers.iter().any(|h| h.contains(required));
        let has_any = headers
            .iter()
            .any(|h| any_of.iter().any(|label| h.contains(label)));
        if has_required && has_any {
            return Some(table);
        }
    }
    None
}

/// Cell texts of every `tbody tr` under `scope`, whitespace collapsed.
pub fn body_rows(scope: &ElementRef<'_>) -> Vec<Vec<String>> {
    let row_sel = selector("tbody tr");
    let td_sel = selector("td");

    let mut rows = Vec::new();
    for tr in scope.select(&row_sel) {
        let cells: Vec<String> = tr
            .select(&td_sel)
            .map(|td| crate::normalize::clean_spaces(&element_text(&td, " ")))
            .collect();
        rows.push(cells);
    }
    rows
}

/// Current values of every named `input` inside `form#<form_id>`.
///
/// Order follows the document; a repeated name keeps its first position and
/// its last value. Missing form yields an empty list.
pub fn form_defaults(document: &Html, form_id: &str) -> Vec<(String, String)> {
    let form_sel = selector("form");
    let input_sel = selector("input");

    let Some(form) = document
        .select(&form_sel)
        .find(|f| f.value().id() == Some(form_id))
    else {
        return Vec::new();
    };

    let mut payload: Vec<(String, String)> = Vec::new();
    for input in form.select(&input_sel) {
        let Some(name) = input.value().attr("name").filter(|n| !n.is_empty()) else {
            continue;
        };
        let value = input.value().attr("value").unwrap_or("").to_string();
        set_param(&mut payload, name, value);
    }
    payload
}

/// Insert or overwrite a parameter, keeping first-seen order.
pub fn set_param(params: &mut Vec<(String, String)>, name: &str, value: String) {
    match params.iter_mut().find(|(k, _)| k == name) {
        Some(slot) => slot.1 = value,
        None => params.push((name.to_string(), value)),
    }
}

/// Highest page number in the pagination widget (`.paging` or `.pagination`).
///
/// Only anchors whose text is all digits count. Defaults to 1.
pub fn max_page(document: &Html) -> u32 {
    let pager = document
        .select(&selector(".paging"))
        .next()
        .or_else(|| document.select(&selector(".pagination")).next());

    let Some(pager) = pager else {
        return 1;
    };

    pager
        .select(&selector("a"))
        .map(|a| element_text(&a, ""))
        .filter(|t| !t.is_empty() && t.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|t| t.parse::<u32>().ok())
        .max()
        .unwrap_or(1)
}
