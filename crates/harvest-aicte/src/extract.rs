//! Index and detail body parsing

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use harvest_store::Record;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::normalize::{normalize, normalize_text};

/// Value the source puts in place of a missing university.
const PLACEHOLDER: &str = "none";

static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tbody > tr").expect("invalid selector"));
static CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("invalid selector"));

/// Parsed index body
#[derive(Debug, Default)]
pub struct IndexParse {
    pub records: BTreeMap<String, Record>,
    /// Rows dropped for lacking an id
    pub skipped: usize,
}

/// Parse an index body: a JSON array of rows `[id, name, address, district, type, ...]`.
///
/// Every text field goes through the normalizer. A body that is not a JSON
/// array is an error.
pub fn parse_index(body: &[u8]) -> Result<IndexParse> {
    let value: Value = serde_json::from_slice(body).context("index body is not valid JSON")?;
    let Value::Array(rows) = value else {
        bail!("index body is not a JSON array");
    };

    let mut parsed = IndexParse::default();
    for row in &rows {
        let Some(id) = row_id(row) else {
            parsed.skipped += 1;
            continue;
        };
        let field = |i: usize| normalize(row.get(i).and_then(Value::as_str));
        let record = Record {
            name: field(1),
            address: field(2),
            district: field(3),
            institution_type: field(4),
            universities: None,
        };
        parsed.records.insert(id, record);
    }
    Ok(parsed)
}

/// Position 0, as a string. Numeric ids are accepted.
fn row_id(row: &Value) -> Option<String> {
    match row.get(0)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// University names from a detail page: second cell of each body row, cleaned.
pub fn parse_universities(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let raw = document.select(&ROW_SELECTOR).filter_map(|row| {
        row.select(&CELL_SELECTOR)
            .nth(1)
            .map(|cell| cell.text().collect::<String>())
    });
    clean_related(raw)
}

/// Normalize, then drop blanks and the placeholder, keeping first-seen order.
pub fn clean_related<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(|name| normalize_text(name.as_ref()))
        .filter(|name| !name.is_empty() && !name.eq_ignore_ascii_case(PLACEHOLDER))
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail_page(cells: &[&[&str]]) -> String {
        let rows: String = cells
            .iter()
            .map(|row| {
                let tds: String = row.iter().map(|c| format!("<td>{c}</td>")).collect();
                format!("<tr>{tds}</tr>")
            })
            .collect();
        format!(
            "<html><body><table><thead><tr><th>Course</th><th>University</th></tr></thead>\
             <tbody>{rows}</tbody></table></body></html>"
        )
    }

    #[test]
    fn index_rows_normalized() {
        let body = br#"[
            ["1-100", "GOVT. POLYTECHNIC,MADURAI", "NEAR BUS STAND", "MADURAI", "GOVERNMENT"],
            [2001, "st. xavier college", null, "Panaji", "Private-Self Financing", "extra"]
        ]"#;
        let parsed = parse_index(body).unwrap();
        assert_eq!(parsed.skipped, 0);
        assert_eq!(parsed.records.len(), 2);

        let first = &parsed.records["1-100"];
        assert_eq!(first.name.as_deref(), Some("Govt. Polytechnic, Madurai"));
        assert_eq!(first.address.as_deref(), Some("Near Bus Stand"));
        assert_eq!(first.district.as_deref(), Some("Madurai"));
        assert_eq!(first.institution_type.as_deref(), Some("Government"));
        assert_eq!(first.universities, None);

        let second = &parsed.records["2001"];
        assert_eq!(second.name.as_deref(), Some("St. Xavier College"));
        assert_eq!(second.address, None);
        assert_eq!(second.institution_type.as_deref(), Some("Private-Self Financing"));
    }

    #[test]
    fn short_rows_leave_fields_empty() {
        let parsed = parse_index(br#"[["7", "ONLY NAME"]]"#).unwrap();
        let rec = &parsed.records["7"];
        assert_eq!(rec.name.as_deref(), Some("Only Name"));
        assert_eq!(rec.district, None);
    }

    #[test]
    fn rows_without_id_skipped() {
        let parsed = parse_index(br#"[[null, "X"], [], ["", "Y"], "junk", ["3", "Z"]]"#).unwrap();
        assert_eq!(parsed.skipped, 4);
        assert_eq!(parsed.records.keys().collect::<Vec<_>>(), vec!["3"]);
    }

    #[test]
    fn empty_index() {
        let parsed = parse_index(b"[]").unwrap();
        assert!(parsed.records.is_empty());
    }

    #[test]
    fn non_array_index_rejected() {
        assert!(parse_index(br#"{"error": "busy"}"#).is_err());
        assert!(parse_index(b"<html>503</html>").is_err());
        assert!(parse_index(b"").is_err());
    }

    #[test]
    fn universities_from_second_cell() {
        let html = detail_page(&[
            &["B.E.", "ANNA UNIVERSITY, CHENNAI"],
            &["M.E.", "anna university, chennai"],
            &["MBA", "MADRAS UNIVERSITY"],
        ]);
        assert_eq!(
            parse_universities(&html),
            vec!["Anna University, Chennai", "Madras University"]
        );
    }

    #[test]
    fn placeholder_yields_empty_list() {
        let html = detail_page(&[&["DIPLOMA", "NONE"], &["DIPLOMA", "None"]]);
        assert!(parse_universities(&html).is_empty());
    }

    #[test]
    fn short_rows_and_header_ignored() {
        let html = detail_page(&[&["lonely"], &["B.Tech", "JNTU"], &["x", "  "]]);
        assert_eq!(parse_universities(&html), vec!["Jntu"]);
    }

    #[test]
    fn page_without_table() {
        assert!(parse_universities("<html><body>No records</body></html>").is_empty());
        assert!(parse_universities("").is_empty());
    }

    #[test]
    fn clean_related_order_and_dedup() {
        let cleaned = clean_related(["B", "a", "none", "A", "", "b"]);
        assert_eq!(cleaned, vec!["B", "A"]);
    }
}
