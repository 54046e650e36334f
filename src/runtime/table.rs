//! runtime::table
//!
//! Parser for the runtime CLI's column-aligned table output.
//!
//! # Format
//!
//! The runtime pads columns with two or more spaces:
//!
//! ```text
//! ID      IMAGE                   STATE    ADDR
//! web     nginx:latest            running  192.168.64.3
//! db      postgres:16             stopped
//! ```
//!
//! Headers become lower-cased keys; each body line becomes one row map.
//! Rows may have fewer cells than there are headers (trailing columns are
//! simply absent). Output with at most one line parses to no rows.

use std::collections::BTreeMap;

/// A parsed table row: lower-cased header -> cell value.
pub type Row = BTreeMap<String, String>;

/// Parse table output into rows.
pub fn parse(output: &str) -> Vec<Row> {
    let mut lines = output.trim().lines();

    let headers: Vec<String> = match lines.next() {
        Some(header_line) => split_columns(header_line)
            .into_iter()
            .map(|h| h.to_ascii_lowercase())
            .collect(),
        None => return Vec::new(),
    };
    if headers.is_empty() {
        return Vec::new();
    }

    lines
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let values = split_columns(line);
            headers
                .iter()
                .zip(values)
                .map(|(h, v)| (h.clone(), v))
                .collect()
        })
        .collect()
}

/// Split a table line on runs of two or more spaces.
fn split_columns(line: &str) -> Vec<String> {
    let mut columns = Vec::new();
    let mut current = String::new();
    let mut space_run = 0usize;

    for ch in line.trim().chars() {
        if ch == ' ' {
            space_run += 1;
            if space_run < 2 {
                current.push(ch);
            }
            continue;
        }
        if space_run >= 2 && !current.is_empty() {
            columns.push(current.trim().to_string());
            current.clear();
        }
        space_run = 0;
        current.push(ch);
    }
    if !current.trim().is_empty() {
        columns.push(current.trim().to_string());
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_basic_table() {
        let output = "\
ID      IMAGE           STATE    ADDR
web     nginx:latest    running  192.168.64.3
db      postgres:16     stopped  192.168.64.4
";
        let rows = parse(output);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], "web");
        assert_eq!(rows[0]["image"], "nginx:latest");
        assert_eq!(rows[1]["state"], "stopped");
    }

    #[test]
    fn headers_are_lowercased() {
        let rows = parse("NAME  TAG\nalpine  latest\n");
        assert_eq!(rows[0]["name"], "alpine");
        assert_eq!(rows[0]["tag"], "latest");
    }

    #[test]
    fn short_rows_omit_trailing_columns() {
        let output = "ID  IMAGE  ADDR\ndb  postgres:16\n";
        let rows = parse(output);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("addr"), None);
        assert_eq!(rows[0]["image"], "postgres:16");
    }

    #[test]
    fn single_space_stays_in_cell() {
        let rows = parse("NAME  CREATED\nweb  2 hours ago\n");
        assert_eq!(rows[0]["created"], "2 hours ago");
    }

    #[test]
    fn empty_and_header_only_yield_no_rows() {
        assert!(parse("").is_empty());
        assert!(parse("   \n").is_empty());
        assert!(parse("ID  IMAGE\n").is_empty());
    }

    #[test]
    fn blank_body_lines_are_skipped() {
        let rows = parse("ID  IMAGE\n\nweb  nginx\n\n");
        assert_eq!(rows.len(), 1);
    }
}
