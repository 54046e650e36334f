//! Property-based tests for the parsing and argv-building seams.
//!
//! These use proptest to check invariants over generated inputs: the
//! table parser never invents cells, signal parsing normalizes every
//! accepted spelling, and argument arrays keep a predictable shape.

use proptest::prelude::*;

use stowage::model::Signal;
use stowage::runtime::{table, ArgBuilder};

/// Strategy for a single table cell: printable, no double spaces, no
/// leading/trailing space.
fn cell() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-zA-Z0-9:._/-]{1,16}( [a-zA-Z0-9:._/-]{1,8})?").unwrap()
}

/// Strategy for a header cell (letters only, so lowercasing is total).
fn header() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Z]{1,10}").unwrap()
}

/// Render rows the way the runtime does: two-space column separation.
fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut out = headers.join("  ");
    out.push('\n');
    for row in rows {
        out.push_str(&row.join("  "));
        out.push('\n');
    }
    out
}

proptest! {
    /// Every rendered row comes back, and no row gains cells beyond its
    /// headers.
    #[test]
    fn table_parse_recovers_rendered_rows(
        headers in proptest::collection::vec(header(), 1..5),
        row_count in 0usize..6,
        seed_cells in proptest::collection::vec(cell(), 30),
    ) {
        // Unique headers; duplicate keys would collapse in the row map.
        let mut headers = headers;
        headers.sort();
        headers.dedup();

        let rows: Vec<Vec<String>> = (0..row_count)
            .map(|r| {
                (0..headers.len())
                    .map(|c| seed_cells[(r * headers.len() + c) % seed_cells.len()].clone())
                    .collect()
            })
            .collect();

        let parsed = table::parse(&render_table(&headers, &rows));

        prop_assert_eq!(parsed.len(), rows.len());
        for (parsed_row, row) in parsed.iter().zip(&rows) {
            prop_assert_eq!(parsed_row.len(), headers.len());
            for (header, cell) in headers.iter().zip(row) {
                prop_assert_eq!(&parsed_row[&header.to_ascii_lowercase()], cell);
            }
        }
    }

    /// Parsed keys are always lowercase, whatever the header casing.
    #[test]
    fn table_keys_are_lowercased(headers in proptest::collection::vec(header(), 1..4)) {
        let mut headers = headers;
        headers.sort();
        headers.dedup();

        let row: Vec<String> = headers.iter().map(|_| "x".to_string()).collect();
        let parsed = table::parse(&render_table(&headers, &[row]));

        for key in parsed[0].keys() {
            prop_assert_eq!(key.to_ascii_lowercase(), key.clone());
        }
    }

    /// Header-only output yields no rows regardless of header content.
    #[test]
    fn header_alone_yields_no_rows(headers in proptest::collection::vec(header(), 1..5)) {
        let parsed = table::parse(&render_table(&headers, &[]));
        prop_assert!(parsed.is_empty());
    }

    /// Any accepted signal spelling normalizes to a canonical SIG* name
    /// that re-parses to the same signal.
    #[test]
    fn signal_parse_is_idempotent(
        name in prop::sample::select(vec![
            "HUP", "INT", "QUIT", "ABRT", "KILL", "USR1", "USR2",
            "PIPE", "ALRM", "TERM", "CONT", "STOP", "WINCH",
        ]),
        prefixed in any::<bool>(),
        lowered in any::<bool>(),
    ) {
        let mut input = if prefixed {
            format!("SIG{}", name)
        } else {
            name.to_string()
        };
        if lowered {
            input = input.to_ascii_lowercase();
        }

        let signal = Signal::parse(&input).unwrap();
        prop_assert!(signal.name().starts_with("SIG"));
        prop_assert!(signal.name().ends_with(name));
        prop_assert_eq!(Signal::parse(signal.name()).unwrap(), signal);
    }

    /// Signal serde round-trips through the canonical name.
    #[test]
    fn signal_serde_roundtrip(number in prop::sample::select(vec![1u8, 2, 3, 6, 9, 10, 12, 13, 14, 15, 18, 19, 28])) {
        let signal = Signal::parse(&number.to_string()).unwrap();
        let json = serde_json::to_string(&signal).unwrap();
        let back: Signal = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, signal);
    }

    /// Positional arguments always appear after the base, in order.
    #[test]
    fn arg_builder_preserves_positional_order(
        positionals in proptest::collection::vec("[a-z0-9:.-]{1,12}", 0..8),
    ) {
        let argv = ArgBuilder::new(["images", "delete"])
            .args(positionals.iter().cloned())
            .build();

        prop_assert_eq!(&argv[..2], &["images".to_string(), "delete".to_string()][..]);
        prop_assert_eq!(&argv[2..], &positionals[..]);
    }

    /// opt_each emits exactly one flag per value, interleaved.
    #[test]
    fn arg_builder_repeats_option_per_value(
        values in proptest::collection::vec("[A-Z]=[a-z0-9]{1,8}", 0..6),
    ) {
        let argv = ArgBuilder::new(["run"])
            .opt_each("env", values.iter().cloned())
            .build();

        prop_assert_eq!(argv.len(), 1 + values.len() * 2);
        for (i, value) in values.iter().enumerate() {
            prop_assert_eq!(&argv[1 + i * 2], "--env");
            prop_assert_eq!(&argv[2 + i * 2], value);
        }
    }

    /// Disabled flags and absent options leave the argv untouched.
    #[test]
    fn arg_builder_omits_absent_parts(flag_name in "[a-z]{1,10}") {
        let argv = ArgBuilder::new(["list"])
            .flag(&flag_name, false)
            .opt(&flag_name, None::<String>)
            .build();
        prop_assert_eq!(argv, vec!["list".to_string()]);
    }
}
