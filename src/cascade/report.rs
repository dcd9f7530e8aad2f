//! Text and JSON rendering of cascade reports.

use super::{BlockingRelation, CascadeReport};
use serde::Serialize;
use std::fmt::Write;

/// JSON representation of a cascade report
#[derive(Debug, Serialize)]
pub struct CascadeJson<'a> {
    pub table: &'a str,
    pub safe: bool,
    pub blocking: Option<&'a BlockingRelation>,
    pub chain: &'a [String],
}

/// Render a report as human-readable text
pub fn to_text(table: &str, report: &CascadeReport) -> String {
    let mut out = String::new();

    match report {
        CascadeReport::Safe => {
            let _ = writeln!(
                out,
                "Deleting from '{}' cascades to all dependent tables.",
                table
            );
        }
        CascadeReport::Unsafe { blocking, chain } => {
            let _ = writeln!(
                out,
                "Deleting from '{}' is blocked by {} <- {} (ON DELETE is not CASCADE)",
                table, blocking.parent_table, blocking.child_table
            );
            let _ = writeln!(out, "Chain:");
            for (depth, name) in chain.iter().enumerate() {
                let _ = writeln!(out, "{}{}", "  ".repeat(depth + 1), name);
            }
        }
    }

    out
}

/// Render a report as pretty-printed JSON
pub fn to_json(table: &str, report: &CascadeReport) -> String {
    let json = CascadeJson {
        table,
        safe: report.is_safe(),
        blocking: report.blocking(),
        chain: report.chain(),
    };
    serde_json::to_string_pretty(&json).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unsafe_report() -> CascadeReport {
        CascadeReport::Unsafe {
            blocking: BlockingRelation {
                parent_table: "orders".to_string(),
                child_table: "order_items".to_string(),
            },
            chain: vec![
                "customers".to_string(),
                "orders".to_string(),
                "order_items".to_string(),
            ],
        }
    }

    #[test]
    fn test_text_indents_chain() {
        let text = to_text("customers", &unsafe_report());
        assert!(text.contains("blocked by orders <- order_items"));
        assert!(text.contains("\n  customers\n    orders\n      order_items\n"));
    }

    #[test]
    fn test_text_safe() {
        let text = to_text("customers", &CascadeReport::Safe);
        assert_eq!(
            text,
            "Deleting from 'customers' cascades to all dependent tables.\n"
        );
    }

    #[test]
    fn test_json_fields() {
        let json = to_json("customers", &unsafe_report());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["safe"], false);
        assert_eq!(value["blocking"]["child_table"], "order_items");
        assert_eq!(value["chain"][0], "customers");

        let json = to_json("customers", &CascadeReport::Safe);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["safe"], true);
        assert!(value["blocking"].is_null());
        assert_eq!(value["chain"].as_array().map(|a| a.len()), Some(0));
    }
}
