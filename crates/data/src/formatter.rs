#![allow(clippy::format_push_string)]

use crate::table::Table;

pub struct TableFormatter;

impl TableFormatter {
    /// Renders a table as boxed text for the terminal.
    ///
    /// Decimals and floats are printed with `precision` fractional digits and
    /// never in scientific notation.
    #[must_use]
    pub fn format(table: &Table, precision: usize) -> String {
        let cells: Vec<Vec<String>> = table
            .rows
            .iter()
            .map(|row| row.iter().map(|v| v.display(precision)).collect())
            .collect();

        let widths: Vec<usize> = table
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                cells
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(col.name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let rule = |left: char, mid: char, right: char| {
            let mut line = String::new();
            line.push(left);
            for (i, w) in widths.iter().enumerate() {
                if i > 0 {
                    line.push(mid);
                }
                line.push_str(&"─".repeat(w + 2));
            }
            line.push(right);
            line.push('\n');
            line
        };

        let mut output = String::new();
        output.push_str(&format!("{} ({} rows)\n", table.name, table.len()));
        output.push_str(&rule('┌', '┬', '┐'));

        output.push('│');
        for (col, w) in table.columns.iter().zip(&widths) {
            output.push_str(&format!(" {:<w$} │", col.name, w = w));
        }
        output.push('\n');
        output.push_str(&rule('├', '┼', '┤'));

        for row in &cells {
            output.push('│');
            for (i, (cell, w)) in row.iter().zip(&widths).enumerate() {
                let numeric = table.columns[i].data_type.is_numeric();
                if numeric {
                    output.push_str(&format!(" {:>w$} │", cell, w = w));
                } else {
                    output.push_str(&format!(" {:<w$} │", cell, w = w));
                }
            }
            output.push('\n');
        }
        output.push_str(&rule('└', '┴', '┘'));

        if table.is_empty() {
            output.push_str("No rows in the selected range.\n");
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{ColumnInfo, DataType, Value};
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_aligns_columns() {
        let mut table = Table::new(
            "total_profit",
            vec![
                ColumnInfo::new("TradingPair", DataType::Varchar),
                ColumnInfo::new("net_profit", DataType::Decimal),
            ],
        );
        table.push_row(vec![Value::from("BTC/USDT"), Value::Decimal(dec!(1.4))]);
        table.push_row(vec![Value::from("TOTAL"), Value::Null]);

        let out = TableFormatter::format(&table, 3);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "total_profit (2 rows)");
        assert_eq!(lines[2], "│ TradingPair │ net_profit │");
        assert_eq!(lines[4], "│ BTC/USDT    │      1.400 │");
        assert_eq!(lines[5], "│ TOTAL       │       NULL │");
        let width = lines[1].chars().count();
        assert!(lines[1..].iter().all(|l| l.chars().count() == width));
    }

    #[test]
    fn test_format_empty_table() {
        let table = Table::new(
            "accuracy_predictions",
            vec![ColumnInfo::new("TradingPair", DataType::Varchar)],
        );
        let out = TableFormatter::format(&table, 3);
        assert!(out.contains("No rows in the selected range."));
    }
}
