//! `tables` command: list registered tables and their columns.

use super::{database_options, open_database, SourceArgs};
use anyhow::Result;
use clap::Args;
use predictoor_data::PredictionDatabase;
use std::fmt::Write as _;

/// Arguments for the tables command.
#[derive(Args, Debug, Clone)]
pub struct TablesArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Also list distinct values for the raw table's filter columns
    #[arg(long)]
    pub filters: bool,
}

/// Runs the tables command.
///
/// # Errors
/// Returns an error if the export cannot be loaded.
pub fn run_tables(args: &TablesArgs) -> Result<()> {
    let config = args.source.load_config()?;
    let db = open_database(&database_options(&config))?;
    print!("{}", describe(&db, args.filters));
    Ok(())
}

fn describe(db: &PredictionDatabase, with_filters: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} predictions loaded", db.len());

    for name in db.show_tables() {
        let _ = writeln!(out, "\n{name}");
        match db.table_info(&name) {
            Ok(columns) => {
                for column in columns {
                    let _ = writeln!(out, "  {:<24} {:?}", column.name, column.data_type);
                }
            }
            Err(e) => {
                let _ = writeln!(out, "  (unavailable: {e})");
            }
        }
    }

    if with_filters {
        let _ = writeln!(out, "\nFilters");
        for option in db.filter_options() {
            let _ = writeln!(out, "  {:<24} {}", option.column, option.choices.join(", "));
        }
    }
    out
}
