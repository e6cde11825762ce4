//! CSV import into a month's transaction list.
//!
//! The header row is mapped against the configured synonym sets; columns
//! with no matching role are ignored, and the first column to match a role
//! wins. Body rows are read leniently: ragged rows are allowed, wrapping
//! quotes are stripped by the CSV reader, and missing fields fall back to
//! empty text (with amounts defaulting to `"0"`).

use std::path::Path;

use crate::config::{ColumnRole, ImportConfig};
use crate::errors::{BudgetError, Result};
use crate::model::{BudgetBook, Transaction};

/// Outcome of one CSV import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

#[derive(Debug, Default, Clone, Copy)]
struct ColumnMap {
    date: Option<usize>,
    amount: Option<usize>,
    description: Option<usize>,
}

/// Appends one transaction per CSV data row to the given month.
pub fn import_csv(
    book: &mut BudgetBook,
    month: usize,
    path: &Path,
    config: &ImportConfig,
) -> Result<ImportSummary> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|err| BudgetError::Import(format!("{}: {}", path.display(), err)))?;

    let headers = reader
        .headers()
        .map_err(|err| BudgetError::Import(err.to_string()))?;
    let columns = map_columns(headers, config);
    if columns.date.is_none() && columns.amount.is_none() {
        return Err(BudgetError::Import(format!(
            "{}: no date or amount column recognized in header",
            path.display()
        )));
    }

    let mut summary = ImportSummary::default();
    for record in reader.records() {
        let record = record.map_err(|err| BudgetError::Import(err.to_string()))?;
        if record.iter().all(|field| field.is_empty()) {
            summary.skipped += 1;
            continue;
        }
        book.add_transaction(month, to_transaction(&record, &columns))?;
        summary.imported += 1;
    }
    tracing::info!(
        path = %path.display(),
        imported = summary.imported,
        skipped = summary.skipped,
        "csv import finished"
    );
    Ok(summary)
}

/// Maps header cells to roles; first match per role wins, the rest are
/// ignored.
fn map_columns(headers: &csv::StringRecord, config: &ImportConfig) -> ColumnMap {
    let mut columns = ColumnMap::default();
    for (index, header) in headers.iter().enumerate() {
        match config.role_of(header) {
            Some(ColumnRole::Date) => {
                columns.date.get_or_insert(index);
            }
            Some(ColumnRole::Amount) => {
                columns.amount.get_or_insert(index);
            }
            Some(ColumnRole::Description) => {
                columns.description.get_or_insert(index);
            }
            None => {}
        }
    }
    columns
}

fn to_transaction(record: &csv::StringRecord, columns: &ColumnMap) -> Transaction {
    let field = |column: Option<usize>| {
        column
            .and_then(|index| record.get(index))
            .unwrap_or("")
            .to_string()
    };
    let mut amount = field(columns.amount);
    if amount.is_empty() {
        amount = "0".to_string();
    }
    Transaction::new(field(columns.date), amount, field(columns.description))
}
