use std::fmt::Write as _;

use crate::errors::{BudgetError, Result};
use crate::model::{BudgetBook, MONTH_COUNT};

use super::{ESC, SECTION_BUDGET, SECTION_CATEGORY, SECTION_CONFIG, SECTION_MONTH_PREFIX};

/// Flattens the book into the flat-file text, in the fixed section order the
/// reader expects.
pub fn write_book(book: &BudgetBook) -> Result<String> {
    let mut out = String::new();

    out.push_str(SECTION_BUDGET);
    out.push('\n');
    write_field(&mut out, "value", book.budget.text())?;
    out.push('\n');

    for category_id in book.category_ids() {
        let Some(category) = book.category(category_id) else {
            continue;
        };
        out.push_str(SECTION_CATEGORY);
        out.push('\n');
        write_field(&mut out, "name", category.name())?;
        out.push(' ');
        write_flag(&mut out, "draw_rows", category.draw_rows);
        out.push('\n');
        for row_id in &category.rows {
            let Some(row) = book.row(*row_id) else {
                continue;
            };
            out.push('\t');
            out.push_str("row ");
            write_field(&mut out, "name", row.name())?;
            out.push(' ');
            write_field(&mut out, "planned", row.planned.text())?;
            out.push(' ');
            write_flag(&mut out, "muted", row.muted);
            out.push('\n');
        }
    }

    for month in 0..MONTH_COUNT {
        let slot = &book.months[month];
        let _ = writeln!(out, "{}{}", SECTION_MONTH_PREFIX, month);
        write_flag(&mut out, "muted", slot.muted);
        out.push('\n');
        for transaction_id in &slot.transactions {
            let Some(transaction) = book.transaction(*transaction_id) else {
                continue;
            };
            out.push('\t');
            out.push_str("tx ");
            write_field(&mut out, "date", &transaction.date)?;
            out.push(' ');
            write_field(&mut out, "amount", transaction.amount.text())?;
            out.push(' ');
            write_field(&mut out, "description", &transaction.description)?;
            out.push(' ');
            write_field(&mut out, "selection", &transaction.selection)?;
            out.push(' ');
            write_flag(&mut out, "muted", transaction.muted);
            out.push('\n');
        }
    }

    out.push_str(SECTION_CONFIG);
    out.push('\n');
    let _ = writeln!(out, "tab={}", book.selected_tab);

    Ok(out)
}

/// Writes one ESC-terminated free-text field. The terminator byte is reserved,
/// so text containing it is refused; newlines would break the line framing
/// and are flattened to spaces.
fn write_field(out: &mut String, key: &str, value: &str) -> Result<()> {
    if value.contains(ESC) {
        return Err(BudgetError::Format(format!(
            "field `{}` contains the reserved escape byte 0x1B",
            key
        )));
    }
    out.push_str(key);
    out.push('=');
    for ch in value.chars() {
        out.push(if ch == '\n' || ch == '\r' { ' ' } else { ch });
    }
    out.push(ESC);
    Ok(())
}

fn write_flag(out: &mut String, key: &str, value: bool) {
    let _ = write!(out, "{}={}", key, if value { 1 } else { 0 });
}
