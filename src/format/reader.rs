use crate::errors::{BudgetError, Result};
use crate::model::{BudgetBook, CategoryId, Row, Transaction, MONTH_COUNT};

use super::{
    is_text_key, ESC, SECTION_BUDGET, SECTION_CATEGORY, SECTION_CONFIG, SECTION_MONTH_PREFIX,
    TAG_ROW, TAG_TX,
};

/// Which section the forward scan is inside.
enum Section {
    None,
    Budget,
    Category(CategoryId),
    Month(usize),
    Config,
}

/// Rebuilds a book from flat-file text in a single forward scan.
///
/// The scan assumes the writer's section order. Indentation is ignored; rows
/// and transactions attach to the most recent `#category` / `#month_m<N>`
/// section purely by order of appearance. Malformed lines produce a
/// structured parse error carrying the line number.
pub fn read_book(text: &str) -> Result<BudgetBook> {
    let mut book = BudgetBook::new();
    let mut section = Section::None;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim_start_matches(['\t', ' ']).trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }

        if let Some(marker) = line.strip_prefix('#') {
            section = open_section(&mut book, marker, line_no)?;
            continue;
        }

        match section {
            Section::None => {
                return Err(BudgetError::parse(line_no, "field line before any section"));
            }
            Section::Budget => {
                for (key, value) in parse_fields(line, line_no)? {
                    match key.as_str() {
                        "value" => book.budget.set_text(value),
                        other => return Err(unknown_key(line_no, other)),
                    }
                }
            }
            Section::Category(category_id) => {
                if let Some(rest) = line.strip_prefix(TAG_ROW).filter(|r| starts_field(r)) {
                    let row = read_row(rest, line_no)?;
                    book.add_row(category_id, row)?;
                } else {
                    let category = book
                        .category_mut(category_id)
                        .ok_or_else(|| BudgetError::parse(line_no, "category vanished mid-scan"))?;
                    for (key, value) in parse_fields(line, line_no)? {
                        match key.as_str() {
                            "name" => category.set_name(value),
                            "draw_rows" => category.draw_rows = parse_flag(&value, line_no, "draw_rows")?,
                            other => return Err(unknown_key(line_no, other)),
                        }
                    }
                }
            }
            Section::Month(month) => {
                if let Some(rest) = line.strip_prefix(TAG_TX).filter(|r| starts_field(r)) {
                    let transaction = read_transaction(rest, line_no)?;
                    book.add_transaction(month, transaction)?;
                } else {
                    for (key, value) in parse_fields(line, line_no)? {
                        match key.as_str() {
                            "muted" => book.months[month].muted = parse_flag(&value, line_no, "muted")?,
                            other => return Err(unknown_key(line_no, other)),
                        }
                    }
                }
            }
            Section::Config => {
                for (key, value) in parse_fields(line, line_no)? {
                    match key.as_str() {
                        "tab" => {
                            let tab: usize = value.parse().map_err(|_| {
                                BudgetError::parse(line_no, format!("invalid tab index `{}`", value))
                            })?;
                            if tab >= MONTH_COUNT {
                                return Err(BudgetError::parse(
                                    line_no,
                                    format!("tab index {} out of range", tab),
                                ));
                            }
                            book.selected_tab = tab;
                        }
                        other => return Err(unknown_key(line_no, other)),
                    }
                }
            }
        }
    }

    Ok(book)
}

fn open_section(book: &mut BudgetBook, marker: &str, line_no: usize) -> Result<Section> {
    let full = format!("#{}", marker.trim_end());
    if full == SECTION_BUDGET {
        return Ok(Section::Budget);
    }
    if full == SECTION_CATEGORY {
        let id = book.add_category("")?;
        return Ok(Section::Category(id));
    }
    if full == SECTION_CONFIG {
        return Ok(Section::Config);
    }
    if let Some(index) = full.strip_prefix(SECTION_MONTH_PREFIX) {
        let month: usize = index.parse().map_err(|_| {
            BudgetError::parse(line_no, format!("invalid month section `{}`", full))
        })?;
        if month >= MONTH_COUNT {
            return Err(BudgetError::parse(
                line_no,
                format!("month index {} out of range", month),
            ));
        }
        return Ok(Section::Month(month));
    }
    Err(BudgetError::parse(
        line_no,
        format!("unknown section `{}`", full),
    ))
}

fn read_row(rest: &str, line_no: usize) -> Result<Row> {
    let mut row = Row::default();
    for (key, value) in parse_fields(rest, line_no)? {
        match key.as_str() {
            "name" => row.set_name(value),
            "planned" => row.planned.set_text(value),
            "muted" => row.muted = parse_flag(&value, line_no, "muted")?,
            other => return Err(unknown_key(line_no, other)),
        }
    }
    Ok(row)
}

fn read_transaction(rest: &str, line_no: usize) -> Result<Transaction> {
    let mut transaction = Transaction::default();
    for (key, value) in parse_fields(rest, line_no)? {
        match key.as_str() {
            "date" => transaction.date = value,
            "amount" => transaction.amount.set_text(value),
            "description" => transaction.description = value,
            "selection" => transaction.selection = value,
            "muted" => transaction.muted = parse_flag(&value, line_no, "muted")?,
            other => return Err(unknown_key(line_no, other)),
        }
    }
    Ok(transaction)
}

/// A tag (`row`/`tx`) only counts when followed by whitespace, so a key like
/// `txn=...` is not mistaken for a transaction line.
fn starts_field(rest: &str) -> bool {
    rest.starts_with(' ') || rest.starts_with('\t')
}

/// Splits a field line into `key=value` pairs. Free-text keys read to the
/// next ESC terminator; scalar keys read to whitespace.
fn parse_fields(line: &str, line_no: usize) -> Result<Vec<(String, String)>> {
    let mut fields = Vec::new();
    let mut rest = line;
    loop {
        rest = rest.trim_start_matches([' ', '\t']);
        if rest.is_empty() {
            break;
        }
        let eq = rest.find('=').ok_or_else(|| {
            BudgetError::parse(line_no, format!("expected key=value, found `{}`", rest))
        })?;
        let key = &rest[..eq];
        if key.is_empty() || key.contains(char::is_whitespace) {
            return Err(BudgetError::parse(
                line_no,
                format!("malformed key before `=` in `{}`", rest),
            ));
        }
        let after = &rest[eq + 1..];
        let (value, remainder) = if is_text_key(key) {
            match after.find(ESC) {
                Some(pos) => (&after[..pos], &after[pos + ESC.len_utf8()..]),
                None => {
                    return Err(BudgetError::parse(
                        line_no,
                        format!("unterminated value for `{}`", key),
                    ))
                }
            }
        } else {
            match after.find(char::is_whitespace) {
                Some(pos) => (&after[..pos], &after[pos..]),
                None => (after, ""),
            }
        };
        fields.push((key.to_string(), value.to_string()));
        rest = remainder;
    }
    Ok(fields)
}

fn parse_flag(value: &str, line_no: usize, key: &str) -> Result<bool> {
    match value {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(BudgetError::parse(
            line_no,
            format!("flag `{}` must be 0 or 1, found `{}`", key, other),
        )),
    }
}

fn unknown_key(line_no: usize, key: &str) -> BudgetError {
    BudgetError::parse(line_no, format!("unknown key `{}`", key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unterminated_text_value_reports_line() {
        let text = "#budget\nvalue=100\n";
        let err = read_book(text).unwrap_err();
        match err {
            BudgetError::Parse { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("unterminated"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_section_is_an_error() {
        let err = read_book("#nonsense\n").unwrap_err();
        assert!(matches!(err, BudgetError::Parse { line: 1, .. }));
    }

    #[test]
    fn field_line_outside_sections_is_an_error() {
        let err = read_book("muted=0\n").unwrap_err();
        assert!(matches!(err, BudgetError::Parse { line: 1, .. }));
    }

    #[test]
    fn row_outside_category_is_an_error() {
        let text = "#budget\nrow name=Oops\u{1B} planned=1\u{1B} muted=0\n";
        let err = read_book(text).unwrap_err();
        assert!(matches!(err, BudgetError::Parse { line: 2, .. }));
    }

    #[test]
    fn month_index_out_of_range_is_an_error() {
        let err = read_book("#month_m12\n").unwrap_err();
        assert!(matches!(err, BudgetError::Parse { line: 1, .. }));
    }

    #[test]
    fn values_may_contain_spaces_and_equals() {
        let text = concat!(
            "#category\n",
            "name=Odds = Ends\u{1B} draw_rows=1\n",
            "\trow name=Second hand stuff\u{1B} planned=10 50\u{1B} muted=1\n",
        );
        let book = read_book(text).unwrap();
        let id = book.find_category("Odds = Ends").unwrap();
        let row_id = book.find_row(id, "Second hand stuff").unwrap();
        let row = book.row(row_id).unwrap();
        assert_eq!(row.planned.text(), "10 50");
        assert!(row.muted);
    }
}
