//! The `budget.b` flat-file format.
//!
//! Line-oriented ASCII with `#section` markers and `key=value` field lines.
//! Free-text values (names, descriptions, selections, amounts-as-text) are
//! terminated by the reserved ESC byte (`0x1B`) so they may contain spaces;
//! bare scalar values (flags, indices) end at whitespace. Rows and
//! transactions are written tab-indented under their owning section but are
//! parsed purely by order of appearance.
//!
//! Section order is fixed: `#budget`, the `#category` blocks, the
//! `#month_m<N>` blocks, then `#config`. The reader is a single forward scan
//! over that order and reports malformed input as a structured parse error
//! instead of accepting garbage.

mod reader;
mod writer;

pub use reader::read_book;
pub use writer::write_book;

/// Reserved terminator for free-text values. User text containing it is
/// rejected at write time.
pub const ESC: char = '\u{1B}';

pub(crate) const SECTION_BUDGET: &str = "#budget";
pub(crate) const SECTION_CATEGORY: &str = "#category";
pub(crate) const SECTION_MONTH_PREFIX: &str = "#month_m";
pub(crate) const SECTION_CONFIG: &str = "#config";

pub(crate) const TAG_ROW: &str = "row";
pub(crate) const TAG_TX: &str = "tx";

/// Keys whose values are ESC-terminated free text.
pub(crate) fn is_text_key(key: &str) -> bool {
    matches!(
        key,
        "value" | "name" | "planned" | "date" | "amount" | "description" | "selection"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{selection_key, BudgetBook, Row, Transaction};

    fn populated_book() -> BudgetBook {
        let mut book = BudgetBook::new();
        book.budget.set_text("1,200.50");
        book.selected_tab = 3;

        let food = book.add_category("Food").unwrap();
        let mut groceries = Row::new("Groceries");
        groceries.planned.set_text("250");
        book.add_row(food, groceries).unwrap();
        let mut dining = Row::new("Dining out");
        dining.planned.set_text("abc"); // non-numeric text must survive
        dining.muted = true;
        book.add_row(food, dining).unwrap();

        let bills = book.add_category("Bills & Rent").unwrap();
        book.category_mut(bills).unwrap().draw_rows = false;
        let mut rent = Row::new("Rent");
        rent.planned.set_text("900.00");
        book.add_row(bills, rent).unwrap();

        let mut tx = Transaction::new("01/02/2024", "42.50", "Coffee with a friend");
        tx.selection = selection_key("Food", "Dining out");
        book.add_transaction(0, tx).unwrap();
        let mut tx = Transaction::new("04/11/2024", "900", "April rent");
        tx.selection = selection_key("Bills & Rent", "Rent");
        tx.muted = true;
        book.add_transaction(3, tx).unwrap();
        book.months[6].muted = true;
        book
    }

    #[test]
    fn round_trip_reproduces_the_book() {
        let book = populated_book();
        let text = write_book(&book).unwrap();
        let restored = read_book(&text).unwrap();

        assert_eq!(restored.budget.text(), "1,200.50");
        assert_eq!(restored.selected_tab, 3);
        assert_eq!(restored.category_count(), 2);

        let food = restored.find_category("Food").unwrap();
        let category = restored.category(food).unwrap();
        assert_eq!(category.row_count(), 2);
        assert!(category.draw_rows);
        let dining = restored.find_row(food, "Dining out").unwrap();
        let row = restored.row(dining).unwrap();
        assert_eq!(row.planned.text(), "abc");
        assert!(row.muted);

        let bills = restored.find_category("Bills & Rent").unwrap();
        assert!(!restored.category(bills).unwrap().draw_rows);

        assert_eq!(restored.months[0].transactions.len(), 1);
        let tx = restored
            .transaction(restored.months[0].transactions[0])
            .unwrap();
        assert_eq!(tx.date, "01/02/2024");
        assert_eq!(tx.amount.text(), "42.50");
        assert_eq!(tx.description, "Coffee with a friend");
        assert_eq!(tx.selection, "Food: Dining out");
        assert!(!tx.muted);

        let april = restored
            .transaction(restored.months[3].transactions[0])
            .unwrap();
        assert!(april.muted);
        assert!(restored.months[6].muted);
        assert!(!restored.months[7].muted);
    }

    #[test]
    fn round_trip_is_stable() {
        let book = populated_book();
        let first = write_book(&book).unwrap();
        let second = write_book(&read_book(&first).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_input_yields_empty_book() {
        let book = read_book("").unwrap();
        assert_eq!(book.category_count(), 0);
        assert_eq!(book.budget.value(), 0.0);
        assert_eq!(book.selected_tab, 0);
    }

    #[test]
    fn missing_budget_section_leaves_budget_zero() {
        let text = "#category\nname=Food\u{1B} draw_rows=1\n#config\ntab=2\n";
        let book = read_book(text).unwrap();
        assert_eq!(book.budget.value(), 0.0);
        assert_eq!(book.selected_tab, 2);
        assert_eq!(book.category_count(), 1);
    }
}
