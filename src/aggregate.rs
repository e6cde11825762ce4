//! Bottom-up rollup of planned/spent/diff figures.
//!
//! Every pass recomputes the derived numbers in a fixed order: transaction
//! amounts into row `spent`, rows into category sums, categories into month
//! totals, months into quarter/half/year totals. The pass runs unconditionally
//! on every refresh; at this data scale the full scan is cheap enough that
//! change tracking is not worth its complexity.

use std::collections::HashMap;

use crate::amount::round_cents;
use crate::model::{BudgetBook, CategoryId, RowId, Totals, MONTH_COUNT};

/// Totals for every time scope, produced by [`refresh`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RollupReport {
    pub months: [Totals; MONTH_COUNT],
    pub quarters: [Totals; 4],
    pub halves: [Totals; 2],
    pub year: Totals,
}

struct RowFigures {
    id: RowId,
    spent: f64,
    diff: f64,
}

struct CategoryFigures {
    id: CategoryId,
    planned: f64,
    spent: f64,
    diff: f64,
    muted: bool,
    rows: Vec<RowFigures>,
}

/// Recomputes every derived field and returns the rollup. Month totals are
/// also cached on the book's month slots, and the row/category caches are
/// rewritten from the figures of the currently selected month.
pub fn refresh(book: &mut BudgetBook) -> RollupReport {
    let budget = book.budget.value();
    let selection_index = build_selection_index(book);

    let mut report = RollupReport::default();
    let mut selected_figures: Option<Vec<CategoryFigures>> = None;

    for month in 0..MONTH_COUNT {
        let muted = book.months[month].effectively_muted(book.transaction_pool());
        let spent_by_row = if muted {
            HashMap::new()
        } else {
            scan_month(book, month, &selection_index)
        };
        let figures = category_figures(book, &spent_by_row);

        let totals = if muted {
            Totals::default()
        } else {
            month_totals(&figures, budget)
        };
        book.months[month].totals = totals;
        report.months[month] = totals;

        if month == book.selected_tab {
            selected_figures = Some(figures);
        }
    }

    if let Some(figures) = selected_figures {
        apply_caches(book, figures);
    }

    for (quarter, chunk) in report.months.chunks(3).enumerate() {
        let mut totals = Totals::default();
        for month in chunk {
            totals.accumulate(month);
        }
        report.quarters[quarter] = totals;
    }
    for (half, chunk) in report.months.chunks(6).enumerate() {
        let mut totals = Totals::default();
        for month in chunk {
            totals.accumulate(month);
        }
        report.halves[half] = totals;
    }
    let mut year = Totals::default();
    for month in &report.months {
        year.accumulate(month);
    }
    report.year = year;

    report
}

/// Pre-hashes the `"Category: Row"` keys once per pass instead of rebuilding
/// the composite string for every comparison. Keys are matched by exact
/// equality; rows sharing a key each receive every matching amount, the same
/// outcome as scanning the transactions once per row.
fn build_selection_index(book: &BudgetBook) -> HashMap<String, Vec<RowId>> {
    let mut index: HashMap<String, Vec<RowId>> = HashMap::new();
    for category_id in book.category_ids() {
        let Some(category) = book.category(category_id) else {
            continue;
        };
        for row_id in &category.rows {
            let Some(row) = book.row(*row_id) else {
                continue;
            };
            if row.has_usable_name() {
                index
                    .entry(crate::model::selection_key(category.name(), row.name()))
                    .or_default()
                    .push(*row_id);
            }
        }
    }
    index
}

/// Sums the unmuted transaction amounts of one month per matched row.
fn scan_month(
    book: &BudgetBook,
    month: usize,
    selection_index: &HashMap<String, Vec<RowId>>,
) -> HashMap<RowId, f64> {
    let mut spent = HashMap::new();
    for transaction_id in &book.months[month].transactions {
        let Some(transaction) = book.transaction(*transaction_id) else {
            continue;
        };
        if transaction.muted || transaction.selection.is_empty() {
            continue;
        }
        if let Some(row_ids) = selection_index.get(&transaction.selection) {
            for row_id in row_ids {
                *spent.entry(*row_id).or_insert(0.0) += transaction.amount.value();
            }
        }
    }
    spent
}

fn category_figures(
    book: &BudgetBook,
    spent_by_row: &HashMap<RowId, f64>,
) -> Vec<CategoryFigures> {
    let mut all = Vec::with_capacity(book.category_count());
    for category_id in book.category_ids() {
        let Some(category) = book.category(category_id) else {
            continue;
        };
        let mut planned_sum = 0.0;
        let mut spent_sum = 0.0;
        let mut diff_sum = 0.0;
        let mut rows = Vec::with_capacity(category.rows.len());
        let mut any_unmuted = false;
        for row_id in &category.rows {
            let Some(row) = book.row(*row_id) else {
                continue;
            };
            let planned = row.planned.value();
            let row_spent = round_cents(spent_by_row.get(row_id).copied().unwrap_or(0.0));
            let row_diff = round_cents(planned - row_spent);
            rows.push(RowFigures {
                id: *row_id,
                spent: row_spent,
                diff: row_diff,
            });
            if !row.muted {
                any_unmuted = true;
                planned_sum += planned;
                spent_sum += row_spent;
                diff_sum += row_diff;
            }
        }
        all.push(CategoryFigures {
            id: category_id,
            planned: round_cents(planned_sum),
            spent: round_cents(spent_sum),
            diff: round_cents(diff_sum),
            muted: !category.rows.is_empty() && !any_unmuted,
            rows,
        });
    }
    all
}

fn month_totals(figures: &[CategoryFigures], budget: f64) -> Totals {
    let mut planned = 0.0;
    let mut spent = 0.0;
    let mut diff = 0.0;
    for category in figures {
        if category.muted {
            continue;
        }
        planned += category.planned;
        spent += category.spent;
        diff += category.diff;
    }
    let planned = round_cents(planned);
    let spent = round_cents(spent);
    Totals {
        planned,
        spent,
        diff: round_cents(diff),
        saved: round_cents(budget - spent),
        goal: round_cents(budget - planned),
    }
}

fn apply_caches(book: &mut BudgetBook, figures: Vec<CategoryFigures>) {
    for category_figures in figures {
        for row_figures in &category_figures.rows {
            if let Some(row) = book.row_mut(row_figures.id) {
                row.spent = row_figures.spent;
                row.diff = row_figures.diff;
            }
        }
        if let Some(category) = book.category_mut(category_figures.id) {
            category.planned = category_figures.planned;
            category.spent = category_figures.spent;
            category.diff = category_figures.diff;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{selection_key, Row, Transaction};

    fn seed_book() -> BudgetBook {
        let mut book = BudgetBook::new();
        book.budget.set_text("1000");
        let food = book.add_category("Food").unwrap();
        let groceries = book.add_row(food, Row::new("Groceries")).unwrap();
        let dining = book.add_row(food, Row::new("Dining")).unwrap();
        book.row_mut(groceries).unwrap().planned.set_text("100");
        book.row_mut(dining).unwrap().planned.set_text("200");

        let mut tx = Transaction::new("01/05/2024", "50", "weekly shop");
        tx.selection = selection_key("Food", "Groceries");
        book.add_transaction(0, tx).unwrap();
        let mut tx = Transaction::new("01/09/2024", "75", "dinner out");
        tx.selection = selection_key("Food", "Dining");
        book.add_transaction(0, tx).unwrap();
        book
    }

    #[test]
    fn category_sums_rows_and_transactions() {
        let mut book = seed_book();
        let report = refresh(&mut book);

        let food = book.find_category("Food").unwrap();
        let category = book.category(food).unwrap();
        assert_eq!(category.planned, 300.0);
        assert_eq!(category.spent, 125.0);
        assert_eq!(category.diff, 175.0);

        assert_eq!(report.months[0].planned, 300.0);
        assert_eq!(report.months[0].spent, 125.0);
        assert_eq!(report.months[0].saved, 875.0);
        assert_eq!(report.months[0].goal, 700.0);
    }

    #[test]
    fn selection_matching_is_exact_string() {
        let mut book = seed_book();
        let mut tx = Transaction::new("01/10/2024", "999", "trailing space");
        tx.selection = "Food: Groceries ".to_string();
        book.add_transaction(0, tx).unwrap();
        let mut tx = Transaction::new("01/11/2024", "999", "case differs");
        tx.selection = "food: groceries".to_string();
        book.add_transaction(0, tx).unwrap();

        refresh(&mut book);
        let groceries = {
            let food = book.find_category("Food").unwrap();
            book.find_row(food, "Groceries").unwrap()
        };
        assert_eq!(book.row(groceries).unwrap().spent, 50.0);
    }

    #[test]
    fn rows_sharing_a_name_each_receive_matching_spend() {
        let mut book = BudgetBook::new();
        book.budget.set_text("1000");
        let food = book.add_category("Food").unwrap();
        let first = book.add_row(food, Row::new("Groceries")).unwrap();
        let second = book.add_row(food, Row::new("Groceries")).unwrap();

        let mut tx = Transaction::new("01/05/2024", "50", "weekly shop");
        tx.selection = selection_key("Food", "Groceries");
        book.add_transaction(0, tx).unwrap();

        refresh(&mut book);
        assert_eq!(book.row(first).unwrap().spent, 50.0);
        assert_eq!(book.row(second).unwrap().spent, 50.0);
        assert_eq!(book.category(food).unwrap().spent, 100.0);
    }

    #[test]
    fn muted_row_is_excluded_from_category_totals() {
        let mut book = seed_book();
        let food = book.find_category("Food").unwrap();
        let groceries = book.find_row(food, "Groceries").unwrap();
        book.row_mut(groceries).unwrap().muted = true;

        refresh(&mut book);
        let category = book.category(food).unwrap();
        assert_eq!(category.planned, 200.0);
        assert_eq!(category.spent, 75.0);
        assert_eq!(category.diff, 125.0);
    }

    #[test]
    fn muting_all_rows_mutes_the_category() {
        let mut book = seed_book();
        let food = book.find_category("Food").unwrap();
        for row_id in book.category(food).unwrap().rows.clone() {
            book.row_mut(row_id).unwrap().muted = true;
        }
        let report = refresh(&mut book);
        assert!(book
            .category(food)
            .unwrap()
            .muted(book.row_pool()));
        assert_eq!(report.months[0].planned, 0.0);
        assert_eq!(report.months[0].spent, 0.0);
    }

    #[test]
    fn muting_every_transaction_zeroes_the_month() {
        let mut book = seed_book();
        for id in book.months[0].transactions.clone() {
            book.transaction_mut(id).unwrap().muted = true;
        }
        let report = refresh(&mut book);
        assert_eq!(report.months[0], Totals::default());
    }

    #[test]
    fn zero_on_parse_failure() {
        let mut book = seed_book();
        let food = book.find_category("Food").unwrap();
        let groceries = book.find_row(food, "Groceries").unwrap();
        book.row_mut(groceries).unwrap().planned.set_text("abc");

        refresh(&mut book);
        assert_eq!(book.category(food).unwrap().planned, 200.0);
    }

    #[test]
    fn quarterly_rollup_sums_months() {
        let mut book = seed_book();
        let mut tx = Transaction::new("02/01/2024", "30", "feb spend");
        tx.selection = selection_key("Food", "Groceries");
        book.add_transaction(1, tx).unwrap();

        let report = refresh(&mut book);
        let q1_planned =
            report.months[0].planned + report.months[1].planned + report.months[2].planned;
        assert_eq!(report.quarters[0].planned, q1_planned);
        let q1_spent = report.months[0].spent + report.months[1].spent + report.months[2].spent;
        assert_eq!(report.quarters[0].spent, q1_spent);
        // saved/goal sum per month rather than re-deriving from the sums.
        let q1_saved = report.months[0].saved + report.months[1].saved + report.months[2].saved;
        assert_eq!(report.quarters[0].saved, q1_saved);
        assert_eq!(report.halves[0].spent, 155.0);
        assert_eq!(report.year.spent, 155.0);
    }
}
