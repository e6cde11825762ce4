//! End-to-end flow: build a plan, import spending, roll up, persist, and
//! verify the reloaded book rolls up identically.

use std::io::Write;

use budgeteer::aggregate;
use budgeteer::config::ImportConfig;
use budgeteer::importer::import_csv;
use budgeteer::model::{selection_key, BudgetBook, Row};
use budgeteer::storage::BookStore;
use tempfile::{tempdir, NamedTempFile};

fn build_plan(book: &mut BudgetBook) {
    book.budget.set_text("2000");
    let food = book.add_category("Food").unwrap();
    let mut groceries = Row::new("Groceries");
    groceries.planned.set_text("300");
    book.add_row(food, groceries).unwrap();

    let home = book.add_category("Home").unwrap();
    let mut rent = Row::new("Rent");
    rent.planned.set_text("900");
    book.add_row(home, rent).unwrap();
}

#[test]
fn import_assign_rollup_and_reload() {
    let mut book = BudgetBook::new();
    build_plan(&mut book);

    let mut csv = NamedTempFile::new().unwrap();
    csv.write_all(b"Date,Amount,Description\n01/03/2024,55.25,veg box\n01/28/2024,62.10,big shop\n")
        .unwrap();
    let summary = import_csv(&mut book, 0, csv.path(), &ImportConfig::default()).unwrap();
    assert_eq!(summary.imported, 2);

    // Imported transactions start unassigned and contribute nothing.
    let report = aggregate::refresh(&mut book);
    assert_eq!(report.months[0].spent, 0.0);

    for id in book.months[0].transactions.clone() {
        book.transaction_mut(id).unwrap().selection = selection_key("Food", "Groceries");
    }
    let report = aggregate::refresh(&mut book);
    assert_eq!(report.months[0].spent, 117.35);
    assert_eq!(report.months[0].planned, 1200.0);
    assert_eq!(report.months[0].saved, 1882.65);
    assert_eq!(report.quarters[0].spent, 117.35);
    assert_eq!(report.year.spent, 117.35);

    let temp = tempdir().unwrap();
    let store = BookStore::new(temp.path().to_path_buf()).unwrap();
    store.save(&book).unwrap();
    let mut restored = store.load().unwrap().expect("saved book");

    let restored_report = aggregate::refresh(&mut restored);
    for month in 0..12 {
        assert_eq!(restored_report.months[month], report.months[month]);
    }
    assert_eq!(restored_report.year, report.year);
}

#[test]
fn pool_capacity_errors_are_recoverable() {
    let mut book = BudgetBook::new();
    for index in 0..budgeteer::model::CATEGORY_CAPACITY {
        book.add_category(format!("cat{index}")).unwrap();
    }
    let err = book.add_category("one too many").unwrap_err();
    assert!(matches!(
        err,
        budgeteer::errors::BudgetError::PoolExhausted { .. }
    ));

    // Freeing one slot makes room again.
    let id = book.find_category("cat0").unwrap();
    book.remove_category(id).unwrap();
    book.add_category("replacement").unwrap();
}
