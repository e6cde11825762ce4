//! Budget data model: pooled categories, rows, and transactions, the twelve
//! month slots, and the derived totals snapshots.

pub mod book;
pub mod category;
pub mod month;
pub mod pool;
pub mod row;
pub mod totals;
pub mod transaction;

pub use book::{BudgetBook, CATEGORY_CAPACITY, ROW_CAPACITY, TRANSACTION_CAPACITY};
pub use category::{Category, CategoryId, RowId, NAME_MAX_BYTES};
pub use month::{month_index, Month, TransactionId, MONTH_COUNT, MONTH_NAMES};
pub use pool::{Handle, Pool};
pub use row::Row;
pub use totals::Totals;
pub use transaction::{selection_key, Transaction};
