use crate::amount::EditableAmount;
use crate::errors::{BudgetError, Result};
use crate::model::category::{Category, CategoryId, RowId};
use crate::model::month::{Month, TransactionId, MONTH_COUNT};
use crate::model::pool::Pool;
use crate::model::row::Row;
use crate::model::transaction::{selection_key, Transaction};

pub const CATEGORY_CAPACITY: usize = 128;
pub const ROW_CAPACITY: usize = 1024;
pub const TRANSACTION_CAPACITY: usize = 4096;

/// The whole in-memory budget state: pooled categories/rows/transactions,
/// the twelve month slots, the global budget figure, and the persisted
/// selected-tab index.
#[derive(Debug)]
pub struct BudgetBook {
    categories: Pool<Category>,
    rows: Pool<Row>,
    transactions: Pool<Transaction>,
    order: Vec<CategoryId>,
    pub months: [Month; MONTH_COUNT],
    pub budget: EditableAmount,
    pub selected_tab: usize,
}

impl Default for BudgetBook {
    fn default() -> Self {
        Self::new()
    }
}

impl BudgetBook {
    pub fn new() -> Self {
        Self {
            categories: Pool::with_capacity("category", CATEGORY_CAPACITY),
            rows: Pool::with_capacity("row", ROW_CAPACITY),
            transactions: Pool::with_capacity("transaction", TRANSACTION_CAPACITY),
            order: Vec::new(),
            months: std::array::from_fn(|_| Month::default()),
            budget: EditableAmount::default(),
            selected_tab: 0,
        }
    }

    // -- categories ------------------------------------------------------

    /// Appends a category at the tail of the ordered list.
    pub fn add_category(&mut self, name: impl Into<String>) -> Result<CategoryId> {
        let id = self.categories.insert(Category::new(name))?;
        self.order.push(id);
        Ok(id)
    }

    /// Removes a category and returns all of its rows to the row pool.
    pub fn remove_category(&mut self, id: CategoryId) -> Result<()> {
        let category = self
            .categories
            .remove(id)
            .ok_or_else(|| BudgetError::InvalidRef("category no longer exists".into()))?;
        for row_id in category.rows {
            self.rows.remove(row_id);
        }
        self.order.retain(|existing| *existing != id);
        Ok(())
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.get(id)
    }

    pub fn category_mut(&mut self, id: CategoryId) -> Option<&mut Category> {
        self.categories.get_mut(id)
    }

    /// Categories in stable logical order.
    pub fn category_ids(&self) -> impl Iterator<Item = CategoryId> + '_ {
        self.order.iter().copied()
    }

    pub fn category_count(&self) -> usize {
        self.order.len()
    }

    pub fn find_category(&self, name: &str) -> Option<CategoryId> {
        self.category_ids()
            .find(|id| self.categories.get(*id).map(Category::name) == Some(name))
    }

    /// Swaps two list positions, reordering the display.
    pub fn swap_categories(&mut self, a: usize, b: usize) -> Result<()> {
        if a >= self.order.len() || b >= self.order.len() {
            return Err(BudgetError::InvalidRef(
                "category position out of range".into(),
            ));
        }
        self.order.swap(a, b);
        Ok(())
    }

    // -- rows ------------------------------------------------------------

    pub fn add_row(&mut self, category_id: CategoryId, row: Row) -> Result<RowId> {
        if self.categories.get(category_id).is_none() {
            return Err(BudgetError::InvalidRef("category no longer exists".into()));
        }
        let row_id = self.rows.insert(row)?;
        // Safe: checked above, and row insertion cannot invalidate it.
        if let Some(category) = self.categories.get_mut(category_id) {
            category.rows.push(row_id);
        }
        Ok(row_id)
    }

    pub fn remove_row(&mut self, category_id: CategoryId, row_id: RowId) -> Result<()> {
        let category = self
            .categories
            .get_mut(category_id)
            .ok_or_else(|| BudgetError::InvalidRef("category no longer exists".into()))?;
        let before = category.rows.len();
        category.rows.retain(|existing| *existing != row_id);
        if category.rows.len() == before {
            return Err(BudgetError::InvalidRef(
                "row does not belong to category".into(),
            ));
        }
        self.rows.remove(row_id);
        Ok(())
    }

    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.rows.get(id)
    }

    pub fn row_mut(&mut self, id: RowId) -> Option<&mut Row> {
        self.rows.get_mut(id)
    }

    pub fn find_row(&self, category_id: CategoryId, name: &str) -> Option<RowId> {
        let category = self.categories.get(category_id)?;
        category
            .rows
            .iter()
            .copied()
            .find(|id| self.rows.get(*id).map(Row::name) == Some(name))
    }

    pub fn swap_rows(&mut self, category_id: CategoryId, a: usize, b: usize) -> Result<()> {
        let category = self
            .categories
            .get_mut(category_id)
            .ok_or_else(|| BudgetError::InvalidRef("category no longer exists".into()))?;
        if a >= category.rows.len() || b >= category.rows.len() {
            return Err(BudgetError::InvalidRef("row position out of range".into()));
        }
        category.rows.swap(a, b);
        Ok(())
    }

    pub(crate) fn row_pool(&self) -> &Pool<Row> {
        &self.rows
    }

    // -- transactions ----------------------------------------------------

    pub fn add_transaction(
        &mut self,
        month: usize,
        transaction: Transaction,
    ) -> Result<TransactionId> {
        if month >= MONTH_COUNT {
            return Err(BudgetError::InvalidRef("month index out of range".into()));
        }
        let id = self.transactions.insert(transaction)?;
        self.months[month].transactions.push(id);
        Ok(id)
    }

    pub fn remove_transaction(&mut self, month: usize, id: TransactionId) -> Result<()> {
        if month >= MONTH_COUNT {
            return Err(BudgetError::InvalidRef("month index out of range".into()));
        }
        let slot = &mut self.months[month];
        let before = slot.transactions.len();
        slot.transactions.retain(|existing| *existing != id);
        if slot.transactions.len() == before {
            return Err(BudgetError::InvalidRef(
                "transaction does not belong to month".into(),
            ));
        }
        self.transactions.remove(id);
        Ok(())
    }

    /// Removes every transaction of a month.
    pub fn clear_month(&mut self, month: usize) -> Result<()> {
        if month >= MONTH_COUNT {
            return Err(BudgetError::InvalidRef("month index out of range".into()));
        }
        let ids = std::mem::take(&mut self.months[month].transactions);
        for id in ids {
            self.transactions.remove(id);
        }
        Ok(())
    }

    pub fn transaction(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.get(id)
    }

    pub fn transaction_mut(&mut self, id: TransactionId) -> Option<&mut Transaction> {
        self.transactions.get_mut(id)
    }

    pub fn swap_transactions(&mut self, month: usize, a: usize, b: usize) -> Result<()> {
        if month >= MONTH_COUNT {
            return Err(BudgetError::InvalidRef("month index out of range".into()));
        }
        let slot = &mut self.months[month];
        if a >= slot.transactions.len() || b >= slot.transactions.len() {
            return Err(BudgetError::InvalidRef(
                "transaction position out of range".into(),
            ));
        }
        slot.transactions.swap(a, b);
        Ok(())
    }

    pub(crate) fn transaction_pool(&self) -> &Pool<Transaction> {
        &self.transactions
    }

    // -- selections ------------------------------------------------------

    /// The assignable `"Category: Row"` options in display order, starting
    /// with the blank (unassigned) option. Rows with empty or all-space
    /// names are skipped.
    pub fn selection_options(&self) -> Vec<String> {
        let mut options = vec![String::new()];
        for category_id in self.category_ids() {
            let Some(category) = self.categories.get(category_id) else {
                continue;
            };
            for row_id in &category.rows {
                let Some(row) = self.rows.get(*row_id) else {
                    continue;
                };
                if row.has_usable_name() {
                    options.push(selection_key(category.name(), row.name()));
                }
            }
        }
        options
    }
}
