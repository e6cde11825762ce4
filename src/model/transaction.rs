use crate::amount::EditableAmount;

/// A dated monetary entry owned by one month.
///
/// `selection` is the exact `"Category: Row"` composite key tying the
/// transaction to a row; matching is full-string, case-sensitive equality.
#[derive(Debug, Clone, Default)]
pub struct Transaction {
    pub date: String,
    pub amount: EditableAmount,
    pub description: String,
    pub selection: String,
    pub muted: bool,
}

impl Transaction {
    pub fn new(
        date: impl Into<String>,
        amount: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            amount: EditableAmount::new(amount.into()),
            description: description.into(),
            selection: String::new(),
            muted: false,
        }
    }
}

/// Builds the composite key a transaction's `selection` must equal exactly
/// to count toward a row.
pub fn selection_key(category: &str, row: &str) -> String {
    format!("{}: {}", category, row)
}
