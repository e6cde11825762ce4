use crate::model::pool::{Handle, Pool};
use crate::model::totals::Totals;
use crate::model::transaction::Transaction;

pub type TransactionId = Handle<Transaction>;

pub const MONTH_COUNT: usize = 12;

pub const MONTH_NAMES: [&str; MONTH_COUNT] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// One of the twelve fixed month slots.
#[derive(Debug, Clone, Default)]
pub struct Month {
    pub transactions: Vec<TransactionId>,
    /// User toggle excluding the whole month from rollups. Persisted.
    pub muted: bool,
    /// Cache of the last aggregation pass.
    pub totals: Totals,
}

impl Month {
    /// A month drops out of rollups when explicitly muted, or when it has
    /// transactions and every one of them is muted.
    pub fn effectively_muted(&self, pool: &Pool<Transaction>) -> bool {
        if self.muted {
            return true;
        }
        !self.transactions.is_empty()
            && self
                .transactions
                .iter()
                .all(|id| pool.get(*id).map(|tx| tx.muted).unwrap_or(true))
    }
}

/// Resolves a month name or prefix (case-insensitive) to its index.
pub fn month_index(name: &str) -> Option<usize> {
    let needle = name.trim().to_ascii_lowercase();
    if needle.is_empty() {
        return None;
    }
    if let Ok(number) = needle.parse::<usize>() {
        return (1..=MONTH_COUNT).contains(&number).then(|| number - 1);
    }
    let mut matched = None;
    for (index, month) in MONTH_NAMES.iter().enumerate() {
        if month.to_ascii_lowercase().starts_with(&needle) {
            if matched.is_some() {
                return None; // ambiguous prefix
            }
            matched = Some(index);
        }
    }
    matched
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_prefix_lookup() {
        assert_eq!(month_index("January"), Some(0));
        assert_eq!(month_index("dec"), Some(11));
        assert_eq!(month_index("3"), Some(2));
        // "Ma" could be March or May.
        assert_eq!(month_index("ma"), None);
        assert_eq!(month_index("mar"), Some(2));
        assert_eq!(month_index("xyz"), None);
    }
}
