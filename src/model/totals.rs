use crate::amount::round_cents;

/// Derived snapshot of a time scope (month, quarter, half, or year).
///
/// `saved = budget - spent` and `goal = budget - planned`; for multi-month
/// scopes both are summed per month rather than re-derived from the summed
/// planned/spent figures.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub planned: f64,
    pub spent: f64,
    pub diff: f64,
    pub saved: f64,
    pub goal: f64,
}

impl Totals {
    /// Adds `other` field-by-field, rounding each sum to cents.
    pub fn accumulate(&mut self, other: &Totals) {
        self.planned = round_cents(self.planned + other.planned);
        self.spent = round_cents(self.spent + other.spent);
        self.diff = round_cents(self.diff + other.diff);
        self.saved = round_cents(self.saved + other.saved);
        self.goal = round_cents(self.goal + other.goal);
    }
}
