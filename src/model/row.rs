use crate::amount::EditableAmount;
use crate::model::category::clamp_name;

/// A single budget line item within a category.
///
/// `planned` is user-edited text; `spent` and `diff` are derived each
/// aggregation pass and never edited directly.
#[derive(Debug, Clone, Default)]
pub struct Row {
    name: String,
    pub planned: EditableAmount,
    pub spent: f64,
    pub diff: f64,
    pub muted: bool,
}

impl Row {
    pub fn new(name: impl Into<String>) -> Self {
        let mut row = Self::default();
        row.set_name(name);
        row
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = clamp_name(name.into());
    }

    /// Rows named only whitespace are excluded from selection options.
    pub fn has_usable_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}
