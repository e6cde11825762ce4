use crate::model::row::Row;
use crate::model::pool::{Handle, Pool};

/// Longest category or row name the save format carries.
pub const NAME_MAX_BYTES: usize = 127;

pub type CategoryId = Handle<Category>;
pub type RowId = Handle<Row>;

/// A top-level budget grouping owning an ordered collection of rows.
///
/// `planned`, `spent`, and `diff` are caches refreshed by the aggregation
/// pass for the selected month; they are never authoritative.
#[derive(Debug, Clone, Default)]
pub struct Category {
    name: String,
    pub rows: Vec<RowId>,
    pub planned: f64,
    pub spent: f64,
    pub diff: f64,
    /// Whether the row list is expanded in views.
    pub draw_rows: bool,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        let mut category = Self {
            draw_rows: true,
            ..Self::default()
        };
        category.set_name(name);
        category
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replaces the name, truncating to [`NAME_MAX_BYTES`] on a character
    /// boundary.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = clamp_name(name.into());
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Derived: every owned row is muted. An empty category is not muted.
    pub fn muted(&self, rows: &Pool<Row>) -> bool {
        !self.rows.is_empty()
            && self
                .rows
                .iter()
                .all(|id| rows.get(*id).map(|row| row.muted).unwrap_or(true))
    }
}

pub(crate) fn clamp_name(mut name: String) -> String {
    if name.len() > NAME_MAX_BYTES {
        let mut end = NAME_MAX_BYTES;
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        name.truncate(end);
    }
    name
}
