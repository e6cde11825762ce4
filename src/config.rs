//! Importer configuration: which CSV header names map to which roles.
//!
//! `config.conf` reuses the `#section` style of the save format, with
//! whitespace-separated synonym tokens under `#date`, `#amount`, and
//! `#description`. A missing file is first-run, not an error: the built-in
//! synonym sets apply.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;

use crate::errors::{BudgetError, Result};

pub const SECTION_DATE: &str = "#date";
pub const SECTION_AMOUNT: &str = "#amount";
pub const SECTION_DESCRIPTION: &str = "#description";

/// The column role a CSV header can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Date,
    Amount,
    Description,
}

/// Acceptable header names per column role.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportConfig {
    pub date_names: Vec<String>,
    pub amount_names: Vec<String>,
    pub desc_names: Vec<String>,
}

static DEFAULTS: Lazy<ImportConfig> = Lazy::new(|| ImportConfig {
    date_names: to_vec(&["date", "Date", "DATE"]),
    amount_names: to_vec(&["amount", "Amount", "AMOUNT"]),
    desc_names: to_vec(&["description", "Description", "desc", "Desc", "Memo"]),
});

fn to_vec(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

impl Default for ImportConfig {
    fn default() -> Self {
        DEFAULTS.clone()
    }
}

impl ImportConfig {
    /// Maps a CSV header cell to its role, if any synonym matches it
    /// case-insensitively after trimming.
    pub fn role_of(&self, header: &str) -> Option<ColumnRole> {
        let header = header.trim();
        let matches = |names: &[String]| {
            names
                .iter()
                .any(|name| name.eq_ignore_ascii_case(header))
        };
        if matches(&self.date_names) {
            Some(ColumnRole::Date)
        } else if matches(&self.amount_names) {
            Some(ColumnRole::Amount)
        } else if matches(&self.desc_names) {
            Some(ColumnRole::Description)
        } else {
            None
        }
    }

    /// Loads from `config.conf`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no importer config found, using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut config = ImportConfig {
            date_names: Vec::new(),
            amount_names: Vec::new(),
            desc_names: Vec::new(),
        };
        let mut current: Option<ColumnRole> = None;
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('#') {
                current = Some(match line {
                    SECTION_DATE => ColumnRole::Date,
                    SECTION_AMOUNT => ColumnRole::Amount,
                    SECTION_DESCRIPTION => ColumnRole::Description,
                    other => {
                        return Err(BudgetError::parse(
                            index + 1,
                            format!("unknown config section `{}`", other),
                        ))
                    }
                });
                continue;
            }
            let Some(role) = current else {
                return Err(BudgetError::parse(
                    index + 1,
                    "synonym token before any section",
                ));
            };
            let bucket = match role {
                ColumnRole::Date => &mut config.date_names,
                ColumnRole::Amount => &mut config.amount_names,
                ColumnRole::Description => &mut config.desc_names,
            };
            bucket.extend(line.split_whitespace().map(|token| token.to_string()));
        }
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.render())?;
        Ok(())
    }

    fn render(&self) -> String {
        let mut out = String::new();
        for (section, names) in [
            (SECTION_DATE, &self.date_names),
            (SECTION_AMOUNT, &self.amount_names),
            (SECTION_DESCRIPTION, &self.desc_names),
        ] {
            out.push_str(section);
            out.push('\n');
            for name in names {
                out.push_str(name);
                out.push('\n');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_recognize_common_headers() {
        let config = ImportConfig::default();
        assert_eq!(config.role_of("Date"), Some(ColumnRole::Date));
        assert_eq!(config.role_of(" AMOUNT "), Some(ColumnRole::Amount));
        assert_eq!(config.role_of("Desc"), Some(ColumnRole::Description));
        assert_eq!(config.role_of("Balance"), None);
    }

    #[test]
    fn parse_round_trips_synonym_sets() {
        let config = ImportConfig {
            date_names: to_vec(&["When", "Posted"]),
            amount_names: to_vec(&["Value"]),
            desc_names: to_vec(&["Memo", "Note"]),
        };
        let restored = ImportConfig::parse(&config.render()).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn tokens_split_on_whitespace() {
        let config = ImportConfig::parse("#date\ndate Date DATE\n#amount\namt\n").unwrap();
        assert_eq!(config.date_names.len(), 3);
        assert_eq!(config.role_of("amt"), Some(ColumnRole::Amount));
        assert!(config.desc_names.is_empty());
    }

    #[test]
    fn unknown_section_is_reported() {
        let err = ImportConfig::parse("#colour\nred\n").unwrap_err();
        assert!(matches!(err, BudgetError::Parse { line: 1, .. }));
    }
}
