//! On-disk layout and persistence envelope.
//!
//! `<base>/budget.b` holds the flat-file save, `<base>/config.conf` the
//! importer synonyms, and `<base>/backups/` timestamped copies. Saves are
//! staged to a temporary file and renamed into place so a failed write
//! cannot clobber the previous save.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::config::ImportConfig;
use crate::errors::{BudgetError, Result};
use crate::format::{read_book, write_book};
use crate::model::BudgetBook;

const SAVE_FILE: &str = "budget.b";
const CONFIG_FILE: &str = "config.conf";
const BACKUP_DIR: &str = "backups";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const BACKUP_NOTE_MAX: usize = 24;

/// Overrides the default base directory; used by tests and scripts.
pub const HOME_ENV: &str = "BUDGETEER_HOME";

pub struct BookStore {
    base_dir: PathBuf,
}

impl BookStore {
    pub fn new(base_dir: PathBuf) -> Result<Self> {
        ensure_dir(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// Resolves `$BUDGETEER_HOME`, falling back to `~/.budgeteer`.
    pub fn new_default() -> Result<Self> {
        if let Some(base) = std::env::var_os(HOME_ENV) {
            return Self::new(PathBuf::from(base));
        }
        let home = dirs::home_dir()
            .ok_or_else(|| BudgetError::Storage("cannot resolve home directory".into()))?;
        Self::new(home.join(".budgeteer"))
    }

    pub fn book_path(&self) -> PathBuf {
        self.base_dir.join(SAVE_FILE)
    }

    pub fn config_path(&self) -> PathBuf {
        self.base_dir.join(CONFIG_FILE)
    }

    fn backups_dir(&self) -> PathBuf {
        self.base_dir.join(BACKUP_DIR)
    }

    /// Loads the saved book. Missing or zero-length files mean first run and
    /// yield `None` rather than an error.
    pub fn load(&self) -> Result<Option<BudgetBook>> {
        let path = self.book_path();
        if !path.exists() {
            tracing::info!(path = %path.display(), "no saved budget yet");
            return Ok(None);
        }
        let text = fs::read_to_string(&path)?;
        if text.is_empty() {
            tracing::info!(path = %path.display(), "saved budget is empty");
            return Ok(None);
        }
        Ok(Some(read_book(&text)?))
    }

    /// Writes the book atomically by staging to a `.tmp` sibling.
    pub fn save(&self, book: &BudgetBook) -> Result<PathBuf> {
        let path = self.book_path();
        let text = write_book(book)?;
        let tmp = path.with_extension("b.tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &path)?;
        tracing::debug!(path = %path.display(), "budget saved");
        Ok(path)
    }

    /// Snapshots the book under `backups/budget_<timestamp>[_<note>].b` and
    /// returns the backup file name.
    pub fn backup(&self, book: &BudgetBook, note: Option<&str>) -> Result<String> {
        let backups = self.backups_dir();
        ensure_dir(&backups)?;
        let timestamp = Local::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut name = format!("budget_{}", timestamp);
        if let Some(label) = sanitize_note(note) {
            name.push('_');
            name.push_str(&label);
        }
        name.push_str(".b");
        fs::write(backups.join(&name), write_book(book)?)?;
        Ok(name)
    }

    /// Backup file names, most recent first.
    pub fn list_backups(&self) -> Result<Vec<String>> {
        let backups = self.backups_dir();
        if !backups.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&backups)? {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                if name.starts_with("budget_") && name.ends_with(".b") {
                    names.push(name.to_string());
                }
            }
        }
        names.sort_by(|a, b| b.cmp(a));
        Ok(names)
    }

    pub fn restore_backup(&self, name: &str) -> Result<BudgetBook> {
        let path = self.backups_dir().join(name);
        if !path.exists() {
            return Err(BudgetError::Storage(format!(
                "backup `{}` not found",
                name
            )));
        }
        let text = fs::read_to_string(&path)?;
        read_book(&text)
    }

    pub fn load_import_config(&self) -> Result<ImportConfig> {
        ImportConfig::load(&self.config_path())
    }

    pub fn save_import_config(&self, config: &ImportConfig) -> Result<()> {
        config.save(&self.config_path())
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Keeps backup notes filesystem-safe: alphanumerics, dashes, and
/// underscores only, capped in length.
fn sanitize_note(note: Option<&str>) -> Option<String> {
    let note = note?.trim();
    if note.is_empty() {
        return None;
    }
    let cleaned: String = note
        .chars()
        .take(BACKUP_NOTE_MAX)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    Some(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notes_are_sanitized() {
        assert_eq!(sanitize_note(Some("before rent!")).unwrap(), "before_rent_");
        assert_eq!(sanitize_note(Some("   ")), None);
        assert_eq!(sanitize_note(None), None);
    }
}
