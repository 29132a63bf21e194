//! Column → descriptive text lookup.
//!
//! The bundled table is compiled in; an optional user table can add to or
//! override it.  Lookups never fail: unknown or blank entries resolve to
//! [`DEFAULT_INFO`].

use std::collections::HashMap;
use std::path::Path;

use super::error::InfoTableError;
use super::forecast::Column;

/// Text shown for columns without a description.
pub const DEFAULT_INFO: &str =
    "No description is available for this series yet. The plot shows the historical values \
     followed by the forecast for the selected number of steps ahead.";

const BUNDLED_TABLE: &str = include_str!("../../assets/info.json");

#[derive(Debug, Clone, Default)]
pub struct InfoResolver {
    table: HashMap<String, String>,
}

impl InfoResolver {
    /// Resolver over the bundled table.
    pub fn bundled() -> Self {
        let table = match parse_table(BUNDLED_TABLE) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!("bundled info table unreadable: {e}");
                HashMap::new()
            }
        };
        Self::from_map(table)
    }

    pub fn from_map(table: HashMap<String, String>) -> Self {
        Self { table }
    }

    /// Bundled table overlaid with `path`.  A missing or malformed file is
    /// logged and ignored.
    pub fn load(path: Option<&Path>) -> Self {
        let mut resolver = Self::bundled();
        if let Some(path) = path {
            match read_table(path) {
                Ok(extra) => {
                    tracing::debug!("loaded {} info entries from {}", extra.len(), path.display());
                    resolver.table.extend(extra);
                }
                Err(e) => tracing::warn!("ignoring info table {}: {e}", path.display()),
            }
        }
        resolver
    }

    pub fn resolve(&self, column: &Column) -> &str {
        match self.table.get(column.as_str()) {
            Some(text) if !text.trim().is_empty() => text.as_str(),
            _ => DEFAULT_INFO,
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }
}

fn read_table(path: &Path) -> Result<HashMap<String, String>, InfoTableError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(parse_table(&contents)?)
}

fn parse_table(contents: &str) -> Result<HashMap<String, String>, serde_json::Error> {
    serde_json::from_str(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn bundled_table_knows_default_column() {
        let info = InfoResolver::bundled();
        assert!(info.len() > 0);
        let text = info.resolve(&"Space economy".into());
        assert_ne!(text, DEFAULT_INFO);
        assert!(text.contains("space economy"));
    }

    #[test]
    fn unknown_columns_fall_back() {
        let info = InfoResolver::bundled();
        for name in ["", "nope", "space economy", "Space economy "] {
            assert_eq!(info.resolve(&name.into()), DEFAULT_INFO, "{name:?}");
        }
    }

    #[test]
    fn blank_entry_falls_back() {
        let mut table = HashMap::new();
        table.insert("Farms".to_string(), "   ".to_string());
        let info = InfoResolver::from_map(table);
        assert_eq!(info.resolve(&"Farms".into()), DEFAULT_INFO);
    }

    #[test]
    fn user_table_overrides_bundled() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"Space economy": "custom", "Farms": "crops"}}"#).unwrap();
        let info = InfoResolver::load(Some(file.path()));
        assert_eq!(info.resolve(&"Space economy".into()), "custom");
        assert_eq!(info.resolve(&"Farms".into()), "crops");
        assert_ne!(info.resolve(&"Manufacturing".into()), DEFAULT_INFO);
    }

    #[test]
    fn malformed_user_table_is_ignored() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2, 3]").unwrap();
        let info = InfoResolver::load(Some(file.path()));
        assert_eq!(info.len(), InfoResolver::bundled().len());

        let missing = InfoResolver::load(Some(Path::new("/definitely/not/here.json")));
        assert_eq!(missing.len(), InfoResolver::bundled().len());
    }
}
