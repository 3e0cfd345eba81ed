use crate::mangle::Initialisms;
use crate::sql::Dialect;

/// Prefix shared by the nullable wrapper types, e.g. `null.Int64`.
pub const DEFAULT_NULLABLE_PREFIX: &str = "null.";

/// Settings for one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub dialect: Dialect,
    pub initialisms: Initialisms,
    /// Stripped from a nullable column's type to name its inner value.
    pub nullable_prefix: String,
    /// Tables to generate for; empty means all of them.
    pub tables: Vec<String>,
    pub exclude: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            initialisms: Initialisms::default(),
            nullable_prefix: DEFAULT_NULLABLE_PREFIX.to_string(),
            tables: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

impl Config {
    pub fn includes(&self, table: &str) -> bool {
        let selected = self.tables.is_empty() || self.tables.iter().any(|t| t == table);
        selected && !self.exclude.iter().any(|t| t == table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.dialect, Dialect::Auto);
        assert_eq!(config.nullable_prefix, "null.");
        assert!(config.initialisms.contains("id"));
        assert!(config.includes("users"));
    }

    #[test]
    fn test_table_selection() {
        let config = Config {
            tables: vec!["users".to_string(), "posts".to_string()],
            exclude: vec!["posts".to_string()],
            ..Config::default()
        };
        assert!(config.includes("users"));
        assert!(!config.includes("posts"));
        assert!(!config.includes("tags"));
    }
}
