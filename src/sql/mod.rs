//! Schema loading from SQL dumps, plus the per-dialect capability table.

mod dialect;
mod lexer;
mod parser;
mod types;

pub use dialect::{AutoIncrement, Capabilities, Dialect};
pub use lexer::LexError;
pub use parser::{SqlParseError, parse_sql};
pub use types::{map_type, nullable_type};

use crate::schema::{Schema, SchemaError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Parse error: {0}")]
    Parse(#[from] SqlParseError),
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
}

/// Parse a dump and finalize it into an immutable [`Schema`].
pub fn load_schema(input: &str, dialect: Dialect) -> Result<Schema, LoadError> {
    let tables = parse_sql(input, dialect)?;
    Ok(Schema::new(tables)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_schema_resolves_relationships() {
        let sql = r#"
            CREATE TABLE users (id SERIAL PRIMARY KEY, name TEXT NOT NULL);
            CREATE TABLE posts (
                id SERIAL PRIMARY KEY,
                author_id INT NOT NULL REFERENCES users (id),
                editor_id INT REFERENCES users (id)
            );
        "#;

        let schema = load_schema(sql, Dialect::PostgreSQL).unwrap();
        let posts = schema.get_table("posts").unwrap();
        assert!(!posts.foreign_keys[0].nullable);
        assert!(posts.foreign_keys[1].nullable);

        let users = schema.get_table("users").unwrap();
        assert_eq!(users.to_many_relationships.len(), 2);
    }

    #[test]
    fn test_load_schema_dangling_reference() {
        let sql = "CREATE TABLE posts (id INT PRIMARY KEY, user_id INT REFERENCES users (id));";
        let err = load_schema(sql, Dialect::Generic).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Schema(SchemaError::UnknownTable(ref name)) if name == "users"
        ));
    }
}
