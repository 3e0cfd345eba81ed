//! Normalized schema snapshot handed to the generator by a schema driver.
//!
//! Drivers fill in [`Table`]s with columns, keys and outgoing foreign keys.
//! [`Schema::new`] then derives everything that depends on the whole table
//! set (join tables, foreign key nullability, incoming to-many relationships)
//! and freezes the result.

use crate::sql::Dialect;
use log::debug;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("Unknown table: {0}")]
    UnknownTable(String),
    #[error("Unknown column {column} on table {table}")]
    UnknownColumn { table: String, column: String },
    #[error("Key column {0} is not among the supplied columns")]
    MissingKeyColumn(String),
    #[error("Primary key predicate requested for an empty key")]
    EmptyPrimaryKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Column {
    pub name: String,
    /// Target-language type, e.g. `int64` or `null.String`.
    pub typ: String,
    /// Type as declared in the database.
    pub db_type: String,
    pub nullable: bool,
    /// Default expression; empty when the column has none.
    pub default: String,
}

impl Column {
    pub fn new(name: impl Into<String>, typ: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            typ: typ.into(),
            ..Self::default()
        }
    }

    pub fn has_default(&self) -> bool {
        !self.default.is_empty()
    }

    /// Whether the default marks a server-generated value for `dialect`.
    pub fn is_auto_increment(&self, dialect: Dialect) -> bool {
        dialect.capabilities().is_auto_increment(&self.default)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PrimaryKey {
    pub name: String,
    /// Constituent columns, in key order.
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ForeignKey {
    pub name: String,
    pub column: String,
    pub nullable: bool,
    pub foreign_table: String,
    pub foreign_column: String,
    pub foreign_column_nullable: bool,
    /// Set when the owning table is a join table.
    pub in_join_table: bool,
}

/// An incoming relationship, seen from the referenced table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToManyRelationship {
    /// Local column the foreign side points at.
    pub column: String,
    pub nullable: bool,
    pub foreign_table: String,
    /// Column on the foreign table pointing back at `column`.
    pub foreign_column: String,
    pub foreign_column_nullable: bool,

    pub to_join_table: bool,
    pub join_table: String,
    pub join_local_column: String,
    pub join_foreign_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub primary_key: Option<PrimaryKey>,
    pub foreign_keys: Vec<ForeignKey>,
    pub to_many_relationships: Vec<ToManyRelationship>,
    pub is_join_table: bool,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn get_column(&self, name: &str) -> Result<&Column, SchemaError> {
        self.find_column(name)
            .ok_or_else(|| SchemaError::UnknownColumn {
                table: self.name.clone(),
                column: name.to_string(),
            })
    }

    /// A join table only links two other tables: its two-column primary key
    /// is made entirely of foreign key columns and it carries nothing else.
    pub fn detect_join_table(&self) -> bool {
        let Some(pkey) = &self.primary_key else {
            return false;
        };
        if pkey.columns.len() != 2 || self.foreign_keys.len() < 2 || self.columns.len() > 2 {
            return false;
        }

        pkey.columns
            .iter()
            .all(|c| self.foreign_keys.iter().any(|f| &f.column == c))
    }
}

pub fn get_table<'a>(tables: &'a [Table], name: &str) -> Result<&'a Table, SchemaError> {
    tables
        .iter()
        .find(|t| t.name == name)
        .ok_or_else(|| SchemaError::UnknownTable(name.to_string()))
}

/// Immutable schema snapshot for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    tables: Vec<Table>,
}

impl Schema {
    pub fn new(mut tables: Vec<Table>) -> Result<Self, SchemaError> {
        for table in &mut tables {
            table.is_join_table = table.detect_join_table();
            if table.is_join_table {
                debug!("{} is a join table", table.name);
            }
        }

        set_foreign_key_nullability(&mut tables)?;

        let relationships = tables
            .iter()
            .map(|t| to_many_relationships(&t.name, &tables))
            .collect::<Vec<_>>();
        for (table, rels) in tables.iter_mut().zip(relationships) {
            debug!(
                "{}: {} foreign keys, {} to-many relationships",
                table.name,
                table.foreign_keys.len(),
                rels.len()
            );
            table.to_many_relationships = rels;
        }

        Ok(Self { tables })
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn get_table(&self, name: &str) -> Result<&Table, SchemaError> {
        get_table(&self.tables, name)
    }
}

fn set_foreign_key_nullability(tables: &mut [Table]) -> Result<(), SchemaError> {
    let view: &[Table] = tables;
    let mut resolved = Vec::with_capacity(view.len());
    for table in view {
        let mut flags = Vec::with_capacity(table.foreign_keys.len());
        for fkey in &table.foreign_keys {
            let local = table.get_column(&fkey.column)?;
            let foreign = get_table(view, &fkey.foreign_table)?.get_column(&fkey.foreign_column)?;
            flags.push((local.nullable, foreign.nullable));
        }
        resolved.push(flags);
    }

    for (table, flags) in tables.iter_mut().zip(resolved) {
        let in_join_table = table.is_join_table;
        for (fkey, (nullable, foreign_nullable)) in table.foreign_keys.iter_mut().zip(flags) {
            fkey.nullable = nullable;
            fkey.foreign_column_nullable = foreign_nullable;
            fkey.in_join_table = in_join_table;
        }
    }

    Ok(())
}

/// Collect every foreign key in `tables` that references `name`.
fn to_many_relationships(name: &str, tables: &[Table]) -> Vec<ToManyRelationship> {
    let mut relationships = Vec::new();

    for table in tables {
        for fkey in table.foreign_keys.iter().filter(|f| f.foreign_table == name) {
            if !table.is_join_table {
                relationships.push(ToManyRelationship {
                    column: fkey.foreign_column.clone(),
                    nullable: fkey.foreign_column_nullable,
                    foreign_table: table.name.clone(),
                    foreign_column: fkey.column.clone(),
                    foreign_column_nullable: fkey.nullable,
                    ..ToManyRelationship::default()
                });
                continue;
            }

            // The far side is whatever the join table's other key points at.
            for other in table.foreign_keys.iter().filter(|f| f.column != fkey.column) {
                relationships.push(ToManyRelationship {
                    column: fkey.foreign_column.clone(),
                    nullable: fkey.foreign_column_nullable,
                    foreign_table: other.foreign_table.clone(),
                    foreign_column: other.foreign_column.clone(),
                    foreign_column_nullable: other.foreign_column_nullable,
                    to_join_table: true,
                    join_table: table.name.clone(),
                    join_local_column: fkey.column.clone(),
                    join_foreign_column: other.column.clone(),
                });
            }
        }
    }

    relationships
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, typ: &str, nullable: bool) -> Column {
        Column {
            nullable,
            ..Column::new(name, typ)
        }
    }

    fn fkey(column: &str, foreign_table: &str, foreign_column: &str) -> ForeignKey {
        ForeignKey {
            name: format!("{}_fkey", column),
            column: column.to_string(),
            foreign_table: foreign_table.to_string(),
            foreign_column: foreign_column.to_string(),
            ..ForeignKey::default()
        }
    }

    fn pkey(columns: &[&str]) -> Option<PrimaryKey> {
        Some(PrimaryKey {
            name: "pkey".to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        })
    }

    fn blog_tables() -> Vec<Table> {
        let users = Table {
            columns: vec![column("id", "int", false), column("name", "string", false)],
            primary_key: pkey(&["id"]),
            ..Table::new("users")
        };
        let posts = Table {
            columns: vec![
                column("id", "int", false),
                column("author_id", "int", false),
                column("editor_id", "null.Int", true),
            ],
            primary_key: pkey(&["id"]),
            foreign_keys: vec![fkey("author_id", "users", "id"), fkey("editor_id", "users", "id")],
            ..Table::new("posts")
        };
        let tags = Table {
            columns: vec![column("id", "int", false)],
            primary_key: pkey(&["id"]),
            ..Table::new("tags")
        };
        let post_tags = Table {
            columns: vec![column("post_id", "int", false), column("tag_id", "int", false)],
            primary_key: pkey(&["post_id", "tag_id"]),
            foreign_keys: vec![fkey("post_id", "posts", "id"), fkey("tag_id", "tags", "id")],
            ..Table::new("post_tags")
        };
        vec![users, posts, tags, post_tags]
    }

    #[test]
    fn test_get_table_and_column() {
        let schema = Schema::new(blog_tables()).unwrap();
        let posts = schema.get_table("posts").unwrap();
        assert_eq!(posts.get_column("author_id").unwrap().typ, "int");

        assert_eq!(
            schema.get_table("nope"),
            Err(SchemaError::UnknownTable("nope".to_string()))
        );
        assert!(matches!(
            posts.get_column("nope"),
            Err(SchemaError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn test_join_table_detection() {
        let schema = Schema::new(blog_tables()).unwrap();
        assert!(schema.get_table("post_tags").unwrap().is_join_table);
        assert!(!schema.get_table("posts").unwrap().is_join_table);

        let mut with_payload = schema.get_table("post_tags").unwrap().clone();
        with_payload.columns.push(column("created_at", "time.Time", false));
        assert!(!with_payload.detect_join_table());
    }

    #[test]
    fn test_foreign_key_nullability() {
        let schema = Schema::new(blog_tables()).unwrap();
        let posts = schema.get_table("posts").unwrap();

        assert!(!posts.foreign_keys[0].nullable);
        assert!(posts.foreign_keys[1].nullable);
        assert!(!posts.foreign_keys[1].foreign_column_nullable);

        let post_tags = schema.get_table("post_tags").unwrap();
        assert!(post_tags.foreign_keys.iter().all(|f| f.in_join_table));
    }

    #[test]
    fn test_to_many_inference() {
        let schema = Schema::new(blog_tables()).unwrap();
        let users = schema.get_table("users").unwrap();

        assert_eq!(users.to_many_relationships.len(), 2);
        assert_eq!(users.to_many_relationships[0].foreign_table, "posts");
        assert_eq!(users.to_many_relationships[0].foreign_column, "author_id");
        assert_eq!(users.to_many_relationships[1].foreign_column, "editor_id");
        assert!(users.to_many_relationships[1].foreign_column_nullable);
    }

    #[test]
    fn test_to_many_through_join_table() {
        let schema = Schema::new(blog_tables()).unwrap();
        let posts = schema.get_table("posts").unwrap();

        assert_eq!(posts.to_many_relationships.len(), 1);
        let rel = &posts.to_many_relationships[0];
        assert!(rel.to_join_table);
        assert_eq!(rel.column, "id");
        assert_eq!(rel.foreign_table, "tags");
        assert_eq!(rel.foreign_column, "id");
        assert_eq!(rel.join_table, "post_tags");
        assert_eq!(rel.join_local_column, "post_id");
        assert_eq!(rel.join_foreign_column, "tag_id");
    }

    #[test]
    fn test_dangling_foreign_key() {
        let mut tables = blog_tables();
        tables[1].foreign_keys.push(fkey("id", "missing", "id"));
        assert_eq!(
            Schema::new(tables),
            Err(SchemaError::UnknownTable("missing".to_string()))
        );
    }
}
