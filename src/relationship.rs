//! Names and assignment expressions for relationship accessors.
//!
//! Every lookup goes through the schema, so a foreign key pointing at a
//! table or column the schema does not have surfaces as a [`SchemaError`]
//! instead of half-derived text.

use crate::config::Config;
use crate::mangle::{plural, singular};
use crate::schema::{Column, ForeignKey, Schema, SchemaError, Table, ToManyRelationship};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToOneTable {
    pub name: String,
    pub column_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RelationshipFunction {
    pub name: String,
    pub receiver: String,
    /// How to read the local join column.
    pub local_assignment: String,
    /// How to read the foreign join column.
    pub foreign_assignment: String,
}

/// Texts for the accessor following an outgoing foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToOneTexts {
    pub local_table: ToOneTable,
    pub foreign_table: ToOneTable,
    pub function: RelationshipFunction,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToManyLocal {
    pub name: String,
    pub name_singular: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToManyForeign {
    pub name: String,
    pub name_singular: String,
    pub name_plural: String,
    pub name_human_readable: String,
    /// Collection type, e.g. `postSlice`.
    pub slice: String,
}

/// Texts for the accessor collecting the rows that point at a table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToManyTexts {
    pub local_table: ToManyLocal,
    pub foreign_table: ToManyForeign,
    pub function: RelationshipFunction,
}

pub struct RelationshipDeriver<'a> {
    schema: &'a Schema,
    config: &'a Config,
}

impl<'a> RelationshipDeriver<'a> {
    pub fn new(schema: &'a Schema, config: &'a Config) -> Self {
        Self { schema, config }
    }

    pub fn to_one(&self, table: &Table, fkey: &ForeignKey) -> Result<ToOneTexts, SchemaError> {
        let local_column = table.get_column(&fkey.column)?;
        let foreign_column = self
            .schema
            .get_table(&fkey.foreign_table)?
            .get_column(&fkey.foreign_column)?;

        Ok(ToOneTexts {
            local_table: ToOneTable {
                name: self.title(&singular(strip_id(&table.name))),
                column_name: self.title(&singular(strip_id(&fkey.column))),
            },
            foreign_table: ToOneTable {
                name: self.title(&singular(&fkey.foreign_table)),
                column_name: self.title(&singular(strip_id(&fkey.foreign_column))),
            },
            function: RelationshipFunction {
                name: self.camel(&singular(&fkey.foreign_table)),
                receiver: receiver(&table.name),
                local_assignment: self.assignment(local_column, fkey.nullable),
                foreign_assignment: self.assignment(foreign_column, fkey.foreign_column_nullable),
            },
        })
    }

    pub fn to_many(
        &self,
        table: &Table,
        rel: &ToManyRelationship,
    ) -> Result<ToManyTexts, SchemaError> {
        let local_column = table.get_column(&rel.column)?;
        let foreign_column = self
            .schema
            .get_table(&rel.foreign_table)?
            .get_column(&rel.foreign_column)?;

        let local_singular = singular(&table.name);
        let foreign_singular = singular(&rel.foreign_table);
        let foreign_plural = self.title(&plural(&rel.foreign_table));

        // Several keys from the same table need the key column in the name.
        let column = strip_id(&rel.foreign_column);
        let name = if rel.to_join_table || local_singular == column {
            foreign_plural.clone()
        } else {
            format!("{}{}", self.title(column), foreign_plural)
        };

        Ok(ToManyTexts {
            local_table: ToManyLocal {
                name: self.title(&local_singular),
                name_singular: local_singular,
            },
            foreign_table: ToManyForeign {
                name: self.title(&foreign_singular),
                slice: format!("{}Slice", self.camel(&foreign_singular)),
                name_singular: foreign_singular,
                name_plural: foreign_plural,
                name_human_readable: rel.foreign_table.replace('_', " "),
            },
            function: RelationshipFunction {
                name,
                receiver: receiver(&table.name),
                local_assignment: self.assignment(local_column, rel.nullable),
                foreign_assignment: self.assignment(foreign_column, rel.foreign_column_nullable),
            },
        })
    }

    /// `AuthorID` for a plain column, `AuthorID.Int64` when the value sits
    /// inside a nullable wrapper.
    fn assignment(&self, column: &Column, nullable: bool) -> String {
        let name = self.title(&column.name);
        if !nullable {
            return name;
        }

        let prefix = self.config.nullable_prefix.as_str();
        let inner = column.typ.strip_prefix(prefix).unwrap_or(&column.typ);
        format!("{}.{}", name, inner)
    }

    fn title(&self, name: &str) -> String {
        self.config.initialisms.title_case(name)
    }

    fn camel(&self, name: &str) -> String {
        self.config.initialisms.camel_case(name)
    }
}

fn strip_id(name: &str) -> &str {
    name.strip_suffix("_id").unwrap_or(name)
}

/// Lower-cased first letter of the table name.
pub(crate) fn receiver(table: &str) -> String {
    table
        .chars()
        .next()
        .map(|c| c.to_lowercase().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::{Dialect, load_schema};

    const BLOG: &str = r#"
        CREATE TABLE users (id SERIAL PRIMARY KEY, name TEXT NOT NULL);
        CREATE TABLE posts (
            id SERIAL PRIMARY KEY,
            author_id INT NOT NULL REFERENCES users (id),
            editor_id INT REFERENCES users (id)
        );
        CREATE TABLE comments (
            id SERIAL PRIMARY KEY,
            user_id INT NOT NULL REFERENCES users (id),
            body TEXT NOT NULL
        );
        CREATE TABLE tags (id SERIAL PRIMARY KEY);
        CREATE TABLE post_tags (
            post_id INT NOT NULL REFERENCES posts (id),
            tag_id INT NOT NULL REFERENCES tags (id),
            PRIMARY KEY (post_id, tag_id)
        );
    "#;

    fn blog() -> Schema {
        load_schema(BLOG, Dialect::PostgreSQL).unwrap()
    }

    #[test]
    fn test_to_one_texts() {
        let schema = blog();
        let config = Config::default();
        let deriver = RelationshipDeriver::new(&schema, &config);
        let posts = schema.get_table("posts").unwrap();

        let author = deriver.to_one(posts, &posts.foreign_keys[0]).unwrap();
        assert_eq!(author.local_table.name, "Post");
        assert_eq!(author.local_table.column_name, "Author");
        assert_eq!(author.foreign_table.name, "User");
        assert_eq!(author.foreign_table.column_name, "ID");
        assert_eq!(author.function.name, "user");
        assert_eq!(author.function.receiver, "p");
        assert_eq!(author.function.local_assignment, "AuthorID");
        assert_eq!(author.function.foreign_assignment, "ID");

        let editor = deriver.to_one(posts, &posts.foreign_keys[1]).unwrap();
        assert_eq!(editor.local_table.column_name, "Editor");
        assert_eq!(editor.function.local_assignment, "EditorID.Int");
        assert_eq!(editor.function.foreign_assignment, "ID");
    }

    #[test]
    fn test_to_one_nullable_foreign_column() {
        let schema = load_schema(
            r#"
            CREATE TABLE accounts (id SERIAL PRIMARY KEY, code TEXT UNIQUE);
            CREATE TABLE invoices (
                id SERIAL PRIMARY KEY,
                account_code TEXT REFERENCES accounts (code)
            );
            "#,
            Dialect::PostgreSQL,
        )
        .unwrap();
        let config = Config::default();
        let deriver = RelationshipDeriver::new(&schema, &config);

        let invoices = schema.get_table("invoices").unwrap();
        let fkey = &invoices.foreign_keys[0];
        assert!(fkey.foreign_column_nullable);

        let account = deriver.to_one(invoices, fkey).unwrap();
        assert_eq!(account.local_table.column_name, "AccountCode");
        assert_eq!(account.foreign_table.name, "Account");
        assert_eq!(account.foreign_table.column_name, "Code");
        assert_eq!(account.function.name, "account");
        assert_eq!(account.function.local_assignment, "AccountCode.String");
        assert_eq!(account.function.foreign_assignment, "Code.String");

        let accounts = schema.get_table("accounts").unwrap();
        let invoices_rel = deriver.to_many(accounts, &accounts.to_many_relationships[0]).unwrap();
        assert_eq!(invoices_rel.function.name, "AccountCodeInvoices");
        assert_eq!(invoices_rel.function.local_assignment, "Code.String");
        assert_eq!(invoices_rel.function.foreign_assignment, "AccountCode.String");
    }

    #[test]
    fn test_to_many_disambiguates_same_table_pair() {
        let schema = blog();
        let config = Config::default();
        let deriver = RelationshipDeriver::new(&schema, &config);
        let users = schema.get_table("users").unwrap();

        let names = users
            .to_many_relationships
            .iter()
            .map(|rel| deriver.to_many(users, rel).unwrap().function.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["AuthorPosts", "EditorPosts", "Comments"]);
    }

    #[test]
    fn test_to_many_texts() {
        let schema = blog();
        let config = Config::default();
        let deriver = RelationshipDeriver::new(&schema, &config);
        let users = schema.get_table("users").unwrap();

        let editor = deriver.to_many(users, &users.to_many_relationships[1]).unwrap();
        assert_eq!(editor.local_table.name, "User");
        assert_eq!(editor.local_table.name_singular, "user");
        assert_eq!(editor.foreign_table.name, "Post");
        assert_eq!(editor.foreign_table.name_singular, "post");
        assert_eq!(editor.foreign_table.name_plural, "Posts");
        assert_eq!(editor.foreign_table.name_human_readable, "posts");
        assert_eq!(editor.foreign_table.slice, "postSlice");
        assert_eq!(editor.function.receiver, "u");
        assert_eq!(editor.function.local_assignment, "ID");
        assert_eq!(editor.function.foreign_assignment, "EditorID.Int");
    }

    #[test]
    fn test_to_many_through_join_table() {
        let schema = blog();
        let config = Config::default();
        let deriver = RelationshipDeriver::new(&schema, &config);
        let posts = schema.get_table("posts").unwrap();

        let tags = deriver.to_many(posts, &posts.to_many_relationships[0]).unwrap();
        assert_eq!(tags.function.name, "Tags");
        assert_eq!(tags.foreign_table.slice, "tagSlice");
    }

    #[test]
    fn test_human_readable_and_nullable_prefix() {
        let schema = load_schema(
            r#"
            CREATE TABLE users (id BIGINT PRIMARY KEY);
            CREATE TABLE video_games (
                id BIGINT PRIMARY KEY,
                owner_id BIGINT REFERENCES users (id)
            );
            "#,
            Dialect::PostgreSQL,
        )
        .unwrap();
        let config = Config {
            nullable_prefix: "null.".to_string(),
            ..Config::default()
        };
        let deriver = RelationshipDeriver::new(&schema, &config);
        let users = schema.get_table("users").unwrap();

        let games = deriver.to_many(users, &users.to_many_relationships[0]).unwrap();
        assert_eq!(games.function.name, "OwnerVideoGames");
        assert_eq!(games.foreign_table.name_human_readable, "video games");
        assert_eq!(games.foreign_table.slice, "videoGameSlice");
        assert_eq!(games.function.foreign_assignment, "OwnerID.Int64");
    }

    #[test]
    fn test_missing_foreign_table_is_an_error() {
        let schema = blog();
        let config = Config::default();
        let deriver = RelationshipDeriver::new(&schema, &config);
        let users = schema.get_table("users").unwrap();

        let rel = ToManyRelationship {
            column: "id".to_string(),
            foreign_table: "ghosts".to_string(),
            foreign_column: "user_id".to_string(),
            ..ToManyRelationship::default()
        };
        assert_eq!(
            deriver.to_many(users, &rel),
            Err(SchemaError::UnknownTable("ghosts".to_string()))
        );

        let fkey = ForeignKey {
            column: "name".to_string(),
            foreign_table: "posts".to_string(),
            foreign_column: "nope".to_string(),
            ..ForeignKey::default()
        };
        assert_eq!(
            deriver.to_one(users, &fkey),
            Err(SchemaError::UnknownColumn {
                table: "posts".to_string(),
                column: "nope".to_string(),
            })
        );
    }
}
