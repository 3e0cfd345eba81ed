//! SQL parser for CREATE TABLE / ALTER TABLE statements.

use super::dialect::Dialect;
use super::lexer::{LexError, Lexer, Token};
use super::types::map_type;
use crate::schema::{Column, ForeignKey, PrimaryKey, Table};
use log::debug;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlParseError {
    #[error("Lex error: {0}")]
    Lex(#[from] LexError),
    #[error("Expected {expected}, found {found:?}")]
    Expected { expected: &'static str, found: Token },
    #[error("Unexpected end of input")]
    UnexpectedEof,
    #[error("Foreign key on {table} pairs {columns} column(s) with {targets} referenced column(s)")]
    ForeignKeyArity {
        table: String,
        columns: usize,
        targets: usize,
    },
    #[error("ALTER TABLE on undeclared table {0}")]
    UnknownAlterTarget(String),
}

/// Parse a schema dump into driver-level tables (not yet finalized).
pub fn parse_sql(input: &str, dialect: Dialect) -> Result<Vec<Table>, SqlParseError> {
    let dialect = dialect.resolve(input);
    debug!("parsing schema dump as {:?}", dialect);
    let tokens = Lexer::new(input).tokenize()?;
    Parser::new(tokens, dialect).parse()
}

struct TableDraft {
    name: String,
    columns: Vec<ColumnDraft>,
    primary_key: Option<(Option<String>, Vec<String>)>,
    foreign_keys: Vec<ForeignKeyDraft>,
}

struct ColumnDraft {
    name: String,
    raw_type: String,
    not_null: bool,
    primary_key: bool,
    serial: bool,
    auto_increment: bool,
    default: String,
}

struct ForeignKeyDraft {
    name: Option<String>,
    columns: Vec<String>,
    target: String,
    target_columns: Vec<String>,
}

impl TableDraft {
    fn finish(self, dialect: Dialect) -> Result<Table, SqlParseError> {
        let (pkey_name, pkey_columns) = match self.primary_key {
            Some((name, columns)) => (name, columns),
            None => (
                None,
                self.columns
                    .iter()
                    .filter(|c| c.primary_key)
                    .map(|c| c.name.clone())
                    .collect(),
            ),
        };

        let columns = self
            .columns
            .into_iter()
            .map(|c| {
                let nullable = !(c.not_null || pkey_columns.contains(&c.name));
                let default = if c.default.is_empty() && (c.serial || c.auto_increment) {
                    dialect
                        .auto_increment_default(&self.name, &c.name)
                        .unwrap_or_default()
                } else {
                    c.default
                };
                Column {
                    typ: map_type(&c.raw_type, dialect, nullable),
                    db_type: c.raw_type.to_lowercase(),
                    nullable,
                    default,
                    name: c.name,
                }
            })
            .collect();

        let primary_key = (!pkey_columns.is_empty()).then(|| PrimaryKey {
            name: pkey_name.unwrap_or_else(|| format!("{}_pkey", self.name)),
            columns: pkey_columns,
        });

        let mut foreign_keys = Vec::new();
        for fk in self.foreign_keys {
            if fk.columns.len() != fk.target_columns.len() {
                return Err(SqlParseError::ForeignKeyArity {
                    table: self.name,
                    columns: fk.columns.len(),
                    targets: fk.target_columns.len(),
                });
            }
            for (column, foreign_column) in fk.columns.into_iter().zip(fk.target_columns) {
                foreign_keys.push(ForeignKey {
                    name: fk
                        .name
                        .clone()
                        .unwrap_or_else(|| format!("{}_{}_fkey", self.name, column)),
                    column,
                    foreign_table: fk.target.clone(),
                    foreign_column,
                    ..ForeignKey::default()
                });
            }
        }

        Ok(Table {
            name: self.name,
            columns,
            primary_key,
            foreign_keys,
            ..Table::default()
        })
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    dialect: Dialect,
}

impl Parser {
    fn new(tokens: Vec<Token>, dialect: Dialect) -> Self {
        Self {
            tokens,
            pos: 0,
            dialect,
        }
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.current() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        match self.current() {
            Token::Ident(w) if w.eq_ignore_ascii_case(word) => {
                self.advance();
                true
            }
            _ => false,
        }
    }

    fn expect_ident(&mut self, expected: &'static str) -> Result<String, SqlParseError> {
        match self.current().clone() {
            Token::Ident(name) => {
                self.advance();
                Ok(name)
            }
            Token::Eof => Err(SqlParseError::UnexpectedEof),
            found => Err(SqlParseError::Expected { expected, found }),
        }
    }

    /// `name` or `schema.name`; the schema qualifier is dropped.
    fn qualified_name(&mut self) -> Result<String, SqlParseError> {
        let mut name = self.expect_ident("table name")?;
        while self.eat(&Token::Dot) {
            name = self.expect_ident("table name")?;
        }
        Ok(name)
    }

    fn parse(&mut self) -> Result<Vec<Table>, SqlParseError> {
        let mut drafts: Vec<TableDraft> = Vec::new();

        while self.current() != &Token::Eof {
            match self.current() {
                Token::Create => {
                    self.advance();
                    while self.eat_word("TEMPORARY") || self.eat_word("TEMP") || self.eat_word("UNLOGGED") {}
                    if self.eat(&Token::Table) {
                        if self.eat(&Token::If) {
                            self.eat(&Token::Not);
                            self.eat(&Token::Exists);
                        }
                        drafts.push(self.parse_create_table()?);
                    } else {
                        // CREATE INDEX, VIEW, SEQUENCE, ...
                        self.skip_statement();
                    }
                }
                Token::Alter => self.parse_alter_table(&mut drafts)?,
                _ => self.skip_statement(),
            }
        }

        drafts.into_iter().map(|d| d.finish(self.dialect)).collect()
    }

    fn parse_create_table(&mut self) -> Result<TableDraft, SqlParseError> {
        let name = self.qualified_name()?;
        let mut draft = TableDraft {
            name,
            columns: Vec::new(),
            primary_key: None,
            foreign_keys: Vec::new(),
        };

        if !self.eat(&Token::LParen) {
            // CREATE TABLE ... AS SELECT, LIKE, etc.
            self.skip_statement();
            return Ok(draft);
        }

        let mut constraint_name: Option<String> = None;
        loop {
            match self.current() {
                Token::RParen => {
                    self.advance();
                    break;
                }
                Token::Comma => {
                    self.advance();
                    constraint_name = None;
                }
                Token::Constraint => {
                    self.advance();
                    constraint_name = Some(self.expect_ident("constraint name")?);
                }
                Token::Primary => {
                    self.advance();
                    self.eat(&Token::Key);
                    let columns = self.parse_column_list()?;
                    draft.primary_key = Some((constraint_name.take(), columns));
                }
                Token::Foreign => {
                    let fk = self.parse_foreign_key(constraint_name.take())?;
                    draft.foreign_keys.push(fk);
                }
                Token::Unique | Token::Index | Token::Key | Token::Check => {
                    self.skip_until(&[Token::Comma, Token::RParen]);
                }
                Token::Ident(w)
                    if w.eq_ignore_ascii_case("FULLTEXT") || w.eq_ignore_ascii_case("SPATIAL") =>
                {
                    self.skip_until(&[Token::Comma, Token::RParen]);
                }
                Token::Ident(_) => {
                    let (column, fk) = self.parse_column()?;
                    if let Some(fk) = fk {
                        draft.foreign_keys.push(fk);
                    }
                    draft.columns.push(column);
                }
                Token::Eof => return Err(SqlParseError::UnexpectedEof),
                found => {
                    return Err(SqlParseError::Expected {
                        expected: "column or table constraint",
                        found: found.clone(),
                    });
                }
            }
        }

        // Table options (ENGINE=, WITHOUT ROWID, ...)
        self.skip_statement();

        debug!("parsed table {} ({} columns)", draft.name, draft.columns.len());
        Ok(draft)
    }

    fn parse_column(&mut self) -> Result<(ColumnDraft, Option<ForeignKeyDraft>), SqlParseError> {
        let name = self.expect_ident("column name")?;

        let mut type_words: Vec<String> = Vec::new();
        let mut serial = false;
        loop {
            match self.current().clone() {
                Token::Ident(word) if word.eq_ignore_ascii_case("GENERATED") => break,
                Token::Ident(word) => {
                    type_words.push(word);
                    self.advance();
                }
                Token::Serial(word) => {
                    type_words.push(word);
                    serial = true;
                    self.advance();
                }
                Token::LParen => {
                    let args = self.parse_paren_expr()?;
                    match type_words.last_mut() {
                        Some(last) => last.push_str(&args),
                        None => type_words.push(args),
                    }
                }
                _ => break,
            }
        }
        if type_words.is_empty() {
            return Err(SqlParseError::Expected {
                expected: "column type",
                found: self.current().clone(),
            });
        }

        let mut column = ColumnDraft {
            name,
            raw_type: type_words.join(" "),
            not_null: false,
            primary_key: false,
            serial,
            auto_increment: false,
            default: String::new(),
        };
        let mut fk = None;
        let mut constraint_name = None;

        loop {
            match self.current() {
                Token::Comma | Token::RParen | Token::Eof => break,
                Token::Primary => {
                    self.advance();
                    self.eat(&Token::Key);
                    column.primary_key = true;
                }
                Token::Not => {
                    self.advance();
                    if self.eat(&Token::Null) {
                        column.not_null = true;
                    }
                }
                Token::Default => {
                    self.advance();
                    column.default = self.parse_default_value()?;
                }
                Token::References => {
                    self.advance();
                    let (target, target_columns) = self.parse_reference()?;
                    fk = Some(ForeignKeyDraft {
                        name: constraint_name.take(),
                        columns: vec![column.name.clone()],
                        target,
                        target_columns,
                    });
                }
                Token::AutoIncrement => {
                    self.advance();
                    column.auto_increment = true;
                }
                Token::Ident(w) if w.eq_ignore_ascii_case("GENERATED") => {
                    if self.parse_generated() {
                        column.auto_increment = true;
                    }
                }
                Token::Constraint => {
                    self.advance();
                    constraint_name = Some(self.expect_ident("constraint name")?);
                }
                Token::On => self.skip_on_actions(),
                Token::Check | Token::LParen => {
                    self.eat(&Token::Check);
                    self.skip_parenthesized();
                }
                // NULL, UNIQUE, KEY, COLLATE ..., COMMENT '...'
                _ => self.advance(),
            }
        }

        Ok((column, fk))
    }

    /// `GENERATED {ALWAYS | BY DEFAULT} AS IDENTITY [(options)]` or a
    /// generated column `GENERATED ALWAYS AS (expr) [STORED]`. Returns
    /// whether the clause declared an identity.
    fn parse_generated(&mut self) -> bool {
        self.advance(); // GENERATED
        if !self.eat_word("ALWAYS") && self.eat_word("BY") {
            self.eat(&Token::Default);
        }
        self.eat_word("AS");

        if self.eat_word("IDENTITY") {
            if self.current() == &Token::LParen {
                self.skip_parenthesized();
            }
            return true;
        }

        self.skip_parenthesized();
        self.eat_word("STORED");
        self.eat_word("VIRTUAL");
        false
    }

    /// A default expression: literal, function call, or parenthesized
    /// expression, with optional `::type` casts.
    fn parse_default_value(&mut self) -> Result<String, SqlParseError> {
        let mut value = match self.current().clone() {
            Token::Str(s) => {
                self.advance();
                quote_literal(&s)
            }
            Token::Num(n) => {
                self.advance();
                n
            }
            Token::Null => {
                self.advance();
                "NULL".to_string()
            }
            Token::Ident(word) => {
                self.advance();
                if self.current() == &Token::LParen {
                    format!("{}{}", word, self.parse_paren_expr()?)
                } else {
                    word
                }
            }
            Token::LParen => self.parse_paren_expr()?,
            Token::Eof => return Err(SqlParseError::UnexpectedEof),
            found => {
                return Err(SqlParseError::Expected {
                    expected: "default value",
                    found,
                });
            }
        };

        while self.eat(&Token::Cast) {
            value.push_str("::");
            value.push_str(&self.expect_ident("type name")?);
        }

        Ok(value)
    }

    /// Render a parenthesized token run back to text, parentheses included.
    fn parse_paren_expr(&mut self) -> Result<String, SqlParseError> {
        if !self.eat(&Token::LParen) {
            return Err(SqlParseError::Expected {
                expected: "(",
                found: self.current().clone(),
            });
        }

        let mut out = String::from("(");
        let mut depth = 1;
        let mut prev_word = false;
        while depth > 0 {
            let (piece, word) = match self.current().clone() {
                Token::LParen => {
                    depth += 1;
                    ("(".to_string(), false)
                }
                Token::RParen => {
                    depth -= 1;
                    (")".to_string(), false)
                }
                Token::Comma => (",".to_string(), false),
                Token::Cast => ("::".to_string(), false),
                Token::Dot => (".".to_string(), false),
                Token::Str(s) => (quote_literal(&s), true),
                Token::Num(n) | Token::Ident(n) => (n, true),
                Token::Null => ("NULL".to_string(), true),
                Token::Eof => return Err(SqlParseError::UnexpectedEof),
                other => (format!("{:?}", other).to_uppercase(), true),
            };
            if word && prev_word {
                out.push(' ');
            }
            out.push_str(&piece);
            prev_word = word;
            self.advance();
        }

        Ok(out)
    }

    /// `REFERENCES table [(col, ...)]`; the column list defaults to `id`.
    fn parse_reference(&mut self) -> Result<(String, Vec<String>), SqlParseError> {
        let target = self.qualified_name()?;
        let columns = if self.current() == &Token::LParen {
            self.parse_column_list()?
        } else {
            vec!["id".to_string()]
        };
        Ok((target, columns))
    }

    fn parse_foreign_key(&mut self, name: Option<String>) -> Result<ForeignKeyDraft, SqlParseError> {
        self.advance(); // FOREIGN
        self.eat(&Token::Key);
        let columns = self.parse_column_list()?;

        if !self.eat(&Token::References) {
            return Err(SqlParseError::Expected {
                expected: "REFERENCES",
                found: self.current().clone(),
            });
        }
        let (target, target_columns) = self.parse_reference()?;
        self.skip_on_actions();

        Ok(ForeignKeyDraft {
            name,
            columns,
            target,
            target_columns,
        })
    }

    fn parse_column_list(&mut self) -> Result<Vec<String>, SqlParseError> {
        if !self.eat(&Token::LParen) {
            return Err(SqlParseError::Expected {
                expected: "column list",
                found: self.current().clone(),
            });
        }

        let mut columns = Vec::new();
        loop {
            match self.current() {
                Token::Ident(name) => {
                    columns.push(name.clone());
                    self.advance();
                    // Index prefix lengths and ordering: name(10) DESC
                    if self.current() == &Token::LParen {
                        self.skip_parenthesized();
                    }
                }
                Token::Comma => self.advance(),
                Token::RParen => {
                    self.advance();
                    return Ok(columns);
                }
                Token::Eof => return Err(SqlParseError::UnexpectedEof),
                _ => self.advance(),
            }
        }
    }

    /// `ALTER TABLE [ONLY] name action[, action ...]`.
    fn parse_alter_table(&mut self, drafts: &mut [TableDraft]) -> Result<(), SqlParseError> {
        self.advance(); // ALTER
        if !self.eat(&Token::Table) {
            self.skip_statement();
            return Ok(());
        }
        if self.eat(&Token::If) {
            self.eat(&Token::Exists);
        }
        self.eat(&Token::Only);

        let table_name = self.qualified_name()?;
        let draft = drafts
            .iter_mut()
            .find(|d| d.name == table_name)
            .ok_or_else(|| SqlParseError::UnknownAlterTarget(table_name.clone()))?;

        loop {
            match self.current() {
                Token::Add => {
                    self.advance();
                    let name = if self.eat(&Token::Constraint) {
                        Some(self.expect_ident("constraint name")?)
                    } else {
                        None
                    };
                    match self.current() {
                        Token::Primary => {
                            self.advance();
                            self.eat(&Token::Key);
                            draft.primary_key = Some((name, self.parse_column_list()?));
                        }
                        Token::Foreign => {
                            let fk = self.parse_foreign_key(name)?;
                            draft.foreign_keys.push(fk);
                        }
                        _ => self.skip_until(&[Token::Comma, Token::Semicolon]),
                    }
                }
                Token::Alter => {
                    // ALTER [COLUMN] name SET DEFAULT expr
                    // ALTER [COLUMN] name ADD GENERATED ... AS IDENTITY (...)
                    self.advance();
                    self.eat_word("COLUMN");
                    let column = self.expect_ident("column name")?;
                    if self.eat_word("SET") && self.eat(&Token::Default) {
                        let default = self.parse_default_value()?;
                        if let Some(c) = draft.columns.iter_mut().find(|c| c.name == column) {
                            c.default = default;
                        }
                    } else if self.eat(&Token::Add)
                        && matches!(self.current(), Token::Ident(w) if w.eq_ignore_ascii_case("GENERATED"))
                    {
                        let identity = self.parse_generated();
                        if let Some(c) = draft.columns.iter_mut().find(|c| c.name == column) {
                            c.auto_increment |= identity;
                        }
                    } else {
                        self.skip_until(&[Token::Comma, Token::Semicolon]);
                    }
                }
                _ => self.skip_until(&[Token::Comma, Token::Semicolon]),
            }

            if !self.eat(&Token::Comma) {
                break;
            }
        }

        self.skip_statement();
        Ok(())
    }

    fn skip_on_actions(&mut self) {
        while self.eat(&Token::On) {
            // DELETE or UPDATE
            if matches!(self.current(), Token::Delete | Token::Update) {
                self.advance();
            }
            // CASCADE, RESTRICT, SET NULL, SET DEFAULT, NO ACTION
            match self.current() {
                Token::Cascade | Token::Restrict => self.advance(),
                Token::Ident(w) if w.eq_ignore_ascii_case("SET") => {
                    self.advance();
                    if matches!(self.current(), Token::Null | Token::Default) {
                        self.advance();
                    }
                }
                Token::Ident(w) if w.eq_ignore_ascii_case("NO") => {
                    self.advance();
                    self.eat_word("ACTION");
                }
                _ => {}
            }
        }
    }

    fn skip_parenthesized(&mut self) {
        if !self.eat(&Token::LParen) {
            return;
        }
        let mut depth = 1;
        while depth > 0 {
            match self.current() {
                Token::LParen => depth += 1,
                Token::RParen => depth -= 1,
                Token::Eof => break,
                _ => {}
            }
            self.advance();
        }
    }

    fn skip_statement(&mut self) {
        while !matches!(self.current(), Token::Semicolon | Token::Eof) {
            self.advance();
        }
        self.eat(&Token::Semicolon);
    }

    fn skip_until(&mut self, tokens: &[Token]) {
        while !tokens.contains(self.current()) && self.current() != &Token::Eof {
            if self.current() == &Token::LParen {
                self.skip_parenthesized();
            } else {
                self.advance();
            }
        }
    }
}

fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}
