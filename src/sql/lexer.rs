//! SQL lexer for schema dumps.
//!
//! Only the vocabulary needed to read `CREATE TABLE` and
//! `ALTER TABLE ... ADD CONSTRAINT` statements gets its own token; every
//! other word comes through as [`Token::Ident`].

use thiserror::Error;

/// SQL token types.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Create,
    Alter,
    Add,
    Table,
    Only,
    Primary,
    Key,
    Foreign,
    References,
    Not,
    Null,
    Unique,
    Default,
    On,
    Delete,
    Update,
    Cascade,
    Restrict,
    Constraint,
    Index,
    If,
    Exists,
    AutoIncrement,
    /// `serial`, `bigserial` or `smallserial`, lower-cased.
    Serial(String),
    Check,

    // Identifiers and literals
    Ident(String),
    Str(String),
    Num(String),

    // Symbols
    LParen,
    RParen,
    Comma,
    Semicolon,
    Dot,
    Cast,

    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("Unterminated string starting on line {0}")]
    UnterminatedString(usize),
    #[error("Unterminated quoted identifier starting on line {0}")]
    UnterminatedIdent(usize),
}

fn keyword(word: &str) -> Option<Token> {
    let token = match word.to_uppercase().as_str() {
        "CREATE" => Token::Create,
        "ALTER" => Token::Alter,
        "ADD" => Token::Add,
        "TABLE" => Token::Table,
        "ONLY" => Token::Only,
        "PRIMARY" => Token::Primary,
        "KEY" => Token::Key,
        "FOREIGN" => Token::Foreign,
        "REFERENCES" => Token::References,
        "NOT" => Token::Not,
        "NULL" => Token::Null,
        "UNIQUE" => Token::Unique,
        "DEFAULT" => Token::Default,
        "ON" => Token::On,
        "DELETE" => Token::Delete,
        "UPDATE" => Token::Update,
        "CASCADE" => Token::Cascade,
        "RESTRICT" => Token::Restrict,
        "CONSTRAINT" => Token::Constraint,
        "INDEX" => Token::Index,
        "IF" => Token::If,
        "EXISTS" => Token::Exists,
        "AUTO_INCREMENT" | "AUTOINCREMENT" => Token::AutoIncrement,
        "SERIAL" | "BIGSERIAL" | "SMALLSERIAL" => Token::Serial(word.to_lowercase()),
        "CHECK" => Token::Check,
        _ => return None,
    };
    Some(token)
}

pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0, line: 1 }
    }

    fn rest(&self) -> &'a str {
        let src = self.src;
        &src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    /// Consume characters while `pred` holds and return the consumed slice.
    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        let src = self.src;
        &src[start..self.pos]
    }

    fn skip_trivia(&mut self) {
        loop {
            match (self.peek(), self.peek_second()) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('-'), Some('-')) | (Some('#'), _) => {
                    self.take_while(|c| c != '\n');
                }
                (Some('/'), Some('*')) => {
                    self.bump();
                    self.bump();
                    while let Some(c) = self.bump() {
                        if c == '*' && self.peek() == Some('/') {
                            self.bump();
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }

    /// Read text up to `close`; a doubled `close` is an escaped literal.
    fn read_delimited(&mut self, close: char, backslash_escapes: bool) -> Option<String> {
        let mut out = String::new();
        loop {
            let c = self.bump()?;
            if c == close {
                if self.peek() == Some(close) {
                    self.bump();
                    out.push(close);
                    continue;
                }
                return Some(out);
            }
            if c == '\\' && backslash_escapes {
                match self.bump()? {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    other => out.push(other),
                }
                continue;
            }
            out.push(c);
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        loop {
            self.skip_trivia();
            let line = self.line;
            let Some(c) = self.peek() else {
                return Ok(Token::Eof);
            };

            let token = match c {
                '(' => Token::LParen,
                ')' => Token::RParen,
                ',' => Token::Comma,
                ';' => Token::Semicolon,
                '.' => Token::Dot,
                ':' if self.peek_second() == Some(':') => {
                    self.bump();
                    Token::Cast
                }
                '\'' => {
                    self.bump();
                    return self
                        .read_delimited('\'', true)
                        .map(Token::Str)
                        .ok_or(LexError::UnterminatedString(line));
                }
                '"' | '`' | '[' => {
                    let close = if c == '[' { ']' } else { c };
                    self.bump();
                    return self
                        .read_delimited(close, false)
                        .map(Token::Ident)
                        .ok_or(LexError::UnterminatedIdent(line));
                }
                '-' if self.peek_second().is_some_and(|d| d.is_ascii_digit()) => {
                    self.bump();
                    let digits = self.take_while(|d| d.is_ascii_digit() || d == '.');
                    return Ok(Token::Num(format!("-{}", digits)));
                }
                d if d.is_ascii_digit() => {
                    let digits = self.take_while(|d| d.is_ascii_digit() || d == '.');
                    return Ok(Token::Num(digits.to_string()));
                }
                w if w.is_alphabetic() || w == '_' => {
                    let word = self.take_while(|w| w.is_alphanumeric() || w == '_' || w == '$');
                    return Ok(keyword(word).unwrap_or_else(|| Token::Ident(word.to_string())));
                }
                _ => {
                    // Operators and stray punctuation carry no schema information
                    self.bump();
                    continue;
                }
            };

            self.bump();
            return Ok(token);
        }
    }

    /// Collect all tokens, ending with [`Token::Eof`].
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(sql: &str) -> Vec<Token> {
        Lexer::new(sql).tokenize().unwrap()
    }

    #[test]
    fn test_simple_create_table() {
        let tokens = lex("CREATE TABLE users (id INT);");

        assert_eq!(
            tokens,
            vec![
                Token::Create,
                Token::Table,
                Token::Ident("users".to_string()),
                Token::LParen,
                Token::Ident("id".to_string()),
                Token::Ident("INT".to_string()),
                Token::RParen,
                Token::Semicolon,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_quoted_identifiers() {
        let tokens = lex(r#"CREATE TABLE "User Table" (`column name` INT, [x]] y] INT);"#);

        assert_eq!(tokens[2], Token::Ident("User Table".to_string()));
        assert_eq!(tokens[4], Token::Ident("column name".to_string()));
        assert_eq!(tokens[7], Token::Ident("x] y".to_string()));
    }

    #[test]
    fn test_comments() {
        let tokens = lex("-- comment\nCREATE /* block */ TABLE t (id INT); # trailing");

        assert_eq!(tokens[0], Token::Create);
        assert_eq!(tokens[1], Token::Table);
        assert_eq!(tokens.len(), 9);
    }

    #[test]
    fn test_auto_increment_and_cast() {
        let tokens = lex("id INTEGER AUTOINCREMENT DEFAULT nextval('s'::regclass)");

        assert_eq!(tokens[2], Token::AutoIncrement);
        assert_eq!(tokens[5], Token::LParen);
        assert_eq!(tokens[6], Token::Str("s".to_string()));
        assert_eq!(tokens[7], Token::Cast);
        assert_eq!(tokens[8], Token::Ident("regclass".to_string()));
        assert_eq!(lex("AUTO_INCREMENT")[0], Token::AutoIncrement);
        assert_eq!(lex("BigSerial")[0], Token::Serial("bigserial".to_string()));
    }

    #[test]
    fn test_literals() {
        let tokens = lex(r"DEFAULT 'it''s' -1.5 'a\nb'");

        assert_eq!(tokens[1], Token::Str("it's".to_string()));
        assert_eq!(tokens[2], Token::Num("-1.5".to_string()));
        assert_eq!(tokens[3], Token::Str("a\nb".to_string()));
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("CREATE TABLE t (\n  name TEXT DEFAULT 'oops\n);")
            .tokenize()
            .unwrap_err();
        assert_eq!(err, LexError::UnterminatedString(2));
    }
}
