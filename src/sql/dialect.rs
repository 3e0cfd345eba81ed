//! SQL dialect detection and per-driver capabilities.

/// SQL dialect variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Auto-detect from dump content
    #[default]
    Auto,
    /// Standard SQL
    Generic,
    /// PostgreSQL
    PostgreSQL,
    /// MySQL and MariaDB
    MySQL,
    /// SQLite and dqlite
    SQLite,
}

/// Driver identifiers accepted on the command line and by the mangler.
const DRIVER_NAMES: &[(&str, Dialect)] = &[
    ("auto", Dialect::Auto),
    ("generic", Dialect::Generic),
    ("postgres", Dialect::PostgreSQL),
    ("postgresql", Dialect::PostgreSQL),
    ("psql", Dialect::PostgreSQL),
    ("mysql", Dialect::MySQL),
    ("mariadb", Dialect::MySQL),
    ("sqlite", Dialect::SQLite),
    ("sqlite3", Dialect::SQLite),
    ("dqlite", Dialect::SQLite),
];

/// How a driver reports generated keys and marks server-generated columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// The driver hands back an incremented row id instead of the inserted row.
    pub uses_last_insert_id: bool,
    /// Default expressions marking a server-generated column.
    pub auto_increment: AutoIncrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoIncrement {
    None,
    Prefix(&'static str),
    Exact(&'static str),
}

const NO_CAPABILITIES: Capabilities = Capabilities {
    uses_last_insert_id: false,
    auto_increment: AutoIncrement::None,
};

const POSTGRES: Capabilities = Capabilities {
    uses_last_insert_id: false,
    auto_increment: AutoIncrement::Prefix("nextval("),
};

const MYSQL: Capabilities = Capabilities {
    uses_last_insert_id: true,
    auto_increment: AutoIncrement::Exact("auto_increment"),
};

const SQLITE: Capabilities = Capabilities {
    uses_last_insert_id: true,
    auto_increment: AutoIncrement::Exact("autoincrement"),
};

impl Capabilities {
    pub fn is_auto_increment(&self, default: &str) -> bool {
        let default = default.trim().to_lowercase();
        match self.auto_increment {
            AutoIncrement::None => false,
            AutoIncrement::Prefix(p) => default.starts_with(p),
            AutoIncrement::Exact(e) => default == e,
        }
    }
}

impl Dialect {
    /// Parse dialect from a driver identifier.
    pub fn from_str(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        DRIVER_NAMES
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, dialect)| *dialect)
    }

    pub fn capabilities(self) -> &'static Capabilities {
        match self {
            Self::PostgreSQL => &POSTGRES,
            Self::MySQL => &MYSQL,
            Self::SQLite => &SQLITE,
            Self::Auto | Self::Generic => &NO_CAPABILITIES,
        }
    }

    /// Default recorded for a column declared `SERIAL`/`AUTO_INCREMENT`.
    pub fn auto_increment_default(self, table: &str, column: &str) -> Option<String> {
        match self.capabilities().auto_increment {
            AutoIncrement::None => None,
            AutoIncrement::Prefix(_) => Some(format!("nextval('{}_{}_seq'::regclass)", table, column)),
            AutoIncrement::Exact(e) => Some(e.to_string()),
        }
    }

    /// Detect dialect from SQL content.
    pub fn detect(content: &str) -> Self {
        let lower = content.to_lowercase();

        // Check header comments
        if lower.contains("postgresql database dump")
            || lower.contains("pg_dump")
            || lower.contains("-- postgres")
        {
            return Self::PostgreSQL;
        }
        if lower.contains("mysql dump")
            || lower.contains("mysqldump")
            || lower.contains("-- mysql")
        {
            return Self::MySQL;
        }
        if lower.contains("pragma ") || lower.contains("-- sqlite") {
            return Self::SQLite;
        }

        // Check type keywords
        if lower.contains("serial")
            || lower.contains("nextval(")
            || lower.contains("::text")
            || lower.contains("timestamptz")
            || lower.contains("as identity")
        {
            return Self::PostgreSQL;
        }
        if lower.contains("auto_increment")
            || lower.contains("tinyint")
            || lower.contains("engine=")
            || lower.contains("unsigned")
        {
            return Self::MySQL;
        }
        if lower.contains("autoincrement") {
            return Self::SQLite;
        }

        Self::Generic
    }

    /// Resolve Auto to a concrete dialect.
    pub fn resolve(self, content: &str) -> Self {
        match self {
            Self::Auto => Self::detect(content),
            other => other,
        }
    }
}
