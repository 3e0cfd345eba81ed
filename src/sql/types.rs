//! SQL to target-language type mapping.

use super::Dialect;
use crate::config::DEFAULT_NULLABLE_PREFIX;

/// Map a declared SQL type to the target type, using the nullable wrapper
/// when the column accepts NULL.
pub fn map_type(sql_type: &str, dialect: Dialect, nullable: bool) -> String {
    let lower = sql_type.to_lowercase();
    let base = lower.split('(').next().unwrap_or(&lower).trim();
    let base = base.strip_suffix(" unsigned").unwrap_or(base);

    let typ = match dialect {
        Dialect::PostgreSQL => map_postgres_type(base),
        Dialect::MySQL => map_mysql_type(base, &lower),
        Dialect::SQLite => map_sqlite_type(base),
        _ => map_generic_type(base),
    };

    if nullable { nullable_type(typ) } else { typ.to_string() }
}

/// Wrapper type for a nullable column of type `typ`.
pub fn nullable_type(typ: &str) -> String {
    let wrapper = match typ {
        "int" => "Int",
        "int16" => "Int16",
        "int64" => "Int64",
        "float32" => "Float32",
        "float64" => "Float64",
        "bool" => "Bool",
        "time.Time" => "Time",
        "[]byte" => "Bytes",
        _ => "String",
    };
    format!("{}{}", DEFAULT_NULLABLE_PREFIX, wrapper)
}

fn map_postgres_type(base: &str) -> &'static str {
    match base {
        // Integer types
        "int" | "int4" | "integer" | "serial" | "serial4" => "int",
        "bigint" | "int8" | "bigserial" | "serial8" => "int64",
        "smallint" | "int2" | "smallserial" | "serial2" => "int16",

        // Floating point
        "real" | "float4" => "float32",
        "double precision" | "float8" | "decimal" | "numeric" => "float64",

        // Date/time
        "timestamp" | "timestamptz" | "timestamp with time zone"
        | "timestamp without time zone" | "date" | "time" | "timetz" => "time.Time",

        "boolean" | "bool" => "bool",
        "bytea" | "json" | "jsonb" => "[]byte",

        // Strings, uuid, intervals, arrays and anything unknown
        _ => "string",
    }
}

fn map_mysql_type(base: &str, full: &str) -> &'static str {
    match base {
        "int" | "integer" | "mediumint" => "int",
        "bigint" => "int64",
        "smallint" => "int16",
        // TINYINT(1) is the conventional boolean
        "tinyint" if full.contains("tinyint(1)") => "bool",
        "tinyint" => "int16",
        "bool" | "boolean" | "bit" => "bool",

        "float" => "float32",
        "double" | "decimal" | "numeric" => "float64",

        "datetime" | "timestamp" | "date" | "time" => "time.Time",

        "blob" | "longblob" | "mediumblob" | "tinyblob" | "binary" | "varbinary" | "json" => {
            "[]byte"
        }

        // char, varchar, text family, enum, set, year
        _ => "string",
    }
}

fn map_sqlite_type(base: &str) -> &'static str {
    match base {
        "integer" | "int" => "int64",
        "real" | "double" | "float" => "float64",
        "boolean" | "bool" => "bool",
        "blob" => "[]byte",
        "datetime" | "timestamp" | "date" => "time.Time",
        _ => "string",
    }
}

fn map_generic_type(base: &str) -> &'static str {
    match base {
        "int" | "integer" => "int",
        "bigint" => "int64",
        "smallint" => "int16",
        "real" | "float" => "float32",
        "double" | "double precision" | "decimal" | "numeric" => "float64",
        "timestamp" | "datetime" | "date" | "time" => "time.Time",
        "boolean" | "bool" => "bool",
        "blob" => "[]byte",
        _ => "string",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_types() {
        assert_eq!(map_type("SERIAL", Dialect::PostgreSQL, false), "int");
        assert_eq!(map_type("BIGSERIAL", Dialect::PostgreSQL, false), "int64");
        assert_eq!(map_type("VARCHAR(255)", Dialect::PostgreSQL, false), "string");
        assert_eq!(map_type("TIMESTAMPTZ", Dialect::PostgreSQL, false), "time.Time");
        assert_eq!(map_type("JSONB", Dialect::PostgreSQL, false), "[]byte");
    }

    #[test]
    fn test_mysql_types() {
        assert_eq!(map_type("INT", Dialect::MySQL, false), "int");
        assert_eq!(map_type("INT UNSIGNED", Dialect::MySQL, false), "int");
        assert_eq!(map_type("TINYINT(1)", Dialect::MySQL, false), "bool");
        assert_eq!(map_type("TINYINT(4)", Dialect::MySQL, false), "int16");
        assert_eq!(map_type("DATETIME", Dialect::MySQL, false), "time.Time");
    }

    #[test]
    fn test_nullable_types() {
        assert_eq!(map_type("BIGINT", Dialect::PostgreSQL, true), "null.Int64");
        assert_eq!(map_type("TEXT", Dialect::Generic, true), "null.String");
        assert_eq!(map_type("INTEGER", Dialect::SQLite, true), "null.Int64");
        assert_eq!(nullable_type("[]byte"), "null.Bytes");
    }
}
