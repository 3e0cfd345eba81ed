//! SQL fragments spliced into generated queries.

use crate::schema::{Column, PrimaryKey, SchemaError};
use crate::sql::Dialect;

/// The single auto-incremented primary key column, when the table has one.
///
/// Requires a one-column key whose column is present, integer typed,
/// non-nullable and carries a default.
pub fn auto_inc_primary_key<'a>(
    columns: &'a [Column],
    pkey: Option<&PrimaryKey>,
) -> Option<&'a str> {
    let [name] = pkey?.columns.as_slice() else {
        return None;
    };

    columns
        .iter()
        .find(|c| &c.name == name)
        .filter(|c| is_integer_type(&c.typ) && c.has_default() && !c.nullable)
        .map(|c| c.name.as_str())
}

fn is_integer_type(typ: &str) -> bool {
    matches!(
        typ,
        "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16" | "uint32" | "uint64"
    )
}

/// Whether `driver` returns an incremented row id instead of the inserted row.
pub fn driver_uses_last_insert_id(driver: &str) -> bool {
    Dialect::from_str(driver).is_some_and(|d| d.capabilities().uses_last_insert_id)
}

/// `$start,$start+1,...`, `count` placeholders long.
pub fn generate_param_flags(count: usize, start_at: usize) -> String {
    (start_at..start_at + count)
        .map(|i| format!("${}", i))
        .collect::<Vec<_>>()
        .join(",")
}

/// `name type` pairs for the key columns, in key order.
pub fn primary_key_func_sig<S: AsRef<str>>(
    columns: &[Column],
    pkey_names: &[S],
) -> Result<String, SchemaError> {
    let params = pkey_names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            columns
                .iter()
                .find(|c| c.name == name)
                .map(|c| format!("{} {}", c.name, c.typ))
                .ok_or_else(|| SchemaError::MissingKeyColumn(name.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(params.join(", "))
}

/// `col1=$n AND col2=$n+1 ...`. An empty key is a configuration error.
pub fn where_primary_key<S: AsRef<str>>(
    pkey_names: &[S],
    start_at: usize,
) -> Result<String, SchemaError> {
    if pkey_names.is_empty() {
        return Err(SchemaError::EmptyPrimaryKey);
    }

    Ok(pkey_names
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{}=${}", name.as_ref(), start_at + i))
        .collect::<Vec<_>>()
        .join(" AND "))
}

/// Quoted, comma-joined names of the columns whose "has a default" flag
/// equals `want_default`.
pub fn filter_columns_by_default(columns: &[Column], want_default: bool) -> String {
    quoted_list(columns.iter().filter(|c| c.has_default() == want_default))
}

/// Quoted, comma-joined names of the server-generated columns.
pub fn filter_columns_by_auto_increment(columns: &[Column], dialect: Dialect) -> String {
    quoted_list(columns.iter().filter(|c| c.is_auto_increment(dialect)))
}

fn quoted_list<'a>(columns: impl Iterator<Item = &'a Column>) -> String {
    columns
        .map(|c| format!(r#""{}""#, c.name))
        .collect::<Vec<_>>()
        .join(",")
}
