//! Identifier mangling: inflection, casing, list helpers and the SQL
//! fragments generated code is built from.

mod case;
mod inflect;
mod sql;

pub use case::{Initialisms, camel_case, title_case};
pub use inflect::{plural, singular};
pub use sql::{
    auto_inc_primary_key, driver_uses_last_insert_id, filter_columns_by_auto_increment,
    filter_columns_by_default, generate_param_flags, primary_key_func_sig, where_primary_key,
};

use crate::schema::Column;

pub fn string_map<F, S>(f: F, list: &[S]) -> Vec<String>
where
    F: Fn(&str) -> String,
    S: AsRef<str>,
{
    list.iter().map(|s| f(s.as_ref())).collect()
}

pub fn column_names(columns: &[Column]) -> Vec<&str> {
    columns.iter().map(|c| c.name.as_str()).collect()
}

pub fn has_element<S: AsRef<str>>(needle: &str, list: &[S]) -> bool {
    list.iter().any(|s| s.as_ref() == needle)
}

pub fn prefix_string_slice<S: AsRef<str>>(prefix: &str, list: &[S]) -> Vec<String> {
    list.iter()
        .map(|s| format!("{}{}", prefix, s.as_ref()))
        .collect()
}

pub fn make_db_name(a: &str, b: &str) -> String {
    format!("{}_{}", a, b)
}

/// Characters `[start, end)` of `s`. Offsets count chars, not bytes, and
/// are clamped to the string, so out-of-range bounds yield a shorter (or
/// empty) result instead of failing.
pub fn substring(start: usize, end: usize, s: &str) -> String {
    let end = end.min(s.chars().count());
    if start >= end {
        return String::new();
    }
    s.chars().skip(start).take(end - start).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_map() {
        let mapped = string_map(|s| s.to_lowercase(), &["HELLO", "WORLD"]);
        assert_eq!(mapped.join(" "), "hello world");

        let titled = string_map(title_case, &["user_id".to_string()]);
        assert_eq!(titled, vec!["UserID"]);
    }

    #[test]
    fn test_column_names() {
        let cols = vec![
            Column::new("one", "int"),
            Column::new("two", "string"),
            Column::new("three", "string"),
        ];
        assert_eq!(column_names(&cols), vec!["one", "two", "three"]);
        assert!(column_names(&[]).is_empty());
    }

    #[test]
    fn test_make_db_name() {
        assert_eq!(make_db_name("a", "b"), "a_b");
    }

    #[test]
    fn test_has_element() {
        let elements = ["one", "two"];
        assert!(has_element("one", &elements));
        assert!(!has_element("three", &elements));
    }

    #[test]
    fn test_prefix_string_slice() {
        let slice = prefix_string_slice("o.", &["one", "two"]);
        assert_eq!(slice.join(" "), "o.one o.two");
    }

    #[test]
    fn test_substring() {
        let s = "hello";
        assert_eq!(substring(0, 5, s), "hello");
        assert_eq!(substring(1, 4, s), "ell");
        assert_eq!(substring(2, 3, s), "l");
        assert_eq!(substring(5, 5, s), "");
        assert_eq!(substring(3, 99, s), "lo");
        assert_eq!(substring(4, 2, s), "");
    }

    #[test]
    fn test_substring_counts_chars() {
        assert_eq!(substring(1, 3, "héllo"), "él");
        assert_eq!(substring(0, 2, "日本語"), "日本");
    }
}
