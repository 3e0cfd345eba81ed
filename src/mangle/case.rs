//! Title/camel case conversion with initialism preservation.

use std::collections::BTreeSet;
use std::sync::LazyLock;

const COMMON_INITIALISMS: &[&str] = &[
    "ACL", "API", "ASCII", "CPU", "CSS", "DNS", "EOF", "GUID", "HTML", "HTTP", "HTTPS", "ID",
    "IP", "JSON", "LHS", "QPS", "RAM", "RHS", "RPC", "SLA", "SMTP", "SQL", "SSH", "TCP", "TLS",
    "TTL", "UDP", "UI", "UID", "UUID", "URI", "URL", "UTF8", "VM", "XML", "XMPP", "XSRF", "XSS",
];

static DEFAULT_INITIALISMS: LazyLock<Initialisms> = LazyLock::new(Initialisms::default);

/// Words rendered fully upper-case by [`Initialisms::title_case`] and
/// [`Initialisms::camel_case`]. Stored in canonical upper-case form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Initialisms {
    words: BTreeSet<String>,
}

impl Default for Initialisms {
    fn default() -> Self {
        Self::new(COMMON_INITIALISMS)
    }
}

impl Initialisms {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words.into_iter().map(|w| w.as_ref().to_uppercase()).collect(),
        }
    }

    pub fn empty() -> Self {
        Self {
            words: BTreeSet::new(),
        }
    }

    pub fn insert(&mut self, word: &str) -> bool {
        self.words.insert(word.to_uppercase())
    }

    pub fn remove(&mut self, word: &str) -> bool {
        self.words.remove(&word.to_uppercase())
    }

    pub fn contains(&self, segment: &str) -> bool {
        self.words.contains(&segment.to_uppercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    /// `fun_id` becomes `FunID`.
    pub fn title_case(&self, name: &str) -> String {
        segments(name).map(|s| self.title_segment(s)).collect()
    }

    /// `fun_id_times` becomes `funIDTimes`; a leading initialism stays
    /// upper-case (`id_card` becomes `IDCard`).
    pub fn camel_case(&self, name: &str) -> String {
        let mut parts = segments(name);
        let Some(first) = parts.next() else {
            return String::new();
        };

        let mut out = if self.contains(first) {
            first.to_uppercase()
        } else {
            first.to_lowercase()
        };
        out.extend(parts.map(|s| self.title_segment(s)));
        out
    }

    fn title_segment(&self, segment: &str) -> String {
        if self.contains(segment) {
            return segment.to_uppercase();
        }

        let mut chars = segment.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

fn segments(name: &str) -> impl Iterator<Item = &str> {
    name.split('_').filter(|s| !s.is_empty())
}

/// [`Initialisms::title_case`] with the common initialism set.
pub fn title_case(name: &str) -> String {
    DEFAULT_INITIALISMS.title_case(name)
}

/// [`Initialisms::camel_case`] with the common initialism set.
pub fn camel_case(name: &str) -> String {
    DEFAULT_INITIALISMS.camel_case(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        let tests = [
            ("hello_there", "HelloThere"),
            ("", ""),
            ("fun_id", "FunID"),
            ("api_url_id", "APIURLID"),
            ("user__name", "UserName"),
        ];

        for (input, want) in tests {
            assert_eq!(title_case(input), want, "input: {:?}", input);
        }
    }

    #[test]
    fn test_camel_case() {
        let tests = [
            ("hello_there_sunny", "helloThereSunny"),
            ("", ""),
            ("fun_id_times", "funIDTimes"),
            ("id_card", "IDCard"),
            ("Hello_world", "helloWorld"),
        ];

        for (input, want) in tests {
            assert_eq!(camel_case(input), want, "input: {:?}", input);
        }
    }

    #[test]
    fn test_override_initialisms() {
        let mut initialisms = Initialisms::default();
        assert_eq!(initialisms.title_case("user_sku"), "UserSku");

        assert!(initialisms.insert("sku"));
        assert!(initialisms.remove("ID"));
        assert_eq!(initialisms.title_case("user_sku"), "UserSKU");
        assert_eq!(initialisms.title_case("fun_id"), "FunId");
        assert_eq!(initialisms.camel_case("sku_id"), "SKUId");

        let none = Initialisms::empty();
        assert_eq!(none.title_case("api_url"), "ApiUrl");
    }
}
