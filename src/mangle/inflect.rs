//! Singular/plural forms of snake_case identifiers.
//!
//! Only the last underscore-delimited segment is inflected, so
//! `hello_people` becomes `hello_person`. Irregular pairs and uncountable
//! words are looked up first; everything else goes through a small set of
//! suffix rules. Both directions are idempotent.

/// Irregular (singular, plural) pairs.
const IRREGULARS: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("ox", "oxen"),
    ("criterion", "criteria"),
    ("datum", "data"),
    ("medium", "media"),
    ("index", "indices"),
    ("matrix", "matrices"),
    ("vertex", "vertices"),
    ("axis", "axes"),
    ("crisis", "crises"),
    ("thesis", "theses"),
    ("movie", "movies"),
    ("cookie", "cookies"),
];

/// Words whose singular and plural are spelled the same.
const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "fish",
    "information",
    "metadata",
    "money",
    "news",
    "rice",
    "series",
    "sheep",
    "species",
];

pub fn singular(name: &str) -> String {
    inflect_last_segment(name, singular_word)
}

pub fn plural(name: &str) -> String {
    inflect_last_segment(name, plural_word)
}

fn inflect_last_segment(name: &str, inflect: fn(&str) -> String) -> String {
    match name.rsplit_once('_') {
        Some((head, last)) => format!("{}_{}", head, inflect(last)),
        None => inflect(name),
    }
}

fn singular_word(word: &str) -> String {
    let lower = word.to_lowercase();
    if lower.is_empty() || UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some((singular, _)) = IRREGULARS.iter().find(|(s, p)| *p == lower || *s == lower) {
        return with_case_of(word, singular);
    }

    if let Some(stem) = strip_suffix_ci(word, "ies").filter(|s| ends_with_consonant(s)) {
        return format!("{}y", stem);
    }
    if let Some(stem) = strip_suffix_ci(word, "yses") {
        return format!("{}ysis", stem);
    }
    if let Some(stem) = strip_suffix_ci(word, "es").filter(|s| takes_es(s)) {
        return stem.to_string();
    }
    if let Some(stem) = strip_suffix_ci(word, "s").filter(|_| !looks_singular(word)) {
        return stem.to_string();
    }

    word.to_string()
}

fn plural_word(word: &str) -> String {
    let lower = word.to_lowercase();
    if lower.is_empty() || UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULARS.iter().find(|(s, p)| *s == lower || *p == lower) {
        return with_case_of(word, plural);
    }

    if let Some(stem) = strip_suffix_ci(word, "y").filter(|s| ends_with_consonant(s)) {
        return format!("{}ies", stem);
    }
    if let Some(stem) = strip_suffix_ci(word, "is").filter(|s| ends_with_consonant(s)) {
        return format!("{}es", stem);
    }
    if takes_es(word) {
        return format!("{}es", word);
    }
    if strip_suffix_ci(word, "s").is_some() {
        // Already plural.
        return word.to_string();
    }

    format!("{}s", word)
}

fn strip_suffix_ci<'a>(word: &'a str, suffix: &str) -> Option<&'a str> {
    let cut = word.len().checked_sub(suffix.len())?;
    if !word.is_char_boundary(cut) || !word[cut..].eq_ignore_ascii_case(suffix) {
        return None;
    }
    Some(&word[..cut])
}

/// Singular stems pluralized with `es` rather than `s`.
fn takes_es(stem: &str) -> bool {
    let stem = stem.to_lowercase();
    stem.ends_with('x') || stem.ends_with("ch") || stem.ends_with("sh") || looks_singular(&stem)
}

/// `class`, `status` and `analysis` end in `s` but are not plurals.
/// Only the `-ss` and `-us` forms take `es` as is; `-is` swaps to `-es`.
fn looks_singular(word: &str) -> bool {
    let word = word.to_lowercase();
    if word.ends_with("ss") {
        return true;
    }
    match word.strip_suffix("us").or_else(|| word.strip_suffix("is")) {
        Some(stem) => ends_with_consonant(stem),
        None => false,
    }
}

fn ends_with_consonant(stem: &str) -> bool {
    stem.chars()
        .last()
        .is_some_and(|c| c.is_ascii_alphabetic() && !"aeiou".contains(c.to_ascii_lowercase()))
}

/// Keep an upper-case first letter when replacing a whole word.
fn with_case_of(original: &str, replacement: &str) -> String {
    let mut chars = replacement.chars();
    match (original.chars().next(), chars.next()) {
        (Some(o), Some(first)) if o.is_uppercase() => first.to_uppercase().chain(chars).collect(),
        _ => replacement.to_string(),
    }
}
