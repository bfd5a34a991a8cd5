//! Sequences that arrive either as real lists or as serialized list strings.
//!
//! The upstream CSV export writes `"[1, 2, 3]"`, `"[(1.0, 2.0), (3.0, 4.0)]"`
//! and `"['Start', 'Foot Only']"`. Those are rewritten into JSON and parsed
//! with the same element types as the native form.

use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum ListField<T> {
    Items(Vec<T>),
    Serialized(String),
}

/// Rewrite a serialized list literal into JSON and parse it.
pub(crate) fn parse_literal_list<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>, serde_json::Error> {
    serde_json::from_str(&literal_to_json(raw.trim()))
}

/// Tuples become arrays and single-quoted strings become JSON strings.
/// Characters inside a quoted element are copied through unchanged.
fn literal_to_json(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut quote: Option<char> = None;
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        match quote {
            None => match c {
                '(' => out.push('['),
                ')' => out.push(']'),
                '\'' | '"' => {
                    quote = Some(c);
                    out.push('"');
                }
                other => out.push(other),
            },
            Some(q) => match c {
                '\\' => match chars.next() {
                    // `\'` has no JSON escape
                    Some('\'') => out.push('\''),
                    Some(escaped) => {
                        out.push('\\');
                        out.push(escaped);
                    }
                    None => out.push('\\'),
                },
                c if c == q => {
                    quote = None;
                    out.push('"');
                }
                '"' => out.push_str("\\\""),
                other => out.push(other),
            },
        }
    }
    out
}

/// `deserialize_with` adapter accepting either form.
pub(crate) fn list_or_literal<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match ListField::<T>::deserialize(deserializer)? {
        ListField::Items(items) => Ok(items),
        ListField::Serialized(raw) => parse_literal_list(&raw).map_err(D::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integer_literal() {
        let ids: Vec<i64> = parse_literal_list("[1090, 1101, 1243]").unwrap();
        assert_eq!(ids, vec![1090, 1101, 1243]);
    }

    #[test]
    fn parses_tuple_literal() {
        let coords: Vec<(f64, f64)> = parse_literal_list("[(12.0, 4), (40.5, 100.0)]").unwrap();
        assert_eq!(coords, vec![(12.0, 4.0), (40.5, 100.0)]);
    }

    #[test]
    fn parses_quoted_string_literal() {
        let types: Vec<String> = parse_literal_list("['Start', 'Foot Only']").unwrap();
        assert_eq!(types, vec!["Start", "Foot Only"]);
    }

    #[test]
    fn delimiters_inside_strings_are_kept() {
        let types: Vec<String> = parse_literal_list("['Foot (left)', 'Start']").unwrap();
        assert_eq!(types, vec!["Foot (left)", "Start"]);
    }

    #[test]
    fn apostrophe_inside_double_quotes() {
        let types: Vec<String> = parse_literal_list(r#"["Jug's edge"]"#).unwrap();
        assert_eq!(types, vec!["Jug's edge"]);
    }

    #[test]
    fn escaped_quotes_in_single_quoted_strings() {
        let types: Vec<String> = parse_literal_list(r#"['Jug\'s edge', 'say "hi"']"#).unwrap();
        assert_eq!(types, vec!["Jug's edge", r#"say "hi""#]);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_literal_list::<i64>("not a list").is_err());
    }
}
