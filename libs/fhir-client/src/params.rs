//! Invocation-parameter normalization
//!
//! The remote API treats `"A, B"` and `"A,B"` differently: a code list with
//! whitespace after the commas may fail to match more than one code. Values
//! of the `code` parameter are therefore canonicalized before the query is
//! built.

use regex::Regex;
use std::sync::OnceLock;

fn code_separator() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",\s+").expect("valid regex"))
}

/// Flatten invocation parameters into query pairs.
///
/// Collapses every comma-plus-whitespace run in `code` values to a single
/// comma. Duplicate names are last-write-wins; the first-seen order of names
/// is preserved so the resulting query is deterministic.
pub fn normalize_query<'a, I>(pairs: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut normalized: Vec<(String, String)> = Vec::new();
    for (name, value) in pairs {
        let value = if name == "code" {
            code_separator().replace_all(value, ",").into_owned()
        } else {
            value.to_string()
        };
        match normalized.iter().position(|(n, _)| n.as_str() == name) {
            Some(index) => normalized[index].1 = value,
            None => normalized.push((name.to_string(), value)),
        }
    }
    normalized
}
