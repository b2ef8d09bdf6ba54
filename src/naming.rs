//! Naming conventions linking member names to column keys

/// Prefix tables used to derive column keys and to probe for accessors.
///
/// The tables are immutable; exporters and importers receive a reference to
/// the set they should use (usually [`Conventions::DEFAULT`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conventions {
    /// Stripped from member names when deriving a column key
    pub column_prefixes: &'static [&'static str],
    /// Tried, in order, when looking for a getter of a key
    pub getter_prefixes: &'static [&'static str],
    /// Tried, in order, when looking for a setter of a key
    pub setter_prefixes: &'static [&'static str],
}

impl Conventions {
    pub const DEFAULT: Conventions = Conventions {
        column_prefixes: &["get", "is", "has", "my", "set", "add"],
        getter_prefixes: &["get", "is", "has", "my"],
        setter_prefixes: &["set", "add"],
    };

    /// Column key for a member name, using [`Conventions::column_prefixes`]
    pub fn column_name(&self, name: &str) -> String {
        column_name(name, self.column_prefixes)
    }

    /// Candidate getter method names for a column key
    pub fn getter_candidates(&self, key: &str) -> Vec<String> {
        candidates(self.getter_prefixes, key)
    }

    /// Candidate setter method names for a column key
    pub fn setter_candidates(&self, key: &str) -> Vec<String> {
        candidates(self.setter_prefixes, key)
    }
}

impl Default for Conventions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn candidates(prefixes: &[&str], key: &str) -> Vec<String> {
    let cap = ucfirst(key);
    prefixes
        .iter()
        .map(|prefix| format!("{}{}", prefix, cap))
        .collect()
}

/// Derive a column key from a member name.
///
/// A prefix is only stripped at a word boundary (`getFirstname`, `Get_name`),
/// so `isbn` or `address` keep their names. Stripping repeats until no prefix
/// applies and the result is lower-cased, which makes the function
/// idempotent.
pub fn column_name(name: &str, prefixes: &[&str]) -> String {
    let mut current = name.trim_matches('_');

    'strip: loop {
        for prefix in prefixes {
            if let Some(rest) = strip_at_boundary(current, prefix) {
                current = rest.trim_matches('_');
                continue 'strip;
            }
        }
        break;
    }

    current.to_lowercase()
}

// Prefixes match case-insensitively. An underscore is always a boundary; an
// upper-case letter only when the matched prefix ends lower-case, so `ISBN`
// stays whole while `GetName` is stripped.
fn strip_at_boundary<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    let head = name.get(..prefix.len())?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }
    let rest = &name[prefix.len()..];
    let next = rest.chars().next()?;
    let camel = next.is_uppercase() && head.chars().last().is_some_and(char::is_lowercase);
    if !(camel || next == '_') {
        return None;
    }
    if rest.trim_matches('_').is_empty() {
        return None;
    }
    Some(rest)
}

/// Upper-case the first character (`firstname` → `Firstname`)
pub fn ucfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
