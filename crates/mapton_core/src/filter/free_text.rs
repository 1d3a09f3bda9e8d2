//! Free-text matching for the form filter.

use regex::{Regex, RegexBuilder};

/// Case-insensitive text predicate.
///
/// Plain text matches as a substring. Text containing `*` or `?` is a glob
/// that must match a whole field. Blank text and a lone `*` match everything.
#[derive(Debug, Clone)]
pub struct FreeText {
    source: String,
    matcher: Matcher,
}

#[derive(Debug, Clone)]
enum Matcher {
    Any,
    Contains(String),
    Glob(Regex),
}

impl Default for FreeText {
    fn default() -> Self {
        Self {
            source: String::new(),
            matcher: Matcher::Any,
        }
    }
}

impl FreeText {
    pub fn parse(text: &str) -> Result<Self, regex::Error> {
        let trimmed = text.trim();
        let matcher = if trimmed.is_empty() || trimmed == "*" {
            Matcher::Any
        } else if trimmed.contains(['*', '?']) {
            Matcher::Glob(glob_to_regex(trimmed)?)
        } else {
            Matcher::Contains(trimmed.to_lowercase())
        };

        Ok(Self {
            source: trimmed.to_string(),
            matcher,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.matcher, Matcher::Any)
    }

    /// True when any of `fields` matches.
    pub fn matches_any(&self, fields: &[&str]) -> bool {
        match &self.matcher {
            Matcher::Any => true,
            Matcher::Contains(needle) => fields
                .iter()
                .any(|field| field.to_lowercase().contains(needle.as_str())),
            Matcher::Glob(regex) => fields.iter().any(|field| regex.is_match(field)),
        }
    }
}

fn glob_to_regex(glob: &str) -> Result<Regex, regex::Error> {
    let mut pattern = String::with_capacity(glob.len() + 8);
    pattern.push('^');
    for c in glob.chars() {
        match c {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            other => pattern.push_str(&regex::escape(&other.to_string())),
        }
    }
    pattern.push('$');
    RegexBuilder::new(&pattern).case_insensitive(true).build()
}
