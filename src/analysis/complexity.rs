//! Coarse complexity heuristic.
//!
//! Counts branch, loop and exception keywords plus function-definition-like
//! tokens, floored at 1. This is not cyclomatic complexity and does not try to be:
//! keywords inside strings and comments count too.

use std::sync::LazyLock;

use regex::Regex;

static DECISION_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\b(?:if|elif|for|foreach|while|case|catch|except|match|loop|try|guard|unless|until)\b|&&|\|\|").ok()
});

static FUNCTION_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b(?:fn|def|func|function|lambda)\b|=>").ok());

/// Returns the complexity score for `source`; never below 1.
#[must_use]
pub fn score(source: &str) -> usize {
    let decisions = count(&DECISION_RE, source);
    let functions = count(&FUNCTION_RE, source);
    (decisions + functions).max(1)
}

fn count(re: &LazyLock<Option<Regex>>, text: &str) -> usize {
    re.as_ref().map_or(0, |r| r.find_iter(text).count())
}
