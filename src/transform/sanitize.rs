//! Markup stripping for free-text policy fragments.

use std::sync::LazyLock;

use regex::Regex;

/// Matches a single angle-bracket tag, shortest match first.
///
/// Lazy matching keeps `<b>Pets</b>` from being swallowed whole and still
/// handles self-closing and malformed tags like `<br/>` or `<a<b>`.
static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<.*?>").expect("invalid tag pattern"));

/// Strip markup tags from each fragment and join with a single space.
///
/// Fragment order is preserved; spacing inside the original text is left
/// untouched. An empty fragment list joins to the empty string.
pub fn sanitize(fragments: &[String]) -> String {
    fragments
        .iter()
        .map(|fragment| TAG_PATTERN.replace_all(fragment, ""))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragments(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn strips_tags_and_joins() {
        let out = sanitize(&fragments(&["<b>Pets</b> allowed", "No <i>extra</i> beds"]));
        assert_eq!(out, "Pets allowed No extra beds");
    }

    #[test]
    fn output_contains_no_angle_brackets() {
        let out = sanitize(&fragments(&[
            "<p>Dogs<br/>and cats</p>",
            "up to <strong>2</strong> pets",
        ]));
        assert!(!out.contains('<'));
        assert!(!out.contains('>'));
        assert_eq!(out, "Dogsand cats up to 2 pets");
    }

    #[test]
    fn malformed_tags_use_shortest_match() {
        // The first '<' pairs with the first '>' it can reach.
        assert_eq!(sanitize(&fragments(&["<a<b>x"])), "x");
        assert_eq!(sanitize(&fragments(&["a < b"])), "a < b");
    }

    #[test]
    fn empty_input_joins_to_empty_string() {
        assert_eq!(sanitize(&[]), "");
        assert_eq!(sanitize(&fragments(&[""])), "");
    }

    #[test]
    fn plain_fragments_join_with_single_space() {
        assert_eq!(sanitize(&fragments(&["a", "b"])), "a b");
    }
}
