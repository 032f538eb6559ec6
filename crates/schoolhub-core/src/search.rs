//! Substring filters for `ILIKE ... ESCAPE '\'`.

/// `%term%` with the LIKE metacharacters in `term` escaped, so user input
/// only ever matches literally.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_term_is_wrapped() {
        assert_eq!(contains_pattern("tolkien"), "%tolkien%");
    }

    #[test]
    fn test_metacharacters_are_escaped() {
        assert_eq!(contains_pattern("50%_off"), r"%50\%\_off%");
        assert_eq!(contains_pattern(r"a\b"), r"%a\\b%");
    }
}
