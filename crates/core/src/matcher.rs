//! Answer checking.

/// Compare a submitted answer with the canonical one.
///
/// Both sides are trimmed and lowercased, then compared exactly.
#[must_use]
pub fn matches(submitted: &str, canonical: &str) -> bool {
    normalize(submitted) == normalize(canonical)
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Serialize formed pairs as `left-right` tokens joined by commas, in selection order.
///
/// The canonical answer of a match-pairs question uses the same shape, so the comparison is
/// order-sensitive.
#[must_use]
pub fn serialize_pairs<L, R>(pairs: &[(L, R)]) -> String
where
    L: AsRef<str>,
    R: AsRef<str>,
{
    pairs
        .iter()
        .map(|(l, r)| format!("{}-{}", l.as_ref(), r.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_case_and_outer_whitespace() {
        assert!(matches("  Hello World ", "hello world"));
        assert!(matches("GRÜSSE", "grüsse"));
    }

    #[test]
    fn inner_whitespace_is_significant() {
        assert!(!matches("hello  world", "hello world"));
    }

    #[test]
    fn no_partial_credit() {
        assert!(!matches("hell", "hello"));
        assert!(!matches("", "hello"));
    }

    #[test]
    fn empty_matches_empty() {
        assert!(matches("   ", ""));
    }

    #[test]
    fn pairs_serialize_in_selection_order() {
        let pairs = [("cat", "gato"), ("dog", "perro")];
        assert_eq!(serialize_pairs(&pairs), "cat-gato,dog-perro");
    }

    #[test]
    fn pair_order_changes_outcome() {
        let canonical = "cat-gato,dog-perro";
        let reversed = serialize_pairs(&[("dog", "perro"), ("cat", "gato")]);
        assert!(!matches(&reversed, canonical));
    }
}
