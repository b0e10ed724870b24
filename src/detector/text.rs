//! Text helpers shared by the content-based strategies.

/// Returns the lines a unified diff adds, without their `+` marker.
///
/// The `+++` file header is not an added line.
pub(crate) fn added_lines(diff: &str) -> Vec<&str> {
    diff.split('\n')
        .filter(|line| line.starts_with('+') && !line.starts_with("+++"))
        .map(|line| &line[1..])
        .collect()
}

/// Non-overlapping occurrences of `needle` in `haystack`.
pub(crate) fn count_occurrences(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

/// Whether `value` lies within `tolerance` of the integer below or above it.
pub(crate) fn is_near_integer(value: f64, tolerance: f64) -> bool {
    let remainder = value - value.trunc();
    remainder < tolerance || remainder > 1.0 - tolerance
}

/// Starts lowercase and contains exactly one ASCII uppercase letter.
pub(crate) fn is_perfect_camel_case(word: &str) -> bool {
    let bytes = word.as_bytes();
    if bytes.len() < 2 || !bytes[0].is_ascii_lowercase() {
        return false;
    }

    bytes.iter().filter(|b| b.is_ascii_uppercase()).count() == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn added_lines_skip_headers_and_context() {
        let diff = "diff --git a/x b/x\n--- a/x\n+++ b/x\n@@ -1,2 +1,3 @@\n keep\n-old\n+new\n+ spaced\n";
        assert_eq!(added_lines(diff), vec!["new", " spaced"]);
    }

    #[test]
    fn added_lines_empty_diff() {
        assert!(added_lines("").is_empty());
    }

    #[test]
    fn count_is_non_overlapping() {
        assert_eq!(count_occurrences("aaaa", "aa"), 2);
        assert_eq!(count_occurrences("try { } catch", "try"), 1);
        assert_eq!(count_occurrences("", "try"), 0);
    }

    #[test]
    fn near_integer_bounds() {
        assert!(is_near_integer(2.0, 0.05));
        assert!(is_near_integer(2.03, 0.05));
        assert!(is_near_integer(2.97, 0.05));
        assert!(!is_near_integer(2.5, 0.05));
        assert!(!is_near_integer(1.333, 0.05));
    }

    #[test]
    fn camel_case_detection() {
        assert!(is_perfect_camel_case("userName"));
        assert!(!is_perfect_camel_case("UserName"));
        assert!(!is_perfect_camel_case("userFirstName"));
        assert!(!is_perfect_camel_case("username"));
        assert!(!is_perfect_camel_case("x"));
    }
}
