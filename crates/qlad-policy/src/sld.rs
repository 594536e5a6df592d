/// Truncates a fully-qualified, trailing-dot query name to its last two
/// labels plus the trailing dot: `foo.bar.example.co.uk.` -> `co.uk.`.
///
/// Ported label-for-label from the reference implementation's `getSLD()`:
/// three successive `rfind('.')` calls, each searching the *previous step's
/// result* but, on failure, resetting that working value back to the
/// *original* string rather than keeping the narrowed slice. Only the
/// position found by the third search is used, to slice the original
/// string. This is not a registrable-domain / public-suffix-aware
/// computation, and it does not simply return the name unchanged once a
/// search fails: a single-label name like `localhost.` collapses to an
/// empty string. This exact positional, reset-on-failure behavior is
/// preserved deliberately: downstream consumers of this policy (hash
/// tables keyed by the result, test fixtures, `Identifier::is_valid`'s
/// empty-string rejection) assume it.
pub fn sld(name: &str) -> String {
    let cpos = name.rfind('.');
    let mut working = match cpos {
        Some(p) => &name[..p],
        None => name,
    };

    let pcpos = working.rfind('.');
    working = match pcpos {
        Some(p) => &name[..p],
        None => name,
    };

    let ppcpos = working.rfind('.');

    match ppcpos {
        Some(p) => name[p + 1..].to_string(),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_five_label_name_to_last_two_plus_dot() {
        // scenario 5
        assert_eq!(sld("foo.bar.example.co.uk."), "co.uk.");
    }

    #[test]
    fn two_label_name_with_trailing_dot_is_returned_unchanged() {
        assert_eq!(sld("example.com."), "example.com.");
    }

    #[test]
    fn three_label_name_truncates_to_last_two() {
        assert_eq!(sld("www.example.com."), "example.com.");
    }

    #[test]
    fn single_label_with_trailing_dot_collapses_to_empty() {
        assert_eq!(sld("localhost."), "");
    }

    #[test]
    fn two_label_name_without_trailing_dot_truncates_to_last_label() {
        assert_eq!(sld("example.com"), "com");
    }

    #[test]
    fn two_short_labels_truncate_to_last_label() {
        assert_eq!(sld("a.b"), "b");
    }

    #[test]
    fn empty_name_is_returned_unchanged() {
        assert_eq!(sld(""), "");
    }
}
