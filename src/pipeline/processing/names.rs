use crate::types::MemberTerm;

/// Reverses the `", "`-separated tokens of a name.
///
/// This is a mechanical reversal of every token, not a first/last swap:
/// "Smith, John" becomes "John Smith" but "Smith, John, Jr." becomes
/// "Jr. John Smith". A name without a separator is returned unchanged.
pub fn normalize_name(name: &str) -> String {
    name.rsplit(", ").collect::<Vec<_>>().join(" ")
}

pub fn normalize_names(terms: &mut [MemberTerm]) {
    for term in terms.iter_mut() {
        term.name = normalize_name(&term.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_first() {
        assert_eq!(normalize_name("Smith, John"), "John Smith");
    }

    #[test]
    fn test_suffix_is_reversed_too() {
        assert_eq!(normalize_name("Smith, John, Jr."), "Jr. John Smith");
    }

    #[test]
    fn test_middle_name_stays_with_first() {
        assert_eq!(normalize_name("Ocasio-Cortez, Alexandria M."), "Alexandria M. Ocasio-Cortez");
    }

    #[test]
    fn test_single_token_passes_through() {
        assert_eq!(normalize_name("Cher"), "Cher");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn test_every_token_is_reversed() {
        assert_eq!(normalize_name("D, C, B, A"), "A B C D");
        assert_eq!(normalize_name("Smith, "), " Smith");
    }

    #[test]
    fn test_comma_without_space_is_not_a_separator() {
        assert_eq!(normalize_name("Smith,John"), "Smith,John");
    }

    #[test]
    fn test_normalize_names_rewrites_rows() {
        let mut terms = vec![
            MemberTerm::new("A", "Pelosi, Nancy", "Democratic", "House of Representatives", 1987, None),
            MemberTerm::new("B", "King, Angus S., Jr.", "Independent", "Senate", 2013, None),
        ];
        normalize_names(&mut terms);
        assert_eq!(terms[0].name, "Nancy Pelosi");
        assert_eq!(terms[1].name, "Jr. Angus S. King");
    }
}
