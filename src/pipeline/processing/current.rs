use crate::types::MemberTerm;

/// Keeps only terms that are still being served, in their original order.
pub fn only_current(terms: Vec<MemberTerm>) -> Vec<MemberTerm> {
    terms.into_iter().filter(MemberTerm::is_current).collect()
}
