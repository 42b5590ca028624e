use crate::error::{CongressError, Result};
use crate::types::{Chamber, MemberTerm, Year};
use tracing::debug;

/// End year of the term cycle that contains `current_year`, for a cycle of
/// `term_years` anchored at `start_year`.
///
/// House: `2025 + 2 - ((2025 - 2019) mod 2) = 2027`.
/// Senate: `2025 + 6 - ((2025 - 2021) mod 6) = 2027`.
pub fn next_term_boundary(start_year: Year, current_year: Year, term_years: Year) -> Year {
    current_year + term_years - (current_year - start_year).rem_euclid(term_years)
}

/// Resolves a missing end year and classifies the term as current or former.
///
/// A term whose end year is already known keeps it. Its `current_member` flag is
/// only set to `false` when nothing has decided it yet, so a second pass over a
/// normalized row changes nothing. A flag already present on the row is
/// trusted as given, even `true` on a term with a past end year.
pub fn normalize_term(term: &mut MemberTerm, current_year: Year) -> Result<()> {
    match term.end_year {
        Some(_) => {
            if term.current_member.is_none() {
                term.current_member = Some(false);
            }
        }
        None => {
            let chamber = Chamber::from_label(&term.chamber).ok_or_else(|| {
                CongressError::UnrecognizedChamber {
                    bioguide_id: term.bioguide_id.clone(),
                    chamber: term.chamber.clone(),
                }
            })?;
            let end_year = next_term_boundary(term.start_year, current_year, chamber.term_years());
            debug!(
                bioguide_id = %term.bioguide_id,
                chamber = chamber.label(),
                start_year = term.start_year,
                end_year,
                "Resolved ongoing term"
            );
            term.end_year = Some(end_year);
            term.current_member = Some(true);
        }
    }
    Ok(())
}

/// Runs [`normalize_term`] over the whole table, stopping at the first error.
pub fn normalize_terms(terms: &mut [MemberTerm], current_year: Year) -> Result<()> {
    for term in terms.iter_mut() {
        normalize_term(term, current_year)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{HOUSE_CHAMBER, SENATE_CHAMBER};

    #[test]
    fn test_ongoing_house_term() {
        let mut term = MemberTerm::new("H1", "Doe, Jane", "Democratic", HOUSE_CHAMBER, 2019, None);
        normalize_term(&mut term, 2025).unwrap();
        assert_eq!(term.end_year, Some(2027));
        assert_eq!(term.current_member, Some(true));
    }

    #[test]
    fn test_ongoing_house_term_odd_offset() {
        let mut term = MemberTerm::new("H2", "Doe, Jane", "Democratic", HOUSE_CHAMBER, 2020, None);
        normalize_term(&mut term, 2025).unwrap();
        assert_eq!(term.end_year, Some(2026));
    }

    #[test]
    fn test_ongoing_senate_term() {
        let mut term = MemberTerm::new("S1", "Roe, Sam", "Republican", SENATE_CHAMBER, 2021, None);
        normalize_term(&mut term, 2025).unwrap();
        assert_eq!(term.end_year, Some(2027));
        assert_eq!(term.current_member, Some(true));
    }

    #[test]
    fn test_senate_term_starting_this_year_runs_full_cycle() {
        let mut term = MemberTerm::new("S2", "Roe, Sam", "Republican", SENATE_CHAMBER, 2025, None);
        normalize_term(&mut term, 2025).unwrap();
        assert_eq!(term.end_year, Some(2031));
    }

    #[test]
    fn test_start_after_current_year_uses_non_negative_remainder() {
        assert_eq!(next_term_boundary(2027, 2025, 2), 2027);
        assert_eq!(next_term_boundary(2026, 2025, 6), 2026);
    }

    #[test]
    fn test_closed_term_is_untouched_and_former() {
        let mut term = MemberTerm::new("F1", "Old, Timer", "Whig", "Continental Congress", 1993, Some(2011));
        normalize_term(&mut term, 2025).unwrap();
        assert_eq!(term.end_year, Some(2011));
        assert_eq!(term.current_member, Some(false));
    }

    #[test]
    fn test_closed_term_keeps_supplied_flag() {
        let mut term = MemberTerm::new("C1", "C, C", "Independent", SENATE_CHAMBER, 2001, Some(2013));
        term.current_member = Some(true);
        normalize_term(&mut term, 2025).unwrap();
        assert_eq!(term.end_year, Some(2013));
        assert_eq!(term.current_member, Some(true));
    }

    #[test]
    fn test_renormalizing_is_a_no_op() {
        let mut terms = vec![
            MemberTerm::new("H1", "Doe, Jane", "Democratic", HOUSE_CHAMBER, 2019, None),
            MemberTerm::new("F1", "Old, Timer", "Democratic", HOUSE_CHAMBER, 1993, Some(2011)),
        ];
        normalize_terms(&mut terms, 2025).unwrap();
        let once = terms.clone();
        normalize_terms(&mut terms, 2025).unwrap();
        assert_eq!(terms, once);
        assert!(terms[0].is_current());
    }

    #[test]
    fn test_every_end_year_present_after_normalizing() {
        let mut terms = vec![
            MemberTerm::new("A", "A, A", "Democratic", HOUSE_CHAMBER, 2013, None),
            MemberTerm::new("B", "B, B", "Republican", SENATE_CHAMBER, 2009, None),
            MemberTerm::new("C", "C, C", "Independent", SENATE_CHAMBER, 2001, Some(2013)),
        ];
        normalize_terms(&mut terms, 2026).unwrap();
        assert!(terms.iter().all(|t| t.end_year.is_some()));
        assert!(terms.iter().all(|t| t.current_member.is_some()));
    }

    #[test]
    fn test_unknown_chamber_on_ongoing_term_fails() {
        let mut term = MemberTerm::new("X1", "Doe, Jane", "Democratic", "Senate ", 2019, None);
        let err = normalize_term(&mut term, 2025).unwrap_err();
        match err {
            CongressError::UnrecognizedChamber { bioguide_id, chamber } => {
                assert_eq!(bioguide_id, "X1");
                assert_eq!(chamber, "Senate ");
            }
            other => panic!("expected UnrecognizedChamber, got {other:?}"),
        }
        assert_eq!(term.end_year, None);
    }
}
