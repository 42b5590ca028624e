use super::ranking::{competition_rank_desc, competition_rank_desc_by, group_sizes};
use crate::error::{CongressError, Result};
use crate::types::MemberTerm;
use tracing::debug;

fn invariant(term: &MemberTerm, message: impl Into<String>) -> CongressError {
    CongressError::InvariantViolation {
        bioguide_id: term.bioguide_id.clone(),
        message: message.into(),
    }
}

/// Computes `duration`, the four tenure ranks and the two party counts for
/// every row. Rows must already carry an end year and a current-member flag.
///
/// Ranking works on term rows, not members: a member with three terms is
/// ranked three times.
pub fn add_tenure(terms: &mut [MemberTerm]) -> Result<()> {
    let mut durations = Vec::with_capacity(terms.len());
    let mut current_flags = Vec::with_capacity(terms.len());

    for term in terms.iter_mut() {
        let end_year = term
            .end_year
            .ok_or_else(|| invariant(term, "endYear missing at tenure stage"))?;
        let current = term
            .current_member
            .ok_or_else(|| invariant(term, "current_member unset at tenure stage"))?;
        let duration = end_year - term.start_year;
        if duration < 0 {
            return Err(invariant(
                term,
                format!(
                    "negative duration {duration} (startYear {}, endYear {end_year})",
                    term.start_year
                ),
            ));
        }
        term.duration = Some(duration);
        durations.push(duration);
        current_flags.push(current);
    }

    let parties: Vec<&str> = terms.iter().map(|t| t.party_name.as_str()).collect();
    let party_status: Vec<(&str, bool)> = parties
        .iter()
        .copied()
        .zip(current_flags.iter().copied())
        .collect();

    let all_time = competition_rank_desc(&durations);
    let all_time_party = competition_rank_desc_by(&durations, &parties);
    let party_counts = group_sizes(&parties);
    let party_status_counts = group_sizes(&party_status);

    // Current-only ranks are computed over the current subset and mapped back.
    let current_rows: Vec<usize> = (0..terms.len()).filter(|&i| current_flags[i]).collect();
    let current_durations: Vec<i32> = current_rows.iter().map(|&i| durations[i]).collect();
    let current_parties: Vec<&str> = current_rows.iter().map(|&i| parties[i]).collect();
    let current_rank = competition_rank_desc(&current_durations);
    let current_party_rank = competition_rank_desc_by(&current_durations, &current_parties);

    let mut tenure_current = vec![None; terms.len()];
    let mut tenure_current_party = vec![None; terms.len()];
    for (position, &row) in current_rows.iter().enumerate() {
        tenure_current[row] = Some(current_rank[position]);
        tenure_current_party[row] = Some(current_party_rank[position]);
    }

    for (i, term) in terms.iter_mut().enumerate() {
        term.tenure_all_time = Some(all_time[i]);
        term.tenure_all_time_party = Some(all_time_party[i]);
        term.tenure_current = tenure_current[i];
        term.tenure_current_party = tenure_current_party[i];
        term.party_all_time_count = Some(party_counts[i]);
        term.party_current_count = Some(party_status_counts[i]);
    }

    debug!(
        rows = terms.len(),
        current = current_rows.len(),
        "Computed tenure statistics"
    );
    Ok(())
}
