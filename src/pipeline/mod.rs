// Pipeline: fetch tables from the API sources and turn the member table into
// the ranked, current-only table the cards and exports consume.

pub mod processing;

use crate::constants::{MEMBERS_TABLE, MODIFIED_MEMBERS_TABLE};
use crate::error::Result;
use crate::storage::{load_members, save_flat_rows, save_members, Storage};
use crate::types::{MemberTerm, TableSource, Year};
use metrics::{counter, histogram};
use processing::{add_tenure, normalize_names, normalize_terms, only_current};
use tracing::{info, info_span, instrument};
use uuid::Uuid;

/// Result of one modify run
#[derive(Debug)]
pub struct ModifyResult {
    pub run_id: Uuid,
    pub total_rows: usize,
    pub current_rows: usize,
    pub members: Vec<MemberTerm>,
}

/// Result of one fetch run
#[derive(Debug)]
pub struct FetchResult {
    pub api_name: String,
    pub table: String,
    pub rows: usize,
}

pub struct Pipeline;

impl Pipeline {
    /// Runs the member transforms in order: resolve term ends, rank tenure,
    /// rename, keep current members.
    ///
    /// `current_year` is the present year all ongoing terms are measured from.
    pub fn modify_members(terms: Vec<MemberTerm>, current_year: Year) -> Result<ModifyResult> {
        let run_id = Uuid::new_v4();
        let span = info_span!("modify", run_id = %run_id, current_year);
        let _enter = span.enter();
        let started = std::time::Instant::now();

        let mut terms = terms;
        let total_rows = terms.len();
        info!("Modifying {} member terms", total_rows);

        normalize_terms(&mut terms, current_year)?;
        add_tenure(&mut terms)?;
        normalize_names(&mut terms);
        let members = only_current(terms);

        info!(
            "Kept {} current terms out of {}",
            members.len(),
            total_rows
        );
        counter!("congress_terms_modified_total").increment(total_rows as u64);
        histogram!("congress_modify_duration_seconds").record(started.elapsed().as_secs_f64());

        Ok(ModifyResult {
            run_id,
            total_rows,
            current_rows: members.len(),
            members,
        })
    }

    /// Loads the raw member table, modifies it and stores the result.
    #[instrument(skip(storage))]
    pub fn run_modify(storage: &dyn Storage, current_year: Year) -> Result<ModifyResult> {
        let terms = load_members(storage, MEMBERS_TABLE)?;
        let result = Self::modify_members(terms, current_year)?;
        save_members(storage, MODIFIED_MEMBERS_TABLE, &result.members)?;
        info!(
            "Wrote {} members to {}",
            result.current_rows, MODIFIED_MEMBERS_TABLE
        );
        Ok(result)
    }

    /// Fetches every row from `source` and stores them under its table name.
    #[instrument(skip(source, storage), fields(api_name = %source.api_name()))]
    pub async fn run_fetch(source: &dyn TableSource, storage: &dyn Storage) -> Result<FetchResult> {
        let api_name = source.api_name().to_string();
        let table = source.table_name().to_string();
        counter!("congress_fetch_runs_total", "api" => api_name.clone()).increment(1);
        let started = std::time::Instant::now();

        info!("Fetching rows from {}", api_name);
        let rows = source.fetch_rows().await?;
        let row_count = rows.len();
        save_flat_rows(storage, &table, rows)?;

        histogram!("congress_fetch_duration_seconds", "api" => api_name.clone())
            .record(started.elapsed().as_secs_f64());
        info!("Stored {} rows in {}", row_count, table);

        Ok(FetchResult {
            api_name,
            table,
            rows: row_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{HOUSE_CHAMBER, SENATE_CHAMBER};
    use crate::error::CongressError;
    use crate::storage::InMemoryStorage;
    use crate::types::FlatRow;
    use serde_json::json;

    fn sample_terms() -> Vec<MemberTerm> {
        vec![
            MemberTerm::new("P000197", "Pelosi, Nancy", "Democratic", HOUSE_CHAMBER, 1987, None),
            MemberTerm::new("C000243", "Cardin, Benjamin L.", "Democratic", HOUSE_CHAMBER, 1987, Some(2007)),
            MemberTerm::new("C000243", "Cardin, Benjamin L.", "Democratic", SENATE_CHAMBER, 2007, Some(2025)),
            MemberTerm::new("K000383", "King, Angus S., Jr.", "Independent", SENATE_CHAMBER, 2013, None),
            MemberTerm::new("J000299", "Johnson, Mike", "Republican", HOUSE_CHAMBER, 2017, None),
        ]
    }

    #[test]
    fn test_modify_members_end_to_end() {
        let result = Pipeline::modify_members(sample_terms(), 2025).unwrap();

        assert_eq!(result.total_rows, 5);
        assert_eq!(result.current_rows, 3);

        let names: Vec<&str> = result.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Nancy Pelosi", "Jr. Angus S. King", "Mike Johnson"]);

        let pelosi = &result.members[0];
        assert_eq!(pelosi.end_year, Some(2027));
        assert_eq!(pelosi.duration, Some(40));
        assert_eq!(pelosi.tenure_all_time, Some(1));
        assert_eq!(pelosi.tenure_current, Some(1));
        assert_eq!(pelosi.party_all_time_count, Some(3));
        assert_eq!(pelosi.party_current_count, Some(1));

        // King: 2013 + 12 -> 2031 (2025 + 6 - (12 mod 6))
        let king = &result.members[1];
        assert_eq!(king.end_year, Some(2031));
        assert_eq!(king.duration, Some(18));
        assert_eq!(king.tenure_current, Some(2));
        assert_eq!(king.tenure_current_party, Some(1));

        let johnson = &result.members[2];
        assert_eq!(johnson.end_year, Some(2027));
        assert_eq!(johnson.duration, Some(10));
        assert_eq!(johnson.tenure_current, Some(3));

        assert!(result.members.iter().all(MemberTerm::is_current));
        assert!(result.members.iter().all(|m| m.tenure_current.is_some()));
    }

    #[test]
    fn test_modify_stops_on_unrecognized_chamber() {
        let mut terms = sample_terms();
        terms.push(MemberTerm::new("D1", "Delegate, Some", "Democratic", "Delegate", 2021, None));
        assert!(matches!(
            Pipeline::modify_members(terms, 2025),
            Err(CongressError::UnrecognizedChamber { .. })
        ));
    }

    #[test]
    fn test_run_modify_reads_and_writes_tables() {
        let storage = InMemoryStorage::new();
        let rows = vec![
            json!({"bioguideId": "S1", "name": "Sanders, Bernard", "partyName": "Independent",
                   "state": "Vermont", "chamber": "Senate", "startYear": 2007}),
            json!({"bioguideId": "S1", "name": "Sanders, Bernard", "partyName": "Independent",
                   "state": "Vermont", "chamber": "House of Representatives",
                   "startYear": 1991, "endYear": 2007}),
        ];
        storage.save_rows(MEMBERS_TABLE, &rows).unwrap();

        let result = Pipeline::run_modify(&storage, 2025).unwrap();
        assert_eq!(result.current_rows, 1);

        let stored = storage.load_rows(MODIFIED_MEMBERS_TABLE).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["name"], "Bernard Sanders");
        assert_eq!(stored[0]["current_member"], true);
        assert_eq!(stored[0]["endYear"], 2031);
        assert_eq!(stored[0]["party_all_time_count"], 2);
        assert_eq!(stored[0]["party_current_count"], 1);
    }

    struct FixedSource(Vec<FlatRow>);

    #[async_trait::async_trait]
    impl TableSource for FixedSource {
        fn api_name(&self) -> &'static str {
            "fixed"
        }

        fn table_name(&self) -> &'static str {
            "fixed_table"
        }

        async fn fetch_rows(&self) -> Result<Vec<FlatRow>> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_run_fetch_stores_rows() {
        let mut row = FlatRow::new();
        row.insert("bioguideID".to_string(), json!("A1"));
        let source = FixedSource(vec![row.clone(), row]);
        let storage = InMemoryStorage::new();

        let result = Pipeline::run_fetch(&source, &storage).await.unwrap();
        assert_eq!(result.rows, 2);
        assert_eq!(result.table, "fixed_table");
        assert_eq!(storage.load_rows("fixed_table").unwrap().len(), 2);
    }
}
