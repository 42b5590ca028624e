use super::client::CongressClient;
use crate::config::VotesConfig;
use crate::constants::{HOUSE_VOTES_API, VOTES_TABLE};
use crate::error::{CongressError, Result};
use crate::types::{FlatRow, TableSource};
use metrics::counter;
use serde_json::Value;
use tracing::{info, instrument, warn};

const VOTES_CONTAINER: &str = "houseRollCallVoteMemberVotes";
const VOTE_PARENT_FIELDS: [&str; 5] = ["congress", "identifier", "result", "voteQuestion", "voteType"];
const MEMBER_VOTES_LIMIT: u32 = 250;

/// House roll-call votes, one row per (roll call, member).
pub struct HouseVotesApi {
    client: CongressClient,
    congress: u32,
    session: u32,
    max_records: u32,
}

impl HouseVotesApi {
    pub fn new(client: CongressClient, config: &VotesConfig) -> Self {
        Self {
            client,
            congress: config.congress,
            session: config.session,
            max_records: config.max_records,
        }
    }

    /// Fetches the member-vote container for one roll call. A single page covers
    /// the whole House.
    #[instrument(skip(self))]
    pub async fn fetch_roll_call(&self, vote_number: u32) -> Result<Value> {
        let endpoint = format!(
            "house-vote/{}/{}/{}/members",
            self.congress, self.session, vote_number
        );
        let params = [
            ("limit", MEMBER_VOTES_LIMIT.to_string()),
            ("offset", "0".to_string()),
        ];
        let mut data = self.client.get_json(&endpoint, &params).await?;

        match data.get_mut(VOTES_CONTAINER).map(Value::take) {
            Some(container @ Value::Object(_)) => Ok(container),
            _ => Err(CongressError::MissingField(format!(
                "{VOTES_CONTAINER} not found for roll call {vote_number}"
            ))),
        }
    }
}

/// Copies the roll call's summary fields onto each member's vote.
pub fn flatten_roll_call(container: &Value) -> Vec<FlatRow> {
    let mut parent = FlatRow::new();
    for field in VOTE_PARENT_FIELDS {
        if let Some(value) = container.get(field) {
            parent.insert(field.to_string(), value.clone());
        }
    }

    container
        .get("results")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .map(|vote| {
            let mut row = parent.clone();
            if let Some(fields) = vote.as_object() {
                for (key, value) in fields {
                    row.insert(key.clone(), value.clone());
                }
            }
            row
        })
        .collect()
}

#[async_trait::async_trait]
impl TableSource for HouseVotesApi {
    fn api_name(&self) -> &'static str {
        HOUSE_VOTES_API
    }

    fn table_name(&self) -> &'static str {
        VOTES_TABLE
    }

    /// Walks roll calls from 1 until `max_records` or the first roll call that
    /// can't be fetched, which marks the end of the session so far.
    async fn fetch_rows(&self) -> Result<Vec<FlatRow>> {
        let mut rows = Vec::new();

        for vote_number in 1..self.max_records {
            let container = match self.fetch_roll_call(vote_number).await {
                Ok(container) => container,
                Err(e) => {
                    warn!("Roll call {} unavailable ({}); stopping", vote_number, e);
                    break;
                }
            };
            let votes = flatten_roll_call(&container);
            info!("Roll call {}: {} member votes", vote_number, votes.len());
            counter!("congress_member_votes_fetched_total").increment(votes.len() as u64);
            rows.extend(votes);
            self.client.pause().await;
        }

        info!("Fetched {} member votes in total", rows.len());
        Ok(rows)
    }
}
