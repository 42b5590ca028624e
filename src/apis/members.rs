use super::client::CongressClient;
use crate::config::ApiConfig;
use crate::constants::{JOIN_KEY, MEMBERS_API, MEMBERS_TABLE};
use crate::error::Result;
use crate::types::{FlatRow, TableSource};
use metrics::counter;
use serde_json::Value;
use tracing::{info, instrument, warn};

/// Member fields copied onto every term row, and the column each lands in.
const PARENT_FIELDS: [(&str, &str); 5] = [
    ("bioguideId", JOIN_KEY),
    ("name", "name"),
    ("partyName", "partyName"),
    ("state", "state"),
    ("url", "url"),
];

/// Paginated `/member` listing, flattened to one row per term.
pub struct MembersApi {
    client: CongressClient,
    limit_per_page: u32,
    max_members: Option<usize>,
    sort: String,
    congress: Option<u32>,
    chamber: Option<String>,
}

impl MembersApi {
    pub fn new(client: CongressClient, config: &ApiConfig) -> Self {
        Self {
            client,
            limit_per_page: config.limit_per_page,
            max_members: config.max_members,
            sort: config.sort.clone(),
            congress: config.congress,
            chamber: config.chamber.clone(),
        }
    }

    /// Walks the member listing page by page until the API stops offering a
    /// `pagination.next` link or `max_members` is reached.
    #[instrument(skip(self))]
    pub async fn fetch_members(&self) -> Result<Vec<Value>> {
        let mut all_members: Vec<Value> = Vec::new();
        let mut offset: u32 = 0;

        loop {
            let mut params = vec![
                ("limit", self.limit_per_page.to_string()),
                ("offset", offset.to_string()),
                ("sort", self.sort.clone()),
            ];
            if let Some(congress) = self.congress {
                params.push(("congress", congress.to_string()));
            }
            if let Some(chamber) = &self.chamber {
                params.push(("chamber", chamber.clone()));
            }

            info!("Fetching members from offset {} (limit {})", offset, self.limit_per_page);
            let data = self.client.get_json("member", &params).await?;

            let Some(page) = data.get("members").and_then(Value::as_array) else {
                warn!("No 'members' list in response; ending pagination");
                break;
            };
            info!("Got {} members from this page", page.len());
            counter!("congress_members_fetched_total").increment(page.len() as u64);
            all_members.extend(page.iter().cloned());

            if let Some(max) = self.max_members {
                if all_members.len() >= max {
                    info!("Reached max_members limit ({})", max);
                    break;
                }
            }

            let has_next = data
                .get("pagination")
                .and_then(|p| p.get("next"))
                .map(is_truthy)
                .unwrap_or(false);
            if !has_next {
                info!("No next page; all members fetched");
                break;
            }
            offset += self.limit_per_page;
            self.client.pause().await;
        }

        if let Some(max) = self.max_members {
            all_members.truncate(max);
        }
        info!("Total members fetched: {}", all_members.len());
        Ok(all_members)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Turns each member into one row per entry of `terms.item`.
///
/// A row starts with the member's own fields (the id under the `bioguideID`
/// column the vote rows use), then the `depiction` object's
/// fields (`imageUrl`, `attribution`), then the term's fields; later keys win.
/// Members without terms produce no rows.
pub fn flatten_member_terms(members: &[Value]) -> Vec<FlatRow> {
    let mut rows = Vec::new();

    for member in members {
        let mut parent = FlatRow::new();
        for (field, column) in PARENT_FIELDS {
            if let Some(value) = member.get(field) {
                parent.insert(column.to_string(), value.clone());
            }
        }
        if let Some(depiction) = member.get("depiction").and_then(Value::as_object) {
            for (key, value) in depiction {
                parent.insert(key.clone(), value.clone());
            }
        }

        let terms = member
            .get("terms")
            .and_then(|t| t.get("item"))
            .and_then(Value::as_array);
        for term in terms.into_iter().flatten() {
            let mut row = parent.clone();
            if let Some(term_fields) = term.as_object() {
                for (key, value) in term_fields {
                    row.insert(key.clone(), value.clone());
                }
            }
            rows.push(row);
        }
    }

    rows
}

#[async_trait::async_trait]
impl TableSource for MembersApi {
    fn api_name(&self) -> &'static str {
        MEMBERS_API
    }

    fn table_name(&self) -> &'static str {
        MEMBERS_TABLE
    }

    async fn fetch_rows(&self) -> Result<Vec<FlatRow>> {
        let members = self.fetch_members().await?;
        let rows = flatten_member_terms(&members);
        info!("Flattened {} members into {} term rows", members.len(), rows.len());
        Ok(rows)
    }
}
