use crate::constants::{HOUSE_CHAMBER, HOUSE_TERM_YEARS, SENATE_CHAMBER, SENATE_TERM_YEARS};
use crate::error::{CongressError, Result};
use serde::{Deserialize, Serialize};

/// A flattened API object: one table row with arbitrary columns.
pub type FlatRow = serde_json::Map<String, serde_json::Value>;

/// Calendar year.
pub type Year = i32;

/// One row per (member, term). A member serving several terms has several rows
/// sharing the same `bioguide_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberTerm {
    #[serde(rename = "bioguideID", alias = "bioguideId")]
    pub bioguide_id: String,
    pub name: String,
    #[serde(rename = "partyName")]
    pub party_name: String,
    #[serde(default)]
    pub state: String,
    pub chamber: String,
    #[serde(rename = "startYear")]
    pub start_year: Year,
    /// `None` while the term is ongoing.
    #[serde(rename = "endYear", default, skip_serializing_if = "Option::is_none")]
    pub end_year: Option<Year>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,

    // Derived by the pipeline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_member: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenure_all_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenure_all_time_party: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenure_current: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenure_current_party: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_all_time_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_current_count: Option<u32>,
}

impl MemberTerm {
    /// Builds a bare term row with no derived fields.
    pub fn new(
        bioguide_id: impl Into<String>,
        name: impl Into<String>,
        party_name: impl Into<String>,
        chamber: impl Into<String>,
        start_year: Year,
        end_year: Option<Year>,
    ) -> Self {
        Self {
            bioguide_id: bioguide_id.into(),
            name: name.into(),
            party_name: party_name.into(),
            state: String::new(),
            chamber: chamber.into(),
            start_year,
            end_year,
            url: None,
            image_url: None,
            attribution: None,
            current_member: None,
            duration: None,
            tenure_all_time: None,
            tenure_all_time_party: None,
            tenure_current: None,
            tenure_current_party: None,
            party_all_time_count: None,
            party_current_count: None,
        }
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    pub fn is_current(&self) -> bool {
        self.current_member == Some(true)
    }

    /// Parses one flattened row, reporting its position on failure.
    pub fn from_row(index: usize, row: &serde_json::Value) -> Result<Self> {
        serde_json::from_value(row.clone()).map_err(|e| CongressError::MalformedRecord {
            index,
            reason: e.to_string(),
        })
    }
}

/// The two chambers, each with its own term length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chamber {
    House,
    Senate,
}

impl Chamber {
    /// Matches the API's chamber label exactly.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            HOUSE_CHAMBER => Some(Chamber::House),
            SENATE_CHAMBER => Some(Chamber::Senate),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Chamber::House => HOUSE_CHAMBER,
            Chamber::Senate => SENATE_CHAMBER,
        }
    }

    pub fn term_years(&self) -> Year {
        match self {
            Chamber::House => HOUSE_TERM_YEARS,
            Chamber::Senate => SENATE_TERM_YEARS,
        }
    }
}

/// Core trait that every Congress.gov data source implements
#[async_trait::async_trait]
pub trait TableSource: Send + Sync {
    /// Unique identifier for this source
    fn api_name(&self) -> &'static str;

    /// Table the fetched rows are stored under
    fn table_name(&self) -> &'static str;

    /// Fetch every row from this source, already flattened
    async fn fetch_rows(&self) -> Result<Vec<FlatRow>>;
}
