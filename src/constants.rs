/// Constants shared by the API sources, the core and the file layout.

// Source names (used in logs, metrics labels and the CLI)
pub const MEMBERS_API: &str = "members";
pub const HOUSE_VOTES_API: &str = "house_votes";

pub const DEFAULT_BASE_URL: &str = "https://api.congress.gov/v3/";
pub const API_KEY_ENV: &str = "CONGRESS_API_KEY";
pub const API_KEY_SIGNUP_URL: &str = "https://api.data.gov/signup/";

// Chamber labels as the API spells them
pub const HOUSE_CHAMBER: &str = "House of Representatives";
pub const SENATE_CHAMBER: &str = "Senate";

pub const HOUSE_TERM_YEARS: i32 = 2;
pub const SENATE_TERM_YEARS: i32 = 6;

// Tables written under the output directory
pub const MEMBERS_TABLE: &str = "congressmen";
pub const VOTES_TABLE: &str = "voting_records";
pub const MODIFIED_MEMBERS_TABLE: &str = "congressmen_mod";
pub const RAW_DATA_CSV: &str = "raw_data.csv";

/// Column used to join members with their votes.
pub const JOIN_KEY: &str = "bioguideID";

/// Get all supported source names
pub fn get_supported_apis() -> Vec<&'static str> {
    vec![MEMBERS_API, HOUSE_VOTES_API]
}
