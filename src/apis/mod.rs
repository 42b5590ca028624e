pub mod client;
pub mod house_votes;
pub mod members;

use crate::config::Config;
use crate::constants::{HOUSE_VOTES_API, MEMBERS_API};
use crate::types::TableSource;
use client::CongressClient;
use house_votes::HouseVotesApi;
use members::MembersApi;

/// Builds the source registered under `api_name`.
pub fn create_source(
    api_name: &str,
    client: CongressClient,
    config: &Config,
) -> Option<Box<dyn TableSource>> {
    match api_name {
        MEMBERS_API => Some(Box::new(MembersApi::new(client, &config.api))),
        HOUSE_VOTES_API => Some(Box::new(HouseVotesApi::new(client, &config.votes))),
        _ => None,
    }
}
