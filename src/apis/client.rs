use crate::config::ApiConfig;
use crate::error::{CongressError, Result};
use metrics::counter;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// Thin wrapper over `reqwest` for the Congress.gov v3 API.
///
/// Every request carries `api_key` and `format=json`. There is no retry; callers
/// decide what a failed request means for them.
#[derive(Clone)]
pub struct CongressClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    delay: Duration,
}

impl std::fmt::Debug for CongressClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CongressClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("delay", &self.delay)
            .finish()
    }
}

impl CongressClient {
    pub fn new(config: &ApiConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: api_key.into(),
            delay: Duration::from_millis(config.rate_limit_delay_ms),
        })
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// GETs `endpoint` and decodes the body as JSON. Non-2xx responses become
    /// [`CongressError::Api`] carrying the status and body text.
    #[instrument(skip(self, params))]
    pub async fn get_json(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value> {
        let url = self.endpoint_url(endpoint);
        debug!("Querying {} with {:?}", url, params);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .query(&[("api_key", self.api_key.as_str()), ("format", "json")])
            .query(params)
            .send()
            .await?;
        counter!("congress_api_requests_total").increment(1);

        let status = response.status();
        if !status.is_success() {
            counter!("congress_api_errors_total", "status" => status.as_u16().to_string())
                .increment(1);
            let message = response.text().await.unwrap_or_default();
            return Err(CongressError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<Value>().await?)
    }

    /// Sleeps for the configured inter-request delay.
    pub async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_joins_slashes() {
        let config = ApiConfig {
            base_url: "https://api.congress.gov/v3/".to_string(),
            ..ApiConfig::default()
        };
        let client = CongressClient::new(&config, "key").unwrap();
        assert_eq!(
            client.endpoint_url("member"),
            "https://api.congress.gov/v3/member"
        );
        assert_eq!(
            client.endpoint_url("/house-vote/119/1/3/members"),
            "https://api.congress.gov/v3/house-vote/119/1/3/members"
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let client = CongressClient::new(&ApiConfig::default(), "secret-key").unwrap();
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("secret-key"));
    }
}
