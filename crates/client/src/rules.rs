//! Client for the rules endpoint: list, add, delete.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use filterfeed_core::Rule;

use crate::error::FeedError;
use crate::CLIENT_USER_AGENT;

/// Store of filter rules on the upstream service.
///
/// All three operations are idempotent at the protocol level: deleting
/// already-deleted ids is harmless, while re-adding an identical rule
/// creates a duplicate (upstream's accounting, not ours).
#[async_trait]
pub trait RuleStore: Send + Sync {
    async fn list_rules(&self) -> Result<Vec<Rule>, FeedError>;

    /// No-op on an empty set.
    async fn add_rules(&self, rules: &[Rule]) -> Result<(), FeedError>;

    /// Deletes by upstream-assigned id; no-op when no rule carries one.
    async fn delete_rules(&self, rules: &[Rule]) -> Result<(), FeedError>;
}

/// HTTP implementation against the real rules endpoint.
pub struct HttpRuleStore {
    client: reqwest::Client,
    rules_url: String,
    bearer_token: String,
}

#[derive(Deserialize)]
struct RulesResponse {
    #[serde(default)]
    data: Vec<Rule>,
}

impl HttpRuleStore {
    pub fn new(rules_url: String, bearer_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            rules_url,
            bearer_token,
        }
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        // Request context is built fresh per call; nothing mutable is
        // shared between operations.
        self.client
            .request(method, &self.rules_url)
            .bearer_auth(&self.bearer_token)
            .header(reqwest::header::USER_AGENT, CLIENT_USER_AGENT)
    }
}

async fn check_status(response: reqwest::Response) -> Result<(), FeedError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(FeedError::Upstream {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl RuleStore for HttpRuleStore {
    async fn list_rules(&self) -> Result<Vec<Rule>, FeedError> {
        let response = self.request(reqwest::Method::GET).send().await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(FeedError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: RulesResponse = serde_json::from_str(&body)?;
        Ok(parsed.data)
    }

    async fn add_rules(&self, rules: &[Rule]) -> Result<(), FeedError> {
        if rules.is_empty() {
            return Ok(());
        }

        debug!(count = rules.len(), "adding rules");
        let payload = json!({ "add": rules });
        let response = self
            .request(reqwest::Method::POST)
            .json(&payload)
            .send()
            .await?;
        check_status(response).await
    }

    async fn delete_rules(&self, rules: &[Rule]) -> Result<(), FeedError> {
        let ids: Vec<&str> = rules.iter().filter_map(|r| r.id.as_deref()).collect();
        if ids.is_empty() {
            return Ok(());
        }

        debug!(count = ids.len(), "deleting rules");
        let payload = json!({ "delete": { "ids": ids } });
        let response = self
            .request(reqwest::Method::POST)
            .json(&payload)
            .send()
            .await?;
        check_status(response).await
    }
}
