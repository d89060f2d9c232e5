use std::time::Duration;

use async_trait::async_trait;
use cartoffer_core::{CoreError, CoreResult, SegmentResolver, UserId};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::resiliency::CircuitBreaker;

#[derive(Debug, Deserialize)]
struct SegmentResponse {
    #[serde(default)]
    segment: Option<String>,
}

/// Resolves segments through the external user-segment service.
///
/// `GET {base_url}/api/v1/user_segment?user_id=N` answering `{"segment": "p1"}`.
/// One bounded attempt per lookup; repeated failures open the circuit and
/// later lookups fail fast until the reset timeout passes.
pub struct HttpSegmentResolver {
    client: Client,
    base_url: String,
    breaker: CircuitBreaker,
}

impl HttpSegmentResolver {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        failure_threshold: usize,
        reset_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            breaker: CircuitBreaker::new("segment-service", failure_threshold, reset_timeout),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/v1/user_segment", self.base_url)
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    async fn fetch(&self, user_id: UserId) -> Result<Option<String>, reqwest::Error> {
        let response = self
            .client
            .get(self.endpoint())
            .query(&[("user_id", user_id)])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body: SegmentResponse = response.error_for_status()?.json().await?;
        Ok(body
            .segment
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()))
    }
}

#[async_trait]
impl SegmentResolver for HttpSegmentResolver {
    async fn segment_of(&self, user_id: UserId) -> CoreResult<Option<String>> {
        if !self.breaker.check().await {
            return Err(CoreError::SegmentLookup(format!(
                "Circuit Breaker [{}] is OPEN",
                self.breaker.name
            )));
        }

        match self.fetch(user_id).await {
            Ok(segment) => {
                self.breaker.record_success().await;
                debug!("User {} resolved to segment {:?}", user_id, segment);
                Ok(segment)
            }
            Err(e) => {
                self.breaker.record_failure().await;
                Err(CoreError::SegmentLookup(e.to_string()))
            }
        }
    }
}
