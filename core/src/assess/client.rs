//! HTTP client for the item quality assessment API.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::NaiveDateTime;
use ornalens_types::AssessmentConfig;
use serde::Deserialize;

use super::{ItemAssessment, ItemAssessmentRequest};

const USER_AGENT: &str = concat!("ornalens/", env!("CARGO_PKG_VERSION"));

/// Index of the first forge-tier value (10★) in each stat array.
const FIRST_TIER_IDX: usize = 9;

#[derive(Debug, thiserror::Error)]
pub enum AssessError {
    #[error("assessment request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("assessment API returned status {0}")]
    Status(u16),
    #[error("failed to decode assessment response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("assessment response missing `{0}`")]
    Missing(&'static str),
}

#[derive(Debug, Deserialize)]
struct RawResponse {
    quality: Option<f64>,
    /// Either a JSON-encoded string or an inline object of stat -> values.
    stats: Option<serde_json::Value>,
    #[serde(default)]
    materials: Vec<i64>,
}

/// Decode a raw API response body into an [`ItemAssessment`].
pub fn decode_response(
    request: &ItemAssessmentRequest,
    body: &str,
    assessed_at: NaiveDateTime,
) -> Result<ItemAssessment, AssessError> {
    let raw: RawResponse = serde_json::from_str(body)?;
    let quality = raw.quality.ok_or(AssessError::Missing("quality"))?;

    let stats_value: serde_json::Value = match raw.stats {
        Some(serde_json::Value::String(s)) => serde_json::from_str(&s)?,
        Some(v @ serde_json::Value::Object(_)) => v,
        Some(_) | None => return Err(AssessError::Missing("stats")),
    };
    let per_stat: BTreeMap<String, Vec<f64>> = serde_json::from_value(stats_value)?;

    let stats = per_stat
        .into_iter()
        .map(|(name, values)| {
            let mut tiers = [0.0; 4];
            for (slot, value) in tiers.iter_mut().zip(values.iter().skip(FIRST_TIER_IDX)) {
                *slot = *value;
            }
            (name, tiers)
        })
        .collect();

    let mut materials = [0; 4];
    for (slot, value) in materials.iter_mut().zip(raw.materials) {
        *slot = value;
    }

    Ok(ItemAssessment {
        request: request.clone(),
        quality,
        stats,
        materials,
        assessed_at,
    })
}

#[derive(Debug, Clone)]
pub struct AssessmentClient {
    http: reqwest::Client,
    endpoint: String,
    retries: u8,
}

impl AssessmentClient {
    pub fn new(config: &AssessmentConfig) -> Result<Self, AssessError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            retries: config.effective_retries(),
        })
    }

    /// Single attempt against the API.
    pub async fn assess(
        &self,
        request: &ItemAssessmentRequest,
    ) -> Result<ItemAssessment, AssessError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&request.to_api_body())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssessError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        decode_response(request, &body, chrono::Local::now().naive_local())
    }

    /// Assess with the configured retry budget (at most one retry).
    pub async fn assess_with_retry(
        &self,
        request: &ItemAssessmentRequest,
    ) -> Result<ItemAssessment, AssessError> {
        let mut attempt = 0;
        loop {
            match self.assess(request).await {
                Ok(result) => return Ok(result),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    tracing::warn!(
                        item = %request.item_name,
                        error = %e,
                        "[ASSESS] Attempt failed, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}
