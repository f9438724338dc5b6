//! Factor-table provider: Climatiq estimate API.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::mapper::{FactorMapper, PreparedRequest};
use super::provider::{EmissionsProvider, ProviderEstimate, ProviderFailure};
use crate::activities::ActivityType;
use crate::config::EmissionsConfig;
use crate::error::AppResult;

const NO_FACTOR_CODE: &str = "no_emission_factors_found";

#[derive(Clone)]
pub struct ClimatiqClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    mapper: FactorMapper,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ClimatiqClient {
    pub fn new(cfg: &EmissionsConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("build climatiq http client")?;
        Ok(Self {
            http,
            endpoint: format!("{}/data/v1/estimate", cfg.base_url.trim_end_matches('/')),
            api_key: cfg.api_key.clone(),
            mapper: FactorMapper::new(cfg.data_version.clone()),
        })
    }
}

/// Turns a non-success response body into a failure kind.
fn classify_error(status: reqwest::StatusCode, body: &str) -> ProviderFailure {
    let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|b| b.message.clone().or_else(|| b.error.clone()))
        .unwrap_or_else(|| format!("HTTP {}", status));

    match parsed.and_then(|b| b.error_code) {
        Some(code) if code == NO_FACTOR_CODE => ProviderFailure::NoEmissionFactor(message),
        _ => ProviderFailure::Rejected(format!("Climatiq API error: {}", message)),
    }
}

fn extract_estimate(raw: Value) -> Result<ProviderEstimate, ProviderFailure> {
    let co2e_kg = raw.get("co2e").and_then(Value::as_f64).ok_or_else(|| {
        ProviderFailure::Transport(anyhow::anyhow!("climatiq response missing co2e"))
    })?;
    Ok(ProviderEstimate { co2e_kg, raw })
}

#[async_trait]
impl EmissionsProvider for ClimatiqClient {
    fn name(&self) -> &'static str {
        "climatiq"
    }

    fn prepare(
        &self,
        activity_type: ActivityType,
        details: &Value,
    ) -> AppResult<PreparedRequest<Value>> {
        let prepared = match activity_type {
            ActivityType::Transport => self.mapper.map_transport_request(details)?,
            ActivityType::Electricity => {
                PreparedRequest::Send(self.mapper.map_electricity_request(details)?)
            }
            ActivityType::Food => PreparedRequest::Send(self.mapper.map_food_request(details)?),
        };
        Ok(match prepared {
            PreparedRequest::ZeroEmission => PreparedRequest::ZeroEmission,
            PreparedRequest::Send(req) => PreparedRequest::Send(
                serde_json::to_value(req).context("serialize climatiq request")?,
            ),
        })
    }

    async fn send(&self, payload: &Value) -> Result<ProviderEstimate, ProviderFailure> {
        debug!(endpoint = %self.endpoint, "climatiq estimate request");
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| ProviderFailure::Transport(e.into()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body = %body, "climatiq returned an error");
            return Err(classify_error(status, &body));
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| ProviderFailure::Transport(e.into()))?;
        extract_estimate(raw)
    }
}
