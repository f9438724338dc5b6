//! Vehicle-model provider: Carbon Interface estimates API.
//!
//! Transport requests are keyed by `details.vehicle_model_id` rather than a
//! vehicle keyword. Food is not offered by this provider.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::mapper::{self, PreparedRequest};
use super::provider::{EmissionsProvider, ProviderEstimate, ProviderFailure};
use crate::activities::ActivityType;
use crate::config::EmissionsConfig;
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct CarbonInterfaceClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EstimateRequest {
    Vehicle {
        distance_unit: &'static str,
        distance_value: f64,
        vehicle_model_id: String,
    },
    Electricity {
        electricity_unit: &'static str,
        electricity_value: f64,
        country: String,
    },
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl CarbonInterfaceClient {
    pub fn new(cfg: &EmissionsConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("build carbon interface http client")?;
        Ok(Self {
            http,
            endpoint: format!("{}/api/v1/estimates", cfg.base_url.trim_end_matches('/')),
            api_key: cfg.api_key.clone(),
        })
    }
}

fn map_request(
    activity_type: ActivityType,
    details: &Value,
) -> AppResult<PreparedRequest<EstimateRequest>> {
    match activity_type {
        ActivityType::Transport => {
            let input = match mapper::transport_input(details)? {
                PreparedRequest::ZeroEmission => return Ok(PreparedRequest::ZeroEmission),
                PreparedRequest::Send(input) => input,
            };
            let model_id = details
                .get("vehicle_model_id")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    AppError::invalid(format!(
                        "vehicle_model_id is required to estimate {} trips",
                        input.vehicle
                    ))
                })?;
            Ok(PreparedRequest::Send(EstimateRequest::Vehicle {
                distance_unit: "km",
                distance_value: input.distance,
                vehicle_model_id: model_id.to_string(),
            }))
        }
        ActivityType::Electricity => {
            let input = mapper::electricity_input(details)?;
            Ok(PreparedRequest::Send(EstimateRequest::Electricity {
                electricity_unit: "kwh",
                electricity_value: input.energy,
                country: input.country,
            }))
        }
        ActivityType::Food => Err(AppError::UnsupportedCategory(
            "Food estimates are not available from this provider".into(),
        )),
    }
}

fn names_vehicle_model(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("vehicle model") || message.contains("vehicle_model")
}

fn classify_error(status: reqwest::StatusCode, body: &str) -> ProviderFailure {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message);

    match (status, message) {
        (reqwest::StatusCode::NOT_FOUND, Some(msg)) if names_vehicle_model(&msg) => {
            ProviderFailure::NoEmissionFactor(msg)
        }
        // Anything else on 404 means the endpoint itself is wrong.
        (reqwest::StatusCode::NOT_FOUND, _) => ProviderFailure::Transport(anyhow::anyhow!(
            "carbon interface endpoint not found, check EMISSIONS_BASE_URL"
        )),
        (_, Some(msg)) => ProviderFailure::Rejected(format!("Carbon Interface API error: {}", msg)),
        (_, None) => {
            ProviderFailure::Rejected(format!("Carbon Interface API error: HTTP {}", status))
        }
    }
}

fn extract_estimate(raw: Value) -> Result<ProviderEstimate, ProviderFailure> {
    let co2e_kg = raw
        .pointer("/data/attributes/carbon_kg")
        .and_then(Value::as_f64)
        .ok_or_else(|| {
            ProviderFailure::Transport(anyhow::anyhow!(
                "carbon interface response missing data.attributes.carbon_kg"
            ))
        })?;
    Ok(ProviderEstimate { co2e_kg, raw })
}

#[async_trait]
impl EmissionsProvider for CarbonInterfaceClient {
    fn name(&self) -> &'static str {
        "carbon_interface"
    }

    fn prepare(
        &self,
        activity_type: ActivityType,
        details: &Value,
    ) -> AppResult<PreparedRequest<Value>> {
        let prepared = map_request(activity_type, details)?;
        let PreparedRequest::Send(req) = prepared else {
            return Ok(PreparedRequest::ZeroEmission);
        };
        let body = serde_json::to_value(req).context("serialize carbon interface request")?;
        Ok(PreparedRequest::Send(body))
    }

    async fn send(&self, payload: &Value) -> Result<ProviderEstimate, ProviderFailure> {
        debug!(endpoint = %self.endpoint, "carbon interface estimate request");
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
            warn!(%status, body = %body, "carbon interface returned an error");
            return Err(classify_error(status, &body));
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| ProviderFailure::Transport(e.into()))?;
        extract_estimate(raw)
    }
}
