//! Estimation pipeline: validate, map, call the provider, interpret.
//!
//! Results are not reproducible over time: provider factor tables change,
//! while the fallback coefficient is fixed.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::mapper::PreparedRequest;
use super::provider::{EmissionsProvider, ProviderFailure};
use super::tips;
use crate::activities::{validation, ActivityType};
use crate::error::{AppError, AppResult};

/// kg CO2e per km used when the provider has no factor for a trip.
pub const FALLBACK_KG_PER_KM: f64 = 0.2;

pub const FALLBACK_NOTE: &str = "Fallback estimation due to unavailable emission factor";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimationResult {
    pub carbon_kg: f64,
    pub activity_data: Value,
    pub tip: String,
}

impl EstimationResult {
    pub fn is_fallback(&self) -> bool {
        self.activity_data.get("fallback").and_then(Value::as_bool) == Some(true)
    }
}

fn result(kind: ActivityType, details: &Value, carbon_kg: f64, activity_data: Value) -> EstimationResult {
    EstimationResult {
        carbon_kg,
        activity_data,
        tip: tips::tip(kind.as_str(), details, carbon_kg).to_string(),
    }
}

pub async fn estimate(
    provider: &dyn EmissionsProvider,
    activity_type: &str,
    details: &Value,
) -> AppResult<EstimationResult> {
    let kind = validation::validate(activity_type, details)?;

    let payload = match provider.prepare(kind, details)? {
        PreparedRequest::ZeroEmission => {
            info!(%kind, "zero-emission activity, provider not called");
            return Ok(result(kind, details, 0.0, json!({ "co2e": 0 })));
        }
        PreparedRequest::Send(payload) => payload,
    };

    info!(%kind, provider = provider.name(), "requesting emission estimate");
    match provider.send(&payload).await {
        Ok(estimate) => Ok(result(kind, details, estimate.co2e_kg, estimate.raw)),
        Err(ProviderFailure::NoEmissionFactor(msg)) => {
            let distance = details.get("distance").and_then(Value::as_f64);
            match (kind, distance) {
                (ActivityType::Transport, Some(distance)) => {
                    warn!(%kind, provider_message = %msg, "no emission factor, using fallback");
                    let carbon_kg = FALLBACK_KG_PER_KM * distance;
                    Ok(result(
                        kind,
                        details,
                        carbon_kg,
                        json!({ "note": FALLBACK_NOTE, "fallback": true }),
                    ))
                }
                _ => Err(AppError::Provider(format!(
                    "Unable to estimate emissions: no emission factor available for this {} activity",
                    kind
                ))),
            }
        }
        Err(ProviderFailure::Rejected(msg)) => Err(AppError::Provider(msg)),
        Err(ProviderFailure::Transport(err)) => {
            Err(AppError::Fatal(err.context(format!("{} request", provider.name()))))
        }
    }
}

#[cfg(test)]
pub mod testing {
    //! Scripted provider for tests.

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::emissions::mapper::FactorMapper;
    use crate::emissions::provider::ProviderEstimate;

    pub enum Script {
        Co2e(f64),
        NoFactor,
        Rejected(&'static str),
        Transport,
    }

    /// Uses the factor-table mapper and answers from a script.
    pub struct StubProvider {
        mapper: FactorMapper,
        script: Mutex<Script>,
        calls: AtomicUsize,
    }

    impl StubProvider {
        pub fn new(script: Script) -> Self {
            Self {
                mapper: FactorMapper::new("21.21"),
                script: Mutex::new(script),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EmissionsProvider for StubProvider {
        fn name(&self) -> &'static str {
            "stub"
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
                ActivityType::Food => {
                    PreparedRequest::Send(self.mapper.map_food_request(details)?)
                }
            };
            Ok(match prepared {
                PreparedRequest::ZeroEmission => PreparedRequest::ZeroEmission,
                PreparedRequest::Send(req) => {
                    PreparedRequest::Send(serde_json::to_value(req).unwrap())
                }
            })
        }

        async fn send(&self, payload: &Value) -> Result<ProviderEstimate, ProviderFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &*self.script.lock().unwrap() {
                Script::Co2e(v) => Ok(ProviderEstimate {
                    co2e_kg: *v,
                    raw: json!({ "co2e": v, "request": payload }),
                }),
                Script::NoFactor => Err(ProviderFailure::NoEmissionFactor(
                    "No emission factors could be found".into(),
                )),
                Script::Rejected(msg) => Err(ProviderFailure::Rejected((*msg).into())),
                Script::Transport => Err(ProviderFailure::Transport(anyhow::anyhow!(
                    "connection refused"
                ))),
            }
        }
    }
}
