use async_trait::async_trait;
use serde_json::Value;

use super::mapper::PreparedRequest;
use crate::activities::ActivityType;
use crate::error::AppResult;

/// Successful provider answer.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderEstimate {
    pub co2e_kg: f64,
    pub raw: Value,
}

/// Why a provider call failed.
#[derive(Debug, thiserror::Error)]
pub enum ProviderFailure {
    /// The provider has no factor for the requested activity.
    #[error("no emission factor found: {0}")]
    NoEmissionFactor(String),

    /// Any other structured error reported by the provider.
    #[error("{0}")]
    Rejected(String),

    /// The request never produced a usable response.
    #[error("emissions provider request failed")]
    Transport(#[source] anyhow::Error),
}

/// One external emissions API. Implementations own both the payload shape
/// and the wire call; the estimator owns interpretation and fallback.
#[async_trait]
pub trait EmissionsProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Builds the request body for already-validated details.
    fn prepare(&self, activity_type: ActivityType, details: &Value)
        -> AppResult<PreparedRequest<Value>>;

    /// Sends one request. No retries.
    async fn send(&self, payload: &Value) -> Result<ProviderEstimate, ProviderFailure>;
}
