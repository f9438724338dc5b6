pub mod carbon_interface;
pub mod climatiq;
pub mod estimator;
#[cfg(test)]
mod fake_api;
pub mod factors;
pub mod mapper;
pub mod provider;
pub mod tips;

use std::sync::Arc;

use crate::config::{EmissionsConfig, ProviderKind};

pub use estimator::estimate;
pub use provider::EmissionsProvider;

pub fn build_provider(cfg: &EmissionsConfig) -> anyhow::Result<Arc<dyn EmissionsProvider>> {
    let provider: Arc<dyn EmissionsProvider> = match cfg.provider {
        ProviderKind::Climatiq => Arc::new(climatiq::ClimatiqClient::new(cfg)?),
        ProviderKind::CarbonInterface => {
            Arc::new(carbon_interface::CarbonInterfaceClient::new(cfg)?)
        }
    };
    tracing::info!(
        provider = provider.name(),
        timeout_secs = cfg.timeout_secs,
        "emissions provider configured"
    );
    Ok(provider)
}
