use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Which external emissions API backs estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Climatiq,
    CarbonInterface,
}

impl ProviderKind {
    fn parse(raw: &str) -> anyhow::Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "climatiq" => Ok(Self::Climatiq),
            "carbon_interface" | "carboninterface" => Ok(Self::CarbonInterface),
            other => anyhow::bail!("unknown EMISSIONS_PROVIDER: {}", other),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmissionsConfig {
    pub provider: ProviderKind,
    pub api_key: String,
    pub base_url: String,
    pub data_version: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub emissions: EmissionsConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "carbon-footprint".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "carbon-footprint-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        let emissions = EmissionsConfig::from_env()?;
        Ok(Self {
            database_url,
            jwt,
            emissions,
        })
    }
}

impl EmissionsConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let provider = match std::env::var("EMISSIONS_PROVIDER") {
            Ok(v) => ProviderKind::parse(&v)?,
            Err(_) => ProviderKind::Climatiq,
        };
        let (key_var, default_base) = match provider {
            ProviderKind::Climatiq => ("CLIMATIQ_API_KEY", "https://api.climatiq.io"),
            ProviderKind::CarbonInterface => {
                ("CARBON_INTERFACE_API_KEY", "https://www.carboninterface.com")
            }
        };
        let api_key = std::env::var(key_var).unwrap_or_default();
        if api_key.is_empty() {
            tracing::warn!(var = key_var, "emissions API key not set; provider calls will be rejected");
        }
        Ok(Self {
            provider,
            api_key,
            base_url: std::env::var("EMISSIONS_BASE_URL")
                .unwrap_or_else(|_| default_base.into()),
            data_version: std::env::var("CLIMATIQ_DATA_VERSION")
                .unwrap_or_else(|_| "21.21".into()),
            timeout_secs: parse_timeout_secs(std::env::var("EMISSIONS_TIMEOUT_SECS").ok())?,
        })
    }
}

const DEFAULT_TIMEOUT_SECS: u64 = 10;

fn parse_timeout_secs(raw: Option<String>) -> anyhow::Result<u64> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_TIMEOUT_SECS);
    };
    let secs = raw
        .trim()
        .parse::<u64>()
        .with_context(|| format!("EMISSIONS_TIMEOUT_SECS is not a number: {}", raw))?;
    anyhow::ensure!(secs > 0, "EMISSIONS_TIMEOUT_SECS must be at least 1");
    Ok(secs)
}
