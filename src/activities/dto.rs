use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body for create and update. Without `carbon_kg` the value is estimated.
#[derive(Debug, Deserialize)]
pub struct ActivityRequest {
    #[serde(default)]
    pub activity_type: String,
    #[serde(default)]
    pub details: Value,
    #[serde(default)]
    pub carbon_kg: Option<f64>,
}

/// `GET /activities/estimate?activity_type=transport&details={"distance":10,...}`
#[derive(Debug, Deserialize)]
pub struct EstimateQuery {
    pub activity_type: Option<String>,
    pub details: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EstimateBody {
    #[serde(default)]
    pub activity_type: String,
    #[serde(default)]
    pub details: Value,
}

#[derive(Debug, Serialize)]
pub struct EstimatedActivity {
    pub activity_type: String,
    pub details: Value,
    pub carbon_kg: f64,
}

#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    pub activity: EstimatedActivity,
    pub activity_data: Value,
    pub tip: String,
}
