use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

/// Supported activity categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Transport,
    Electricity,
    Food,
}

impl ActivityType {
    pub const ALL: [ActivityType; 3] = [Self::Transport, Self::Electricity, Self::Food];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Transport => "transport",
            ActivityType::Electricity => "electricity",
            ActivityType::Food => "food",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == raw)
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw `activities` row. `details` is JSONB but may hold legacy values.
#[derive(Debug, Clone, FromRow)]
pub struct ActivityRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub activity_type: String,
    pub details: Option<Value>,
    pub carbon_kg: f64,
    pub created_at: OffsetDateTime,
}

/// Activity as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub activity_type: String,
    pub details: Value,
    pub carbon_kg: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<ActivityRow> for Activity {
    fn from(r: ActivityRow) -> Self {
        let details = normalize_details(r.id, r.details);
        Self {
            id: r.id,
            user_id: r.user_id,
            activity_type: r.activity_type,
            details,
            carbon_kg: r.carbon_kg,
            created_at: r.created_at,
        }
    }
}

/// Stored details are not re-validated; anything that is not an object
/// (or a string holding one) reads back as `{}`.
fn normalize_details(id: Uuid, details: Option<Value>) -> Value {
    match details {
        Some(Value::Object(map)) => Value::Object(map),
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Value::Object(map),
            Ok(_) | Err(_) => {
                warn!(activity_id = %id, "could not parse stored activity details, defaulting to empty object");
                Value::Object(Map::new())
            }
        },
        _ => {
            warn!(activity_id = %id, "stored activity details are not an object, defaulting to empty object");
            Value::Object(Map::new())
        }
    }
}

/// Values written on insert and update.
#[derive(Debug, Clone)]
pub struct ActivityWrite {
    pub activity_type: ActivityType,
    pub details: Value,
    pub carbon_kg: f64,
}
