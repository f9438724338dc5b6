//! Presence checks for activity details, per activity type.
//!
//! Only presence is checked here. Numeric bounds (e.g. a positive distance)
//! belong to the provider request mappers.

use serde_json::Value;

use super::repo_types::ActivityType;
use crate::error::{AppError, AppResult};

pub fn validate(activity_type: &str, details: &Value) -> AppResult<ActivityType> {
    if activity_type.trim().is_empty() {
        return Err(AppError::invalid("Activity type is required"));
    }
    let kind = ActivityType::parse(activity_type)
        .ok_or_else(|| AppError::invalid(format!("Invalid activity type: {}", activity_type)))?;

    let Some(fields) = details.as_object() else {
        return Err(AppError::invalid(
            "Activity details are required and must be an object",
        ));
    };

    let present = |key: &str| match fields.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    };

    let ok = match kind {
        ActivityType::Transport => present("distance") && present("vehicle"),
        ActivityType::Electricity => present("energy") && present("country"),
        ActivityType::Food => present("food_type") && present("quantity"),
    };
    if !ok {
        let msg = match kind {
            ActivityType::Transport => "Transport details must include distance and vehicle",
            ActivityType::Electricity => "Electricity details must include energy and country",
            ActivityType::Food => "Food details must include food type and quantity",
        };
        return Err(AppError::invalid(msg));
    }

    Ok(kind)
}
