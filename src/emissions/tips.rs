use serde_json::Value;

pub const TIP_CARPOOL: &str = "Consider carpooling or using public transport to reduce emissions";
pub const TIP_BIKE: &str = "Consider biking for short distances to reduce emissions";
pub const TIP_FLIGHT: &str =
    "Consider offsetting your flight emissions or taking direct routes when possible";
pub const TIP_TRANSPORT: &str = "Consider using more eco-friendly transportation options";
pub const TIP_ELECTRICITY: &str =
    "Try to reduce energy consumption during peak hours and consider renewable energy sources";
pub const TIP_RED_MEAT: &str =
    "Consider reducing red meat consumption to lower your carbon footprint";
pub const TIP_FOOD: &str = "Try to buy local and seasonal food to reduce transportation emissions";
pub const TIP_GENERIC: &str =
    "Small changes in daily habits can significantly reduce your carbon footprint";

/// Advisory text for an activity. First matching rule wins.
pub fn tip(activity_type: &str, details: &Value, carbon_kg: f64) -> &'static str {
    let field = |key: &str| {
        details
            .get(key)
            .and_then(Value::as_str)
            .map(|s| s.trim().to_lowercase())
            .unwrap_or_default()
    };

    match activity_type {
        "transport" => match field("vehicle").as_str() {
            "car" if carbon_kg > 5.0 => TIP_CARPOOL,
            "motorbike" => TIP_BIKE,
            "plane" => TIP_FLIGHT,
            _ => TIP_TRANSPORT,
        },
        "electricity" => TIP_ELECTRICITY,
        "food" => match field("food_type").as_str() {
            "beef" | "lamb" => TIP_RED_MEAT,
            _ => TIP_FOOD,
        },
        _ => TIP_GENERIC,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn car_tip_depends_on_magnitude() {
        let details = json!({"vehicle": "car", "distance": 30});
        assert_eq!(tip("transport", &details, 6.0), TIP_CARPOOL);
        assert_eq!(tip("transport", &details, 3.0), TIP_TRANSPORT);
        assert_eq!(tip("transport", &details, 5.0), TIP_TRANSPORT);
    }

    #[test]
    fn transport_vehicle_rules() {
        assert_eq!(tip("transport", &json!({"vehicle": "motorbike"}), 100.0), TIP_BIKE);
        assert_eq!(tip("transport", &json!({"vehicle": "plane"}), 0.0), TIP_FLIGHT);
        assert_eq!(tip("transport", &json!({"vehicle": "bicycle"}), 0.0), TIP_TRANSPORT);
        assert_eq!(tip("transport", &json!({}), 0.0), TIP_TRANSPORT);
    }

    #[test]
    fn food_and_electricity_rules() {
        assert_eq!(tip("electricity", &json!({}), 12.0), TIP_ELECTRICITY);
        assert_eq!(tip("food", &json!({"food_type": "lamb"}), 1.0), TIP_RED_MEAT);
        assert_eq!(tip("food", &json!({"food_type": "beef"}), 1.0), TIP_RED_MEAT);
        assert_eq!(tip("food", &json!({"food_type": "rice"}), 1.0), TIP_FOOD);
    }

    #[test]
    fn unknown_type_gets_generic_tip() {
        assert_eq!(tip("shopping", &json!({}), 1.0), TIP_GENERIC);
    }
}
