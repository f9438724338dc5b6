//! Maps validated activity details onto provider request payloads.

use serde::Serialize;
use serde_json::Value;

use super::factors::{self, FactorEntry};
use crate::error::{AppError, AppResult};

/// Result of mapping: either a payload to send, or a known zero without
/// contacting the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum PreparedRequest<T> {
    ZeroEmission,
    Send(T),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransportInput {
    pub distance: f64,
    pub vehicle: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElectricityInput {
    pub energy: f64,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FoodInput {
    pub food_type: String,
    pub quantity: f64,
}

fn positive_number(details: &Value, key: &str, label: &str) -> AppResult<f64> {
    match details.get(key).and_then(Value::as_f64) {
        Some(n) if n.is_finite() && n > 0.0 => Ok(n),
        _ => Err(AppError::invalid(format!("{} must be a positive number", label))),
    }
}

fn keyword(details: &Value, key: &str, label: &str) -> AppResult<String> {
    match details.get(key).and_then(Value::as_str).map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s.to_lowercase()),
        _ => Err(AppError::invalid(format!("{} must be a valid string", label))),
    }
}

/// Checks shared by every transport strategy. Disallowed vehicles are
/// rejected here, before any table lookup.
pub fn transport_input(details: &Value) -> AppResult<PreparedRequest<TransportInput>> {
    let distance = positive_number(details, "distance", "Distance")?;
    let vehicle = keyword(details, "vehicle", "Vehicle")?;

    if factors::is_disallowed(&vehicle) {
        return Err(AppError::invalid(
            "Emission estimates for motorbike/motorcycle are not supported yet. Please choose another vehicle type.",
        ));
    }
    if factors::is_zero_emission(&vehicle) {
        return Ok(PreparedRequest::ZeroEmission);
    }
    Ok(PreparedRequest::Send(TransportInput { distance, vehicle }))
}

pub fn electricity_input(details: &Value) -> AppResult<ElectricityInput> {
    let energy = positive_number(details, "energy", "Energy")?;
    let country = keyword(details, "country", "Country")?;
    Ok(ElectricityInput { energy, country })
}

pub fn food_input(details: &Value) -> AppResult<FoodInput> {
    let quantity = positive_number(details, "quantity", "Quantity")?;
    let food_type = keyword(details, "food_type", "Food type")?;
    Ok(FoodInput { food_type, quantity })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmissionFactor {
    pub activity_id: String,
    pub region: String,
    pub data_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Parameters {
    Distance { distance: f64, distance_unit: &'static str },
    Energy { energy: f64, energy_unit: &'static str },
    Weight { weight: f64, weight_unit: &'static str },
}

/// Body of a factor-table estimate request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateRequest {
    pub emission_factor: EmissionFactor,
    pub parameters: Parameters,
}

/// Builds factor-table requests for a fixed data version.
#[derive(Debug, Clone)]
pub struct FactorMapper {
    data_version: String,
}

impl FactorMapper {
    pub fn new(data_version: impl Into<String>) -> Self {
        Self {
            data_version: data_version.into(),
        }
    }

    fn factor(&self, entry: FactorEntry, region: Option<String>) -> EmissionFactor {
        EmissionFactor {
            activity_id: entry.activity_id.to_string(),
            region: region.unwrap_or_else(|| entry.region.to_string()),
            data_version: self.data_version.clone(),
        }
    }

    pub fn map_transport_request(
        &self,
        details: &Value,
    ) -> AppResult<PreparedRequest<EstimateRequest>> {
        let input = match transport_input(details)? {
            PreparedRequest::ZeroEmission => return Ok(PreparedRequest::ZeroEmission),
            PreparedRequest::Send(input) => input,
        };
        let entry = factors::vehicle_factor(&input.vehicle)
            .ok_or_else(|| AppError::UnsupportedVehicle(input.vehicle.clone()))?;

        Ok(PreparedRequest::Send(EstimateRequest {
            emission_factor: self.factor(entry, None),
            parameters: Parameters::Distance {
                distance: input.distance,
                distance_unit: "km",
            },
        }))
    }

    pub fn map_electricity_request(&self, details: &Value) -> AppResult<EstimateRequest> {
        let input = electricity_input(details)?;
        let entry = FactorEntry {
            activity_id: factors::ELECTRICITY_ACTIVITY_ID,
            region: "global",
        };
        Ok(EstimateRequest {
            emission_factor: self.factor(entry, Some(input.country.to_uppercase())),
            parameters: Parameters::Energy {
                energy: input.energy,
                energy_unit: "kWh",
            },
        })
    }

    pub fn map_food_request(&self, details: &Value) -> AppResult<EstimateRequest> {
        let input = food_input(details)?;
        let entry = factors::food_factor(&input.food_type).ok_or_else(|| {
            AppError::UnsupportedCategory(format!("Unsupported food type: {}", input.food_type))
        })?;
        Ok(EstimateRequest {
            emission_factor: self.factor(entry, None),
            parameters: Parameters::Weight {
                weight: input.quantity,
                weight_unit: "kg",
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapper() -> FactorMapper {
        FactorMapper::new("21.21")
    }

    fn sent(p: PreparedRequest<EstimateRequest>) -> EstimateRequest {
        match p {
            PreparedRequest::Send(r) => r,
            PreparedRequest::ZeroEmission => panic!("expected a payload"),
        }
    }

    #[test]
    fn car_maps_to_car_factor() {
        let req = sent(
            mapper()
                .map_transport_request(&json!({"distance": 10, "vehicle": "car"}))
                .unwrap(),
        );
        assert_eq!(
            req.emission_factor.activity_id,
            factors::vehicle_factor("car").unwrap().activity_id
        );
        assert_eq!(req.emission_factor.data_version, "21.21");

        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["parameters"]["distance"], 10.0);
        assert_eq!(body["parameters"]["distance_unit"], "km");
        assert_eq!(body["emission_factor"]["region"], "global");
    }

    #[test]
    fn vehicle_keyword_is_normalized() {
        let req = sent(
            mapper()
                .map_transport_request(&json!({"distance": 3.5, "vehicle": " Bus "}))
                .unwrap(),
        );
        assert!(req.emission_factor.activity_id.contains("vehicle_type_bus"));
    }

    #[test]
    fn bicycle_is_zero_emission() {
        let p = mapper()
            .map_transport_request(&json!({"distance": 10, "vehicle": "bicycle"}))
            .unwrap();
        assert_eq!(p, PreparedRequest::ZeroEmission);
    }

    #[test]
    fn non_positive_distance_is_rejected() {
        for d in [json!(-1), json!(0), json!("10"), json!(null)] {
            let err = mapper()
                .map_transport_request(&json!({"distance": d, "vehicle": "car"}))
                .unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(_)));
        }
    }

    #[test]
    fn vehicle_must_be_a_string() {
        let err = mapper()
            .map_transport_request(&json!({"distance": 5, "vehicle": 42}))
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn motorbike_is_disallowed_not_unsupported() {
        for v in ["motorbike", "motorcycle"] {
            let err = mapper()
                .map_transport_request(&json!({"distance": 5, "vehicle": v}))
                .unwrap_err();
            match err {
                AppError::InvalidInput(msg) => assert!(msg.contains("motorbike")),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn unknown_vehicle_is_unsupported() {
        let err = mapper()
            .map_transport_request(&json!({"distance": 5, "vehicle": "hovercraft"}))
            .unwrap_err();
        assert!(matches!(err, AppError::UnsupportedVehicle(v) if v == "hovercraft"));
    }

    #[test]
    fn electricity_uses_country_as_region() {
        let req = mapper()
            .map_electricity_request(&json!({"energy": 120, "country": "gb"}))
            .unwrap();
        assert_eq!(req.emission_factor.region, "GB");
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["parameters"]["energy"], 120.0);
        assert_eq!(body["parameters"]["energy_unit"], "kWh");
    }

    #[test]
    fn food_requires_known_type() {
        let req = mapper()
            .map_food_request(&json!({"food_type": "Beef", "quantity": 0.5}))
            .unwrap();
        assert!(req.emission_factor.activity_id.ends_with("beef"));
        assert!(matches!(
            mapper().map_food_request(&json!({"food_type": "durian", "quantity": 1})),
            Err(AppError::UnsupportedCategory(_))
        ));
        assert!(matches!(
            mapper().map_food_request(&json!({"food_type": "rice", "quantity": -2})),
            Err(AppError::InvalidInput(_))
        ));
    }
}
