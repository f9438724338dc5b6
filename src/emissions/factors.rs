//! Static emission-factor tables for the factor-table provider.
//!
//! Adding a vehicle or food type is a one-line change here.

use std::collections::HashMap;

use lazy_static::lazy_static;

/// Provider activity id and region for one keyword. The data version is
/// configured separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactorEntry {
    pub activity_id: &'static str,
    pub region: &'static str,
}

/// Vehicles with no tailpipe emissions. Never sent to a provider.
pub const ZERO_EMISSION_VEHICLES: &[&str] = &["bicycle"];

/// Vehicles rejected by policy, independently of whether a factor exists.
pub const DISALLOWED_VEHICLES: &[&str] = &["motorbike", "motorcycle"];

pub const ELECTRICITY_ACTIVITY_ID: &str = "electricity-supply_grid-source_supplier_mix";

lazy_static! {
    static ref VEHICLE_FACTORS: HashMap<&'static str, FactorEntry> = HashMap::from([
        ("car", FactorEntry {
            activity_id: "passenger_vehicle-vehicle_type_car-fuel_source_petrol-engine_size_na",
            region: "global",
        }),
        ("bus", FactorEntry {
            activity_id: "passenger_vehicle-vehicle_type_bus-fuel_source_na",
            region: "global",
        }),
        ("train", FactorEntry {
            activity_id: "passenger_train-route_type_commuter_rail-fuel_source_na",
            region: "global",
        }),
        ("plane", FactorEntry {
            activity_id: "passenger_flight-route_type_domestic-aircraft_type_jet-distance_na-class_na",
            region: "global",
        }),
    ]);

    static ref FOOD_FACTORS: HashMap<&'static str, FactorEntry> = HashMap::from([
        ("beef", FactorEntry { activity_id: "consumer_goods-type_meat_products_beef", region: "global" }),
        ("lamb", FactorEntry { activity_id: "consumer_goods-type_meat_products_lamb", region: "global" }),
        ("pork", FactorEntry { activity_id: "consumer_goods-type_meat_products_pork", region: "global" }),
        ("chicken", FactorEntry { activity_id: "consumer_goods-type_meat_products_poultry", region: "global" }),
        ("fish", FactorEntry { activity_id: "consumer_goods-type_fish_products", region: "global" }),
        ("cheese", FactorEntry { activity_id: "consumer_goods-type_dairy_products_cheese", region: "global" }),
        ("milk", FactorEntry { activity_id: "consumer_goods-type_dairy_products_milk", region: "global" }),
        ("rice", FactorEntry { activity_id: "consumer_goods-type_rice", region: "global" }),
        ("vegetables", FactorEntry { activity_id: "consumer_goods-type_vegetables", region: "global" }),
    ]);
}

pub fn vehicle_factor(vehicle: &str) -> Option<FactorEntry> {
    VEHICLE_FACTORS.get(vehicle).copied()
}

pub fn food_factor(food_type: &str) -> Option<FactorEntry> {
    FOOD_FACTORS.get(food_type).copied()
}

pub fn is_zero_emission(vehicle: &str) -> bool {
    ZERO_EMISSION_VEHICLES.contains(&vehicle)
}

pub fn is_disallowed(vehicle: &str) -> bool {
    DISALLOWED_VEHICLES.contains(&vehicle)
}
