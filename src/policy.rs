//! Policy tables and fixed assumptions.
//!
//! The `policy` module holds every constant the estimator relies on:
//! the per-vehicle consumption rates, the charger class chosen for each
//! operation tier and the cost and emission assumptions.  Lookups are
//! exhaustive matches over the closed enums in [`crate::models`], so
//! adding a vehicle class or operation tier fails to compile until its
//! policy row is written here.

use crate::models::{OperationType, VehicleType};

/// Default overnight charging window (22:00 to 07:00) in hours.
pub const DEFAULT_CHARGING_HOURS: f64 = 9.0;

/// Average diesel consumption in litres per kilometre.
pub const DIESEL_LITRES_PER_KM: f64 = 0.35;

/// Flat electricity tariff per kWh.
pub const ELECTRICITY_TARIFF_PER_KWH: f64 = 0.15;

/// kg of CO₂ released per litre of diesel burned.
pub const CO2_KG_PER_LITRE: f64 = 2.3;

/// Share of today's maintenance spend saved by going electric.  An
/// electric fleet costs 60% of the diesel fleet to maintain.
pub const EV_MAINTENANCE_REDUCTION: f64 = 0.4;

/// Acquisition premium paid per electric vehicle.
pub const EV_PREMIUM_PER_VEHICLE: f64 = 80_000.0;

pub const DAYS_PER_MONTH: f64 = 30.0;

/// Floor and ceiling of the published savings percentage.
pub const SAVINGS_PCT_FLOOR: i64 = 15;
pub const SAVINGS_PCT_CEILING: i64 = 65;

/// Operational margin applied on top of the daily energy need.
pub const BATTERY_OPERATIONAL_MARGIN: f64 = 1.3;

/// Oversizing needed to still cover the need at 80% state of health
/// (20% capacity loss by 5 years / 500 000 km).
pub const BATTERY_DEGRADATION_FACTOR: f64 = 1.25;

/// Battery recommendations are rounded up to this many kWh.
pub const BATTERY_STEP_KWH: f64 = 5.0;

/// Energy consumption of an electric vehicle of the given class, in
/// kWh per km.  Vans and trucks deliberately share a rate.
pub fn consumption_rate_kwh_per_km(vehicle: VehicleType) -> f64 {
    match vehicle {
        VehicleType::Sedan => 0.15,
        VehicleType::Van => 0.30,
        VehicleType::Truck => 0.30,
    }
}

/// A charger class installed for an operation tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChargerPolicy {
    /// Power of one charger (hose) in kW.
    pub charger_power_kw: u32,
    pub chargers_per_station: u32,
    /// Installation cost of one station.
    pub install_cost_per_station: u64,
    pub label: &'static str,
}

impl ChargerPolicy {
    /// Power delivered by a fully used station in kW.
    pub fn station_power_kw(&self) -> u32 {
        self.charger_power_kw * self.chargers_per_station
    }
}

/// Charger class used for an operation tier.
pub fn charger_policy(operation: OperationType) -> ChargerPolicy {
    match operation {
        OperationType::Relaxed => ChargerPolicy {
            charger_power_kw: 7,
            chargers_per_station: 1,
            install_cost_per_station: 8_000,
            label: "7kW Domiciliario",
        },
        OperationType::Intermediate => ChargerPolicy {
            charger_power_kw: 30,
            chargers_per_station: 2,
            install_cost_per_station: 45_000,
            label: "60kW Comercial (2x30kW)",
        },
        OperationType::Intensive => ChargerPolicy {
            charger_power_kw: 60,
            chargers_per_station: 2,
            install_cost_per_station: 85_000,
            label: "120kW Rápido (2x60kW)",
        },
    }
}
