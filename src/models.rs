//! Data models for the Fleet Estimator.
//!
//! The `models` module defines the serialisable input and output
//! records of the electrification estimate together with the closed
//! vehicle and operation enums.  Every type derives `Serialize` and
//! `Deserialize` with camelCase field names so that the JSON shape
//! matches what the funnel front end already sends and renders.

use crate::error::EstimateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Vehicle class of the fleet being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    /// Sedans and executive cars.
    Sedan,
    /// Vans and light commercial vehicles.
    Van,
    /// Trucks and cargo vehicles.
    Truck,
}

impl VehicleType {
    pub const ALL: [VehicleType; 3] = [VehicleType::Sedan, VehicleType::Van, VehicleType::Truck];

    pub fn as_str(self) -> &'static str {
        match self {
            VehicleType::Sedan => "sedan",
            VehicleType::Van => "van",
            VehicleType::Truck => "truck",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleType {
    type Err = EstimateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sedan" => Ok(VehicleType::Sedan),
            "van" => Ok(VehicleType::Van),
            "truck" => Ok(VehicleType::Truck),
            _ => Err(EstimateError::UnknownVehicleType(s.to_string())),
        }
    }
}

/// Intensity tier of the fleet's operation.  It decides which charger
/// class gets installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    /// Flexible schedules with plenty of time to charge.
    Relaxed,
    /// Standard operation with regular charging windows.
    Intermediate,
    /// Continuous operation that needs fast charging.
    Intensive,
}

impl OperationType {
    pub const ALL: [OperationType; 3] = [
        OperationType::Relaxed,
        OperationType::Intermediate,
        OperationType::Intensive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OperationType::Relaxed => "relaxed",
            OperationType::Intermediate => "intermediate",
            OperationType::Intensive => "intensive",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationType {
    type Err = EstimateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relaxed" => Ok(OperationType::Relaxed),
            "intermediate" => Ok(OperationType::Intermediate),
            "intensive" => Ok(OperationType::Intensive),
            _ => Err(EstimateError::UnknownOperationType(s.to_string())),
        }
    }
}

/// Input to the estimator.
///
/// Values are expected to be normalised already (see
/// [`crate::normalize`]); the estimator validates them but never
/// substitutes defaults for numeric fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationInputs {
    /// Number of vehicles in the fleet.
    pub fleet_size: u32,
    /// Average distance driven per vehicle and day, in kilometres.
    pub route_km_per_day: f64,
    /// Price of one litre of diesel in the local currency.
    pub diesel_cost: f64,
    /// Current monthly maintenance spend for the whole fleet.
    pub maintenance_spend: f64,
    pub vehicle_type: VehicleType,
    pub operation_type: OperationType,
    /// Hours available every night for charging.  `None` means the
    /// default overnight window of 22:00 to 07:00.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charging_window_hours: Option<f64>,
}

/// Charging infrastructure sized for the fleet's daily energy demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargingInfrastructure {
    /// kWh each vehicle consumes per day, rounded to two decimals.
    pub daily_energy_per_vehicle: f64,
    /// kWh the whole fleet consumes per day, rounded to two decimals.
    pub total_daily_energy: f64,
    /// Length of the charging window in hours.
    pub charging_hours: f64,
    /// Aggregate power in kW needed to refill the fleet inside the
    /// window, rounded to two decimals.
    pub required_charging_power: f64,
    /// Human readable charger class, e.g. `60kW Comercial (2x30kW)`.
    pub charger_type: String,
    /// Power of a single charger (hose) in kW.
    pub charger_power_kw: u32,
    pub chargers_per_station: u32,
    /// Total number of chargers (hoses) across all stations.
    pub required_chargers: u64,
    pub required_stations: u64,
    /// Installed power over all stations in kW.
    pub total_installed_power: u64,
    pub estimated_installation_cost: u64,
}

/// The immutable result of a single estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    /// Operating cost savings in percent, always within `[15, 65]`.
    pub savings_pct: u32,
    /// Tonnes of CO₂ avoided per month.
    pub co2: u64,
    /// Monthly fuel cost minus monthly electricity cost.  Negative when
    /// electricity is the more expensive option.
    pub monthly_fuel_savings: i64,
    /// Months until savings repay the electric vehicle premium.  `None`
    /// when the fleet never saves money and payback cannot happen.
    pub payback_months: Option<u64>,
    /// Fuel savings plus the maintenance reduction, per month.
    pub total_monthly_savings: i64,
    pub fleet_size: u32,
    pub route_km_per_day: f64,
    pub vehicle_type: VehicleType,
    pub operation_type: OperationType,
    pub charging_infrastructure: ChargingInfrastructure,
    /// Smallest recommended battery in kWh (multiple of 5).
    pub battery_capacity_min: u32,
    /// Largest recommended battery in kWh, sized for 80% state of
    /// health at end of life (multiple of 5).
    pub battery_capacity_max: u32,
}

impl CalculationResult {
    /// Returns the payback period, or
    /// [`EstimateError::PaybackNotAchievable`] when monthly savings are
    /// zero or negative.
    pub fn payback_months(&self) -> Result<u64, EstimateError> {
        self.payback_months
            .ok_or(EstimateError::PaybackNotAchievable {
                monthly_savings: self.total_monthly_savings,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_parsing_is_case_insensitive() {
        assert_eq!("Truck".parse::<VehicleType>().unwrap(), VehicleType::Truck);
        assert_eq!(
            " intensive ".parse::<OperationType>().unwrap(),
            OperationType::Intensive
        );
    }

    #[test]
    fn test_unknown_enum_values_are_rejected() {
        let err = "bus".parse::<VehicleType>().unwrap_err();
        assert!(matches!(err, EstimateError::UnknownVehicleType(ref v) if v == "bus"));
        let err = "leisurely".parse::<OperationType>().unwrap_err();
        assert!(matches!(err, EstimateError::UnknownOperationType(_)));
    }

    #[test]
    fn test_enums_serialise_lowercase() {
        let json = serde_json::to_string(&VehicleType::Van).unwrap();
        assert_eq!(json, "\"van\"");
        let op: OperationType = serde_json::from_str("\"relaxed\"").unwrap();
        assert_eq!(op, OperationType::Relaxed);
    }

    #[test]
    fn test_inputs_use_camel_case() {
        let inputs: CalculationInputs = serde_json::from_value(serde_json::json!({
            "fleetSize": 3,
            "routeKmPerDay": 80.0,
            "dieselCost": 1.1,
            "maintenanceSpend": 900.0,
            "vehicleType": "sedan",
            "operationType": "relaxed"
        }))
        .unwrap();
        assert_eq!(inputs.fleet_size, 3);
        assert_eq!(inputs.charging_window_hours, None);
    }
}
