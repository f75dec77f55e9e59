//! Electrification estimation engine.
//!
//! The `engine` module turns a [`CalculationInputs`] into a
//! [`CalculationResult`].  The computation is a pure, deterministic
//! pipeline: energy demand, charging infrastructure sizing, cost
//! comparison, CO₂ avoided and battery sizing.  Inputs are validated
//! up front and rejected with an [`EstimateError`]; nothing in here
//! substitutes defaults.  [`estimate_batch`] uses the [`rayon`] crate
//! to evaluate many independent scenarios across CPU cores.

use crate::error::EstimateError;
use crate::models::{CalculationInputs, CalculationResult, ChargingInfrastructure, OperationType};
use crate::policy::{
    charger_policy, consumption_rate_kwh_per_km, BATTERY_DEGRADATION_FACTOR,
    BATTERY_OPERATIONAL_MARGIN, BATTERY_STEP_KWH, CO2_KG_PER_LITRE, DAYS_PER_MONTH,
    DEFAULT_CHARGING_HOURS, DIESEL_LITRES_PER_KM, ELECTRICITY_TARIFF_PER_KWH,
    EV_MAINTENANCE_REDUCTION, EV_PREMIUM_PER_VEHICLE, SAVINGS_PCT_CEILING, SAVINGS_PCT_FLOOR,
};
use rayon::prelude::*;

pub const MAX_FLEET_SIZE: u32 = 100_000;
pub const MAX_ROUTE_KM_PER_DAY: f64 = 2_000.0;
pub const MAX_DIESEL_COST: f64 = 1_000.0;
pub const MAX_MAINTENANCE_SPEND: f64 = 1_000_000_000.0;
pub const MIN_CHARGING_HOURS: f64 = 1.0;
pub const MAX_CHARGING_HOURS: f64 = 24.0;

/// Runs a single estimate.
///
/// Returns an error when any input is out of range.  A fleet that
/// never saves money still gets a complete result; its
/// `payback_months` is `None`.
pub fn estimate(inputs: &CalculationInputs) -> Result<CalculationResult, EstimateError> {
    validate(inputs)?;

    let fleet = f64::from(inputs.fleet_size);
    let km = inputs.route_km_per_day;

    let daily_energy_per_vehicle = km * consumption_rate_kwh_per_km(inputs.vehicle_type);
    let total_daily_energy = daily_energy_per_vehicle * fleet;
    let charging_hours = inputs
        .charging_window_hours
        .unwrap_or(DEFAULT_CHARGING_HOURS);

    let charging_infrastructure = size_charging_infrastructure(
        daily_energy_per_vehicle,
        total_daily_energy,
        charging_hours,
        inputs.operation_type,
    );

    let monthly_fuel_cost = finite(
        "monthlyFuelCost",
        km * DIESEL_LITRES_PER_KM * inputs.diesel_cost * fleet * DAYS_PER_MONTH,
    )?;
    // totalDailyEnergy is already fleet-wide; the extra fleet factor is
    // kept so figures match the published calculator.
    let monthly_electricity_cost = finite(
        "monthlyElectricityCost",
        total_daily_energy * ELECTRICITY_TARIFF_PER_KWH * fleet * DAYS_PER_MONTH,
    )?;
    let maintenance = inputs.maintenance_spend;
    let monthly_savings = finite(
        "monthlySavings",
        monthly_fuel_cost + maintenance
            - monthly_electricity_cost
            - maintenance * EV_MAINTENANCE_REDUCTION,
    )?;
    let savings_ratio = finite(
        "savingsPct",
        monthly_savings / (monthly_fuel_cost + maintenance) * 100.0,
    )?;
    let savings_pct = round_half_up(savings_ratio)
        .clamp(SAVINGS_PCT_FLOOR as f64, SAVINGS_PCT_CEILING as f64) as u32;

    let co2 = round_half_up(km * CO2_KG_PER_LITRE * fleet * DAYS_PER_MONTH / 1000.0) as u64;

    let (battery_capacity_min, battery_capacity_max) =
        recommend_battery_kwh(daily_energy_per_vehicle);

    Ok(CalculationResult {
        savings_pct,
        co2,
        monthly_fuel_savings: round_half_up(monthly_fuel_cost - monthly_electricity_cost) as i64,
        payback_months: payback_months(fleet, monthly_savings),
        total_monthly_savings: round_half_up(monthly_savings) as i64,
        fleet_size: inputs.fleet_size,
        route_km_per_day: km,
        vehicle_type: inputs.vehicle_type,
        operation_type: inputs.operation_type,
        charging_infrastructure,
        battery_capacity_min,
        battery_capacity_max,
    })
}

/// Runs many independent estimates in parallel.  The output keeps the
/// order of `inputs`.
pub fn estimate_batch(
    inputs: &[CalculationInputs],
) -> Vec<Result<CalculationResult, EstimateError>> {
    inputs.par_iter().map(estimate).collect()
}

/// Checks every field against its accepted range.
pub fn validate(inputs: &CalculationInputs) -> Result<(), EstimateError> {
    if inputs.fleet_size == 0 {
        return Err(EstimateError::invalid("fleetSize", "must be at least 1"));
    }
    if inputs.fleet_size > MAX_FLEET_SIZE {
        return Err(EstimateError::invalid(
            "fleetSize",
            format!("must not exceed {MAX_FLEET_SIZE}"),
        ));
    }
    positive_within("routeKmPerDay", inputs.route_km_per_day, MAX_ROUTE_KM_PER_DAY)?;
    positive_within("dieselCost", inputs.diesel_cost, MAX_DIESEL_COST)?;
    positive_within("maintenanceSpend", inputs.maintenance_spend, MAX_MAINTENANCE_SPEND)?;
    if let Some(hours) = inputs.charging_window_hours {
        if !hours.is_finite() || !(MIN_CHARGING_HOURS..=MAX_CHARGING_HOURS).contains(&hours) {
            return Err(EstimateError::invalid(
                "chargingWindowHours",
                format!("must be between {MIN_CHARGING_HOURS} and {MAX_CHARGING_HOURS} hours"),
            ));
        }
    }
    Ok(())
}

fn positive_within(field: &'static str, value: f64, max: f64) -> Result<(), EstimateError> {
    if !value.is_finite() {
        return Err(EstimateError::invalid(field, "must be a finite number"));
    }
    if value <= 0.0 {
        return Err(EstimateError::invalid(field, "must be greater than zero"));
    }
    if value > max {
        return Err(EstimateError::invalid(field, format!("must not exceed {max}")));
    }
    Ok(())
}

fn finite(field: &'static str, value: f64) -> Result<f64, EstimateError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EstimateError::NonFinite { field })
    }
}

/// Sizes the charging stations for the fleet.  Stations cover the exact
/// charging power; only the reported figures are rounded.
fn size_charging_infrastructure(
    daily_energy_per_vehicle: f64,
    total_daily_energy: f64,
    charging_hours: f64,
    operation: OperationType,
) -> ChargingInfrastructure {
    let policy = charger_policy(operation);
    let required_charging_power = total_daily_energy / charging_hours;
    let station_power = u64::from(policy.station_power_kw());
    let required_stations = (required_charging_power / station_power as f64).ceil() as u64;

    ChargingInfrastructure {
        daily_energy_per_vehicle: round2(daily_energy_per_vehicle),
        total_daily_energy: round2(total_daily_energy),
        charging_hours,
        required_charging_power: round2(required_charging_power),
        charger_type: policy.label.to_string(),
        charger_power_kw: policy.charger_power_kw,
        chargers_per_station: policy.chargers_per_station,
        required_chargers: required_stations * u64::from(policy.chargers_per_station),
        required_stations,
        total_installed_power: required_stations * station_power,
        estimated_installation_cost: required_stations * policy.install_cost_per_station,
    }
}

fn payback_months(fleet: f64, monthly_savings: f64) -> Option<u64> {
    if monthly_savings <= 0.0 {
        return None;
    }
    let months = round_half_up(fleet * EV_PREMIUM_PER_VEHICLE / monthly_savings);
    months.is_finite().then_some(months as u64)
}

/// Recommended battery range in kWh as `(min, max)`.  The max covers
/// the same need after the pack has degraded to 80% state of health.
pub fn recommend_battery_kwh(daily_energy_per_vehicle: f64) -> (u32, u32) {
    let base = daily_energy_per_vehicle * BATTERY_OPERATIONAL_MARGIN;
    let with_degradation = base * BATTERY_DEGRADATION_FACTOR;
    (
        round_up_to_step(base * BATTERY_OPERATIONAL_MARGIN),
        round_up_to_step(with_degradation * BATTERY_OPERATIONAL_MARGIN),
    )
}

fn round_up_to_step(kwh: f64) -> u32 {
    ((kwh / BATTERY_STEP_KWH).ceil() * BATTERY_STEP_KWH) as u32
}

/// Rounds half-way cases toward positive infinity, like the browser
/// `Math.round` the results pages use.
pub(crate) fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

fn round2(value: f64) -> f64 {
    round_half_up(value * 100.0) / 100.0
}
