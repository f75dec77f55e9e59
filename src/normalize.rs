//! Raw form normalisation.
//!
//! Request bodies coming from the intake form carry free-form values:
//! numbers, numeric strings, empty strings or nothing at all.  This
//! module maps such a body onto [`CalculationInputs`], applying the
//! funnel's defaults for values that are missing, blank, unparseable or
//! zero.  Anything that does parse is passed through untouched so that
//! [`crate::engine::estimate`] can reject it (negative distances, for
//! instance).  Enum fields default when missing but an unknown value is
//! an error.
//!
//! Numeric strings are read by their leading numeric prefix, the way the
//! form's own parsing does: `"12abc"` is 12.  Fleet size reads an integer
//! prefix only, so `"1e3"` is one vehicle while the other fields read a
//! decimal prefix with an optional exponent.  Only named keys of a JSON
//! object are read; any other body shape fails to deserialize.

use crate::error::EstimateError;
use crate::models::{CalculationInputs, OperationType, VehicleType};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::OnceLock;

pub const DEFAULT_FLEET_SIZE: u32 = 1;
pub const DEFAULT_ROUTE_KM_PER_DAY: f64 = 100.0;
pub const DEFAULT_DIESEL_COST: f64 = 1.2;
pub const DEFAULT_MAINTENANCE_SPEND: f64 = 1000.0;
pub const DEFAULT_VEHICLE_TYPE: VehicleType = VehicleType::Sedan;
pub const DEFAULT_OPERATION_TYPE: OperationType = OperationType::Intermediate;

/// An estimate request exactly as the front end sends it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Map<String, Value>")]
pub struct RawEstimateForm {
    pub fleet_size: Option<Value>,
    pub route_km_per_day: Option<Value>,
    pub diesel_cost: Option<Value>,
    pub maintenance_spend: Option<Value>,
    pub vehicle_type: Option<Value>,
    pub operation_type: Option<Value>,
    /// The contact form calls this field `chargingWindow`.
    pub charging_window_hours: Option<Value>,
}

impl From<Map<String, Value>> for RawEstimateForm {
    fn from(mut body: Map<String, Value>) -> Self {
        let charging_window_hours = match body.remove("chargingWindowHours") {
            Some(hours) => Some(hours),
            None => body.remove("chargingWindow"),
        };
        Self {
            fleet_size: body.remove("fleetSize"),
            route_km_per_day: body.remove("routeKmPerDay"),
            diesel_cost: body.remove("dieselCost"),
            maintenance_spend: body.remove("maintenanceSpend"),
            vehicle_type: body.remove("vehicleType"),
            operation_type: body.remove("operationType"),
            charging_window_hours,
        }
    }
}

impl RawEstimateForm {
    /// Applies defaults and parses enum fields.
    pub fn normalize(&self) -> Result<CalculationInputs, EstimateError> {
        let fleet_size = match parse_integer(self.fleet_size.as_ref()) {
            // Fractional fleet sizes are truncated like the form's integer parse.
            Some(n) if n.trunc() != 0.0 => clamp_to_u32(n.trunc()),
            _ => Some(DEFAULT_FLEET_SIZE),
        };
        let fleet_size = fleet_size.ok_or_else(|| {
            EstimateError::invalid("fleetSize", "must be a whole number of vehicles")
        })?;

        Ok(CalculationInputs {
            fleet_size,
            route_km_per_day: number_or(self.route_km_per_day.as_ref(), DEFAULT_ROUTE_KM_PER_DAY),
            diesel_cost: number_or(self.diesel_cost.as_ref(), DEFAULT_DIESEL_COST),
            maintenance_spend: number_or(
                self.maintenance_spend.as_ref(),
                DEFAULT_MAINTENANCE_SPEND,
            ),
            vehicle_type: match text(self.vehicle_type.as_ref()) {
                Some(s) => s.parse()?,
                None => DEFAULT_VEHICLE_TYPE,
            },
            operation_type: match text(self.operation_type.as_ref()) {
                Some(s) => s.parse()?,
                None => DEFAULT_OPERATION_TYPE,
            },
            charging_window_hours: parse_number(self.charging_window_hours.as_ref())
                .filter(|h| *h != 0.0),
        })
    }
}

fn number_or(value: Option<&Value>, default: f64) -> f64 {
    match parse_number(value) {
        Some(n) if n != 0.0 => n,
        _ => default,
    }
}

fn decimal_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("valid regex")
    })
}

fn integer_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[+-]?\d+").expect("valid regex"))
}

/// Reads a JSON number or the numeric prefix of a string.  Strings
/// without one, `null` and other JSON types count as missing.
fn parse_number(value: Option<&Value>) -> Option<f64> {
    parse_with(value, decimal_prefix())
}

/// Like [`parse_number`] but a string contributes its integer prefix
/// only.
fn parse_integer(value: Option<&Value>) -> Option<f64> {
    parse_with(value, integer_prefix())
}

fn parse_with(value: Option<&Value>, prefix: &Regex) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => prefix
            .find(s.trim_start())
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .filter(|n| n.is_finite()),
        _ => None,
    }
}

fn clamp_to_u32(n: f64) -> Option<u32> {
    if n < 0.0 || n > f64::from(u32::MAX) {
        None
    } else {
        Some(n as u32)
    }
}

fn text(value: Option<&Value>) -> Option<&str> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.as_str()),
        _ => None,
    }
}
