//! Dashboard series derived from an estimate.
//!
//! The dashboard charts a twelve month comparison of diesel and
//! electric operating cost, a progressive CO₂ reduction curve and a
//! split of the fleet by status.  The series carry a small seasonal
//! variation; it is a fixed function of the month index so the output
//! stays deterministic.

use crate::engine::round_half_up;
use crate::models::CalculationResult;
use crate::policy::{DAYS_PER_MONTH, ELECTRICITY_TARIFF_PER_KWH};
use serde::{Deserialize, Serialize};

pub const MONTH_LABELS: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostPoint {
    pub month: String,
    pub diesel: i64,
    pub ev: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Co2Point {
    pub month: String,
    pub reduction: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySeries {
    pub savings: Vec<CostPoint>,
    pub co2: Vec<Co2Point>,
}

/// One slice of the fleet status breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetStatusSlice {
    pub name: String,
    pub value: u32,
}

/// Builds the twelve month cost and CO₂ series for a result.
pub fn monthly_series(result: &CalculationResult) -> MonthlySeries {
    let electricity = result.charging_infrastructure.total_daily_energy
        * ELECTRICITY_TARIFF_PER_KWH
        * DAYS_PER_MONTH;
    let savings = result.total_monthly_savings as f64;

    let mut series = MonthlySeries {
        savings: Vec::with_capacity(MONTH_LABELS.len()),
        co2: Vec::with_capacity(MONTH_LABELS.len()),
    };
    for (index, month) in MONTH_LABELS.iter().enumerate() {
        let i = index as f64;
        // ±5% seasonal swing
        let variation = 1.0 + (i * 0.5).sin() * 0.05;
        series.savings.push(CostPoint {
            month: month.to_string(),
            diesel: round_half_up((savings + electricity) * variation) as i64,
            ev: round_half_up(electricity * variation) as i64,
        });
        series.co2.push(Co2Point {
            month: month.to_string(),
            reduction: round_half_up(result.co2 as f64 * (0.8 + i * 0.03)) as i64,
        });
    }
    series
}

/// Splits a fleet into operational (88%), maintenance (8%) and charging
/// vehicles.  The charging slice absorbs rounding so the slices always
/// sum to `fleet_size`.
pub fn fleet_status(fleet_size: u32) -> Vec<FleetStatusSlice> {
    let n = f64::from(fleet_size);
    let operational = (n * 0.88).floor() as u32;
    let maintenance = (n * 0.08).floor() as u32;
    let charging = fleet_size - operational - maintenance;
    vec![
        FleetStatusSlice {
            name: "Operativos".to_string(),
            value: operational,
        },
        FleetStatusSlice {
            name: "Mantenimiento".to_string(),
            value: maintenance,
        },
        FleetStatusSlice {
            name: "Carga".to_string(),
            value: charging,
        },
    ]
}
