//! Fleet Estimator library crate.
//!
//! This crate exposes the electric fleet conversion estimator and the
//! HTTP adapters around it as reusable modules.  External applications
//! may depend on the `fleet_estimator` crate and call
//! `engine::estimate` directly or embed the API via `api::build_router`.

pub mod models;
pub mod error;
pub mod policy;
pub mod engine;
pub mod normalize;
pub mod series;
pub mod token;
pub mod contact;
pub mod config;
pub mod api;

pub use engine::{estimate, estimate_batch};
pub use error::EstimateError;
pub use models::{
    CalculationInputs, CalculationResult, ChargingInfrastructure, OperationType, VehicleType,
};
