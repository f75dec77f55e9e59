//! Contact capture.
//!
//! Leads submit their contact details together with a copy of the
//! preliminary estimate they saw.  The `contact` module validates the
//! request, flattens it into the row shape of the hosted
//! `contact_submissions` table and hands it to a [`ContactStore`].
//! The hosted store itself lives outside this crate; an in-memory
//! implementation is provided for development and tests.

use crate::error::{ContactError, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Who is asking for the full report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactData {
    pub full_name: String,
    pub company: String,
    pub position: String,
    pub email: String,
    pub phone: String,
}

/// The estimate figures the lead saw before leaving their details.
/// Every field is optional; the front end sends what it has.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreliminaryData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fleet_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_km_per_day: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charging_window: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_fuel_savings: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings_pct: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub co2: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_capacity_min: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_capacity_max: Option<u32>,
}

/// Body of `POST /api/contact`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactRequest {
    pub contact: Option<ContactData>,
    pub preliminary_data: PreliminaryData,
}

/// One row of the `contact_submissions` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub full_name: String,
    pub company: String,
    pub position: String,
    pub email: String,
    pub phone: String,
    pub fleet_size: Option<u32>,
    pub vehicle_type: Option<String>,
    pub operation_type: Option<String>,
    pub route_km_per_day: Option<f64>,
    pub charging_window: Option<f64>,
    pub monthly_fuel_savings: Option<i64>,
    pub savings_percentage: Option<u32>,
    pub co2_avoided: Option<u64>,
    pub battery_capacity_min: Option<u32>,
    pub battery_capacity_max: Option<u32>,
    /// The preliminary data exactly as submitted.
    pub preliminary_data_json: serde_json::Value,
    /// RFC 3339 timestamp.
    pub created_at: String,
}

impl ContactRequest {
    /// Builds the row to insert.  The full name and email are required.
    pub fn into_submission(
        self,
        created_at: DateTime<Utc>,
    ) -> Result<ContactSubmission, ContactError> {
        let contact = self.contact.ok_or(ContactError::MissingRequired)?;
        if contact.full_name.trim().is_empty() || contact.email.trim().is_empty() {
            return Err(ContactError::MissingRequired);
        }
        let prelim = self.preliminary_data;
        let preliminary_data_json = serde_json::to_value(&prelim)?;
        Ok(ContactSubmission {
            full_name: contact.full_name,
            company: contact.company,
            position: contact.position,
            email: contact.email,
            phone: contact.phone,
            fleet_size: prelim.fleet_size,
            vehicle_type: prelim.vehicle_type,
            operation_type: prelim.operation_type,
            route_km_per_day: prelim.route_km_per_day,
            charging_window: prelim.charging_window,
            monthly_fuel_savings: prelim.monthly_fuel_savings,
            savings_percentage: prelim.savings_pct,
            co2_avoided: prelim.co2,
            battery_capacity_min: prelim.battery_capacity_min,
            battery_capacity_max: prelim.battery_capacity_max,
            preliminary_data_json,
            created_at: created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }
}

/// Storage backend for contact submissions.  Implementations must be
/// shareable across request handlers.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Inserts a row and returns its identifier.
    async fn insert(&self, submission: ContactSubmission) -> Result<u64, StoreError>;
    /// Number of stored rows.  Doubles as a connectivity check.
    async fn count(&self) -> Result<u64, StoreError>;
}

/// A stored row with its assigned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredContact {
    pub id: u64,
    pub submission: ContactSubmission,
}

/// Keeps submissions in process memory.  Identifiers start at 1.
#[derive(Debug, Default)]
pub struct InMemoryContactStore {
    rows: RwLock<Vec<StoredContact>>,
}

impl InMemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn rows(&self) -> Vec<StoredContact> {
        self.rows.read().await.clone()
    }
}

#[async_trait]
impl ContactStore for InMemoryContactStore {
    async fn insert(&self, submission: ContactSubmission) -> Result<u64, StoreError> {
        let mut rows = self.rows.write().await;
        let id = rows.len() as u64 + 1;
        rows.push(StoredContact { id, submission });
        Ok(id)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.rows.read().await.len() as u64)
    }
}
