use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::RecordType;

/// One row per user; allergies and chronic conditions are JSON arrays in
/// storage, decoded at the repository boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthProfile {
    pub user_id: Uuid,
    pub blood_type: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub allergies: Vec<String>,
    pub chronic_conditions: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub id: Uuid,
    pub patient_id: Uuid,
    /// The user who wrote the record — the patient, or a doctor writing for
    /// a named patient.
    pub author_id: Option<Uuid>,
    pub title: String,
    pub record_type: RecordType,
    pub description: Option<String>,
    pub record_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}
