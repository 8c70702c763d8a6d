use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    /// UNIQUE in storage — one review per appointment.
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A review joined with the reviewing patient's name, for the doctor's
/// received-reviews listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewDetail {
    #[serde(flatten)]
    pub review: Review,
    pub patient_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Favorite {
    pub user_id: Uuid,
    pub doctor_id: Uuid,
    pub created_at: DateTime<Utc>,
}
