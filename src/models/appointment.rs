use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::AppointmentStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub service_id: Option<Uuid>,
    pub date: NaiveDate,
    /// Opaque slot label (e.g. "10:00"). The server treats slots as strings;
    /// the candidate grid lives in the client.
    pub time_slot: String,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

/// Appointment joined with display fields for list views.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentDetail {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub doctor_name: String,
    pub doctor_specialty: String,
    pub patient_name: Option<String>,
    pub service_name: Option<String>,
    pub service_price: Option<i64>,
}
