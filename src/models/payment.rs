use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{MethodType, PaymentStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub appointment_id: Option<Uuid>,
    pub amount: i64,
    pub status: PaymentStatus,
    pub method_type: Option<MethodType>,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: Uuid,
    pub user_id: Uuid,
    pub method_type: MethodType,
    pub display_name: String,
    pub masked_number: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}
