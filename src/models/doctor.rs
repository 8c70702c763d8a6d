use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    /// Optional account link — seeded demo doctors have no user behind them.
    pub user_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub specialty: String,
    pub experience_years: u32,
    pub bio: Option<String>,
    /// Mean of all review ratings, maintained by reviews::recompute_doctor_rating.
    pub rating: f64,
    pub available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub name: String,
    /// Price in minor currency units.
    pub price: i64,
    pub duration_minutes: u32,
}
