//! Medical record endpoints.
//!
//! - `GET /api/medical-records` — patient lists own records
//! - `POST /api/medical-records` — patient writes for themselves; a doctor may
//!   write for a named patient
//! - `DELETE /api/medical-records/:id` — owner or authoring doctor removes

use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};
use crate::db;
use crate::models::{MedicalRecord, RecordType, Role};

#[derive(Serialize)]
pub struct RecordsResponse {
    pub medical_records: Vec<MedicalRecord>,
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<RecordsResponse>, ApiError> {
    auth.require_role(Role::Patient)?;
    let conn = ctx.open_db()?;
    let medical_records = db::list_medical_records(&conn, &auth.user_id)?;
    Ok(Json(RecordsResponse { medical_records }))
}

#[derive(Deserialize)]
pub struct CreateRecordRequest {
    /// Required for doctor-authored records; patients may omit it.
    pub patient_id: Option<Uuid>,
    pub title: String,
    pub record_type: RecordType,
    pub description: Option<String>,
    pub record_date: NaiveDate,
}

#[derive(Serialize)]
pub struct RecordResponse {
    pub medical_record: MedicalRecord,
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateRecordRequest>,
) -> Result<Json<RecordResponse>, ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title is required".into()));
    }

    let conn = ctx.open_db()?;
    let patient_id = match auth.role {
        Role::Patient => auth.user_id,
        Role::Doctor => {
            let patient_id = req
                .patient_id
                .ok_or_else(|| ApiError::BadRequest("patient_id is required".into()))?;
            let patient = db::get_user(&conn, &patient_id)?
                .filter(|u| u.role == Role::Patient)
                .ok_or_else(|| ApiError::NotFound("Patient not found".into()))?;
            patient.id
        }
        Role::Admin => {
            return Err(ApiError::Forbidden("patient or doctor role required".into()))
        }
    };

    let medical_record = MedicalRecord {
        id: Uuid::new_v4(),
        patient_id,
        author_id: Some(auth.user_id),
        title: req.title.trim().to_string(),
        record_type: req.record_type,
        description: req.description,
        record_date: req.record_date,
        created_at: Utc::now(),
    };
    db::insert_medical_record(&conn, &medical_record)?;
    Ok(Json(RecordResponse { medical_record }))
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}

pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(record_id): Path<Uuid>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let record = db::get_medical_record(&conn, &record_id)?
        .ok_or_else(|| ApiError::NotFound("Record not found".into()))?;

    let allowed = record.patient_id == auth.user_id || record.author_id == Some(auth.user_id);
    if !allowed {
        return Err(ApiError::NotFound("Record not found".into()));
    }

    db::delete_medical_record(&conn, &record_id)?;
    Ok(Json(DeletedResponse { deleted: true }))
}
