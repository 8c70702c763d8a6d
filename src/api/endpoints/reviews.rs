//! Review endpoints.
//!
//! - `GET /api/reviews` — patient's own reviews
//! - `POST /api/reviews` — review a completed appointment
//! - `GET /api/doctor/reviews` — reviews a doctor has received

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};
use crate::db;
use crate::models::{Review, ReviewDetail, Role};
use crate::reviews;

#[derive(Serialize)]
pub struct ReviewsResponse {
    pub reviews: Vec<Review>,
}

pub async fn list_mine(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ReviewsResponse>, ApiError> {
    auth.require_role(Role::Patient)?;
    let conn = ctx.open_db()?;
    let reviews = db::list_reviews_by_patient(&conn, &auth.user_id)?;
    Ok(Json(ReviewsResponse { reviews }))
}

#[derive(Deserialize)]
pub struct CreateReviewRequest {
    pub appointment_id: Uuid,
    pub rating: u8,
    pub comment: Option<String>,
}

#[derive(Serialize)]
pub struct ReviewResponse {
    pub review: Review,
    /// The doctor's refreshed aggregate rating.
    pub doctor_rating: f64,
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateReviewRequest>,
) -> Result<Json<ReviewResponse>, ApiError> {
    auth.require_role(Role::Patient)?;
    let mut conn = ctx.open_db()?;
    let review = reviews::create_review(
        &mut conn,
        auth.user_id,
        &req.appointment_id,
        req.rating,
        req.comment,
    )?;
    let doctor_rating = db::get_doctor(&conn, &review.doctor_id)?
        .map(|d| d.rating)
        .unwrap_or(0.0);
    Ok(Json(ReviewResponse {
        review,
        doctor_rating,
    }))
}

#[derive(Serialize)]
pub struct ReceivedReviewsResponse {
    pub reviews: Vec<ReviewDetail>,
}

pub async fn list_for_doctor(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ReceivedReviewsResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let doctor = auth.require_doctor(&conn)?;
    let reviews = db::list_reviews_by_doctor(&conn, &doctor.id)?;
    Ok(Json(ReceivedReviewsResponse { reviews }))
}
