//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`; uploaded avatars are served under
//! `/uploads/`.
//!
//! Public surface: health, register/login, the doctor catalog, and the
//! availability query. Everything else sits behind the bearer-token layer.

use std::sync::Arc;

use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::config::Config;

/// Build the full API router.
pub fn api_router(config: Arc<Config>) -> Router {
    let ctx = ApiContext::new(config);
    build_router(ctx)
}

fn build_router(ctx: ApiContext) -> Router {
    // Protected routes — bearer token required.
    //
    // Layers are applied from bottom (innermost) to top (outermost):
    // Extension (outermost) → Auth → Handler. Extension must be outermost so
    // the auth middleware can extract ApiContext.
    let protected = Router::new()
        .route("/auth/logout", post(endpoints::auth::logout))
        .route("/me", get(endpoints::auth::me).patch(endpoints::auth::update_me))
        .route(
            "/appointments",
            get(endpoints::appointments::list_mine)
                .post(endpoints::appointments::create)
                .patch(endpoints::appointments::update_mine),
        )
        .route(
            "/doctor/appointments",
            get(endpoints::appointments::list_for_doctor)
                .patch(endpoints::appointments::update_for_doctor),
        )
        .route(
            "/doctor/services",
            get(endpoints::services::list).post(endpoints::services::create),
        )
        .route(
            "/doctor/services/:id",
            patch(endpoints::services::update).delete(endpoints::services::delete),
        )
        .route("/doctor/payments", get(endpoints::payments::for_doctor))
        .route("/doctor/reviews", get(endpoints::reviews::list_for_doctor))
        .route("/payments", get(endpoints::payments::list_mine))
        .route("/payments/pay", post(endpoints::payments::pay))
        .route(
            "/payment-methods",
            get(endpoints::payment_methods::list).post(endpoints::payment_methods::create),
        )
        .route(
            "/payment-methods/:id",
            patch(endpoints::payment_methods::update)
                .delete(endpoints::payment_methods::delete),
        )
        .route(
            "/reviews",
            get(endpoints::reviews::list_mine).post(endpoints::reviews::create),
        )
        .route(
            "/favorites",
            get(endpoints::favorites::list).post(endpoints::favorites::toggle),
        )
        .route(
            "/health-profile",
            get(endpoints::health_profile::get).post(endpoints::health_profile::upsert),
        )
        .route(
            "/medical-records",
            get(endpoints::medical_records::list).post(endpoints::medical_records::create),
        )
        .route(
            "/medical-records/:id",
            delete(endpoints::medical_records::delete),
        )
        .route(
            "/admin/db",
            get(endpoints::admin::browse).delete(endpoints::admin::delete),
        )
        .route("/upload/avatar", post(endpoints::upload::avatar))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(axum::Extension(ctx.clone()));

    // Unprotected routes
    let unprotected = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/auth/register", post(endpoints::auth::register))
        .route("/auth/login", post(endpoints::auth::login))
        .route("/doctors", get(endpoints::doctors::list))
        .route("/doctors/:id", get(endpoints::doctors::detail))
        .route(
            "/appointments/availability",
            get(endpoints::appointments::availability),
        )
        .with_state(ctx.clone());

    let uploads = ServeDir::new(&ctx.config.upload_dir);

    Router::new()
        .nest("/api", protected)
        .nest("/api", unprotected)
        .nest_service("/uploads", uploads)
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::Duration;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::auth::Registration;
    use crate::db;
    use crate::models::{Doctor, Role, Service};

    struct TestApp {
        router: Router,
        config: Arc<Config>,
        _dir: tempfile::TempDir,
    }

    fn test_app() -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let config = Arc::new(Config {
            bind_addr: ([127, 0, 0, 1], 0).into(),
            database_path: dir.path().join("test.db"),
            upload_dir: dir.path().join("uploads"),
            token_ttl: Duration::hours(1),
        });
        // Run migrations up front
        db::open_database(&config.database_path).unwrap();
        TestApp {
            router: api_router(config.clone()),
            config,
            _dir: dir,
        }
    }

    impl TestApp {
        fn conn(&self) -> rusqlite::Connection {
            db::open_database(&self.config.database_path).unwrap()
        }

        async fn request(
            &self,
            method: &str,
            path: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(path);
            if let Some(token) = token {
                builder = builder.header("Authorization", format!("Bearer {token}"));
            }
            let request = match body {
                Some(body) => builder
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let json = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, json)
        }

        /// Register a patient through the API and log them in.
        async fn patient(&self, email: &str) -> String {
            let (status, _) = self
                .request(
                    "POST",
                    "/api/auth/register",
                    None,
                    Some(json!({
                        "email": email,
                        "password": "long enough pw",
                        "first_name": "Alex",
                        "last_name": "Moreau",
                    })),
                )
                .await;
            assert_eq!(status, StatusCode::OK);
            self.login(email).await
        }

        async fn login(&self, email: &str) -> String {
            let (status, body) = self
                .request(
                    "POST",
                    "/api/auth/login",
                    None,
                    Some(json!({"email": email, "password": "long enough pw"})),
                )
                .await;
            assert_eq!(status, StatusCode::OK);
            body["token"].as_str().unwrap().to_string()
        }

        /// Seed a non-patient account directly, with an optional doctor row.
        fn account_with_role(&self, email: &str, role: Role) -> Uuid {
            let conn = self.conn();
            let user = crate::auth::register_user(
                &conn,
                &Registration {
                    email: email.to_string(),
                    password: "long enough pw".to_string(),
                    first_name: "Sam".to_string(),
                    last_name: "Okafor".to_string(),
                    phone: None,
                    birth_date: None,
                },
                role,
            )
            .unwrap();
            user.id
        }

        fn doctor_row(&self, user_id: Option<Uuid>) -> Doctor {
            let conn = self.conn();
            let doctor = Doctor {
                id: Uuid::new_v4(),
                user_id,
                first_name: "Irene".to_string(),
                last_name: "Vasquez".to_string(),
                specialty: "cardiology".to_string(),
                experience_years: 12,
                bio: None,
                rating: 0.0,
                available: true,
            };
            db::insert_doctor(&conn, &doctor).unwrap();
            doctor
        }

        fn service_row(&self, doctor_id: Uuid, price: i64) -> Service {
            let conn = self.conn();
            let service = Service {
                id: Uuid::new_v4(),
                doctor_id,
                name: "Consultation".to_string(),
                price,
                duration_minutes: 30,
            };
            db::insert_service(&conn, &service).unwrap();
            service
        }
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = test_app();
        let (status, body) = app.request("GET", "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn protected_route_requires_token() {
        let app = test_app();
        let (status, body) = app.request("GET", "/api/appointments", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "AUTH_REQUIRED");

        let (status, _) = app
            .request("GET", "/api/appointments", Some("bogus-token"), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn register_login_reports_registered_role() {
        let app = test_app();
        let (status, body) = app
            .request(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({
                    "email": "pat@example.org",
                    "password": "long enough pw",
                    "first_name": "Alex",
                    "last_name": "Moreau",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["role"], "patient");
        assert!(body["user"].get("password_hash").is_none());

        let (status, body) = app
            .request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({"email": "pat@example.org", "password": "long enough pw"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "patient");

        let token = body["token"].as_str().unwrap();
        let (status, body) = app.request("GET", "/api/me", Some(token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["email"], "pat@example.org");
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let app = test_app();
        app.patient("pat@example.org").await;
        let (status, body) = app
            .request(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({
                    "email": "pat@example.org",
                    "password": "long enough pw",
                    "first_name": "Alex",
                    "last_name": "Moreau",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn booking_with_service_creates_pending_payment() {
        let app = test_app();
        let token = app.patient("pat@example.org").await;
        let doctor = app.doctor_row(None);
        let service = app.service_row(doctor.id, 5000);

        let (status, body) = app
            .request(
                "POST",
                "/api/appointments",
                Some(&token),
                Some(json!({
                    "doctor_id": doctor.id,
                    "service_id": service.id,
                    "date": "2026-04-02",
                    "time_slot": "10:00",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["appointment"]["status"], "pending");
        assert_eq!(body["payment"]["amount"], 5000);
        assert_eq!(body["payment"]["status"], "pending");

        // Round-trip through the list endpoint
        let (status, body) = app.request("GET", "/api/appointments", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let appointments = body["appointments"].as_array().unwrap();
        assert_eq!(appointments.len(), 1);
        assert_eq!(appointments[0]["date"], "2026-04-02");
        assert_eq!(appointments[0]["time_slot"], "10:00");
        assert_eq!(appointments[0]["doctor_id"], doctor.id.to_string());
        assert_eq!(appointments[0]["service_name"], "Consultation");
    }

    #[tokio::test]
    async fn double_booking_is_conflict() {
        let app = test_app();
        let first = app.patient("pat@example.org").await;
        let second = app.patient("rival@example.org").await;
        let doctor = app.doctor_row(None);

        let booking = json!({
            "doctor_id": doctor.id,
            "date": "2026-04-02",
            "time_slot": "10:00",
        });
        let (status, _) = app
            .request("POST", "/api/appointments", Some(&first), Some(booking.clone()))
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = app
            .request("POST", "/api/appointments", Some(&second), Some(booking))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn availability_reflects_taken_slots() {
        let app = test_app();
        let token = app.patient("pat@example.org").await;
        let doctor = app.doctor_row(None);

        let path = format!(
            "/api/appointments/availability?doctor_id={}&date=2026-04-02",
            doctor.id
        );
        let (status, body) = app.request("GET", &path, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["taken_slots"].as_array().unwrap().is_empty());

        app.request(
            "POST",
            "/api/appointments",
            Some(&token),
            Some(json!({
                "doctor_id": doctor.id,
                "date": "2026-04-02",
                "time_slot": "10:00",
            })),
        )
        .await;

        let (_, body) = app.request("GET", &path, None, None).await;
        assert_eq!(body["taken_slots"], json!(["10:00"]));
        // Identical second query, identical answer
        let (_, again) = app.request("GET", &path, None, None).await;
        assert_eq!(again["taken_slots"], body["taken_slots"]);
    }

    #[tokio::test]
    async fn pay_flow_confirms_appointment() {
        let app = test_app();
        let token = app.patient("pat@example.org").await;
        let doctor = app.doctor_row(None);
        let service = app.service_row(doctor.id, 5000);

        let (_, booked) = app
            .request(
                "POST",
                "/api/appointments",
                Some(&token),
                Some(json!({
                    "doctor_id": doctor.id,
                    "service_id": service.id,
                    "date": "2026-04-02",
                    "time_slot": "10:00",
                })),
            )
            .await;
        let payment_id = booked["payment"]["id"].as_str().unwrap().to_string();

        let (status, method) = app
            .request(
                "POST",
                "/api/payment-methods",
                Some(&token),
                Some(json!({
                    "method_type": "card",
                    "display_name": "Visa",
                    "masked_number": "**** 4242",
                    "is_default": true,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let method_id = method["payment_method"]["id"].as_str().unwrap();

        let (status, paid) = app
            .request(
                "POST",
                "/api/payments/pay",
                Some(&token),
                Some(json!({
                    "payment_id": payment_id,
                    "payment_method_id": method_id,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(paid["payment"]["status"], "completed");
        assert!(paid["payment"]["transaction_id"].is_string());

        let (_, list) = app.request("GET", "/api/appointments", Some(&token), None).await;
        assert_eq!(list["appointments"][0]["status"], "confirmed");

        // Paying again is a conflict
        let (status, _) = app
            .request(
                "POST",
                "/api/payments/pay",
                Some(&token),
                Some(json!({
                    "payment_id": payment_id,
                    "payment_method_id": method_id,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn doctor_queue_and_review_flow() {
        let app = test_app();
        let patient_token = app.patient("pat@example.org").await;
        let doctor_user = app.account_with_role("doc@example.org", Role::Doctor);
        let doctor = app.doctor_row(Some(doctor_user));
        let doctor_token = app.login("doc@example.org").await;

        let (_, booked) = app
            .request(
                "POST",
                "/api/appointments",
                Some(&patient_token),
                Some(json!({
                    "doctor_id": doctor.id,
                    "date": "2026-04-02",
                    "time_slot": "10:00",
                })),
            )
            .await;
        let appointment_id = booked["appointment"]["id"].as_str().unwrap().to_string();

        // Doctor sees the booking and completes it
        let (status, queue) = app
            .request("GET", "/api/doctor/appointments", Some(&doctor_token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(queue["appointments"][0]["patient_name"], "Alex Moreau");

        for next in ["confirmed", "completed"] {
            let (status, _) = app
                .request(
                    "PATCH",
                    "/api/doctor/appointments",
                    Some(&doctor_token),
                    Some(json!({"appointment_id": appointment_id, "status": next})),
                )
                .await;
            assert_eq!(status, StatusCode::OK);
        }

        // Patient reviews; duplicate is a conflict and leaves rating alone
        let (status, reviewed) = app
            .request(
                "POST",
                "/api/reviews",
                Some(&patient_token),
                Some(json!({"appointment_id": appointment_id, "rating": 4})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reviewed["doctor_rating"], 4.0);

        let (status, _) = app
            .request(
                "POST",
                "/api/reviews",
                Some(&patient_token),
                Some(json!({"appointment_id": appointment_id, "rating": 1})),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let path = format!("/api/doctors/{}", doctor.id);
        let (_, detail) = app.request("GET", &path, None, None).await;
        assert_eq!(detail["rating"], 4.0);

        let (status, received) = app
            .request("GET", "/api/doctor/reviews", Some(&doctor_token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(received["reviews"].as_array().unwrap().len(), 1);
        assert_eq!(received["reviews"][0]["patient_name"], "Alex Moreau");
        assert_eq!(received["reviews"][0]["rating"], 4);
    }

    #[tokio::test]
    async fn foreign_cancel_reads_as_not_found() {
        let app = test_app();
        let owner = app.patient("pat@example.org").await;
        let rival = app.patient("rival@example.org").await;
        let doctor = app.doctor_row(None);

        let (_, booked) = app
            .request(
                "POST",
                "/api/appointments",
                Some(&owner),
                Some(json!({
                    "doctor_id": doctor.id,
                    "date": "2026-04-02",
                    "time_slot": "10:00",
                })),
            )
            .await;
        let appointment_id = booked["appointment"]["id"].as_str().unwrap();

        let (status, _) = app
            .request(
                "PATCH",
                "/api/appointments",
                Some(&rival),
                Some(json!({"appointment_id": appointment_id, "status": "cancelled"})),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, list) = app.request("GET", "/api/appointments", Some(&owner), None).await;
        assert_eq!(list["appointments"][0]["status"], "pending");
    }

    #[tokio::test]
    async fn admin_explorer_is_role_gated() {
        let app = test_app();
        let patient = app.patient("pat@example.org").await;
        let (status, _) = app.request("GET", "/api/admin/db", Some(&patient), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        app.account_with_role("admin@example.org", Role::Admin);
        let admin = app.login("admin@example.org").await;

        let (status, body) = app.request("GET", "/api/admin/db", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        let tables = body["tables"].as_array().unwrap();
        assert!(tables.iter().any(|t| t["table"] == "appointments"));

        let (status, body) = app
            .request("GET", "/api/admin/db?table=users", Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rows"].as_array().unwrap().len(), 2);

        let (status, _) = app
            .request("GET", "/api/admin/db?table=nope", Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn favorites_toggle_round_trip() {
        let app = test_app();
        let token = app.patient("pat@example.org").await;
        let doctor = app.doctor_row(None);

        let toggle = json!({"doctor_id": doctor.id});
        let (status, body) = app
            .request("POST", "/api/favorites", Some(&token), Some(toggle.clone()))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["favorited"], true);

        let (_, list) = app.request("GET", "/api/favorites", Some(&token), None).await;
        assert_eq!(list["doctors"].as_array().unwrap().len(), 1);

        let (_, body) = app
            .request("POST", "/api/favorites", Some(&token), Some(toggle))
            .await;
        assert_eq!(body["favorited"], false);
    }
}
