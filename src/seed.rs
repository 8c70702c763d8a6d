//! Demo data seeding, behind the `--seed` CLI flag.
//!
//! Populates an empty database with a handful of doctors, their services,
//! an admin account and one doctor login. Skipped when doctors already
//! exist, so re-running with `--seed` is harmless.

use rusqlite::Connection;
use uuid::Uuid;

use crate::auth::{self, AuthError, Registration};
use crate::db::{self, DatabaseError};
use crate::models::{Doctor, Role, Service};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

pub const ADMIN_EMAIL: &str = "admin@medibook.local";
pub const DOCTOR_EMAIL: &str = "doctor@medibook.local";
const DEMO_PASSWORD: &str = "medibook-demo";

struct DemoDoctor {
    first_name: &'static str,
    last_name: &'static str,
    specialty: &'static str,
    experience_years: u32,
    bio: &'static str,
    services: &'static [(&'static str, i64, u32)],
}

const DEMO_DOCTORS: &[DemoDoctor] = &[
    DemoDoctor {
        first_name: "Irene",
        last_name: "Vasquez",
        specialty: "cardiology",
        experience_years: 14,
        bio: "Consultant cardiologist focused on preventive care.",
        services: &[("Consultation", 6000, 30), ("ECG + consultation", 9500, 45)],
    },
    DemoDoctor {
        first_name: "Samuel",
        last_name: "Okafor",
        specialty: "dermatology",
        experience_years: 9,
        bio: "Dermatologist covering both clinical and surgical cases.",
        services: &[("Skin check", 4500, 20), ("Minor procedure", 12000, 60)],
    },
    DemoDoctor {
        first_name: "Mei",
        last_name: "Tanaka",
        specialty: "pediatrics",
        experience_years: 11,
        bio: "Pediatrician with a background in respiratory medicine.",
        services: &[("Consultation", 5000, 30)],
    },
];

/// Seed demo doctors, services and the admin/doctor logins.
///
/// No-op when the database already holds doctors. Returns whether anything
/// was written.
pub fn seed_demo_data(conn: &Connection) -> Result<bool, SeedError> {
    if db::count_doctors(conn)? > 0 {
        tracing::info!("Database already seeded, skipping");
        return Ok(false);
    }

    let admin = auth::register_user(
        conn,
        &Registration {
            email: ADMIN_EMAIL.to_string(),
            password: DEMO_PASSWORD.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Admin".to_string(),
            phone: None,
            birth_date: None,
        },
        Role::Admin,
    )?;
    tracing::info!("Seeded admin account {}", admin.email);

    for (i, demo) in DEMO_DOCTORS.iter().enumerate() {
        // The first demo doctor gets a login so the doctor surface is usable
        // out of the box.
        let user_id = if i == 0 {
            let user = auth::register_user(
                conn,
                &Registration {
                    email: DOCTOR_EMAIL.to_string(),
                    password: DEMO_PASSWORD.to_string(),
                    first_name: demo.first_name.to_string(),
                    last_name: demo.last_name.to_string(),
                    phone: None,
                    birth_date: None,
                },
                Role::Doctor,
            )?;
            Some(user.id)
        } else {
            None
        };

        let doctor = Doctor {
            id: Uuid::new_v4(),
            user_id,
            first_name: demo.first_name.to_string(),
            last_name: demo.last_name.to_string(),
            specialty: demo.specialty.to_string(),
            experience_years: demo.experience_years,
            bio: Some(demo.bio.to_string()),
            rating: 0.0,
            available: true,
        };
        db::insert_doctor(conn, &doctor)?;

        for &(name, price, duration_minutes) in demo.services {
            db::insert_service(
                conn,
                &Service {
                    id: Uuid::new_v4(),
                    doctor_id: doctor.id,
                    name: name.to_string(),
                    price,
                    duration_minutes,
                },
            )?;
        }
    }

    tracing::info!("Seeded {} demo doctors", DEMO_DOCTORS.len());
    Ok(true)
}
