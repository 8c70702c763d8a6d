//! API endpoint handlers.
//!
//! Handlers stay thin: validate the body, open a connection, call the domain
//! module, reshape the result for JSON.

pub mod admin;
pub mod appointments;
pub mod auth;
pub mod doctors;
pub mod favorites;
pub mod health;
pub mod health_profile;
pub mod medical_records;
pub mod payment_methods;
pub mod payments;
pub mod reviews;
pub mod services;
pub mod upload;
