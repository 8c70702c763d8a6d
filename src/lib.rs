pub mod api;
pub mod auth;
pub mod booking;
pub mod config;
pub mod db;
pub mod models;
pub mod payments;
pub mod reviews;
pub mod seed;
