//! API middleware stack.
//!
//! A single layer: bearer-token auth. Every protected handler re-checks role
//! and row ownership itself — the middleware only establishes who is calling.

pub mod auth;
