//! Merchant onboarding: the public intake wizard, the gateway that speaks the backend
//! wire format, the admin dashboard list state, and a bundled in-memory backend.

pub mod admin;
pub mod backend;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod gateway;
pub mod onboarding;
pub mod telemetry;
