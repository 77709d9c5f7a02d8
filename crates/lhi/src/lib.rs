//! Relationship health index: questionnaire scoring plus the access-code, admin, and
//! assessment services that surround it.

pub mod access;
pub mod admin;
pub mod assessment;
pub mod config;
pub mod error;
pub mod persistence;
pub mod telemetry;
