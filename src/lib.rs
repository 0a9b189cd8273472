//! Administrative backend for students, classes and exam grades.
//!
//! The binary wires these modules into an axum server; tests drive the same
//! router in-process.

pub mod aggregate;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod model;
pub mod store;
pub mod uploads;
