//! HTTP handlers for all web routes.

pub mod cases;
pub mod sessions;
