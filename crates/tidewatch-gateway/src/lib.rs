//! # Tidewatch Gateway
//! HTTP surface for the authoring commands and health checks.

pub mod commands;
pub mod routes;
pub mod server;
pub mod verify;

pub use server::{AppState, serve};
