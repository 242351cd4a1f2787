//! Shared types and models for the Apparel Stock Management Platform
//!
//! This crate contains the domain model and validation rules shared between
//! the workflow engine, the frontend (via WASM), and other components of
//! the system. Everything here is pure: no I/O, no async, no global state.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
