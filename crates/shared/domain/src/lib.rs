//! # Domain Models
//!
//! This crate contains pure domain types with minimal dependencies (`serde`, `bitflags`,
//! `chrono`, `rust_decimal`).
//! Keep it lean: no I/O, networking, or heavy logic. Just data and simple helpers.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod registry;
pub mod security;
