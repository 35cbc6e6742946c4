//! Crate containing Cuisineberg API types, definitions and client utils.
//!
//! # Notes on API types
//!
//! The backend is a JSON/HTTP service with camelCase field names and
//! MongoDB-style `_id` item identifiers. All wire structs in this crate use
//! `#[serde(rename_all = "camelCase")]` (or explicit renames) so the Rust
//! side can keep snake_case field names.

/// Session tokens and bearer auth.
pub mod auth;
/// Traits defining the Cuisineberg APIs.
pub mod def;
/// Deploy environments and per-environment API URLs.
pub mod env;
/// API error types.
pub mod error;
/// Country/state/city reference data types and parsing.
pub mod geo;
/// API request and response types.
pub mod models;
/// A client and helpers that enforce common REST semantics.
pub mod rest;
