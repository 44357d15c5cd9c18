//! Loan Risk Submission API Library
//!
//! Accepts loan risk assessments from the scoring front end, validates them
//! against a declared field catalog and stores each one as a single warehouse
//! row, referencing only the columns the submission actually carries.
//!
//! # Modules
//!
//! - `api`: HTTP-facing components.
//! - `data`: Warehouse access layer.
//! - `app`: Router assembly (routes, CORS, body limit, tracing).
//! - `config`: Configuration management.
//! - `db`: Postgres-protocol warehouse, one connection per insert.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `loan_storage`: Dynamic insert builder and the `Warehouse` seam.
//! - `models`: Submission and response models.
//! - `schema`: Column catalog shared by validation and storage.
//! - `validation`: Payload checks against the catalog.

pub mod api;
pub mod data;

pub mod app;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod loan_storage;
pub mod models;
pub mod schema;
pub mod validation;
