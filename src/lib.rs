//! Mortgage Application Service Library
//!
//! Accepts mortgage applications, asks an external calculator for the monthly
//! payment, decides approval, and stores the applicant record in Postgres.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core business logic.
//! - `data`: Data access layer.
//! - `integrations`: External service integrations.
//! - `obs`: Observability and logging.
//! - `application_service`: Submission orchestration and the approval rule.
//! - `calculator_client`: Mortgage calculator HTTP client.
//! - `config`: Configuration management.
//! - `db`: Database connection and schema setup.
//! - `db_storage`: Client record store.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers and router.
//! - `models`: Domain, API and calculator models.
//! - `validation`: Submission validation.

pub mod api;
pub mod core;
pub mod data;
pub mod integrations;
pub mod obs;

// Re-export primary modules for shared use in tests and other binaries
pub mod application_service;
pub mod calculator_client;
pub mod config;
pub mod db;
pub mod db_storage;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod validation;
