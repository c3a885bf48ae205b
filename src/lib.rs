//! ARI Platform API Library
//!
//! Backend for the agency's admin dashboard and client portals: client
//! management, the AI receptionist voice webhook, the booking accelerator
//! lead-capture pipeline, campaigns, appointments and billing.
//!
//! # Modules
//!
//! - `api`: API-layer namespace (handlers).
//! - `core`: Domain-layer namespace (scoring, models, services, errors).
//! - `data`: Data access namespace (db, db_storage).
//! - `integrations`: External payload models (voice webhook, form capture).
//! - `capture_handler`: Public lead-capture endpoint.
//! - `capture_models`: Lead-capture payload models.
//! - `config`: Configuration management.
//! - `db`: Database connection and pool management.
//! - `db_storage`: Collection stores.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: Core data models.
//! - `scoring`: Lead scoring and quote pricing.
//! - `services`: External service clients (notifications, sheets, voice platform).
//! - `webhook_handler`: Voice platform webhook handler.
//! - `webhook_models`: Voice webhook payload models.

pub mod api;
pub mod core;
pub mod data;
pub mod integrations;

// Re-export primary modules for shared use in tests and other binaries
pub mod capture_handler;
pub mod capture_models;
pub mod config;
pub mod db;
pub mod db_storage;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod scoring;
pub mod services;
pub mod webhook_handler;
pub mod webhook_models;
