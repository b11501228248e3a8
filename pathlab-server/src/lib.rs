//! PathLab Server — HTTP API around the simulation pipeline.
//!
//! Endpoints:
//! - `POST /simulate` — run a scenario, returns OHLC path + provenance
//! - `GET /controls` — control catalog for client-side form validation
//! - `GET /health` — liveness + whether a trained model is loaded
//!
//! The simulator (with or without a trained model) is constructed once at
//! startup and shared read-only across requests.

pub mod error;
pub mod handlers;
pub mod server;

pub use server::ApiServer;
