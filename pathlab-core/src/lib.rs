//! PathLab Core — scenario price-path simulation pipeline.
//!
//! This crate contains the whole simulation engine:
//! - Domain types (company metadata, OHLC bars)
//! - Trading calendar generation (weekdays only)
//! - Feature panel construction with scalar/series broadcasting
//! - Event overlay as a pure panel transform
//! - Return prediction: trained-model trait + synthetic fallback
//! - OHLC path synthesis with clamped exponential wicks
//! - The simulation orchestrator wiring the stages together

pub mod calendar;
pub mod controls;
pub mod domain;
pub mod error;
pub mod events;
pub mod ohlc;
pub mod panel;
pub mod predictor;
pub mod rng;
pub mod sim;
pub mod synthetic;

pub use error::{SimError, ValidationError};
pub use sim::{SimulationRequest, SimulationResult, Simulator};
