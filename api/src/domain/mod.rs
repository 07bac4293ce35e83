//! Domain layer
//!
//! Profitability math, plan quotas and the scenario model, with no I/O.
//! - `entities`: Domain models and the pure calculation
//! - `ports`: Trait definitions for the record store and identity service

pub mod entities;
pub mod ports;
