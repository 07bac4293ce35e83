//! SeaORM entities
//!
//! Table mappings for the record store. Generated with `sea-orm-cli generate entity`
//! against `migrations/001_initial.sql`, then trimmed.

pub mod profiles;
pub mod scenarios;
pub mod usage_monthly;
