//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod postgres;
pub mod supabase;

pub use postgres::{PostgresProfileRepository, PostgresScenarioRepository, PostgresUsageRepository};
pub use supabase::SupabaseAuthClient;
