//! PostgreSQL adapters
//!
//! Implementations of repository traits using SeaORM and PostgreSQL.

pub mod profile_repo;
pub mod scenario_repo;
pub mod usage_repo;


pub use profile_repo::PostgresProfileRepository;
pub use scenario_repo::PostgresScenarioRepository;
pub use usage_repo::PostgresUsageRepository;
