//! HTTP handlers
//!
//! Axum request handlers for the API endpoints.

pub mod auth;
pub mod calculator;
pub mod plans;
pub mod scenarios;

pub use auth::{callback, me, request_link, sign_out};
pub use calculator::{calculate, usage};
pub use plans::list_plans;
pub use scenarios::{
    delete_scenario, get_scenario, list_scenarios, rename_scenario, save_scenario,
};
