//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.
//! Each fixture function creates a valid entity that can be customized.

use chrono::Utc;

use crate::domain::entities::{
    calculate, AuthUser, CalculatorInputs, Profile, Scenario, ScenarioId, UserId,
};

/// Create a signed-in user with a fresh id
pub fn test_user() -> AuthUser {
    let id = UserId::new();
    AuthUser {
        id,
        email: Some(format!("seller-{}@example.com", id.0.simple())),
    }
}

/// Create a pro profile for a user
pub fn test_pro_profile(user_id: UserId) -> Profile {
    Profile {
        user_id,
        is_pro: true,
    }
}

/// Inputs for a profitable private label product
pub fn test_inputs() -> CalculatorInputs {
    CalculatorInputs {
        buy_cost: 4.0,
        shipping_per_unit: 1.0,
        prep_cost: 0.5,
        sale_price: 15.0,
        referral_percent: 15.0,
        fba_fee: 3.25,
        monthly_storage_per_unit: 0.05,
        expected_months_to_sell: 5.0,
        vat_included: false,
    }
}

/// Create a saved scenario owned by `user_id`
pub fn test_scenario(user_id: UserId, name: &str) -> Scenario {
    let inputs = test_inputs();
    Scenario {
        id: ScenarioId::new(),
        user_id,
        name: name.to_string(),
        inputs,
        outputs: calculate(&inputs),
        updated_at: Utc::now(),
    }
}
