//! Supabase adapter
//!
//! Implementation of the identity port against Supabase Auth (GoTrue).

pub mod client;

pub use client::SupabaseAuthClient;
