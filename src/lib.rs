pub mod api;
pub mod cache;
pub mod config;
pub mod data_models;
pub mod error;
pub mod intent;
pub mod orchestrator;
pub mod places;
pub mod validation;
