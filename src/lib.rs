pub mod adapters;
pub mod configuration;
pub mod content;
pub mod domain;
pub mod player;
pub mod routes;
pub mod startup;
pub mod telemetry;
pub mod utils;
