//! Library exports for prometrics, shared between the binary and tests.

pub mod collector;
pub mod config;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod startup;
pub mod state;
pub mod utils;
