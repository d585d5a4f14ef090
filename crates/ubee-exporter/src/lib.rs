//! HTTP shell of the exporter: configuration, routes and Prometheus exposition.

pub mod config;
pub mod dto;
pub mod error;
pub mod metrics;
pub mod routes;
pub mod state;
