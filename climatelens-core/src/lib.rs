//! Core library for ClimateLens.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Provider clients for weather, air quality and summaries
//! - The seed repository and the aggregation gateway that falls back to it
//! - The dashboard controller and an HTTP client for the gateway surface
//!
//! It is used by `climatelens-gateway` and `climatelens-cli`.

pub mod client;
pub mod config;
pub mod dashboard;
pub mod gateway;
pub mod model;
pub mod provider;
pub mod seed;

pub use client::HttpGatewayClient;
pub use config::{Config, ProviderConfig};
pub use dashboard::{ClimateApi, Dashboard, Mode, Snapshot};
pub use gateway::Gateway;
pub use model::{AirQualityReading, Coordinates, SummaryText, WeatherReading};
pub use provider::{ProviderId, ProviderSet, UpstreamFailure};
pub use seed::SeedRepository;
