/// OpenWeatherMap geocoding and air-pollution client.
///
/// This module provides the `AirQualityClient` seam used by the air-quality handler,
/// the reading types it returns, and a blocking HTTP implementation.
mod client;
mod types;

pub use client::{AirQualityClient, AirQualityError, OpenWeatherClient, OpenWeatherClientBuilder};
pub use types::{AirQualityReading, Coordinates, PollutantLevels};
