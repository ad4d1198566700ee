use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating the emissions dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The file could not be opened or a row could not be parsed
    #[error("{0}")]
    Csv(#[from] csv::Error),

    /// The file has a header but no rows
    #[error("dataset contains no rows")]
    Empty,

    /// A numeric field is NaN, infinite or negative
    #[error("invalid {column} for region {region}")]
    InvalidValue { region: String, column: &'static str },
}

/// One row of the regional emissions dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionRecord {
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
    /// Total emissions, kt CO₂
    #[serde(rename = "CO2_Emissions")]
    pub co2_emissions: f64,
    /// Emissions per inhabitant, kt CO₂
    #[serde(rename = "Emissions_Per_Capita")]
    pub emissions_per_capita: f64,
    #[serde(rename = "Population")]
    pub population: u64,
    #[serde(rename = "Sector")]
    pub sector: String,
    #[serde(rename = "Description")]
    pub description: String,
}

impl EmissionRecord {
    fn validate(&self) -> Result<(), DatasetError> {
        let checks = [
            ("Latitude", self.latitude.is_finite()),
            ("Longitude", self.longitude.is_finite()),
            (
                "CO2_Emissions",
                self.co2_emissions.is_finite() && self.co2_emissions >= 0.0,
            ),
            (
                "Emissions_Per_Capita",
                self.emissions_per_capita.is_finite() && self.emissions_per_capita >= 0.0,
            ),
        ];

        match checks.into_iter().find(|(_, ok)| !ok) {
            Some((column, _)) => Err(DatasetError::InvalidValue {
                region: self.region.clone(),
                column,
            }),
            None => Ok(()),
        }
    }
}

/// Reads and validates every row of the CSV at `path`.
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<EmissionRecord>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let records = reader
        .deserialize::<EmissionRecord>()
        .collect::<Result<Vec<_>, _>>()?;

    if records.is_empty() {
        return Err(DatasetError::Empty);
    }

    for record in &records {
        record.validate()?;
    }

    Ok(records)
}
