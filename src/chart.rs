//! CO₂ emissions bubble map.
//!
//! Loads the regional emissions dataset and turns it into an `EmissionsMap`: one
//! marker per region, area proportional to total emissions, coloured on a continuous
//! yellow-orange-red scale by emissions per capita. The map can be exported as a
//! Plotly figure or drawn by the terminal UI.

mod color;
mod dataset;
mod emissions_map;

pub use color::Rgb;
pub use dataset::{DatasetError, EmissionRecord, load_records};
pub use emissions_map::{Bounds, ColorLegend, EmissionsMap, LegendTick, MapPoint};
