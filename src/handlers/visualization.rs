//! Emissions map generation from the local dataset.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::chart::{DatasetError, EmissionsMap, load_records};
use crate::models::{HandlerResult, Request};

use super::Handler;

/// Dataset read when no other path is configured.
pub const DEFAULT_DATASET_PATH: &str = "data/emissions_co2_france.csv";

const SUCCESS: &str = "Interactive CO₂ emissions map generated successfully.";

/// Builds the CO₂ bubble map. The question content is not used.
pub struct VisualizationHandler {
    dataset: PathBuf,
}

impl VisualizationHandler {
    #[must_use]
    pub fn new(dataset: impl Into<PathBuf>) -> Self {
        Self {
            dataset: dataset.into(),
        }
    }

    pub fn dataset(&self) -> &Path {
        &self.dataset
    }

    fn build_map(&self) -> Result<EmissionsMap, DatasetError> {
        let records = load_records(&self.dataset)?;
        debug!(rows = records.len(), path = %self.dataset.display(), "loaded emissions dataset");
        EmissionsMap::from_records(records)
    }
}

impl Default for VisualizationHandler {
    fn default() -> Self {
        Self::new(DEFAULT_DATASET_PATH)
    }
}

impl Handler for VisualizationHandler {
    fn run(&self, _request: &Request) -> HandlerResult {
        match self.build_map() {
            Ok(map) => HandlerResult::with_chart(SUCCESS, map),
            Err(e) => {
                warn!(error = %e, path = %self.dataset.display(), "map generation failed");
                HandlerResult::text(format!("Error generating the map: {e}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str =
        "Region,Latitude,Longitude,CO2_Emissions,Emissions_Per_Capita,Population,Sector,Description";

    fn dataset(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn request() -> Request {
        Request::new("Show me emissions on a map").unwrap()
    }

    #[test]
    fn valid_dataset_produces_chart() {
        let file = dataset(&format!(
            "{HEADER}\n\
             Grand Est,48.70,6.18,38000,6.9,5550000,Industry,Steel and chemicals\n\
             Bretagne,48.20,-2.93,21000,6.3,3340000,Agriculture,Livestock\n"
        ));
        let handler = VisualizationHandler::new(file.path());

        let result = handler.run(&request());

        assert_eq!(
            result.message(),
            "Interactive CO₂ emissions map generated successfully."
        );
        let chart = result.chart().expect("chart should be present");
        assert_eq!(chart.points().len(), 2);
    }

    #[test]
    fn malformed_dataset_is_reported_without_chart() {
        let file = dataset("Region;Latitude\nnot;a;csv;we;expect\n");
        let handler = VisualizationHandler::new(file.path());

        let result = handler.run(&request());

        assert!(result.message().starts_with("Error generating the map:"));
        assert!(result.chart().is_none());
    }

    #[test]
    fn missing_dataset_is_reported_without_chart() {
        let handler = VisualizationHandler::new("/nonexistent/emissions.csv");

        let result = handler.run(&request());

        assert!(result.message().starts_with("Error generating the map:"));
        assert!(result.chart().is_none());
    }

    #[test]
    fn question_content_does_not_matter() {
        let file = dataset(&format!("{HEADER}\nCorse,42.04,9.01,2100,6.1,345000,Transport,Ferries\n"));
        let handler = VisualizationHandler::new(file.path());

        let a = handler.run(&request());
        let b = handler.run(&Request::new("anything else").unwrap());

        assert_eq!(a, b);
    }

    #[test]
    fn default_points_at_bundled_dataset() {
        assert_eq!(
            VisualizationHandler::default().dataset(),
            Path::new(DEFAULT_DATASET_PATH)
        );
    }
}
