//! Live air-quality lookup for a city named in the question.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, warn};

use crate::llm::LanguageModel;
use crate::models::{HandlerResult, Request};
use crate::openweather::{AirQualityClient, AirQualityReading};

use super::Handler;

/// City used when the model's answer is empty after cleaning.
pub const DEFAULT_CITY: &str = "Paris";

const EXTRACTION_TEMPLATE: &str = "Extract only the city name from this question: {question}";

/// Anything that is neither a word character nor whitespace.
static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\w\s]").expect("punctuation pattern is valid")
});

/// Extracts a city with the model, then geocodes it and fetches its pollution levels.
pub struct AirQualityHandler {
    model: Arc<dyn LanguageModel>,
    client: Arc<dyn AirQualityClient>,
}

impl AirQualityHandler {
    #[must_use]
    pub fn new(model: Arc<dyn LanguageModel>, client: Arc<dyn AirQualityClient>) -> Self {
        Self { model, client }
    }

    /// Asks the model for the city, returning a user-facing message on failure.
    fn extract_city(&self, question: &str) -> Result<String, String> {
        let prompt = EXTRACTION_TEMPLATE.replace("{question}", question);

        let response = self.model.invoke(&prompt).map_err(|e| {
            warn!(error = %e, "city extraction failed");
            format!("Unable to extract a city name: {e}")
        })?;

        let Some(text) = response.text() else {
            warn!(%response, "city extraction response has no text payload");
            return Err("Unable to extract a city name: unexpected model response.".to_string());
        };

        Ok(clean_city(text))
    }
}

impl Handler for AirQualityHandler {
    fn run(&self, request: &Request) -> HandlerResult {
        let city = match self.extract_city(request.question()) {
            Ok(city) => city,
            Err(message) => return HandlerResult::text(message),
        };
        debug!(%city, "extracted city");

        let coords = match self.client.geocode(&city) {
            Ok(Some(coords)) => coords,
            Ok(None) => {
                return HandlerResult::text(format!("Unable to find coordinates for city: {city}"));
            }
            Err(e) => {
                warn!(error = %e, %city, "geocoding failed");
                return HandlerResult::text(format!("Unable to find coordinates for city: {city}"));
            }
        };

        match self.client.air_quality(coords) {
            Ok(Some(reading)) => HandlerResult::text(format_report(&city, &reading)),
            Ok(None) => HandlerResult::text("Unable to retrieve air quality data."),
            Err(e) => {
                warn!(error = %e, %city, "air-quality lookup failed");
                HandlerResult::text("Unable to retrieve air quality data.")
            }
        }
    }
}

/// Strips punctuation from the model's answer, falling back to the default city.
fn clean_city(raw: &str) -> String {
    let cleaned = PUNCTUATION.replace_all(raw.trim(), "");
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        DEFAULT_CITY.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Renders the markdown report for a reading.
fn format_report(city: &str, reading: &AirQualityReading) -> String {
    let c = &reading.components;
    format!(
        "## Air Quality in {city}\n\
         - **Air Quality Index (AQI)**: {aqi}\n\
         - **Pollutant Levels**:\n  \
         - Carbon Monoxide (CO): {co:?} µg/m³\n  \
         - Nitrogen Dioxide (NO2): {no2:?} µg/m³\n  \
         - Ozone (O3): {o3:?} µg/m³\n  \
         - Fine Particles (PM2.5): {pm2_5:?} µg/m³\n  \
         - Fine Particles (PM10): {pm10:?} µg/m³\n\n\
         The Air Quality Index of {aqi} indicates that the air quality in {city} is {verdict}.",
        aqi = reading.aqi,
        co = c.co,
        no2 = c.no2,
        o3 = c.o3,
        pm2_5 = c.pm2_5,
        pm10 = c.pm10,
        verdict = reading.verdict(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmError, ModelResponse};
    use crate::openweather::{AirQualityError, Coordinates, PollutantLevels};
    use std::sync::Mutex;

    struct CannedModel(Result<ModelResponse, u16>);

    impl LanguageModel for CannedModel {
        fn invoke(&self, _prompt: &str) -> Result<ModelResponse, LlmError> {
            self.0.clone().map_err(|status| LlmError::Http { status })
        }
    }

    #[derive(Default)]
    struct StubClient {
        coords: Option<Coordinates>,
        reading: Option<AirQualityReading>,
        geocoded: Mutex<Vec<String>>,
        pollution_calls: Mutex<usize>,
    }

    impl AirQualityClient for StubClient {
        fn geocode(&self, city: &str) -> Result<Option<Coordinates>, AirQualityError> {
            self.geocoded.lock().unwrap().push(city.to_string());
            Ok(self.coords)
        }

        fn air_quality(
            &self,
            _coords: Coordinates,
        ) -> Result<Option<AirQualityReading>, AirQualityError> {
            *self.pollution_calls.lock().unwrap() += 1;
            Ok(self.reading)
        }
    }

    fn paris_reading() -> AirQualityReading {
        AirQualityReading {
            aqi: 2,
            components: PollutantLevels {
                co: 200.5,
                no2: 10.2,
                o3: 60.1,
                pm2_5: 5.3,
                pm10: 8.7,
            },
        }
    }

    fn run_with(model_text: &str, client: Arc<StubClient>) -> HandlerResult {
        let handler = AirQualityHandler::new(
            Arc::new(CannedModel(Ok(model_text.into()))),
            client,
        );
        handler.run(&Request::new("How is the air in Paris today?").unwrap())
    }

    #[test]
    fn punctuation_is_stripped_from_city() {
        assert_eq!(clean_city("Paris!"), "Paris");
        assert_eq!(clean_city("  \"Saint-Étienne.\" "), "SaintÉtienne");
        assert_eq!(clean_city("New York"), "New York");
    }

    #[test]
    fn empty_extraction_falls_back_to_paris() {
        assert_eq!(clean_city(""), "Paris");
        assert_eq!(clean_city(" ?! "), "Paris");
    }

    #[test]
    fn geocoded_city_is_the_cleaned_answer() {
        let client = Arc::new(StubClient::default());
        run_with("Paris!", client.clone());
        assert_eq!(*client.geocoded.lock().unwrap(), vec!["Paris".to_string()]);
    }

    #[test]
    fn missing_coordinates_skip_pollution_lookup() {
        let client = Arc::new(StubClient::default());

        let result = run_with("Atlantis", client.clone());

        assert_eq!(result.message(), "Unable to find coordinates for city: Atlantis");
        assert_eq!(*client.pollution_calls.lock().unwrap(), 0);
    }

    #[test]
    fn missing_reading_is_reported() {
        let client = Arc::new(StubClient {
            coords: Some(Coordinates { lat: 48.85, lon: 2.35 }),
            ..Default::default()
        });

        let result = run_with("Paris", client);

        assert_eq!(result.message(), "Unable to retrieve air quality data.");
    }

    #[test]
    fn report_lists_index_and_all_pollutants() {
        let client = Arc::new(StubClient {
            coords: Some(Coordinates { lat: 48.85, lon: 2.35 }),
            reading: Some(paris_reading()),
            ..Default::default()
        });

        let result = run_with("Paris", client);
        let text = result.message();

        assert!(text.starts_with("## Air Quality in Paris\n"));
        assert!(text.contains("- **Air Quality Index (AQI)**: 2\n"));
        assert!(text.contains("  - Carbon Monoxide (CO): 200.5 µg/m³\n"));
        assert!(text.contains("  - Nitrogen Dioxide (NO2): 10.2 µg/m³\n"));
        assert!(text.contains("  - Ozone (O3): 60.1 µg/m³\n"));
        assert!(text.contains("  - Fine Particles (PM2.5): 5.3 µg/m³\n"));
        assert!(text.contains("  - Fine Particles (PM10): 8.7 µg/m³\n"));
        assert!(text.ends_with("The Air Quality Index of 2 indicates that the air quality in Paris is fair."));
        assert!(result.chart().is_none());
    }

    #[test]
    fn whole_number_concentrations_keep_their_decimal() {
        let reading = AirQualityReading {
            aqi: 1,
            components: PollutantLevels {
                co: 230.0,
                no2: 4.0,
                o3: 55.0,
                pm2_5: 2.5,
                pm10: 3.0,
            },
        };

        let text = format_report("Brest", &reading);

        assert!(text.contains("  - Carbon Monoxide (CO): 230.0 µg/m³\n"));
        assert!(text.contains("  - Nitrogen Dioxide (NO2): 4.0 µg/m³\n"));
        assert!(text.contains("  - Ozone (O3): 55.0 µg/m³\n"));
        assert!(text.contains("  - Fine Particles (PM2.5): 2.5 µg/m³\n"));
        assert!(text.contains("  - Fine Particles (PM10): 3.0 µg/m³\n"));
    }

    #[test]
    fn model_failure_is_recovered_locally() {
        let client = Arc::new(StubClient::default());
        let handler = AirQualityHandler::new(Arc::new(CannedModel(Err(500))), client.clone());

        let result = handler.run(&Request::new("Air in Lille?").unwrap());

        assert_eq!(
            result.message(),
            "Unable to extract a city name: HTTP error: status 500"
        );
        assert!(client.geocoded.lock().unwrap().is_empty());
    }

    #[test]
    fn unrecognized_extraction_response_is_recovered_locally() {
        let client = Arc::new(StubClient::default());
        let handler = AirQualityHandler::new(
            Arc::new(CannedModel(Ok(ModelResponse::Unrecognized(serde_json::json!(null))))),
            client.clone(),
        );

        let result = handler.run(&Request::new("Air in Lille?").unwrap());

        assert!(result.message().starts_with("Unable to extract a city name"));
        assert!(client.geocoded.lock().unwrap().is_empty());
    }
}
