//! Wire and domain types for the OpenWeatherMap endpoints.

use serde::Deserialize;

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Pollutant concentrations in µg/m³.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PollutantLevels {
    pub co: f64,
    pub no2: f64,
    pub o3: f64,
    pub pm2_5: f64,
    pub pm10: f64,
}

/// Air-quality index plus pollutant levels at one location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirQualityReading {
    /// OpenWeatherMap index, 1 (good) to 5 (very poor)
    pub aqi: u8,
    pub components: PollutantLevels,
}

impl AirQualityReading {
    /// Qualitative reading of the index.
    pub fn verdict(&self) -> &'static str {
        match self.aqi {
            1 => "good",
            2 => "fair",
            3 => "moderate",
            4 => "poor",
            5 => "very poor",
            _ => "unknown",
        }
    }
}

/// Body of `/data/2.5/air_pollution`.
#[derive(Debug, Deserialize)]
pub(crate) struct PollutionResponse {
    pub list: Vec<PollutionEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PollutionEntry {
    pub main: PollutionMain,
    pub components: PollutantLevels,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PollutionMain {
    pub aqi: u8,
}

impl PollutionResponse {
    /// The first entry as a reading, if any.
    pub fn into_reading(self) -> Option<AirQualityReading> {
        self.list.into_iter().next().map(|entry| AirQualityReading {
            aqi: entry.main.aqi,
            components: entry.components,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pollution_response_decodes_first_entry() {
        let body = r#"{
            "coord": {"lon": 2.3488, "lat": 48.8534},
            "list": [{
                "main": {"aqi": 2},
                "components": {"co": 200.5, "no": 0.1, "no2": 10.2, "o3": 60.1,
                               "so2": 1.2, "pm2_5": 5.3, "pm10": 8.7, "nh3": 0.5},
                "dt": 1700000000
            }]
        }"#;

        let response: PollutionResponse = serde_json::from_str(body).unwrap();
        let reading = response.into_reading().unwrap();

        assert_eq!(reading.aqi, 2);
        assert_eq!(reading.components.co, 200.5);
        assert_eq!(reading.components.pm10, 8.7);
    }

    #[test]
    fn empty_list_has_no_reading() {
        let response: PollutionResponse = serde_json::from_str(r#"{"list": []}"#).unwrap();
        assert!(response.into_reading().is_none());
    }

    #[test]
    fn coordinates_ignore_extra_geocoding_fields() {
        let body = r#"[{"name": "Lyon", "lat": 45.7578, "lon": 4.8320, "country": "FR"}]"#;
        let places: Vec<Coordinates> = serde_json::from_str(body).unwrap();
        assert_eq!(places[0], Coordinates { lat: 45.7578, lon: 4.8320 });
    }

    #[test]
    fn verdict_follows_index_scale() {
        let components = PollutantLevels {
            co: 0.0,
            no2: 0.0,
            o3: 0.0,
            pm2_5: 0.0,
            pm10: 0.0,
        };
        let verdicts: Vec<&str> = (0..=6)
            .map(|aqi| AirQualityReading { aqi, components }.verdict())
            .collect();
        assert_eq!(
            verdicts,
            ["unknown", "good", "fair", "moderate", "poor", "very poor", "unknown"]
        );
    }
}
