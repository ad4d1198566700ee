use serde::Serialize;
use serde_json::{Value, json};

use super::color::Rgb;
use super::dataset::{DatasetError, EmissionRecord};

const TITLE: &str = "Detailed Map of CO₂ Emissions in France";
const LEGEND_TITLE: &str = "Emissions per Capita (kt)";
const CENTER: GeoPoint = GeoPoint {
    lat: 46.603354,
    lon: 1.888334,
};
const ZOOM: f64 = 5.5;
const SIZE_MAX: f64 = 50.0;
const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// A latitude/longitude pair on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// One region's marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    #[serde(flatten)]
    pub record: EmissionRecord,
    /// Marker diameter in pixels; the area scales with CO₂ emissions
    pub marker_size: f64,
    pub color: Rgb,
}

/// A labelled position on the colour bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendTick {
    pub value: f64,
    pub label: &'static str,
}

/// Colour bar for emissions per capita.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorLegend {
    pub title: &'static str,
    pub min: f64,
    pub max: f64,
    pub ticks: [LegendTick; 3],
}

/// Longitude/latitude box enclosing every marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

/// The bubble map produced by the visualization handler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmissionsMap {
    title: &'static str,
    center: GeoPoint,
    zoom: f64,
    size_max: f64,
    points: Vec<MapPoint>,
    legend: ColorLegend,
}

impl EmissionsMap {
    /// Builds the map from dataset rows.
    ///
    /// Fails on an empty slice or on rows with non-finite or negative values.
    pub fn from_records(records: Vec<EmissionRecord>) -> Result<Self, DatasetError> {
        if records.is_empty() {
            return Err(DatasetError::Empty);
        }

        let max_co2 = records
            .iter()
            .map(|r| r.co2_emissions)
            .fold(f64::MIN, f64::max);
        let min_pc = records
            .iter()
            .map(|r| r.emissions_per_capita)
            .fold(f64::MAX, f64::min);
        let max_pc = records
            .iter()
            .map(|r| r.emissions_per_capita)
            .fold(f64::MIN, f64::max);

        for record in &records {
            if !(record.co2_emissions.is_finite() && record.co2_emissions >= 0.0) {
                return Err(DatasetError::InvalidValue {
                    region: record.region.clone(),
                    column: "CO2_Emissions",
                });
            }
            if !record.emissions_per_capita.is_finite() {
                return Err(DatasetError::InvalidValue {
                    region: record.region.clone(),
                    column: "Emissions_Per_Capita",
                });
            }
        }

        let points = records
            .into_iter()
            .map(|record| {
                let marker_size = if max_co2 > 0.0 {
                    SIZE_MAX * (record.co2_emissions / max_co2).sqrt()
                } else {
                    0.0
                };
                let t = if max_pc > min_pc {
                    (record.emissions_per_capita - min_pc) / (max_pc - min_pc)
                } else {
                    0.0
                };
                MapPoint {
                    record,
                    marker_size,
                    color: Rgb::yl_or_rd(t),
                }
            })
            .collect();

        Ok(Self {
            title: TITLE,
            center: CENTER,
            zoom: ZOOM,
            size_max: SIZE_MAX,
            points,
            legend: ColorLegend {
                title: LEGEND_TITLE,
                min: min_pc,
                max: max_pc,
                ticks: [
                    LegendTick {
                        value: min_pc,
                        label: "Low",
                    },
                    LegendTick {
                        value: max_pc / 2.0,
                        label: "Medium",
                    },
                    LegendTick {
                        value: max_pc,
                        label: "High",
                    },
                ],
            },
        })
    }

    pub fn title(&self) -> &str {
        self.title
    }

    pub fn points(&self) -> &[MapPoint] {
        &self.points
    }

    pub fn legend(&self) -> &ColorLegend {
        &self.legend
    }

    /// Diameter of the largest marker, in pixels.
    pub fn size_max(&self) -> f64 {
        self.size_max
    }

    /// Bounding box of all markers, padded by `margin` degrees on each side.
    pub fn bounds(&self, margin: f64) -> Bounds {
        let init = Bounds {
            min_lon: f64::MAX,
            max_lon: f64::MIN,
            min_lat: f64::MAX,
            max_lat: f64::MIN,
        };
        let b = self.points.iter().fold(init, |b, p| Bounds {
            min_lon: b.min_lon.min(p.record.longitude),
            max_lon: b.max_lon.max(p.record.longitude),
            min_lat: b.min_lat.min(p.record.latitude),
            max_lat: b.max_lat.max(p.record.latitude),
        });

        Bounds {
            min_lon: b.min_lon - margin,
            max_lon: b.max_lon + margin,
            min_lat: b.min_lat - margin,
            max_lat: b.max_lat + margin,
        }
    }

    /// Returns the map as a Plotly `scattermap` figure (`{"data": [...], "layout": {...}}`).
    pub fn to_plotly_json(&self) -> Value {
        let lat: Vec<f64> = self.points.iter().map(|p| p.record.latitude).collect();
        let lon: Vec<f64> = self.points.iter().map(|p| p.record.longitude).collect();
        let regions: Vec<&str> = self.points.iter().map(|p| p.record.region.as_str()).collect();
        let co2: Vec<f64> = self.points.iter().map(|p| p.record.co2_emissions).collect();
        let per_capita: Vec<f64> = self
            .points
            .iter()
            .map(|p| p.record.emissions_per_capita)
            .collect();
        let customdata: Vec<Value> = self
            .points
            .iter()
            .map(|p| {
                json!([
                    p.record.population,
                    p.record.co2_emissions,
                    p.record.emissions_per_capita,
                    p.record.sector,
                    p.record.description
                ])
            })
            .collect();

        let tickvals: Vec<f64> = self.legend.ticks.iter().map(|t| t.value).collect();
        let ticktext: Vec<&str> = self.legend.ticks.iter().map(|t| t.label).collect();

        let max_co2 = co2.iter().copied().fold(0.0, f64::max);
        let sizeref = if max_co2 > 0.0 {
            2.0 * max_co2 / (self.size_max * self.size_max)
        } else {
            1.0
        };

        json!({
            "data": [{
                "type": "scattermap",
                "mode": "markers",
                "lat": lat,
                "lon": lon,
                "text": regions,
                "customdata": customdata,
                "hovertemplate": concat!(
                    "<b>%{text}</b><br>",
                    "Population: %{customdata[0]:,}<br>",
                    "CO2_Emissions: %{customdata[1]}<br>",
                    "Emissions_Per_Capita: %{customdata[2]:.2f}<br>",
                    "Sector: %{customdata[3]}<br>",
                    "Description: %{customdata[4]}<extra></extra>"
                ),
                "marker": {
                    "size": co2,
                    "sizemode": "area",
                    "sizeref": sizeref,
                    "color": per_capita,
                    "colorscale": "YlOrRd",
                    "showscale": true,
                    "colorbar": {
                        "title": {"text": self.legend.title},
                        "tickvals": tickvals,
                        "ticktext": ticktext
                    }
                }
            }],
            "layout": {
                "title": {"text": self.title, "font": {"size": 24, "color": "darkblue"}},
                "font": {"family": "Arial", "size": 14},
                "map": {
                    "style": "carto-positron",
                    "zoom": self.zoom,
                    "center": {"lat": self.center.lat, "lon": self.center.lon}
                },
                "margin": {"r": 0, "t": 50, "l": 0, "b": 0},
                "height": 600
            }
        })
    }

    /// Renders a standalone HTML page displaying the interactive map.
    pub fn to_html(&self) -> String {
        // "</" inside an inline script would close the tag early.
        let figure = self.to_plotly_json().to_string().replace("</", "<\\/");

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{cdn}"></script>
</head>
<body>
<div id="map"></div>
<script>
const figure = {figure};
Plotly.newPlot("map", figure.data, figure.layout, {{responsive: true}});
</script>
</body>
</html>
"#,
            title = self.title,
            cdn = PLOTLY_CDN,
            figure = figure,
        )
    }
}
