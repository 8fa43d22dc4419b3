//! Typed visualization payloads.
//!
//! The model embeds one JSON object per response. [`VisualizationPayload::decode`]
//! turns that object into a typed variant and checks every invariant a renderer
//! would otherwise have to re-check (non-empty series, coordinate ranges,
//! density bounds). A payload that fails any check is rejected, never clamped.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::PayloadError;

// ── Variant tags ─────────────────────────────────────────────────────────────

/// Discriminant of a [`VisualizationPayload`], as it appears in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum VariantTag {
    Welcome,
    Loading,
    ProfileChart,
    TimeSeriesChart,
    Map,
    MapComparison,
    DensityMap,
    TrajectoryMap,
    TableView,
}

impl VariantTag {
    pub const ALL: [VariantTag; 9] = [
        VariantTag::Welcome,
        VariantTag::Loading,
        VariantTag::ProfileChart,
        VariantTag::TimeSeriesChart,
        VariantTag::Map,
        VariantTag::MapComparison,
        VariantTag::DensityMap,
        VariantTag::TrajectoryMap,
        VariantTag::TableView,
    ];

    /// Variants that carry data. `welcome` and `loading` are UI-local
    /// placeholders and are never produced by the model.
    pub const DATA: [VariantTag; 7] = [
        VariantTag::ProfileChart,
        VariantTag::TimeSeriesChart,
        VariantTag::Map,
        VariantTag::MapComparison,
        VariantTag::DensityMap,
        VariantTag::TrajectoryMap,
        VariantTag::TableView,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VariantTag::Welcome => "welcome",
            VariantTag::Loading => "loading",
            VariantTag::ProfileChart => "profile_chart",
            VariantTag::TimeSeriesChart => "time_series_chart",
            VariantTag::Map => "map",
            VariantTag::MapComparison => "map_comparison",
            VariantTag::DensityMap => "density_map",
            VariantTag::TrajectoryMap => "trajectory_map",
            VariantTag::TableView => "table_view",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }
}

impl fmt::Display for VariantTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Data shapes ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProfilePoint {
    /// Depth in metres (plotted on an inverted y axis).
    pub depth: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TimeSeriesPoint {
    /// Calendar date as emitted by the model, e.g. `2024-01-15`.
    pub date: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MapPoint {
    pub lat: f64,
    pub lon: f64,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DensityPoint {
    pub lat: f64,
    pub lon: f64,
    /// Normalised density in `[0, 1]`.
    pub density: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MapSeries {
    pub title: String,
    pub data: Vec<MapPoint>,
}

/// The two maps of a `map_comparison`. Any other key is a shape error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(deny_unknown_fields)]
#[ts(export)]
pub struct MapComparisonData {
    #[serde(rename = "mapA")]
    pub map_a: MapSeries,
    #[serde(rename = "mapB")]
    pub map_b: MapSeries,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TrajectoryPoint {
    pub lat: f64,
    pub lon: f64,
    pub timestamp: String,
}

/// One float's route. Points are kept in the order the model emitted them;
/// they are not guaranteed to be sorted by timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Trajectory {
    pub id: String,
    pub path: Vec<TrajectoryPoint>,
}

/// A table row: column header → cell value.
pub type TableRow = BTreeMap<String, serde_json::Value>;

// ── Payload ──────────────────────────────────────────────────────────────────

/// A validated visualization, ready for a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export)]
pub enum VisualizationPayload {
    Welcome {
        title: String,
    },
    Loading {
        title: String,
    },
    ProfileChart {
        title: String,
        data: Vec<ProfilePoint>,
        #[serde(rename = "xAxisLabel", default)]
        x_axis_label: Option<String>,
        #[serde(rename = "yAxisLabel", default)]
        y_axis_label: Option<String>,
    },
    TimeSeriesChart {
        title: String,
        data: Vec<TimeSeriesPoint>,
        #[serde(rename = "xAxisLabel", default)]
        x_axis_label: Option<String>,
        #[serde(rename = "yAxisLabel", default)]
        y_axis_label: Option<String>,
    },
    Map {
        title: String,
        data: Vec<MapPoint>,
    },
    MapComparison {
        title: String,
        data: MapComparisonData,
    },
    DensityMap {
        title: String,
        data: Vec<DensityPoint>,
    },
    TrajectoryMap {
        title: String,
        data: Vec<Trajectory>,
    },
    TableView {
        title: String,
        data: Vec<TableRow>,
    },
}

impl VisualizationPayload {
    pub fn welcome(title: impl Into<String>) -> Self {
        VisualizationPayload::Welcome {
            title: title.into(),
        }
    }

    pub fn loading(title: impl Into<String>) -> Self {
        VisualizationPayload::Loading {
            title: title.into(),
        }
    }

    /// Decode and validate a parsed JSON object.
    ///
    /// The `type` tag is checked first so that an unknown variant is reported
    /// as such rather than as a generic shape mismatch.
    pub fn decode(value: serde_json::Value) -> Result<Self, PayloadError> {
        let tag = value
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or(PayloadError::MissingType)?;
        let kind = VariantTag::parse(tag)
            .ok_or_else(|| PayloadError::UnknownVariant(tag.to_string()))?;

        let payload: VisualizationPayload =
            serde_json::from_value(value).map_err(|e| PayloadError::Shape {
                expected: kind.to_string(),
                detail: e.to_string(),
            })?;

        payload.validate()?;
        Ok(payload)
    }

    pub fn kind(&self) -> VariantTag {
        match self {
            VisualizationPayload::Welcome { .. } => VariantTag::Welcome,
            VisualizationPayload::Loading { .. } => VariantTag::Loading,
            VisualizationPayload::ProfileChart { .. } => VariantTag::ProfileChart,
            VisualizationPayload::TimeSeriesChart { .. } => VariantTag::TimeSeriesChart,
            VisualizationPayload::Map { .. } => VariantTag::Map,
            VisualizationPayload::MapComparison { .. } => VariantTag::MapComparison,
            VisualizationPayload::DensityMap { .. } => VariantTag::DensityMap,
            VisualizationPayload::TrajectoryMap { .. } => VariantTag::TrajectoryMap,
            VisualizationPayload::TableView { .. } => VariantTag::TableView,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            VisualizationPayload::Welcome { title }
            | VisualizationPayload::Loading { title }
            | VisualizationPayload::ProfileChart { title, .. }
            | VisualizationPayload::TimeSeriesChart { title, .. }
            | VisualizationPayload::Map { title, .. }
            | VisualizationPayload::MapComparison { title, .. }
            | VisualizationPayload::DensityMap { title, .. }
            | VisualizationPayload::TrajectoryMap { title, .. }
            | VisualizationPayload::TableView { title, .. } => title,
        }
    }

    /// `true` for the welcome and loading placeholders, which carry no data.
    pub fn is_placeholder(&self) -> bool {
        matches!(
            self,
            VisualizationPayload::Welcome { .. } | VisualizationPayload::Loading { .. }
        )
    }

    /// Check the per-variant invariants.
    pub fn validate(&self) -> Result<(), PayloadError> {
        let kind = self.kind();
        match self {
            VisualizationPayload::Welcome { .. } | VisualizationPayload::Loading { .. } => Ok(()),
            VisualizationPayload::ProfileChart { data, .. } => non_empty(kind, "data", data),
            VisualizationPayload::TimeSeriesChart { data, .. } => {
                non_empty(kind, "data", data)?;
                if let Some(i) = data.iter().position(|p| p.date.trim().is_empty()) {
                    return Err(invariant(kind, format!("data[{i}].date is blank")));
                }
                Ok(())
            }
            VisualizationPayload::Map { data, .. } => {
                non_empty(kind, "data", data)?;
                for (i, p) in data.iter().enumerate() {
                    check_coordinates(kind, &format!("data[{i}]"), p.lat, p.lon)?;
                }
                Ok(())
            }
            VisualizationPayload::MapComparison { data, .. } => {
                for (name, series) in [("mapA", &data.map_a), ("mapB", &data.map_b)] {
                    non_empty(kind, &format!("{name}.data"), &series.data)?;
                    for (i, p) in series.data.iter().enumerate() {
                        check_coordinates(kind, &format!("{name}.data[{i}]"), p.lat, p.lon)?;
                    }
                }
                Ok(())
            }
            VisualizationPayload::DensityMap { data, .. } => {
                non_empty(kind, "data", data)?;
                for (i, p) in data.iter().enumerate() {
                    check_coordinates(kind, &format!("data[{i}]"), p.lat, p.lon)?;
                    if !(0.0..=1.0).contains(&p.density) {
                        return Err(invariant(
                            kind,
                            format!("data[{i}].density {} is outside [0, 1]", p.density),
                        ));
                    }
                }
                Ok(())
            }
            VisualizationPayload::TrajectoryMap { data, .. } => {
                non_empty(kind, "data", data)?;
                for (i, trajectory) in data.iter().enumerate() {
                    non_empty(kind, &format!("data[{i}].path"), &trajectory.path)?;
                    for (j, p) in trajectory.path.iter().enumerate() {
                        check_coordinates(kind, &format!("data[{i}].path[{j}]"), p.lat, p.lon)?;
                    }
                }
                Ok(())
            }
            VisualizationPayload::TableView { data, .. } => non_empty(kind, "data", data),
        }
    }
}

fn invariant(variant: VariantTag, reason: String) -> PayloadError {
    PayloadError::Invariant { variant, reason }
}

fn non_empty<T>(variant: VariantTag, field: &str, items: &[T]) -> Result<(), PayloadError> {
    if items.is_empty() {
        return Err(invariant(variant, format!("{field} is empty")));
    }
    Ok(())
}

fn check_coordinates(
    variant: VariantTag,
    at: &str,
    lat: f64,
    lon: f64,
) -> Result<(), PayloadError> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(invariant(variant, format!("{at}.lat {lat} is outside [-90, 90]")));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(invariant(variant, format!("{at}.lon {lon} is outside [-180, 180]")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_map() {
        let payload = VisualizationPayload::decode(json!({
            "type": "map",
            "title": "T",
            "data": [{"lat": 1, "lon": 2, "id": "x"}]
        }))
        .unwrap();

        assert_eq!(
            payload,
            VisualizationPayload::Map {
                title: "T".to_string(),
                data: vec![MapPoint {
                    lat: 1.0,
                    lon: 2.0,
                    id: "x".to_string()
                }],
            }
        );
        assert_eq!(payload.kind(), VariantTag::Map);
        assert_eq!(payload.title(), "T");
    }

    #[test]
    fn rejects_density_above_one() {
        let err = VisualizationPayload::decode(json!({
            "type": "density_map",
            "title": "Density",
            "data": [{"lat": 10.0, "lon": 70.0, "density": 1.4}]
        }))
        .unwrap_err();

        assert!(matches!(
            err,
            PayloadError::Invariant {
                variant: VariantTag::DensityMap,
                ..
            }
        ));
    }

    #[test]
    fn accepts_density_bounds() {
        let payload = VisualizationPayload::decode(json!({
            "type": "density_map",
            "title": "Density",
            "data": [
                {"lat": 10.0, "lon": 70.0, "density": 0.0},
                {"lat": 11.0, "lon": 71.0, "density": 1.0}
            ]
        }));
        assert!(payload.is_ok());
    }

    #[test]
    fn rejects_unknown_and_missing_type() {
        assert_eq!(
            VisualizationPayload::decode(json!({"type": "pie_chart", "title": "x", "data": []})),
            Err(PayloadError::UnknownVariant("pie_chart".to_string()))
        );
        assert_eq!(
            VisualizationPayload::decode(json!({"title": "x", "data": []})),
            Err(PayloadError::MissingType)
        );
        assert_eq!(
            VisualizationPayload::decode(json!({"type": 7})),
            Err(PayloadError::MissingType)
        );
    }

    #[test]
    fn rejects_empty_chart_series() {
        let err = VisualizationPayload::decode(json!({
            "type": "profile_chart",
            "title": "Profile",
            "data": []
        }))
        .unwrap_err();
        assert!(matches!(err, PayloadError::Invariant { .. }));
    }

    #[test]
    fn rejects_missing_required_field() {
        let err = VisualizationPayload::decode(json!({
            "type": "time_series_chart",
            "data": [{"date": "2024-01-15", "value": 3.0}]
        }))
        .unwrap_err();
        assert!(matches!(err, PayloadError::Shape { .. }));
    }

    #[test]
    fn map_comparison_needs_exactly_two_maps() {
        let two = json!({
            "type": "map_comparison",
            "title": "Compare",
            "data": {
                "mapA": {"title": "Indian", "data": [{"lat": -10.5, "lon": 80.2, "id": "A1"}]},
                "mapB": {"title": "Pacific", "data": [{"lat": -20.7, "lon": -140.9, "id": "B1"}]}
            }
        });
        assert!(VisualizationPayload::decode(two).is_ok());

        let one = json!({
            "type": "map_comparison",
            "title": "Compare",
            "data": {
                "mapA": {"title": "Indian", "data": [{"lat": -10.5, "lon": 80.2, "id": "A1"}]}
            }
        });
        assert!(matches!(
            VisualizationPayload::decode(one),
            Err(PayloadError::Shape { .. })
        ));

        let three = json!({
            "type": "map_comparison",
            "title": "Compare",
            "data": {
                "mapA": {"title": "A", "data": [{"lat": 0, "lon": 0, "id": "a"}]},
                "mapB": {"title": "B", "data": [{"lat": 0, "lon": 0, "id": "b"}]},
                "mapC": {"title": "C", "data": [{"lat": 0, "lon": 0, "id": "c"}]}
            }
        });
        assert!(matches!(
            VisualizationPayload::decode(three),
            Err(PayloadError::Shape { .. })
        ));
    }

    #[test]
    fn trajectory_points_may_be_out_of_order() {
        let payload = VisualizationPayload::decode(json!({
            "type": "trajectory_map",
            "title": "Float 98765",
            "data": [{
                "id": "98765",
                "path": [
                    {"lat": 30.6, "lon": -45.8, "timestamp": "2024-03-10T12:00:00Z"},
                    {"lat": 30.1, "lon": -45.2, "timestamp": "2024-03-01T12:00:00Z"}
                ]
            }]
        }))
        .unwrap();

        let VisualizationPayload::TrajectoryMap { data, .. } = payload else {
            panic!("expected trajectory map");
        };
        assert_eq!(data[0].path[0].timestamp, "2024-03-10T12:00:00Z");
    }

    #[test]
    fn trajectory_with_empty_path_is_rejected() {
        let err = VisualizationPayload::decode(json!({
            "type": "trajectory_map",
            "title": "Float",
            "data": [{"id": "1", "path": []}]
        }))
        .unwrap_err();
        assert!(matches!(err, PayloadError::Invariant { .. }));
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        let err = VisualizationPayload::decode(json!({
            "type": "map",
            "title": "T",
            "data": [{"lat": 91.0, "lon": 2.0, "id": "x"}]
        }))
        .unwrap_err();
        assert!(matches!(err, PayloadError::Invariant { .. }));
    }

    #[test]
    fn axis_labels_use_camel_case() {
        let payload = VisualizationPayload::decode(json!({
            "type": "profile_chart",
            "title": "Temperature Profile",
            "xAxisLabel": "Temperature (°C)",
            "yAxisLabel": "Depth (m)",
            "data": [{"depth": 0, "value": 28.1}, {"depth": 100, "value": 22.4}]
        }))
        .unwrap();

        let VisualizationPayload::ProfileChart { x_axis_label, .. } = &payload else {
            panic!("expected profile chart");
        };
        assert_eq!(x_axis_label.as_deref(), Some("Temperature (°C)"));

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["xAxisLabel"], "Temperature (°C)");
        assert_eq!(value["type"], "profile_chart");
    }

    #[test]
    fn table_rows_keep_arbitrary_columns() {
        let payload = VisualizationPayload::decode(json!({
            "type": "table_view",
            "title": "Readings",
            "data": [{"latitude": 1.5, "longitude": 70.2, "timestamp": "2024-01-01", "salinity": 35.1}]
        }))
        .unwrap();

        let VisualizationPayload::TableView { data, .. } = payload else {
            panic!("expected table view");
        };
        assert_eq!(data[0]["salinity"], json!(35.1));
    }

    #[test]
    fn placeholders_are_not_data() {
        assert!(VisualizationPayload::welcome("Welcome").is_placeholder());
        assert!(VisualizationPayload::loading("Loading").is_placeholder());
        assert_eq!(VariantTag::parse("table_view"), Some(VariantTag::TableView));
        assert_eq!(VariantTag::parse("TABLE_VIEW"), None);
    }
}
