//! Flattening a visualization into rows.
//!
//! Every data variant becomes a list of flat records. A map comparison
//! tags each point with the title of the map it came from, and a trajectory
//! map emits one row per path point carrying its float id.

use seavoice_core::models::visualization::{MapPoint, VisualizationPayload};
use serde_json::{Map, Value, json};

use crate::error::ExportError;

/// One record with its columns in display order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    cells: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column. Setting an existing column replaces its value in place.
    pub fn with(mut self, column: &str, value: Value) -> Self {
        match self.cells.iter_mut().find(|(c, _)| c == column) {
            Some((_, v)) => *v = value,
            None => self.cells.push((column.to_string(), value)),
        }
        self
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(c, _)| c.as_str())
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn to_object(&self) -> Value {
        let map: Map<String, Value> = self.cells.iter().cloned().collect();
        Value::Object(map)
    }
}

/// Flatten the data of `payload` into rows.
///
/// Placeholders and visualizations without any rows yield
/// [`ExportError::NoData`].
pub fn flatten(payload: &VisualizationPayload) -> Result<Vec<Row>, ExportError> {
    let rows: Vec<Row> = match payload {
        VisualizationPayload::Welcome { .. } | VisualizationPayload::Loading { .. } => {
            return Err(ExportError::NoData);
        }
        VisualizationPayload::ProfileChart { data, .. } => data
            .iter()
            .map(|p| Row::new().with("depth", json!(p.depth)).with("value", json!(p.value)))
            .collect(),
        VisualizationPayload::TimeSeriesChart { data, .. } => data
            .iter()
            .map(|p| Row::new().with("date", json!(p.date)).with("value", json!(p.value)))
            .collect(),
        VisualizationPayload::Map { data, .. } => data.iter().map(map_row).collect(),
        VisualizationPayload::MapComparison { data, .. } => [&data.map_a, &data.map_b]
            .into_iter()
            .flat_map(|series| {
                series
                    .data
                    .iter()
                    .map(|p| map_row(p).with("source", json!(series.title)))
            })
            .collect(),
        VisualizationPayload::DensityMap { data, .. } => data
            .iter()
            .map(|p| {
                Row::new()
                    .with("lat", json!(p.lat))
                    .with("lon", json!(p.lon))
                    .with("density", json!(p.density))
            })
            .collect(),
        VisualizationPayload::TrajectoryMap { data, .. } => data
            .iter()
            .flat_map(|trajectory| {
                trajectory.path.iter().map(|p| {
                    Row::new()
                        .with("float_id", json!(trajectory.id))
                        .with("lat", json!(p.lat))
                        .with("lon", json!(p.lon))
                        .with("timestamp", json!(p.timestamp))
                })
            })
            .collect(),
        VisualizationPayload::TableView { data, .. } => data
            .iter()
            .map(|record| {
                record
                    .iter()
                    .fold(Row::new(), |row, (column, value)| row.with(column, value.clone()))
            })
            .collect(),
    };

    if rows.is_empty() {
        return Err(ExportError::NoData);
    }
    Ok(rows)
}

fn map_row(p: &MapPoint) -> Row {
    Row::new()
        .with("lat", json!(p.lat))
        .with("lon", json!(p.lon))
        .with("id", json!(p.id))
}
