//! Export files on disk.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use seavoice_core::models::visualization::VisualizationPayload;
use tracing::info;

use crate::csv::{to_csv, to_json};
use crate::error::ExportError;
use crate::flatten::flatten;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

/// File name for an export: the title with whitespace and `/` replaced by
/// `_`, plus the format's extension.
pub fn export_filename(title: &str, format: ExportFormat) -> String {
    let stem: String = title
        .chars()
        .map(|c| if c.is_whitespace() || c == '/' { '_' } else { c })
        .collect();
    format!("{stem}.{}", format.extension())
}

/// Render the export document for `payload`.
pub fn render(payload: &VisualizationPayload, format: ExportFormat) -> Result<String, ExportError> {
    let rows = flatten(payload)?;
    match format {
        ExportFormat::Csv => to_csv(&rows),
        ExportFormat::Json => to_json(&rows),
    }
}

/// Write the export of `payload` into `dir` and return the file path.
pub fn write_export(
    payload: &VisualizationPayload,
    format: ExportFormat,
    dir: &Path,
) -> Result<PathBuf, ExportError> {
    let document = render(payload, format)?;
    let path = dir.join(export_filename(payload.title(), format));
    std::fs::write(&path, document)?;

    info!(path = %path.display(), %format, kind = %payload.kind(), "visualization exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_replaces_whitespace_and_slashes() {
        assert_eq!(
            export_filename("Temp / Salinity\tnear Sri Lanka", ExportFormat::Csv),
            "Temp___Salinity_near_Sri_Lanka.csv"
        );
        assert_eq!(export_filename("Map", ExportFormat::Json), "Map.json");
    }

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!(matches!(
            "xlsx".parse::<ExportFormat>(),
            Err(ExportError::UnknownFormat(_))
        ));
    }
}
