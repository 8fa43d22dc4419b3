//! Terminal rendering of streamed replies, visualizations and filters.

use seavoice_core::compose::constraint_lines;
use seavoice_core::models::filters::Filters;
use seavoice_core::models::visualization::VisualizationPayload;
use seavoice_export::flatten::flatten;
use seavoice_interpreter::interpreter::OPEN_DELIMITER;

const PREVIEW_ROWS: usize = 5;

/// Prints a growing transcript as deltas.
///
/// Text that could still turn out to be the start of the payload marker is
/// held back, so the marker never reaches the terminal.
#[derive(Debug, Default)]
pub struct TranscriptPrinter {
    printed: String,
}

impl TranscriptPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The part of `transcript` not yet printed.
    pub fn delta(&mut self, transcript: &str) -> Option<String> {
        let visible = transcript.trim_start();
        let visible = &visible[..visible.len() - held_back(visible)];
        self.advance(visible)
    }

    /// Everything left to print once the transcript is final.
    pub fn finish(&mut self, transcript: &str) -> Option<String> {
        self.advance(transcript.trim())
    }

    fn advance(&mut self, visible: &str) -> Option<String> {
        let rest = visible.strip_prefix(self.printed.as_str())?;
        if rest.is_empty() {
            return None;
        }
        self.printed.push_str(rest);
        Some(rest.to_string())
    }
}

/// Length of the longest suffix of `text` that is a proper prefix of the
/// opening marker.
fn held_back(text: &str) -> usize {
    (1..OPEN_DELIMITER.len())
        .rev()
        .find(|&n| text.ends_with(&OPEN_DELIMITER[..n]))
        .unwrap_or(0)
}

/// A short text rendering of a visualization: title, type and a few rows.
pub fn visualization(payload: &VisualizationPayload) -> String {
    let mut out = format!("[{}] {}", payload.kind(), payload.title());
    if payload.is_placeholder() {
        return out;
    }

    let Ok(rows) = flatten(payload) else {
        return out;
    };
    out.push_str(&format!(" ({} rows)", rows.len()));
    for row in rows.iter().take(PREVIEW_ROWS) {
        let cells: Vec<String> = row
            .columns()
            .map(|c| match row.get(c) {
                Some(serde_json::Value::String(s)) => format!("{c}={s}"),
                Some(v) => format!("{c}={v}"),
                None => format!("{c}="),
            })
            .collect();
        out.push_str("\n  ");
        out.push_str(&cells.join("  "));
    }
    if rows.len() > PREVIEW_ROWS {
        out.push_str(&format!("\n  ... {} more", rows.len() - PREVIEW_ROWS));
    }
    out
}

pub fn filters(filters: &Filters) -> String {
    let lines = constraint_lines(filters);
    if lines.is_empty() {
        return "No filters set.".to_string();
    }
    lines
        .iter()
        .map(|l| format!("- {l}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use seavoice_core::models::filters::SensorType;
    use seavoice_core::models::visualization::ProfilePoint;

    use super::*;

    #[test]
    fn partial_marker_is_held_back() {
        let mut printer = TranscriptPrinter::new();
        assert_eq!(printer.delta("Here is the data.\n``").as_deref(), Some("Here is the data.\n"));
        assert_eq!(printer.delta("Here is the data."), None);
        assert_eq!(printer.finish("Here is the data."), None);
    }

    #[test]
    fn held_back_text_is_released_when_not_a_marker() {
        let mut printer = TranscriptPrinter::new();
        assert_eq!(printer.delta("Use `").as_deref(), Some("Use "));
        assert_eq!(printer.delta("Use `ls`").as_deref(), Some("`ls"));
        assert_eq!(printer.finish("Use `ls` here").as_deref(), Some("` here"));
    }

    #[test]
    fn leading_whitespace_is_skipped() {
        let mut printer = TranscriptPrinter::new();
        assert_eq!(printer.delta("\n\nHello").as_deref(), Some("Hello"));
        assert_eq!(printer.finish("Hello"), None);
    }

    #[test]
    fn visualization_lists_first_rows() {
        let payload = VisualizationPayload::ProfileChart {
            title: "Temperature profile".to_string(),
            data: (0..7)
                .map(|i| ProfilePoint {
                    depth: f64::from(i) * 10.0,
                    value: 25.0 - f64::from(i),
                })
                .collect(),
            x_axis_label: None,
            y_axis_label: None,
        };

        let text = visualization(&payload);
        assert!(text.starts_with("[profile_chart] Temperature profile (7 rows)"));
        assert!(text.contains("depth=0.0  value=25.0"));
        assert!(text.ends_with("... 2 more"));
    }

    #[test]
    fn placeholder_shows_title_only() {
        assert_eq!(
            visualization(&VisualizationPayload::welcome("Welcome to Sea Voice")),
            "[welcome] Welcome to Sea Voice"
        );
    }

    #[test]
    fn filters_are_listed() {
        let mut f = Filters::default();
        assert_eq!(filters(&f), "No filters set.");
        f.set_sensor_type(SensorType::Ph);
        assert_eq!(filters(&f), "- Sensor type: pH");
    }
}
