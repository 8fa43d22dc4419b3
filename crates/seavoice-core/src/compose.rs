//! Outbound request composition.
//!
//! A request is the user's utterance followed by a manifest of the filters
//! that are actually set, so the model sees both the free-text ask and the
//! explicit constraints. Composition is pure and deterministic.

use crate::models::filters::{DateRange, DepthRange, Filters, Region, SensorType};
use crate::models::persona::Persona;

pub const FILTER_HEADER: &str = "Applied filters:";

const TRIVIA_REQUEST: &str = "Generate a new ocean trivia question.";

/// Build the request text for one exchange.
///
/// The caller rejects blank utterances before calling. Personas that do not
/// work with ocean data (summarizer, trivia) never receive the manifest.
pub fn compose(utterance: &str, filters: &Filters, persona: Persona) -> String {
    let utterance = utterance.trim();
    if !persona.uses_filters() {
        return utterance.to_string();
    }

    let lines = constraint_lines(filters);
    if lines.is_empty() {
        return utterance.to_string();
    }

    let mut request = String::with_capacity(utterance.len() + 64 * lines.len());
    request.push_str(utterance);
    request.push_str("\n\n");
    request.push_str(FILTER_HEADER);
    for line in lines {
        request.push_str("\n- ");
        request.push_str(&line);
    }
    request
}

/// Request text for the next trivia question at a given difficulty.
pub fn compose_trivia_request(difficulty: u32) -> String {
    format!("{TRIVIA_REQUEST}\n\ndifficulty level: {}", difficulty.max(1))
}

/// One human-readable line per set filter, in a fixed order.
pub fn constraint_lines(filters: &Filters) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(line) = date_line(&filters.date_range) {
        lines.push(line);
    }
    if filters.sensor_type != SensorType::All {
        lines.push(format!("Sensor type: {}", filters.sensor_type.label()));
    }
    if filters.region != Region::All {
        lines.push(format!("Region: {}", filters.region.label()));
    }
    if let Some(line) = depth_line(&filters.depth_range) {
        lines.push(line);
    }
    if let Some(id) = filters.float_id.as_deref().map(str::trim)
        && !id.is_empty()
    {
        lines.push(format!("Float ID: {id}"));
    }

    lines
}

fn date_line(range: &DateRange) -> Option<String> {
    let text = match (range.start, range.end) {
        (Some(start), Some(end)) => format!("{start} to {end}"),
        (Some(start), None) => format!("from {start}"),
        (None, Some(end)) => format!("until {end}"),
        (None, None) => return None,
    };
    Some(format!("Date range: {text}"))
}

fn depth_line(range: &DepthRange) -> Option<String> {
    let text = match (range.min, range.max) {
        (Some(min), Some(max)) => format!("{min} to {max} m"),
        (Some(min), None) => format!("at least {min} m"),
        (None, Some(max)) => format!("at most {max} m"),
        (None, None) => return None,
    };
    Some(format!("Depth range: {text}"))
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    #[test]
    fn no_filters_yields_bare_utterance() {
        let request = compose("  Show salinity near Sri Lanka ", &Filters::default(), Persona::DomainExpert);
        assert_eq!(request, "Show salinity near Sri Lanka");
    }

    #[test]
    fn lists_only_set_filters_in_fixed_order() {
        let mut filters = Filters::default();
        filters.set_float_id(Some("2901765"));
        filters.set_region(Region::IndianOcean);
        filters
            .set_date_range(Some(date(2024, 1, 1)), Some(date(2024, 3, 31)))
            .unwrap();
        filters.set_depth_range(Some(0.0), Some(500.0)).unwrap();

        let request = compose("Plot temperature", &filters, Persona::DomainExpert);
        assert_eq!(
            request,
            "Plot temperature\n\n\
             Applied filters:\n\
             - Date range: 2024-01-01 to 2024-03-31\n\
             - Region: Indian Ocean\n\
             - Depth range: 0 to 500 m\n\
             - Float ID: 2901765"
        );
    }

    #[test]
    fn open_ended_bounds_read_naturally() {
        let mut filters = Filters::default();
        filters.set_date_range(None, Some(date(2023, 12, 31))).unwrap();
        filters.set_depth_range(Some(200.5), None).unwrap();
        filters.set_sensor_type(SensorType::Oxygen);

        assert_eq!(
            constraint_lines(&filters),
            vec![
                "Date range: until 2023-12-31",
                "Sensor type: Oxygen",
                "Depth range: at least 200.5 m",
            ]
        );
    }

    #[test]
    fn summarizer_ignores_filters() {
        let mut filters = Filters::default();
        filters.set_sensor_type(SensorType::Salinity);
        assert_eq!(compose("Summarize El Niño", &filters, Persona::Summarizer), "Summarize El Niño");
        assert!(compose("Explain", &filters, Persona::Conversational).contains(FILTER_HEADER));
    }

    #[test]
    fn composition_is_deterministic() {
        let mut filters = Filters::default();
        filters.set_sensor_type(SensorType::Nitrate);
        let a = compose("q", &filters, Persona::DomainExpert);
        let b = compose("q", &filters.clone(), Persona::DomainExpert);
        assert_eq!(a, b);
    }

    #[test]
    fn trivia_request_carries_difficulty() {
        assert_eq!(
            compose_trivia_request(3),
            "Generate a new ocean trivia question.\n\ndifficulty level: 3"
        );
        assert!(compose_trivia_request(0).ends_with("difficulty level: 1"));
    }
}
