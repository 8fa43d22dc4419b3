//! Parsing of REPL input lines.
//!
//! Lines starting with `/` are commands; anything else is an utterance for
//! the model. A `-` argument means "no bound" or "clear".

use std::path::PathBuf;

use eyre::{Result, eyre};
use jiff::civil::Date;
use seavoice_core::models::filters::{Region, SensorType};
use seavoice_core::models::language::Language;
use seavoice_export::file::ExportFormat;

pub const HELP: &str = "\
Commands:
  /date <start|-> <end|->     date range filter (YYYY-MM-DD)
  /sensor <type>              sensor filter (all, temperature, salinity, oxygen, chlorophyll, nitrate, ph)
  /region <region>            region filter (all, indian, pacific, atlantic, southern, arctic)
  /depth <min|-> <max|->      depth range filter in metres
  /float <id|->               float id filter
  /filters                    show active filters
  /reset-filters              clear all filters
  /lang <code>                reply language (en es fr de hi ja zh ru pt ar it)
  /save, /load                save or restore this session
  /clear                      clear chat, filters and visualization
  /clear-viz                  clear only the visualization
  /export csv|json [dir]      export the current visualization
  /help                       show this help
  /quit                       leave
Anything else is sent as a question. Typing while a reply streams replaces it.";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Utterance(String),
    Date {
        start: Option<Date>,
        end: Option<Date>,
    },
    Sensor(SensorType),
    Region(Region),
    Depth {
        min: Option<f64>,
        max: Option<f64>,
    },
    Float(Option<String>),
    Filters,
    ResetFilters,
    Lang(Language),
    Save,
    Load,
    Clear,
    ClearVisualization,
    Export {
        format: ExportFormat,
        dir: Option<PathBuf>,
    },
    Help,
    Quit,
}

impl Command {
    /// Commands that only make sense on the explorer surface.
    pub fn explorer_only(&self) -> bool {
        matches!(
            self,
            Command::Date { .. }
                | Command::Sensor(_)
                | Command::Region(_)
                | Command::Depth { .. }
                | Command::Float(_)
                | Command::Filters
                | Command::ResetFilters
                | Command::ClearVisualization
                | Command::Export { .. }
        )
    }
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Some(Command::Utterance(line.to_string())));
    };

    let mut words = rest.split_whitespace();
    let name = words.next().unwrap_or_default();
    let args: Vec<&str> = words.collect();

    let command = match (name, args.as_slice()) {
        ("date", [start, end]) => Command::Date {
            start: optional(start, parse_date)?,
            end: optional(end, parse_date)?,
        },
        ("sensor", [sensor]) => Command::Sensor(sensor.parse()?),
        ("region", [region]) => Command::Region(region.parse()?),
        ("depth", [min, max]) => Command::Depth {
            min: optional(min, parse_depth)?,
            max: optional(max, parse_depth)?,
        },
        ("float", [id]) => Command::Float(optional(id, |s| Ok(s.to_string()))?),
        ("filters", []) => Command::Filters,
        ("reset-filters", []) => Command::ResetFilters,
        ("lang", [code]) => Command::Lang(Language::from_code_or_default(code)),
        ("save", []) => Command::Save,
        ("load", []) => Command::Load,
        ("clear", []) => Command::Clear,
        ("clear-viz", []) => Command::ClearVisualization,
        ("export", [format]) => Command::Export {
            format: format.parse()?,
            dir: None,
        },
        ("export", [format, dir]) => Command::Export {
            format: format.parse()?,
            dir: Some(PathBuf::from(dir)),
        },
        ("help", []) => Command::Help,
        ("quit" | "exit", []) => Command::Quit,
        (name, _) => return Err(eyre!("unknown command or wrong arguments: /{name} (try /help)")),
    };
    Ok(Some(command))
}

fn optional<T>(arg: &str, parse: impl Fn(&str) -> Result<T>) -> Result<Option<T>> {
    if arg == "-" {
        Ok(None)
    } else {
        parse(arg).map(Some)
    }
}

fn parse_date(s: &str) -> Result<Date> {
    s.parse::<Date>()
        .map_err(|e| eyre!("invalid date {s:?}: {e}"))
}

fn parse_depth(s: &str) -> Result<f64> {
    s.parse::<f64>()
        .map_err(|e| eyre!("invalid depth {s:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    #[test]
    fn plain_text_is_an_utterance() {
        assert_eq!(
            parse_line("  Show salinity near Sri Lanka  ").unwrap(),
            Some(Command::Utterance("Show salinity near Sri Lanka".to_string()))
        );
        assert_eq!(parse_line("   ").unwrap(), None);
    }

    #[test]
    fn dash_means_unbounded() {
        assert_eq!(
            parse_line("/date 2024-01-01 -").unwrap(),
            Some(Command::Date {
                start: Some(date(2024, 1, 1)),
                end: None
            })
        );
        assert_eq!(
            parse_line("/depth - 500").unwrap(),
            Some(Command::Depth {
                min: None,
                max: Some(500.0)
            })
        );
        assert_eq!(parse_line("/float -").unwrap(), Some(Command::Float(None)));
    }

    #[test]
    fn filter_values_are_parsed() {
        assert_eq!(
            parse_line("/sensor oxygen").unwrap(),
            Some(Command::Sensor(SensorType::Oxygen))
        );
        assert_eq!(
            parse_line("/region indian").unwrap(),
            Some(Command::Region(Region::IndianOcean))
        );
        assert!(parse_line("/sensor sonar").is_err());
        assert!(parse_line("/date yesterday -").is_err());
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        assert_eq!(parse_line("/lang ja").unwrap(), Some(Command::Lang(Language::Ja)));
        assert_eq!(parse_line("/lang xx").unwrap(), Some(Command::Lang(Language::En)));
    }

    #[test]
    fn export_takes_optional_directory() {
        assert_eq!(
            parse_line("/export csv").unwrap(),
            Some(Command::Export {
                format: ExportFormat::Csv,
                dir: None
            })
        );
        assert_eq!(
            parse_line("/export json /tmp/out").unwrap(),
            Some(Command::Export {
                format: ExportFormat::Json,
                dir: Some(PathBuf::from("/tmp/out"))
            })
        );
        assert!(parse_line("/export xlsx").is_err());
    }

    #[test]
    fn unknown_commands_are_rejected() {
        assert!(parse_line("/teleport").is_err());
        assert!(parse_line("/save now").is_err());
        assert!(Command::Filters.explorer_only());
        assert!(!Command::Save.explorer_only());
    }
}
