use std::fmt;
use std::str::FromStr;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// User-chosen constraints applied to visualization requests.
///
/// Every setter validates before mutating, so a stored `Filters` always
/// satisfies [`Filters::validate`]. Requests take a clone at composition time;
/// editing the live filters afterwards never reaches an in-flight request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    pub date_range: DateRange,
    pub sensor_type: SensorType,
    pub region: Region,
    pub depth_range: DepthRange,
    pub float_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<Date>,
    pub end: Option<Date>,
}

/// Depth bounds in metres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DepthRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl DateRange {
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

impl DepthRange {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

impl Filters {
    /// `true` when nothing would be added to a request.
    pub fn is_empty(&self) -> bool {
        self.date_range.is_empty()
            && self.sensor_type == SensorType::All
            && self.region == Region::All
            && self.depth_range.is_empty()
            && self.float_id.is_none()
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        check_dates(&self.date_range)?;
        check_depths(&self.depth_range)?;
        if let Some(id) = &self.float_id
            && id.trim().is_empty()
        {
            return Err(CoreError::InvalidFilter("float id is blank".to_string()));
        }
        Ok(())
    }

    pub fn set_date_range(&mut self, start: Option<Date>, end: Option<Date>) -> Result<(), CoreError> {
        let range = DateRange { start, end };
        check_dates(&range)?;
        self.date_range = range;
        Ok(())
    }

    pub fn set_depth_range(&mut self, min: Option<f64>, max: Option<f64>) -> Result<(), CoreError> {
        let range = DepthRange { min, max };
        check_depths(&range)?;
        self.depth_range = range;
        Ok(())
    }

    pub fn set_sensor_type(&mut self, sensor_type: SensorType) {
        self.sensor_type = sensor_type;
    }

    pub fn set_region(&mut self, region: Region) {
        self.region = region;
    }

    /// Set or clear the float id. A blank id clears it.
    pub fn set_float_id(&mut self, float_id: Option<&str>) {
        self.float_id = float_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
    }
}

fn check_dates(range: &DateRange) -> Result<(), CoreError> {
    if let (Some(start), Some(end)) = (range.start, range.end)
        && start > end
    {
        return Err(CoreError::InvalidFilter(format!(
            "date range start {start} is after end {end}"
        )));
    }
    Ok(())
}

fn check_depths(range: &DepthRange) -> Result<(), CoreError> {
    for bound in [range.min, range.max].into_iter().flatten() {
        if !bound.is_finite() || bound < 0.0 {
            return Err(CoreError::InvalidFilter(format!(
                "depth {bound} must be a non-negative number of metres"
            )));
        }
    }
    if let (Some(min), Some(max)) = (range.min, range.max)
        && min > max
    {
        return Err(CoreError::InvalidFilter(format!(
            "depth range min {min} is greater than max {max}"
        )));
    }
    Ok(())
}

// ── Enumerations ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorType {
    #[default]
    All,
    Temperature,
    Salinity,
    Oxygen,
    Chlorophyll,
    Nitrate,
    Ph,
}

impl SensorType {
    pub const ALL: [SensorType; 7] = [
        SensorType::All,
        SensorType::Temperature,
        SensorType::Salinity,
        SensorType::Oxygen,
        SensorType::Chlorophyll,
        SensorType::Nitrate,
        SensorType::Ph,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SensorType::All => "all",
            SensorType::Temperature => "temperature",
            SensorType::Salinity => "salinity",
            SensorType::Oxygen => "oxygen",
            SensorType::Chlorophyll => "chlorophyll",
            SensorType::Nitrate => "nitrate",
            SensorType::Ph => "ph",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SensorType::All => "All",
            SensorType::Temperature => "Temperature",
            SensorType::Salinity => "Salinity",
            SensorType::Oxygen => "Oxygen",
            SensorType::Chlorophyll => "Chlorophyll",
            SensorType::Nitrate => "Nitrate",
            SensorType::Ph => "pH",
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SensorType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        SensorType::ALL
            .into_iter()
            .find(|t| t.as_str() == key)
            .ok_or_else(|| CoreError::UnknownValue {
                kind: "sensor type",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    #[default]
    All,
    IndianOcean,
    PacificOcean,
    AtlanticOcean,
    SouthernOcean,
    ArcticOcean,
}

impl Region {
    pub const ALL: [Region; 6] = [
        Region::All,
        Region::IndianOcean,
        Region::PacificOcean,
        Region::AtlanticOcean,
        Region::SouthernOcean,
        Region::ArcticOcean,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Region::All => "all",
            Region::IndianOcean => "indian_ocean",
            Region::PacificOcean => "pacific_ocean",
            Region::AtlanticOcean => "atlantic_ocean",
            Region::SouthernOcean => "southern_ocean",
            Region::ArcticOcean => "arctic_ocean",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Region::All => "All Oceans",
            Region::IndianOcean => "Indian Ocean",
            Region::PacificOcean => "Pacific Ocean",
            Region::AtlanticOcean => "Atlantic Ocean",
            Region::SouthernOcean => "Southern Ocean",
            Region::ArcticOcean => "Arctic Ocean",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Region {
    type Err = CoreError;

    /// Accepts the snake_case key or a short name (`indian`, `pacific`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        Region::ALL
            .into_iter()
            .find(|r| {
                let name = r.as_str();
                name == key || name.strip_suffix("_ocean") == Some(key.as_str())
            })
            .ok_or_else(|| CoreError::UnknownValue {
                kind: "region",
                value: s.to_string(),
            })
    }
}
