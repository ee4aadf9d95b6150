//! Data models for the record reshaper.
//!
//! This module contains the input record shape, the indicator enum, and
//! the nested output document structures.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Fallback country name when the field is absent.
const DEFAULT_COUNTRY: &str = "Unknown";
/// Fallback country code when the field is absent.
const DEFAULT_COUNTRY_CODE: &str = "N/A";
/// Fallback continent when the field is absent.
const DEFAULT_CONTINENT: &str = "Unknown";
/// Fallback source attribution when the field is absent.
const DEFAULT_SOURCE: &str = "Unknown";
/// Fallback period key when the field is absent.
const DEFAULT_PERIOD_KEY: &str = "Unknown";

/// One input row: a single country × week × indicator observation.
///
/// Every field is optional in the serialized form, and `null` is treated
/// the same as an absent field. Unknown extra fields are ignored. The
/// accessor methods apply the documented defaults, so callers never see a
/// missing value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeeklyRecord {
    /// Country display name.
    pub country: Option<String>,
    /// Country code; the grouping key for the output document.
    pub country_code: Option<String>,
    /// Continent display name.
    pub continent: Option<String>,
    /// Country population.
    pub population: Option<u64>,
    /// Data source attribution.
    pub source: Option<String>,
    /// Period key in `YYYY-WW` format.
    pub year_week: Option<String>,
    /// Observation kind, matched case-insensitively.
    pub indicator: Option<String>,
    /// Count for this week. Signed: upstream data contains negative
    /// correction rows.
    pub weekly_count: Option<i64>,
    /// Running total up to and including this week.
    pub cumulative_count: Option<i64>,
    /// 14-day notification rate.
    pub rate_14_day: Option<f64>,
}

impl WeeklyRecord {
    pub fn country(&self) -> &str {
        self.country.as_deref().unwrap_or(DEFAULT_COUNTRY)
    }

    pub fn country_code(&self) -> &str {
        self.country_code.as_deref().unwrap_or(DEFAULT_COUNTRY_CODE)
    }

    pub fn continent(&self) -> &str {
        self.continent.as_deref().unwrap_or(DEFAULT_CONTINENT)
    }

    pub fn population(&self) -> u64 {
        self.population.unwrap_or(0)
    }

    pub fn source(&self) -> &str {
        self.source.as_deref().unwrap_or(DEFAULT_SOURCE)
    }

    pub fn period_key(&self) -> &str {
        self.year_week.as_deref().unwrap_or(DEFAULT_PERIOD_KEY)
    }

    pub fn indicator(&self) -> Indicator {
        Indicator::from(self.indicator.as_deref().unwrap_or(""))
    }

    pub fn weekly_count(&self) -> i64 {
        self.weekly_count.unwrap_or(0)
    }

    pub fn cumulative_count(&self) -> i64 {
        self.cumulative_count.unwrap_or(0)
    }

    pub fn rate_14_day(&self) -> f64 {
        self.rate_14_day.unwrap_or(0.0)
    }
}

/// Observation kind carried by a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Indicator {
    /// Weekly case counts.
    Cases,
    /// Weekly death counts.
    Deaths,
    /// Anything else; dropped by the aggregator (extension point).
    Other(String),
}

impl From<&str> for Indicator {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "cases" => Indicator::Cases,
            "deaths" => Indicator::Deaths,
            other => Indicator::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Indicator::Cases => write!(f, "cases"),
            Indicator::Deaths => write!(f, "deaths"),
            Indicator::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Static per-country properties.
///
/// Fixed by the first record seen for a country code and never overwritten,
/// even if later records disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryProperties {
    pub country: String,
    pub country_code: String,
    pub continent: String,
    pub population: u64,
    pub source: String,
}

impl CountryProperties {
    /// Capture the properties block from a record, applying field defaults.
    pub fn from_record(record: &WeeklyRecord) -> Self {
        Self {
            country: record.country().to_string(),
            country_code: record.country_code().to_string(),
            continent: record.continent().to_string(),
            population: record.population(),
            source: record.source().to_string(),
        }
    }
}

/// Per-country metrics for a single period key.
///
/// Zero-initialized on the first write for the period. Writes overwrite,
/// never sum: the last record for a (country, period, indicator) triple
/// wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodMetrics {
    pub cases: i64,
    pub deaths: i64,
    pub cumulative_cases: i64,
    pub cumulative_deaths: i64,
    pub rate_14_day_cases: f64,
    pub rate_14_day_deaths: f64,
}

/// Global totals for a single period key, accumulated additively across
/// all countries. Carries no rate fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldMetrics {
    pub cases: i64,
    pub deaths: i64,
    pub cumulative_cases: i64,
    pub cumulative_deaths: i64,
}

/// Time series for one country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryEntry {
    pub properties: CountryProperties,
    pub data: BTreeMap<String, PeriodMetrics>,
}

/// The synthesized global aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldEntry {
    pub properties: CountryProperties,
    pub data: BTreeMap<String, WorldMetrics>,
}

/// A value of the output document: a country or the world aggregate.
///
/// Serialized untagged; both shapes emit `{"properties": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SeriesEntry {
    Country(CountryEntry),
    World(WorldEntry),
}

impl SeriesEntry {
    pub fn properties(&self) -> &CountryProperties {
        match self {
            SeriesEntry::Country(entry) => &entry.properties,
            SeriesEntry::World(entry) => &entry.properties,
        }
    }
}

/// The fully materialized output document, keyed by country code plus the
/// synthesized `"WORLD"` key. `BTreeMap` keeps serialization order, and
/// therefore output bytes, deterministic.
pub type ReshapedData = BTreeMap<String, SeriesEntry>;
