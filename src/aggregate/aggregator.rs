//! Single-pass aggregation of weekly records into the nested document.
//!
//! The whole transform lives here: records are grouped by country code,
//! properties are fixed at first sight, per-period metrics are overwritten
//! in place, and world totals accumulate on the fly. All state is owned by
//! one [`Aggregator`] value for the duration of one run; nothing is
//! process-wide.

use crate::models::{
    CountryEntry, CountryProperties, Indicator, PeriodMetrics, ReshapedData, SeriesEntry,
    WeeklyRecord, WorldEntry, WorldMetrics,
};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::debug;

/// Key of the synthesized global entry.
pub const WORLD_CODE: &str = "WORLD";

/// Counters describing one reshaping run, for the console summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReshapeSummary {
    /// Total records consumed.
    pub records: usize,
    /// Records carrying a "cases" indicator.
    pub cases_records: usize,
    /// Records carrying a "deaths" indicator.
    pub deaths_records: usize,
    /// Records dropped because their indicator was unrecognized.
    pub skipped_records: usize,
    /// Distinct country codes seen (the world entry not counted).
    pub countries: usize,
    /// Distinct period keys that received at least one metric write.
    pub periods: usize,
}

/// Accumulation state for one country code.
#[derive(Debug, Clone)]
struct CountryAccumulator {
    properties: CountryProperties,
    data: BTreeMap<String, PeriodMetrics>,
}

/// Single-pass aggregator owning all accumulation state for one run.
#[derive(Debug, Default)]
pub struct Aggregator {
    countries: BTreeMap<String, CountryAccumulator>,
    world_totals: BTreeMap<String, WorldMetrics>,
    world_population: u64,
    summary: ReshapeSummary,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one record.
    ///
    /// The properties block and the world-population contribution are taken
    /// from the first record seen for a code and never touched again; later
    /// records for the same code only write period metrics. Duplicate
    /// (country, period, indicator) triples overwrite: the last record
    /// wins, values are never summed. A record with an unrecognized
    /// indicator still materializes its country entry but writes no metrics
    /// and updates no world totals.
    pub fn ingest(&mut self, record: &WeeklyRecord) {
        self.summary.records += 1;

        let code = record.country_code();
        let country = match self.countries.entry(code.to_string()) {
            Entry::Occupied(occupied) => occupied.into_mut(),
            // First sight of this code: fix the properties block and count
            // the population toward the world total, exactly once.
            Entry::Vacant(vacant) => {
                self.world_population += record.population();
                vacant.insert(CountryAccumulator {
                    properties: CountryProperties::from_record(record),
                    data: BTreeMap::new(),
                })
            }
        };

        let period = record.period_key();

        // Period entries are created at the point of a metric write only;
        // a mere lookup must not materialize an empty entry.
        match record.indicator() {
            Indicator::Cases => {
                let metrics = country.data.entry(period.to_string()).or_default();
                metrics.cases = record.weekly_count();
                metrics.cumulative_cases = record.cumulative_count();
                metrics.rate_14_day_cases = record.rate_14_day();

                let totals = self.world_totals.entry(period.to_string()).or_default();
                totals.cases += record.weekly_count();
                totals.cumulative_cases += record.cumulative_count();

                self.summary.cases_records += 1;
            }
            Indicator::Deaths => {
                let metrics = country.data.entry(period.to_string()).or_default();
                metrics.deaths = record.weekly_count();
                metrics.cumulative_deaths = record.cumulative_count();
                metrics.rate_14_day_deaths = record.rate_14_day();

                let totals = self.world_totals.entry(period.to_string()).or_default();
                totals.deaths += record.weekly_count();
                totals.cumulative_deaths += record.cumulative_count();

                self.summary.deaths_records += 1;
            }
            Indicator::Other(raw) => {
                debug!("skipping record with unrecognized indicator {:?}", raw);
                self.summary.skipped_records += 1;
            }
        }
    }

    /// Synthesize the world entry and materialize the output document.
    pub fn finish(self) -> (ReshapedData, ReshapeSummary) {
        let mut summary = self.summary;
        summary.countries = self.countries.len();
        summary.periods = self.world_totals.len();

        let mut document: ReshapedData = BTreeMap::new();
        for (code, country) in self.countries {
            document.insert(
                code,
                SeriesEntry::Country(CountryEntry {
                    properties: country.properties,
                    data: country.data,
                }),
            );
        }

        document.insert(
            WORLD_CODE.to_string(),
            SeriesEntry::World(WorldEntry {
                properties: CountryProperties {
                    country: "World".to_string(),
                    country_code: WORLD_CODE.to_string(),
                    continent: "Earth".to_string(),
                    population: self.world_population,
                    source: "Aggregated Data".to_string(),
                },
                data: self.world_totals,
            }),
        );

        (document, summary)
    }
}

/// Run the whole transform over an in-memory record sequence.
pub fn reshape(records: &[WeeklyRecord]) -> (ReshapedData, ReshapeSummary) {
    let mut aggregator = Aggregator::new();
    for record in records {
        aggregator.ingest(record);
    }
    aggregator.finish()
}

/// Re-derive the world totals from the per-country entries and report every
/// discrepancy against the emitted world entry.
///
/// For input with at most one record per (country, period, indicator)
/// triple this always comes back empty. Duplicate triples make the two
/// views diverge, since per-country metrics overwrite while world totals
/// accumulate, so a non-empty result flags duplicated input rows.
pub fn verify_world_totals(document: &ReshapedData) -> Vec<String> {
    let mut derived: BTreeMap<&str, WorldMetrics> = BTreeMap::new();
    let mut derived_population: u64 = 0;

    for entry in document.values() {
        let SeriesEntry::Country(country) = entry else {
            continue;
        };
        derived_population += country.properties.population;

        for (period, metrics) in &country.data {
            let totals = derived.entry(period.as_str()).or_default();
            totals.cases += metrics.cases;
            totals.deaths += metrics.deaths;
            totals.cumulative_cases += metrics.cumulative_cases;
            totals.cumulative_deaths += metrics.cumulative_deaths;
        }
    }

    let mut problems = Vec::new();

    let Some(SeriesEntry::World(world)) = document.get(WORLD_CODE) else {
        problems.push("document has no world entry".to_string());
        return problems;
    };

    if world.properties.population != derived_population {
        problems.push(format!(
            "world population {} != sum of country populations {}",
            world.properties.population, derived_population
        ));
    }

    for (period, totals) in &world.data {
        match derived.get(period.as_str()) {
            Some(expected) if expected == totals => {}
            Some(expected) => problems.push(format!(
                "period {}: world totals {:?} != derived {:?}",
                period, totals, expected
            )),
            None => problems.push(format!(
                "period {}: world entry has totals but no country has data",
                period
            )),
        }
    }

    for period in derived.keys() {
        if !world.data.contains_key(*period) {
            problems.push(format!(
                "period {}: countries have data but the world entry does not",
                period
            ));
        }
    }

    problems
}
