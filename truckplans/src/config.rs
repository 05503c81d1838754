use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Corrects annual totals for the imbalance between weekday and weekend truck traffic.
pub const SEASONAL_FACTOR: f64 = 1.02159;
pub const DAYS_PER_YEAR: f64 = 365.25;
pub const SECONDS_PER_DAY: u64 = 24 * 3600;

/// How finely trip endpoints are placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Granularity {
    /// Counties are further split into sub-county zones.
    Numas,
    /// Stop at the county (or border crossing) level.
    Counties,
}

impl FromStr for Granularity {
    type Err = Error;

    fn from_str(x: &str) -> Result<Granularity> {
        match x {
            "numas" => Ok(Granularity::Numas),
            "counties" => Ok(Granularity::Counties),
            _ => Err(Error::Configuration(format!(
                "region must be either numas or counties, not {}",
                x
            ))),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Granularity::Numas => write!(f, "numas"),
            Granularity::Counties => write!(f, "counties"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// One row per trip
    Csv,
    /// An agent-based population of two-activity plans
    Xml,
}

impl OutputFormat {
    /// Detect the format from an output path. `.xml.gz` counts as XML.
    pub fn from_path(path: &str) -> Result<OutputFormat> {
        let path = path.to_ascii_lowercase();
        if path.ends_with(".csv") {
            Ok(OutputFormat::Csv)
        } else if path.ends_with(".xml") || path.ends_with(".xml.gz") {
            Ok(OutputFormat::Xml)
        } else {
            Err(Error::Configuration(format!(
                "output must be either xml or csv, not {}",
                path
            )))
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Xml => write!(f, "xml"),
        }
    }
}

/// Everything that controls a run. Built once, validated, then passed by reference to every
/// stage that needs it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Fraction of the simulated period's trucks to keep.
    pub sample_rate: f64,
    /// Length of the simulated horizon.
    pub number_days: u32,
    pub granularity: Granularity,
    pub output_format: OutputFormat,
    /// Departure days are normally drawn from `[0, number_days - 1)`, leaving out the last day.
    /// Setting this draws from `[0, number_days)` instead.
    pub include_final_day: bool,
    pub rng_seed: u64,
    /// How many independent chunks the input rows are split into.
    pub num_partitions: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            sample_rate: 1.0,
            number_days: 1,
            granularity: Granularity::Numas,
            output_format: OutputFormat::Csv,
            include_final_day: false,
            rng_seed: 42,
            num_partitions: 1,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(Error::Configuration(format!(
                "samplerate must be a positive number, not {}",
                self.sample_rate
            )));
        }
        if self.number_days == 0 {
            return Err(Error::Configuration(
                "days must be a positive integer".to_string(),
            ));
        }
        if self.num_partitions == 0 {
            return Err(Error::Configuration(
                "need at least one partition".to_string(),
            ));
        }
        Ok(())
    }

    /// The length of the simulated period. Every departure is strictly less than this.
    pub fn horizon_seconds(&self) -> u64 {
        u64::from(self.number_days) * SECONDS_PER_DAY
    }

    /// The chance that any one of a flow's annual trucks shows up in the simulated period.
    pub fn thinning_probability(&self) -> f64 {
        (f64::from(self.number_days) / DAYS_PER_YEAR * SEASONAL_FACTOR * self.sample_rate).min(1.0)
    }
}
